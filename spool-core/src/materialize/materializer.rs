// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::any::type_name;

use tracing::{debug, trace, warn};

use super::{
    normalize, ConstructorShape, Constructors, InfoContext, Materialize, PropertyBag, VALUES_ENTRY,
};
use crate::error::Error;
use crate::spool::Spool;
use crate::token::{TokenBuffer, TokenKind, TokenReader};

/// Materializes `T` from the reader's current token.
///
/// Returns `None` for a null token. The reader is left on the last token of
/// the value.
pub(crate) fn materialize<T: Materialize>(
    reader: &mut dyn TokenReader,
    existing: Option<T>,
    spool: &Spool,
) -> Result<Option<T>, Error> {
    if reader.token_kind().is_null() {
        return Ok(None);
    }

    if let Some(mut existing) = existing {
        if spool.config().object_creation_handling().reuses_existing() {
            trace!(target_type = type_name::<T>(), "populating existing instance");
            existing.read_from(reader, spool)?;
            return Ok(Some(existing));
        }
    }

    let info = spool.type_registry().get_or_register::<T>();
    if info.is_abstract() {
        return Err(Error::construction(format!(
            "Could not create an instance of type {}. Type is abstract and cannot be instantiated. Path '{}'.",
            type_name::<T>(),
            reader.path()
        )));
    }
    let ctors = info.constructors::<T>().ok_or_else(|| {
        Error::enhance_type_error::<T>(Error::type_error("cached constructors belong to another type"))
    })?;

    let shapes = info.shapes();
    match (shapes.preferred(), shapes.legacy()) {
        (None, None) => Err(Error::construction(format!(
            "Unable to find a constructor to use for type {}. Path '{}'.",
            type_name::<T>(),
            reader.path()
        ))),
        (Some(shape), None) => construct(shape, ctors, reader, spool).map(Some),
        (None, Some(legacy)) => {
            debug!(target_type = type_name::<T>(), shape = ?legacy, "using legacy constructor");
            construct_legacy(legacy, ctors, reader, spool).map(Some)
        }
        (Some(shape), Some(legacy)) => {
            // both attempts must see the same tokens
            let base = reader.path();
            let max_depth = reader.max_depth().saturating_sub(reader.depth());
            let handling = reader.date_parse_handling();
            let tokens = TokenBuffer::record(reader)?;

            let mut replay = tokens.reader_at(handling, max_depth, &base);
            replay.read_required()?;
            match construct(shape, ctors, &mut replay, spool) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    warn!(
                        target_type = type_name::<T>(),
                        shape = ?shape,
                        error = %err,
                        "constructor failed, falling back to legacy constructor"
                    );
                    let mut replay = tokens.reader_at(handling, max_depth, &base);
                    replay.read_required()?;
                    construct_legacy(legacy, ctors, &mut replay, spool).map(Some)
                }
            }
        }
    }
}

fn construct<T: Materialize>(
    shape: ConstructorShape,
    ctors: &Constructors<T>,
    reader: &mut dyn TokenReader,
    spool: &Spool,
) -> Result<T, Error> {
    trace!(target_type = type_name::<T>(), shape = ?shape, "constructing");
    match shape {
        ConstructorShape::ReaderPlusHelper => match ctors.reader_plus_helper {
            Some(f) => f(reader, spool).map_err(|err| construction_failed::<T>(shape, err)),
            None => Err(missing_shape::<T>(shape)),
        },
        ConstructorShape::ReaderOnly => match ctors.reader_only {
            Some(f) => f(reader).map_err(|err| construction_failed::<T>(shape, err)),
            None => Err(missing_shape::<T>(shape)),
        },
        ConstructorShape::Parameterless => match ctors.parameterless {
            Some(f) => {
                let mut value = f();
                value
                    .read_from(reader, spool)
                    .map_err(|err| construction_failed::<T>(shape, err))?;
                Ok(value)
            }
            None => Err(missing_shape::<T>(shape)),
        },
        ConstructorShape::LegacyInfoPlusContext | ConstructorShape::LegacyInfo => {
            construct_legacy(shape, ctors, reader, spool)
        }
    }
}

fn construct_legacy<T: Materialize>(
    shape: ConstructorShape,
    ctors: &Constructors<T>,
    reader: &mut dyn TokenReader,
    spool: &Spool,
) -> Result<T, Error> {
    let path = reader.path();
    let mut bag = PropertyBag::new(type_name::<T>());
    match reader.token_kind() {
        TokenKind::StartObject => {
            while let Some(name) = reader.read_property_name()? {
                reader.read_required()?;
                let value = normalize(reader)?;
                bag.insert(name, value);
            }
        }
        TokenKind::StartArray => {
            let values = normalize(reader)?;
            bag.insert(VALUES_ENTRY, values);
        }
        found => {
            return Err(Error::construction(format!(
                "Cannot populate type {} from token {}. Path '{}'.",
                type_name::<T>(),
                found,
                path
            )))
        }
    }
    let result = match shape {
        ConstructorShape::LegacyInfoPlusContext => match ctors.legacy_info_context {
            Some(f) => f(bag, &InfoContext::new(spool, &path)),
            None => return Err(missing_shape::<T>(shape)),
        },
        ConstructorShape::LegacyInfo => match ctors.legacy_info {
            Some(f) => f(bag),
            None => return Err(missing_shape::<T>(shape)),
        },
        _ => return Err(missing_shape::<T>(shape)),
    };
    result.map_err(|err| construction_failed::<T>(shape, err))
}

#[cold]
fn missing_shape<T>(shape: ConstructorShape) -> Error {
    Error::construction(format!(
        "Type {} has no {:?} constructor.",
        type_name::<T>(),
        shape
    ))
}

#[cold]
fn construction_failed<T>(shape: ConstructorShape, err: Error) -> Error {
    match err {
        err @ Error::Construction(_) => err,
        err => Error::construction(format!(
            "Failed to create an instance of type {} using its {:?} constructor: {}",
            type_name::<T>(),
            shape,
            err
        )),
    }
}
