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

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use super::type_registry::{TypeKey, TypeRegistry};
use crate::error::Error;
use crate::spool::Spool;
use crate::token::{TokenReader, TokenWriter};

/// Which side of a conversion a converter is resolved for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

/// Custom read/write logic for one or more runtime types, consulted before
/// the default serializer path.
pub trait Converter: Send + Sync {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    /// Whether this converter handles values of `key`. One converter may
    /// claim a whole family of types.
    fn can_convert(&self, key: &TypeKey) -> bool;

    /// Reads a value of type `key` from the reader's current token. The
    /// returned box must hold exactly that type.
    fn read_value(
        &self,
        reader: &mut dyn TokenReader,
        key: &TypeKey,
        existing: Option<Box<dyn Any>>,
        spool: &Spool,
    ) -> Result<Box<dyn Any>, Error>;

    fn write_value(&self, writer: &mut dyn TokenWriter, value: &dyn Any, spool: &Spool) -> Result<(), Error>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Ordered converter list. The first converter whose direction flag is set
/// and whose predicate accepts the type wins; the registry never reorders.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, converter: Arc<dyn Converter>) {
        self.converters.push(converter);
    }

    /// Inserts at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, converter: Arc<dyn Converter>) {
        let index = index.min(self.converters.len());
        self.converters.insert(index, converter);
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Converter>> {
        self.converters.iter()
    }

    /// `None` means the default path handles the type.
    pub fn resolve(&self, key: &TypeKey, direction: Direction) -> Option<&Arc<dyn Converter>> {
        let found = self.converters.iter().find(|c| {
            let enabled = match direction {
                Direction::Read => c.can_read(),
                Direction::Write => c.can_write(),
            };
            enabled && c.can_convert(key)
        });
        if let Some(converter) = found {
            trace!(
                target_type = key.name(),
                ?direction,
                converter = converter.name(),
                "resolved converter"
            );
        }
        found
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.converters.iter().map(|c| c.name()))
            .finish()
    }
}

/// A set of types one converter owns.
#[derive(Clone, Debug, Default)]
pub struct TypeFamily {
    members: Vec<TypeKey>,
}

impl TypeFamily {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: ?Sized + 'static>(mut self) -> Self {
        let key = TypeKey::of::<T>();
        if !self.members.contains(&key) {
            self.members.push(key);
        }
        self
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.members.contains(key)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

type ReadClosure<T> = Box<dyn Fn(&mut dyn TokenReader, Option<T>, &Spool) -> Result<T, Error> + Send + Sync>;
type WriteClosure<T> = Box<dyn Fn(&mut dyn TokenWriter, &T, &Spool) -> Result<(), Error> + Send + Sync>;

/// Closure-backed converter for exactly one type. A missing side clears the
/// matching direction flag.
///
/// ```rust
/// use std::sync::Arc;
/// use spool_core::resolver::FnConverter;
/// use spool_core::token::TokenValue;
/// use spool_core::Spool;
///
/// let yes_no = FnConverter::<bool>::new().with_write(|writer, value, _| {
///     writer.write_value(&TokenValue::from(if *value { "yes" } else { "no" }))
/// });
/// let spool = Spool::default().converter(Arc::new(yes_no));
/// assert_eq!(spool.to_string(&true).unwrap(), "\"yes\"");
/// ```
pub struct FnConverter<T> {
    read: Option<ReadClosure<T>>,
    write: Option<WriteClosure<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> FnConverter<T> {
    pub fn new() -> Self {
        FnConverter {
            read: None,
            write: None,
            _marker: PhantomData,
        }
    }

    pub fn with_read<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn TokenReader, Option<T>, &Spool) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.read = Some(Box::new(f));
        self
    }

    pub fn with_write<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn TokenWriter, &T, &Spool) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.write = Some(Box::new(f));
        self
    }
}

impl<T: 'static> Default for FnConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Converter for FnConverter<T> {
    fn can_read(&self) -> bool {
        self.read.is_some()
    }

    fn can_write(&self) -> bool {
        self.write.is_some()
    }

    fn can_convert(&self, key: &TypeKey) -> bool {
        key.is::<T>()
    }

    fn read_value(
        &self,
        reader: &mut dyn TokenReader,
        _key: &TypeKey,
        existing: Option<Box<dyn Any>>,
        spool: &Spool,
    ) -> Result<Box<dyn Any>, Error> {
        let read = self
            .read
            .as_ref()
            .ok_or_else(|| Error::unsupported(format!("{} cannot read", self.name())))?;
        let existing = existing.and_then(|boxed| boxed.downcast::<T>().ok()).map(|b| *b);
        Ok(Box::new(read(reader, existing, spool)?))
    }

    fn write_value(&self, writer: &mut dyn TokenWriter, value: &dyn Any, spool: &Spool) -> Result<(), Error> {
        let write = self
            .write
            .as_ref()
            .ok_or_else(|| Error::unsupported(format!("{} cannot write", self.name())))?;
        match value.downcast_ref::<T>() {
            Some(value) => write(writer, value, spool),
            None => Err(Error::enhance_type_error::<T>(Error::type_error(
                "converter received a value of another type",
            ))),
        }
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Catch-all converter for every type in a [`TypeRegistry`]. Push it first to
/// override other converters, or last to act as a fallback.
#[derive(Debug)]
pub struct SelfSerializingConverter {
    types: Arc<TypeRegistry>,
}

impl SelfSerializingConverter {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        SelfSerializingConverter { types }
    }
}

impl Converter for SelfSerializingConverter {
    fn can_convert(&self, key: &TypeKey) -> bool {
        self.types.contains(key)
    }

    fn read_value(
        &self,
        reader: &mut dyn TokenReader,
        key: &TypeKey,
        existing: Option<Box<dyn Any>>,
        spool: &Spool,
    ) -> Result<Box<dyn Any>, Error> {
        let info = self
            .types
            .get(key)
            .ok_or_else(|| Error::type_error(format!("type {} is not registered", key)))?;
        match (info.harness().get_read_fn())(reader, existing, spool)? {
            Some(value) => Ok(value),
            None => Err(Error::token_mismatch(key.name(), reader.token_kind(), reader.path())),
        }
    }

    fn write_value(&self, writer: &mut dyn TokenWriter, value: &dyn Any, spool: &Spool) -> Result<(), Error> {
        let info = self
            .types
            .get_by_id((*value).type_id())
            .ok_or_else(|| Error::type_error("value type is not registered"))?;
        (info.harness().get_write_fn())(value, writer, spool)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "SelfSerializingConverter"
    }
}
