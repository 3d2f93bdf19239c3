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

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Error;
use crate::materialize::{materialize, Constructors, Materialize, ShapeSet};
use crate::spool::Spool;
use crate::token::{TokenReader, TokenWriter};

/// Runtime type identity plus its name for diagnostics. Equality and hashing
/// use the [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type ReadFn =
    fn(&mut dyn TokenReader, Option<Box<dyn Any>>, &Spool) -> Result<Option<Box<dyn Any>>, Error>;
type WriteFn = fn(&dyn Any, &mut dyn TokenWriter, &Spool) -> Result<u32, Error>;

/// Type-erased entry points of one registered type.
#[derive(Clone, Copy, Debug)]
pub struct Harness {
    read_fn: ReadFn,
    write_fn: WriteFn,
}

impl Harness {
    pub fn new(read_fn: ReadFn, write_fn: WriteFn) -> Harness {
        Harness { read_fn, write_fn }
    }

    pub fn of<T: Materialize>() -> Harness {
        Harness::new(read_erased::<T>, write_erased::<T>)
    }

    #[inline(always)]
    pub fn get_read_fn(&self) -> ReadFn {
        self.read_fn
    }

    #[inline(always)]
    pub fn get_write_fn(&self) -> WriteFn {
        self.write_fn
    }
}

fn read_erased<T: Materialize>(
    reader: &mut dyn TokenReader,
    existing: Option<Box<dyn Any>>,
    spool: &Spool,
) -> Result<Option<Box<dyn Any>>, Error> {
    let existing = match existing {
        Some(boxed) => match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(_) => {
                return Err(Error::enhance_type_error::<T>(Error::type_error(
                    "existing instance has the wrong type",
                )))
            }
        },
        None => None,
    };
    Ok(materialize::<T>(reader, existing, spool)?.map(|value| Box::new(value) as Box<dyn Any>))
}

fn write_erased<T: Materialize>(
    value: &dyn Any,
    writer: &mut dyn TokenWriter,
    spool: &Spool,
) -> Result<u32, Error> {
    match value.downcast_ref::<T>() {
        Some(value) => value.write_to(writer, spool),
        None => Err(Error::enhance_type_error::<T>(Error::type_error(
            "value passed to the write harness has the wrong type",
        ))),
    }
}

/// Cached registration of one self-serializing type: its constructor shapes
/// and erased harness, resolved once.
pub struct TypeInfo {
    key: TypeKey,
    shapes: ShapeSet,
    is_abstract: bool,
    harness: Harness,
    constructors: Box<dyn Any + Send + Sync>,
}

impl TypeInfo {
    pub fn of<T: Materialize>() -> TypeInfo {
        let ctors = T::constructors();
        TypeInfo {
            key: TypeKey::of::<T>(),
            shapes: ctors.shapes(),
            is_abstract: ctors.is_abstract(),
            harness: Harness::of::<T>(),
            constructors: Box::new(ctors),
        }
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn shapes(&self) -> ShapeSet {
        self.shapes
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// The cached constructors, if this entry belongs to `T`.
    pub fn constructors<T: 'static>(&self) -> Option<&Constructors<T>> {
        self.constructors.downcast_ref::<Constructors<T>>()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("shapes", &self.shapes)
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

/// Per-type cache of [`TypeInfo`], shared read-mostly between threads.
#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<TypeId, Arc<TypeInfo>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`, returning the existing entry when already present.
    pub fn register<T: Materialize>(&self) -> Arc<TypeInfo> {
        if let Some(info) = self.types.read().get(&TypeId::of::<T>()) {
            return Arc::clone(info);
        }
        let info = Arc::new(TypeInfo::of::<T>());
        let mut types = self.types.write();
        let entry = types.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(
                target_type = info.key().name(),
                shapes = ?info.shapes(),
                "registered self-serializing type"
            );
            Arc::clone(&info)
        });
        Arc::clone(entry)
    }

    #[inline(always)]
    pub fn get_or_register<T: Materialize>(&self) -> Arc<TypeInfo> {
        self.register::<T>()
    }

    pub fn get(&self, key: &TypeKey) -> Option<Arc<TypeInfo>> {
        self.get_by_id(key.id())
    }

    pub fn get_by_id(&self, id: TypeId) -> Option<Arc<TypeInfo>> {
        self.types.read().get(&id).cloned()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.read().contains_key(&key.id())
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .finish()
    }
}
