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
use std::fmt::Write;
use std::sync::Arc;

use crate::buffer::PoolSet;
use crate::config::{
    Config, DateParseHandling, FloatParseHandling, Formatting, ObjectCreationHandling,
};
use crate::error::Error;
use crate::json::{JsonReader, JsonWriter};
use crate::materialize::{materialize, Materialize};
use crate::resolver::{
    Converter, ConverterRegistry, Direction, SelfSerializingConverter, TypeKey, TypeRegistry,
};
use crate::serializer::Serializer;
use crate::token::{TokenKind, TokenReader, TokenWriter};

/// The Spool engine: configuration, converters, registered self-serializing
/// types and buffer pools, plus the read and write entry points.
///
/// Every nested value goes through [`Spool::read`] or [`Spool::write`], so a
/// converter registered for a type applies wherever that type appears.
///
/// # Examples
///
/// ```rust
/// use spool_core::Spool;
/// use spool_core::config::Formatting;
///
/// let spool = Spool::default().formatting(Formatting::None).max_depth(32);
/// let json = spool.to_string(&vec![1u8, 2, 3]).unwrap();
/// assert_eq!(json, "[1,2,3]");
/// let back: Vec<u8> = spool.from_str(&json).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Spool {
    config: Config,
    converters: ConverterRegistry,
    types: Arc<TypeRegistry>,
    pools: PoolSet,
}

impl Default for Spool {
    fn default() -> Self {
        Spool::new(Config::default())
    }
}

impl Spool {
    pub fn new(config: Config) -> Self {
        let pools = PoolSet::new(&config.pool);
        Spool {
            config,
            converters: ConverterRegistry::new(),
            types: Arc::new(TypeRegistry::new()),
            pools,
        }
    }

    /// Sets how date-like strings are surfaced by readers this engine creates.
    pub fn date_parse_handling(mut self, handling: DateParseHandling) -> Self {
        self.config.date_parse_handling = handling;
        self
    }

    pub fn float_parse_handling(mut self, handling: FloatParseHandling) -> Self {
        self.config.float_parse_handling = handling;
        self
    }

    /// Whether an existing instance is populated in place or replaced.
    pub fn object_creation_handling(mut self, handling: ObjectCreationHandling) -> Self {
        self.config.object_creation_handling = handling;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn formatting(mut self, formatting: Formatting) -> Self {
        self.config.formatting = formatting;
        self
    }

    /// Shares existing pools instead of the ones built from the config.
    pub fn pools(mut self, pools: PoolSet) -> Self {
        self.pools = pools;
        self
    }

    /// Appends a converter. Converters are consulted in insertion order.
    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converters.push(converter);
        self
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool_set(&self) -> &PoolSet {
        &self.pools
    }

    pub fn type_registry(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Registers `T` so it can be read and written by [`TypeKey`] through
    /// [`Spool::read_dyn`] and the [`SelfSerializingConverter`].
    pub fn register<T: Materialize>(&self) {
        self.types.register::<T>();
    }

    /// A converter claiming every type registered with this engine.
    pub fn self_serializing_converter(&self) -> Arc<dyn Converter> {
        Arc::new(SelfSerializingConverter::new(Arc::clone(&self.types)))
    }

    /// Reads a `T` starting at the reader's current token, advancing first
    /// when nothing has been read yet.
    pub fn read<T: Serializer>(&self, reader: &mut dyn TokenReader) -> Result<T, Error> {
        advance_if_fresh(reader)?;
        let key = TypeKey::of::<T>();
        if let Some(converter) = self.converters.resolve(&key, Direction::Read) {
            let value = converter.read_value(reader, &key, None, self)?;
            return downcast::<T>(value, converter.as_ref());
        }
        T::spool_read(reader, self)
    }

    /// Reads into an existing value. A converter receives the current value
    /// as its `existing` argument.
    pub fn read_into<T: Serializer + Default>(
        &self,
        reader: &mut dyn TokenReader,
        target: &mut T,
    ) -> Result<(), Error> {
        advance_if_fresh(reader)?;
        let key = TypeKey::of::<T>();
        if let Some(converter) = self.converters.resolve(&key, Direction::Read) {
            let existing: Box<dyn Any> = Box::new(std::mem::take(target));
            let value = converter.read_value(reader, &key, Some(existing), self)?;
            *target = downcast::<T>(value, converter.as_ref())?;
            return Ok(());
        }
        target.spool_read_into(reader, self)
    }

    pub fn write<T: Serializer>(&self, writer: &mut dyn TokenWriter, value: &T) -> Result<(), Error> {
        let key = TypeKey::of::<T>();
        if let Some(converter) = self.converters.resolve(&key, Direction::Write) {
            return converter.write_value(writer, value as &dyn Any, self);
        }
        value.spool_write(writer, self)
    }

    /// Reads a value whose type is only known at runtime. Returns `None` for
    /// a null token read through a registered type.
    pub fn read_dyn(
        &self,
        reader: &mut dyn TokenReader,
        key: &TypeKey,
        existing: Option<Box<dyn Any>>,
    ) -> Result<Option<Box<dyn Any>>, Error> {
        advance_if_fresh(reader)?;
        if let Some(converter) = self.converters.resolve(key, Direction::Read) {
            return converter.read_value(reader, key, existing, self).map(Some);
        }
        match self.types.get(key) {
            Some(info) => (info.harness().get_read_fn())(reader, existing, self),
            None => Err(Error::type_error(format!(
                "No converter or registration for type {}.",
                key
            ))),
        }
    }

    pub fn write_dyn(
        &self,
        writer: &mut dyn TokenWriter,
        key: &TypeKey,
        value: &dyn Any,
    ) -> Result<(), Error> {
        if let Some(converter) = self.converters.resolve(key, Direction::Write) {
            return converter.write_value(writer, value, self);
        }
        match self.types.get(key) {
            Some(info) => {
                (info.harness().get_write_fn())(value, writer, self)?;
                Ok(())
            }
            None => Err(Error::type_error(format!(
                "No converter or registration for type {}.",
                key
            ))),
        }
    }

    /// Builds a self-serializing `T` through its constructor shapes. Returns
    /// `None` for a null token.
    pub fn materialize<T: Materialize>(&self, reader: &mut dyn TokenReader) -> Result<Option<T>, Error> {
        advance_if_fresh(reader)?;
        materialize::<T>(reader, None, self)
    }

    /// Like [`Spool::materialize`], populating the instance in `slot` when
    /// object creation handling allows reuse. A null token empties the slot.
    pub fn materialize_into<T: Materialize>(
        &self,
        reader: &mut dyn TokenReader,
        slot: &mut Option<T>,
    ) -> Result<(), Error> {
        advance_if_fresh(reader)?;
        *slot = materialize::<T>(reader, slot.take(), self)?;
        Ok(())
    }

    /// Writes `value` as JSON text into `sink` and hands the sink back.
    pub fn serialize<W: Write, T: Serializer>(&self, sink: W, value: &T) -> Result<W, Error> {
        let mut writer = JsonWriter::new(sink, &self.pools).formatting(self.config.formatting());
        self.write(&mut writer, value)?;
        Ok(writer.into_inner())
    }

    pub fn to_string<T: Serializer>(&self, value: &T) -> Result<String, Error> {
        self.serialize(String::new(), value)
    }

    pub fn deserialize<T: Serializer>(&self, reader: &mut dyn TokenReader) -> Result<T, Error> {
        self.read(reader)
    }

    pub fn from_str<T: Serializer>(&self, text: &str) -> Result<T, Error> {
        let mut reader = JsonReader::new(text, &self.config)?;
        self.deserialize(&mut reader)
    }
}

#[inline(always)]
fn advance_if_fresh(reader: &mut dyn TokenReader) -> Result<(), Error> {
    if reader.token_kind() == TokenKind::None {
        reader.read_required()?;
    }
    Ok(())
}

fn downcast<T: 'static>(value: Box<dyn Any>, converter: &dyn Converter) -> Result<T, Error> {
    value.downcast::<T>().map(|v| *v).map_err(|_| {
        Error::enhance_type_error::<T>(Error::type_error(format!(
            "Converter {} returned a value of another type.",
            converter.name()
        )))
    })
}
