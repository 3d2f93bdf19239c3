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

//! The token model every reader, writer, converter and materializer speaks.
//!
//! A [`TokenReader`] is a pull reader positioned on one token at a time; a
//! [`TokenWriter`] is a push writer. Nothing above this module depends on a
//! concrete text framing.

mod buffer;
mod path;

use std::fmt;
use std::io::Read;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;

use crate::config::DateParseHandling;
use crate::error::Error;

pub use buffer::{TokenBuffer, TokenBufferReader};
pub use path::PathTracker;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// No token has been read yet, or the reader is exhausted.
    #[default]
    None,
    StartObject,
    PropertyName,
    EndObject,
    StartArray,
    EndArray,
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Undefined,
    Date,
    Bytes,
}

impl TokenKind {
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::None => "None",
            TokenKind::StartObject => "StartObject",
            TokenKind::PropertyName => "PropertyName",
            TokenKind::EndObject => "EndObject",
            TokenKind::StartArray => "StartArray",
            TokenKind::EndArray => "EndArray",
            TokenKind::Integer => "Integer",
            TokenKind::Float => "Float",
            TokenKind::String => "String",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
            TokenKind::Undefined => "Undefined",
            TokenKind::Date => "Date",
            TokenKind::Bytes => "Bytes",
        }
    }

    #[inline(always)]
    pub const fn is_start(self) -> bool {
        matches!(self, TokenKind::StartObject | TokenKind::StartArray)
    }

    #[inline(always)]
    pub const fn is_end(self) -> bool {
        matches!(self, TokenKind::EndObject | TokenKind::EndArray)
    }

    #[inline(always)]
    pub const fn is_null(self) -> bool {
        matches!(self, TokenKind::Null | TokenKind::Undefined)
    }

    /// Scalar tokens carry their payload in [`TokenReader::value`].
    #[inline(always)]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::Boolean
                | TokenKind::Null
                | TokenKind::Undefined
                | TokenKind::Date
                | TokenKind::Bytes
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw payload of the current token.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TokenValue {
    /// Structural tokens carry no value.
    #[default]
    None,
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BigInt(BigInt),
    F64(f64),
    Decimal(Decimal),
    /// Text; also the payload of property names and of numbers or bytes that
    /// arrived as text.
    Str(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
}

impl TokenValue {
    /// The token kind a writer emits for this value.
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenValue::None => TokenKind::None,
            TokenValue::Null => TokenKind::Null,
            TokenValue::Bool(_) => TokenKind::Boolean,
            TokenValue::I8(_)
            | TokenValue::I16(_)
            | TokenValue::I32(_)
            | TokenValue::I64(_)
            | TokenValue::U8(_)
            | TokenValue::U16(_)
            | TokenValue::U32(_)
            | TokenValue::U64(_)
            | TokenValue::BigInt(_) => TokenKind::Integer,
            TokenValue::F64(_) | TokenValue::Decimal(_) => TokenKind::Float,
            TokenValue::Str(_) => TokenKind::String,
            TokenValue::Bytes(_) => TokenKind::Bytes,
            TokenValue::DateTime(_) | TokenValue::DateTimeOffset(_) => TokenKind::Date,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TokenValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer payload that fits an `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match self {
            TokenValue::I8(v) => *v as i128,
            TokenValue::I16(v) => *v as i128,
            TokenValue::I32(v) => *v as i128,
            TokenValue::I64(v) => *v as i128,
            TokenValue::U8(v) => *v as i128,
            TokenValue::U16(v) => *v as i128,
            TokenValue::U32(v) => *v as i128,
            TokenValue::U64(v) => *v as i128,
            TokenValue::BigInt(v) => return i128::try_from(v).ok(),
            _ => return None,
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        use num_traits::ToPrimitive;
        match self {
            TokenValue::F64(v) => Some(*v),
            TokenValue::Decimal(d) => d.to_f64(),
            TokenValue::BigInt(v) => v.to_f64(),
            other => other.as_i128().map(|v| v as f64),
        }
    }
}

macro_rules! impl_from_for_token_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TokenValue {
                #[inline(always)]
                fn from(v: $ty) -> Self {
                    TokenValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_token_value!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    BigInt => BigInt,
    f64 => F64,
    Decimal => Decimal,
    String => Str,
    Vec<u8> => Bytes,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
);

impl From<&str> for TokenValue {
    fn from(v: &str) -> Self {
        TokenValue::Str(v.to_owned())
    }
}

/// One recorded token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue) -> Self {
        Token { kind, value }
    }
}

/// Pull reader over a token stream.
pub trait TokenReader {
    /// Advances to the next token. Returns `false` once the input is
    /// exhausted.
    fn read(&mut self) -> Result<bool, Error>;

    fn token_kind(&self) -> TokenKind;

    fn value(&self) -> &TokenValue;

    /// Nesting depth of the current token. Start tokens report the depth of
    /// the container they appear in.
    fn depth(&self) -> usize;

    fn path(&self) -> String;

    fn date_parse_handling(&self) -> DateParseHandling;

    fn max_depth(&self) -> usize;

    /// Advances, failing with [`Error::UnexpectedEnd`] at end of input.
    fn read_required(&mut self) -> Result<(), Error> {
        if self.read()? {
            Ok(())
        } else {
            Err(Error::unexpected_end(self.path()))
        }
    }

    /// Skips the current token. On a property name the value is skipped too;
    /// on a start token the reader ends on the matching end token.
    fn skip(&mut self) -> Result<(), Error> {
        if self.token_kind() == TokenKind::PropertyName {
            self.read_required()?;
        }
        if self.token_kind().is_start() {
            let depth = self.depth();
            loop {
                self.read_required()?;
                if self.token_kind().is_end() && self.depth() <= depth {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Builds a [`Error::TokenMismatch`] for the current position.
    #[cold]
    fn unexpected(&self, expected: &'static str) -> Error {
        Error::token_mismatch(expected, self.token_kind(), self.path())
    }

    fn expect(&self, kind: TokenKind) -> Result<(), Error> {
        if self.token_kind() == kind {
            Ok(())
        } else {
            Err(self.unexpected(kind.name()))
        }
    }

    /// Advances inside an object. Returns the next property name, or `None`
    /// when the object ends.
    fn read_property_name(&mut self) -> Result<Option<String>, Error> {
        self.read_required()?;
        match self.token_kind() {
            TokenKind::PropertyName => match self.value() {
                TokenValue::Str(name) => Ok(Some(name.clone())),
                _ => Err(Error::invalid_data(format!(
                    "property name without text. Path '{}'.",
                    self.path()
                ))),
            },
            TokenKind::EndObject => Ok(None),
            _ => Err(self.unexpected("PropertyName")),
        }
    }
}

/// Push writer producing a token stream.
pub trait TokenWriter {
    fn write_start_object(&mut self) -> Result<(), Error>;

    fn write_end_object(&mut self) -> Result<(), Error>;

    fn write_start_array(&mut self) -> Result<(), Error>;

    fn write_end_array(&mut self) -> Result<(), Error>;

    fn write_property_name(&mut self, name: &str) -> Result<(), Error>;

    /// Writes one scalar value; its token kind follows [`TokenValue::kind`].
    fn write_value(&mut self, value: &TokenValue) -> Result<(), Error>;

    fn write_null(&mut self) -> Result<(), Error> {
        self.write_value(&TokenValue::Null)
    }

    /// Writes a bytes value read from `reader`, stopping after `length`
    /// bytes when given. Returns the number of bytes consumed.
    fn write_bytes_from(&mut self, reader: &mut dyn Read, length: Option<u64>) -> Result<u64, Error> {
        let mut bytes = Vec::new();
        match length {
            Some(limit) => reader.take(limit).read_to_end(&mut bytes)?,
            None => reader.read_to_end(&mut bytes)?,
        };
        let consumed = bytes.len() as u64;
        self.write_value(&TokenValue::Bytes(bytes))?;
        Ok(consumed)
    }

    /// Writes a token of an explicit kind. Writers that can keep a kind
    /// distinct from its payload (a text-encoded integer) override this.
    fn write_token(&mut self, kind: TokenKind, value: &TokenValue) -> Result<(), Error> {
        match kind {
            TokenKind::StartObject => self.write_start_object(),
            TokenKind::EndObject => self.write_end_object(),
            TokenKind::StartArray => self.write_start_array(),
            TokenKind::EndArray => self.write_end_array(),
            TokenKind::PropertyName => match value {
                TokenValue::Str(name) => self.write_property_name(name),
                _ => Err(Error::invalid_data("property name without text")),
            },
            TokenKind::Null | TokenKind::Undefined => self.write_null(),
            TokenKind::None => Ok(()),
            _ => self.write_value(value),
        }
    }

    /// Copies the reader's current token, and the whole sub-tree when it is
    /// a start token or a property name, leaving the reader on the last
    /// token copied.
    fn write_current(&mut self, reader: &mut dyn TokenReader) -> Result<(), Error> {
        if reader.token_kind() == TokenKind::PropertyName {
            self.write_token(TokenKind::PropertyName, reader.value())?;
            reader.read_required()?;
        }
        let kind = reader.token_kind();
        self.write_token(kind, reader.value())?;
        if !kind.is_start() {
            return Ok(());
        }
        let depth = reader.depth();
        loop {
            reader.read_required()?;
            let kind = reader.token_kind();
            self.write_token(kind, reader.value())?;
            if kind.is_end() && reader.depth() <= depth {
                return Ok(());
            }
        }
    }
}
