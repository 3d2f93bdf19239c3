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

//! Maps one raw token to the most specific value it can represent.

use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::DateParseHandling;
use crate::error::Error;
use crate::json::parse_date;
use crate::token::{TokenBuffer, TokenBufferReader, TokenKind, TokenReader, TokenValue, TokenWriter};

/// Bag entry name under which an array payload is stored.
pub const VALUES_ENTRY: &str = "$values";

#[derive(Clone, Debug, PartialEq)]
pub enum NormalizedValue {
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
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Node(StructuralNode),
}

impl NormalizedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, NormalizedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NormalizedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer variant that fits an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NormalizedValue::I8(v) => Some(*v as i64),
            NormalizedValue::I16(v) => Some(*v as i64),
            NormalizedValue::I32(v) => Some(*v as i64),
            NormalizedValue::I64(v) => Some(*v),
            NormalizedValue::U8(v) => Some(*v as i64),
            NormalizedValue::U16(v) => Some(*v as i64),
            NormalizedValue::U32(v) => Some(*v as i64),
            NormalizedValue::U64(v) => i64::try_from(*v).ok(),
            NormalizedValue::BigInt(v) => v.to_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NormalizedValue::Double(v) => Some(*v),
            NormalizedValue::Decimal(d) => d.to_f64(),
            NormalizedValue::U64(v) => Some(*v as f64),
            NormalizedValue::BigInt(v) => v.to_f64(),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_node(&self) -> Option<&StructuralNode> {
        match self {
            NormalizedValue::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Writes the value back as tokens; nodes replay their sub-tree.
    pub fn write(&self, writer: &mut dyn TokenWriter) -> Result<(), Error> {
        let value = match self {
            NormalizedValue::Node(node) => return node.tokens.write_to(writer),
            NormalizedValue::Null => TokenValue::Null,
            NormalizedValue::Bool(v) => TokenValue::Bool(*v),
            NormalizedValue::I8(v) => TokenValue::I8(*v),
            NormalizedValue::I16(v) => TokenValue::I16(*v),
            NormalizedValue::I32(v) => TokenValue::I32(*v),
            NormalizedValue::I64(v) => TokenValue::I64(*v),
            NormalizedValue::U8(v) => TokenValue::U8(*v),
            NormalizedValue::U16(v) => TokenValue::U16(*v),
            NormalizedValue::U32(v) => TokenValue::U32(*v),
            NormalizedValue::U64(v) => TokenValue::U64(*v),
            NormalizedValue::BigInt(v) => TokenValue::BigInt(v.clone()),
            NormalizedValue::Double(v) => TokenValue::F64(*v),
            NormalizedValue::Decimal(v) => TokenValue::Decimal(*v),
            NormalizedValue::String(v) => TokenValue::Str(v.clone()),
            NormalizedValue::Bytes(v) => TokenValue::Bytes(v.clone()),
            NormalizedValue::DateTime(v) => TokenValue::DateTime(*v),
            NormalizedValue::DateTimeOffset(v) => TokenValue::DateTimeOffset(*v),
        };
        writer.write_value(&value)
    }
}

impl From<&TokenValue> for NormalizedValue {
    fn from(value: &TokenValue) -> Self {
        match value {
            TokenValue::None | TokenValue::Null => NormalizedValue::Null,
            TokenValue::Bool(v) => NormalizedValue::Bool(*v),
            TokenValue::I8(v) => NormalizedValue::I8(*v),
            TokenValue::I16(v) => NormalizedValue::I16(*v),
            TokenValue::I32(v) => NormalizedValue::I32(*v),
            TokenValue::I64(v) => NormalizedValue::I64(*v),
            TokenValue::U8(v) => NormalizedValue::U8(*v),
            TokenValue::U16(v) => NormalizedValue::U16(*v),
            TokenValue::U32(v) => NormalizedValue::U32(*v),
            TokenValue::U64(v) => NormalizedValue::U64(*v),
            TokenValue::BigInt(v) => NormalizedValue::BigInt(v.clone()),
            TokenValue::F64(v) => NormalizedValue::Double(*v),
            TokenValue::Decimal(v) => NormalizedValue::Decimal(*v),
            TokenValue::Str(v) => NormalizedValue::String(v.clone()),
            TokenValue::Bytes(v) => NormalizedValue::Bytes(v.clone()),
            TokenValue::DateTime(v) => NormalizedValue::DateTime(*v),
            TokenValue::DateTimeOffset(v) => NormalizedValue::DateTimeOffset(*v),
        }
    }
}

/// A captured object or array, parsed on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuralNode {
    tokens: TokenBuffer,
    date_parse_handling: DateParseHandling,
}

impl StructuralNode {
    /// Records the sub-tree starting at the reader's current start token.
    pub fn capture(reader: &mut dyn TokenReader) -> Result<Self, Error> {
        if !reader.token_kind().is_start() {
            return Err(reader.unexpected("StartObject or StartArray"));
        }
        let date_parse_handling = reader.date_parse_handling();
        Ok(StructuralNode {
            tokens: TokenBuffer::record(reader)?,
            date_parse_handling,
        })
    }

    pub fn is_object(&self) -> bool {
        self.tokens.first_kind() == TokenKind::StartObject
    }

    pub fn is_array(&self) -> bool {
        self.tokens.first_kind() == TokenKind::StartArray
    }

    pub fn tokens(&self) -> &TokenBuffer {
        &self.tokens
    }

    /// A reader positioned before the node's start token.
    pub fn reader(&self) -> TokenBufferReader<'_> {
        self.tokens.reader(self.date_parse_handling)
    }

    /// Normalized (name, value) pairs of an object node.
    pub fn entries(&self) -> Result<Vec<(String, NormalizedValue)>, Error> {
        let mut reader = self.reader();
        reader.read_required()?;
        reader.expect(TokenKind::StartObject)?;
        let mut entries = Vec::new();
        while let Some(name) = reader.read_property_name()? {
            reader.read_required()?;
            entries.push((name, normalize(&mut reader)?));
        }
        Ok(entries)
    }

    /// Normalized elements of an array node.
    pub fn elements(&self) -> Result<Vec<NormalizedValue>, Error> {
        let mut reader = self.reader();
        reader.read_required()?;
        reader.expect(TokenKind::StartArray)?;
        let mut elements = Vec::new();
        loop {
            reader.read_required()?;
            if reader.token_kind() == TokenKind::EndArray {
                return Ok(elements);
            }
            elements.push(normalize(&mut reader)?);
        }
    }
}

/// Normalizes the reader's current token. Start tokens are captured whole,
/// leaving the reader on the matching end token.
pub fn normalize(reader: &mut dyn TokenReader) -> Result<NormalizedValue, Error> {
    let kind = reader.token_kind();
    let value = reader.value();
    match kind {
        TokenKind::Boolean => Ok(NormalizedValue::from(value)),
        TokenKind::Integer => normalize_integer(value),
        TokenKind::Float => normalize_float(value),
        TokenKind::Bytes => match value {
            TokenValue::Str(text) => STANDARD
                .decode(text)
                .map(NormalizedValue::Bytes)
                .map_err(|e| Error::invalid_data(format!("invalid base64 payload: {e}"))),
            other => Ok(NormalizedValue::from(other)),
        },
        TokenKind::Date => Ok(normalize_date(value, reader.date_parse_handling())),
        TokenKind::StartObject | TokenKind::StartArray => {
            StructuralNode::capture(reader).map(NormalizedValue::Node)
        }
        TokenKind::Null | TokenKind::Undefined => Ok(NormalizedValue::Null),
        TokenKind::EndObject | TokenKind::EndArray | TokenKind::PropertyName | TokenKind::None => {
            Err(reader.unexpected("a value"))
        }
        TokenKind::String => Ok(NormalizedValue::from(value)),
    }
}

fn normalize_integer(value: &TokenValue) -> Result<NormalizedValue, Error> {
    match value {
        TokenValue::Str(text) => {
            let big = BigInt::from_str(text.trim())
                .map_err(|e| Error::invalid_data(format!("invalid integer `{text}`: {e}")))?;
            Ok(narrow(big))
        }
        other => Ok(NormalizedValue::from(other)),
    }
}

fn narrow(big: BigInt) -> NormalizedValue {
    if let Ok(v) = i64::try_from(&big) {
        NormalizedValue::I64(v)
    } else if let Ok(v) = u64::try_from(&big) {
        NormalizedValue::U64(v)
    } else {
        NormalizedValue::BigInt(big)
    }
}

fn normalize_float(value: &TokenValue) -> Result<NormalizedValue, Error> {
    match value {
        TokenValue::Decimal(d) => Ok(match d.to_f64() {
            Some(v) if v.is_finite() => NormalizedValue::Double(v),
            _ => NormalizedValue::Decimal(*d),
        }),
        TokenValue::Str(text) => {
            if let Ok(v) = text.parse::<f64>() {
                if v.is_finite() {
                    return Ok(NormalizedValue::Double(v));
                }
            }
            Decimal::from_str_exact(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map(NormalizedValue::Decimal)
                .map_err(|e| Error::invalid_data(format!("invalid number `{text}`: {e}")))
        }
        other => Ok(NormalizedValue::from(other)),
    }
}

fn normalize_date(value: &TokenValue, handling: DateParseHandling) -> NormalizedValue {
    let offset_aware = handling == DateParseHandling::DateTimeOffset;
    match value {
        TokenValue::DateTime(naive) if offset_aware => {
            NormalizedValue::DateTimeOffset(naive.and_utc().fixed_offset())
        }
        TokenValue::DateTimeOffset(date) if !offset_aware => {
            NormalizedValue::DateTime(date.naive_local())
        }
        TokenValue::Str(text) => {
            let mode = if offset_aware {
                DateParseHandling::DateTimeOffset
            } else {
                DateParseHandling::DateTime
            };
            match parse_date(text, mode) {
                Some(parsed) => NormalizedValue::from(&parsed),
                None => NormalizedValue::String(text.clone()),
            }
        }
        other => NormalizedValue::from(other),
    }
}
