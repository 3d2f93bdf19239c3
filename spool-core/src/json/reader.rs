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

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::config::{Config, DateParseHandling, FloatParseHandling};
use crate::error::Error;
use crate::token::{TokenBuffer, TokenBufferReader, TokenKind, TokenReader, TokenValue};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// [`TokenReader`] over JSON text.
///
/// The text is parsed by `serde_json` (with arbitrary precision numbers, so
/// integers wider than 64 bits survive) and flattened into tokens; date and
/// float handling from [`Config`] are applied while flattening.
#[derive(Debug)]
pub struct JsonReader {
    inner: TokenBufferReader<'static>,
}

impl JsonReader {
    pub fn new(text: &str, config: &Config) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::invalid_data(format!("invalid JSON text: {e}")))?;
        Self::from_value(value, config)
    }

    pub fn from_value(value: Value, config: &Config) -> Result<Self, Error> {
        let mut tokens = TokenBuffer::new();
        flatten(value, config, &mut tokens)?;
        Ok(JsonReader {
            inner: tokens.into_reader(config.date_parse_handling(), config.max_depth()),
        })
    }
}

fn flatten(value: Value, config: &Config, out: &mut TokenBuffer) -> Result<(), Error> {
    match value {
        Value::Null => out.push(TokenKind::Null, TokenValue::Null),
        Value::Bool(b) => out.push(TokenKind::Boolean, TokenValue::Bool(b)),
        Value::Number(n) => {
            let (kind, value) = number_token(&n, config.float_parse_handling())?;
            out.push(kind, value);
        }
        Value::String(s) => match parse_date(&s, config.date_parse_handling()) {
            Some(date) => out.push(TokenKind::Date, date),
            None => out.push(TokenKind::String, TokenValue::Str(s)),
        },
        Value::Array(items) => {
            out.push(TokenKind::StartArray, TokenValue::None);
            for item in items {
                flatten(item, config, out)?;
            }
            out.push(TokenKind::EndArray, TokenValue::None);
        }
        Value::Object(map) => {
            out.push(TokenKind::StartObject, TokenValue::None);
            for (name, item) in map {
                out.push(TokenKind::PropertyName, TokenValue::Str(name));
                flatten(item, config, out)?;
            }
            out.push(TokenKind::EndObject, TokenValue::None);
        }
    }
    Ok(())
}

fn number_token(n: &Number, float: FloatParseHandling) -> Result<(TokenKind, TokenValue), Error> {
    if let Some(v) = n.as_i64() {
        return Ok((TokenKind::Integer, TokenValue::I64(v)));
    }
    if let Some(v) = n.as_u64() {
        return Ok((TokenKind::Integer, TokenValue::U64(v)));
    }
    let text = n.to_string();
    if !text.contains(&['.', 'e', 'E'][..]) {
        let big = BigInt::from_str(&text)
            .map_err(|e| Error::invalid_data(format!("invalid integer `{text}`: {e}")))?;
        return Ok((TokenKind::Integer, TokenValue::BigInt(big)));
    }
    if float == FloatParseHandling::Decimal {
        let decimal = Decimal::from_str_exact(&text).or_else(|_| Decimal::from_scientific(&text));
        if let Ok(d) = decimal {
            return Ok((TokenKind::Float, TokenValue::Decimal(d)));
        }
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((TokenKind::Float, TokenValue::F64(v))),
        // out of double range; the normalizer decides what to make of it
        _ => Ok((TokenKind::Float, TokenValue::Str(text))),
    }
}

/// Recognizes ISO 8601 date-times. Offset-aware text keeps its local clock
/// time when a naive date is wanted; naive text is taken as UTC when an
/// offset is wanted.
pub(crate) fn parse_date(text: &str, handling: DateParseHandling) -> Option<TokenValue> {
    if handling == DateParseHandling::None || !looks_like_date(text) {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(match handling {
            DateParseHandling::DateTimeOffset => TokenValue::DateTimeOffset(date),
            _ => TokenValue::DateTime(date.naive_local()),
        });
    }
    let naive = NaiveDateTime::parse_from_str(text, NAIVE_FORMAT).ok()?;
    Some(match handling {
        DateParseHandling::DateTimeOffset => TokenValue::DateTimeOffset(naive.and_utc().fixed_offset()),
        _ => TokenValue::DateTime(naive),
    })
}

#[inline(always)]
fn looks_like_date(text: &str) -> bool {
    let b = text.as_bytes();
    b.len() >= 19 && b[4] == b'-' && b[7] == b'-' && matches!(b[10], b'T' | b't' | b' ')
}

impl TokenReader for JsonReader {
    fn read(&mut self) -> Result<bool, Error> {
        self.inner.read()
    }

    fn token_kind(&self) -> TokenKind {
        self.inner.token_kind()
    }

    fn value(&self) -> &TokenValue {
        self.inner.value()
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn path(&self) -> String {
        self.inner.path()
    }

    fn date_parse_handling(&self) -> DateParseHandling {
        self.inner.date_parse_handling()
    }

    fn max_depth(&self) -> usize {
        self.inner.max_depth()
    }
}
