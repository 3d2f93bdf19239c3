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

use crate::error::Error;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenKind, TokenReader, TokenValue, TokenWriter};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl Serializer for String {
    #[inline(always)]
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::Str(self.clone()))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match (reader.token_kind(), reader.value()) {
            (TokenKind::String, TokenValue::Str(text)) => Ok(text.clone()),
            // a date recognized by the reader is handed back as text
            (TokenKind::Date, TokenValue::DateTime(d)) => Ok(d.format(NAIVE_FORMAT).to_string()),
            (TokenKind::Date, TokenValue::DateTimeOffset(d)) => Ok(d.to_rfc3339()),
            (TokenKind::Integer | TokenKind::Float, TokenValue::Str(text)) => Ok(text.clone()),
            (TokenKind::Integer | TokenKind::Float | TokenKind::Boolean, value) => {
                Ok(scalar_text(value))
            }
            _ => Err(reader.unexpected("String")),
        }
    }
}

fn scalar_text(value: &TokenValue) -> String {
    match value {
        TokenValue::Bool(b) => b.to_string(),
        TokenValue::BigInt(v) => v.to_string(),
        TokenValue::Decimal(v) => v.to_string(),
        TokenValue::F64(v) => v.to_string(),
        other => other.as_i128().map(|v| v.to_string()).unwrap_or_default(),
    }
}
