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

use num_bigint::BigInt;
use rust_decimal::Decimal;

use crate::error::Error;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenKind, TokenReader, TokenValue, TokenWriter};

impl Serializer for BigInt {
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::BigInt(self.clone()))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match (reader.token_kind(), reader.value()) {
            (TokenKind::Integer, TokenValue::BigInt(v)) => Ok(v.clone()),
            (TokenKind::Integer | TokenKind::String, TokenValue::Str(text)) => {
                BigInt::from_str(text.trim()).map_err(|_| {
                    Error::invalid_data(format!(
                        "Could not convert string to BigInteger: {}. Path '{}'.",
                        text,
                        reader.path()
                    ))
                })
            }
            (TokenKind::Integer, value) => value
                .as_i128()
                .map(BigInt::from)
                .ok_or_else(|| reader.unexpected("Integer")),
            _ => Err(reader.unexpected("Integer")),
        }
    }
}

impl Serializer for Decimal {
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::Decimal(*self))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        let out_of_range = |reader: &dyn TokenReader| {
            Error::invalid_data(format!(
                "Value is too large or too small for a Decimal. Path '{}'.",
                reader.path()
            ))
        };
        match (reader.token_kind(), reader.value()) {
            (TokenKind::Float, TokenValue::Decimal(d)) => Ok(*d),
            (TokenKind::Float, TokenValue::F64(v)) => {
                Decimal::try_from(*v).map_err(|_| out_of_range(reader))
            }
            (TokenKind::Float | TokenKind::Integer | TokenKind::String, TokenValue::Str(text)) => {
                let text = text.trim();
                Decimal::from_str_exact(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .map_err(|_| out_of_range(reader))
            }
            (TokenKind::Integer, TokenValue::BigInt(v)) => {
                Decimal::from_str_exact(&v.to_string()).map_err(|_| out_of_range(reader))
            }
            (TokenKind::Integer, value) => match value.as_i128() {
                Some(v) => Decimal::try_from_i128_with_scale(v, 0).map_err(|_| out_of_range(reader)),
                None => Err(reader.unexpected("Float")),
            },
            _ => Err(reader.unexpected("Float")),
        }
    }
}
