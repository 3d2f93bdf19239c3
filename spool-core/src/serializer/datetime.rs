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

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::config::DateParseHandling;
use crate::error::Error;
use crate::json::parse_date;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenKind, TokenReader, TokenValue, TokenWriter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The reader's date payload, or its text parsed as a date in `handling`.
fn date_value(reader: &dyn TokenReader, handling: DateParseHandling) -> Result<TokenValue, Error> {
    match (reader.token_kind(), reader.value()) {
        (TokenKind::Date, value) => Ok(value.clone()),
        (TokenKind::String, TokenValue::Str(text)) => parse_date(text, handling).ok_or_else(|| {
            Error::invalid_data(format!(
                "Could not convert string to DateTime: {}. Path '{}'.",
                text,
                reader.path()
            ))
        }),
        _ => Err(reader.unexpected("Date")),
    }
}

impl Serializer for NaiveDateTime {
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::DateTime(*self))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match date_value(reader, DateParseHandling::DateTime)? {
            TokenValue::DateTime(d) => Ok(d),
            TokenValue::DateTimeOffset(d) => Ok(d.naive_local()),
            _ => Err(reader.unexpected("Date")),
        }
    }
}

impl Serializer for DateTime<FixedOffset> {
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::DateTimeOffset(*self))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match date_value(reader, DateParseHandling::DateTimeOffset)? {
            TokenValue::DateTimeOffset(d) => Ok(d),
            TokenValue::DateTime(d) => Ok(d.and_utc().fixed_offset()),
            _ => Err(reader.unexpected("Date")),
        }
    }
}

impl Serializer for NaiveDate {
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::Str(self.format(DATE_FORMAT).to_string()))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match (reader.token_kind(), reader.value()) {
            (TokenKind::Date, TokenValue::DateTime(d)) => Ok(d.date()),
            (TokenKind::Date, TokenValue::DateTimeOffset(d)) => Ok(d.date_naive()),
            (TokenKind::String, TokenValue::Str(text)) => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map_err(|e| {
                    Error::invalid_data(format!(
                        "Could not convert string to date: {} ({}). Path '{}'.",
                        text,
                        e,
                        reader.path()
                    ))
                }),
            _ => Err(reader.unexpected("Date")),
        }
    }
}
