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

impl Serializer for bool {
    #[inline(always)]
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::Bool(*self))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match (reader.token_kind(), reader.value()) {
            (TokenKind::Boolean, TokenValue::Bool(b)) => Ok(*b),
            (TokenKind::Integer, value) => match value.as_i128() {
                Some(v) => Ok(v != 0),
                None => Err(reader.unexpected("Boolean")),
            },
            (TokenKind::String, TokenValue::Str(text)) => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(Error::invalid_data(format!(
                        "Could not convert string to boolean: {}. Path '{}'.",
                        text,
                        reader.path()
                    )))
                }
            }
            _ => Err(reader.unexpected("Boolean")),
        }
    }
}
