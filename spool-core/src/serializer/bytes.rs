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

use std::ops::{Deref, DerefMut};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Error;
use crate::serializer::number::read_integer;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenKind, TokenReader, TokenValue, TokenWriter};

/// Binary payload written as a Bytes token, which text writers encode as
/// Base64. A plain `Vec<u8>` is a list of numbers instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for Bytes {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

impl Serializer for Bytes {
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        let mut source = self.0.as_slice();
        writer.write_bytes_from(&mut source, Some(self.0.len() as u64))?;
        Ok(())
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        match (reader.token_kind(), reader.value()) {
            (TokenKind::Bytes, TokenValue::Bytes(bytes)) => Ok(Bytes(bytes.clone())),
            (TokenKind::Bytes | TokenKind::String, TokenValue::Str(text)) => {
                STANDARD.decode(text.as_bytes()).map(Bytes).map_err(|e| {
                    Error::invalid_data(format!(
                        "Could not decode Base64 text: {}. Path '{}'.",
                        e,
                        reader.path()
                    ))
                })
            }
            (TokenKind::StartArray, _) => {
                let mut bytes = Vec::new();
                loop {
                    reader.read_required()?;
                    if reader.token_kind() == TokenKind::EndArray {
                        return Ok(Bytes(bytes));
                    }
                    bytes.push(read_integer::<u8>(reader)?);
                }
            }
            _ => Err(reader.unexpected("Bytes")),
        }
    }
}
