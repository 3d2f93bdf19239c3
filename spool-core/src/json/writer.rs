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

use std::fmt::Write;
use std::io::Read;

use crate::buffer::{Base64Encoder, PoolSet};
use crate::config::Formatting;
use crate::error::Error;
use crate::token::{TokenValue, TokenWriter};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug)]
struct Frame {
    object: bool,
    has_items: bool,
}

/// [`TokenWriter`] producing JSON text.
///
/// Byte values are streamed through a [`Base64Encoder`] whose buffers come
/// from the writer's [`PoolSet`].
pub struct JsonWriter<W: Write> {
    writer: W,
    pools: PoolSet,
    formatting: Formatting,
    frames: Vec<Frame>,
    after_name: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W, pools: &PoolSet) -> Self {
        JsonWriter {
            writer,
            pools: pools.clone(),
            formatting: Formatting::None,
            frames: Vec::new(),
            after_name: false,
        }
    }

    pub fn formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn newline(&mut self) -> Result<(), Error> {
        if self.formatting == Formatting::Indented {
            self.writer.write_char('\n')?;
            for _ in 0..self.frames.len() {
                self.writer.write_str(INDENT)?;
            }
        }
        Ok(())
    }

    fn before_value(&mut self) -> Result<(), Error> {
        if self.after_name {
            self.after_name = false;
            return Ok(());
        }
        let Some(top) = self.frames.last_mut() else {
            return Ok(());
        };
        if top.object {
            return Err(Error::invalid_data(
                "a value inside an object must follow a property name",
            ));
        }
        let first = !top.has_items;
        top.has_items = true;
        if !first {
            self.writer.write_char(',')?;
        }
        self.newline()
    }

    fn start(&mut self, object: bool) -> Result<(), Error> {
        self.before_value()?;
        self.writer.write_char(if object { '{' } else { '[' })?;
        self.frames.push(Frame {
            object,
            has_items: false,
        });
        Ok(())
    }

    fn end(&mut self, object: bool) -> Result<(), Error> {
        match self.frames.pop() {
            Some(frame) if frame.object == object && !self.after_name => {
                if frame.has_items {
                    self.newline()?;
                }
                self.writer.write_char(if object { '}' } else { ']' })?;
                Ok(())
            }
            _ => Err(Error::invalid_data(if object {
                "no object to close"
            } else {
                "no array to close"
            })),
        }
    }

    fn write_string(&mut self, text: &str) -> Result<(), Error> {
        let quoted = serde_json::to_string(text)
            .map_err(|e| Error::encoding(format!("failed to escape string: {e}")))?;
        self.writer.write_str(&quoted)?;
        Ok(())
    }
}

impl<W: Write> TokenWriter for JsonWriter<W> {
    fn write_start_object(&mut self) -> Result<(), Error> {
        self.start(true)
    }

    fn write_end_object(&mut self) -> Result<(), Error> {
        self.end(true)
    }

    fn write_start_array(&mut self) -> Result<(), Error> {
        self.start(false)
    }

    fn write_end_array(&mut self) -> Result<(), Error> {
        self.end(false)
    }

    fn write_property_name(&mut self, name: &str) -> Result<(), Error> {
        let top = match self.frames.last_mut() {
            Some(top) if top.object && !self.after_name => top,
            _ => return Err(Error::invalid_data("a property name needs an open object")),
        };
        let first = !top.has_items;
        top.has_items = true;
        if !first {
            self.writer.write_char(',')?;
        }
        self.newline()?;
        self.write_string(name)?;
        self.writer.write_char(':')?;
        if self.formatting == Formatting::Indented {
            self.writer.write_char(' ')?;
        }
        self.after_name = true;
        Ok(())
    }

    fn write_value(&mut self, value: &TokenValue) -> Result<(), Error> {
        self.before_value()?;
        match value {
            TokenValue::None | TokenValue::Null => self.writer.write_str("null")?,
            TokenValue::Bool(b) => self.writer.write_str(if *b { "true" } else { "false" })?,
            TokenValue::I8(v) => write!(self.writer, "{v}")?,
            TokenValue::I16(v) => write!(self.writer, "{v}")?,
            TokenValue::I32(v) => write!(self.writer, "{v}")?,
            TokenValue::I64(v) => write!(self.writer, "{v}")?,
            TokenValue::U8(v) => write!(self.writer, "{v}")?,
            TokenValue::U16(v) => write!(self.writer, "{v}")?,
            TokenValue::U32(v) => write!(self.writer, "{v}")?,
            TokenValue::U64(v) => write!(self.writer, "{v}")?,
            TokenValue::BigInt(v) => write!(self.writer, "{v}")?,
            TokenValue::F64(v) if v.is_nan() => self.writer.write_str("\"NaN\"")?,
            TokenValue::F64(v) if v.is_infinite() => self.writer.write_str(if *v > 0.0 {
                "\"Infinity\""
            } else {
                "\"-Infinity\""
            })?,
            TokenValue::F64(v) => write!(self.writer, "{v:?}")?,
            TokenValue::Decimal(d) => write!(self.writer, "{d}")?,
            TokenValue::Str(s) => self.write_string(s)?,
            TokenValue::Bytes(bytes) => {
                self.writer.write_char('"')?;
                let mut encoder = Base64Encoder::new(&mut self.writer, &self.pools);
                encoder.encode(bytes)?;
                encoder.flush()?;
                drop(encoder);
                self.writer.write_char('"')?;
            }
            TokenValue::DateTime(d) => write!(self.writer, "\"{}\"", d.format(NAIVE_FORMAT))?,
            TokenValue::DateTimeOffset(d) => write!(self.writer, "\"{}\"", d.to_rfc3339())?,
        }
        Ok(())
    }

    fn write_bytes_from(&mut self, reader: &mut dyn Read, length: Option<u64>) -> Result<u64, Error> {
        self.before_value()?;
        self.writer.write_char('"')?;
        let mut encoder = Base64Encoder::new(&mut self.writer, &self.pools);
        let consumed = encoder.encode_reader(reader, length)?;
        encoder.flush()?;
        drop(encoder);
        self.writer.write_char('"')?;
        Ok(consumed)
    }
}
