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

use std::any::type_name;

use crate::error::Error;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenKind, TokenReader, TokenValue, TokenWriter};

/// Reads an integer token, or integer text, into `T`.
pub(crate) fn read_integer<T: TryFrom<i128>>(reader: &dyn TokenReader) -> Result<T, Error> {
    let wide = match (reader.token_kind(), reader.value()) {
        (TokenKind::Integer, TokenValue::Str(text)) | (TokenKind::String, TokenValue::Str(text)) => {
            text.trim().parse::<i128>().map_err(|_| {
                Error::invalid_data(format!(
                    "Could not convert string to integer: {}. Path '{}'.",
                    text,
                    reader.path()
                ))
            })?
        }
        (TokenKind::Integer, value) => value.as_i128().ok_or_else(|| out_of_range::<T>(reader))?,
        _ => return Err(reader.unexpected("Integer")),
    };
    T::try_from(wide).map_err(|_| out_of_range::<T>(reader))
}

#[cold]
fn out_of_range<T>(reader: &dyn TokenReader) -> Error {
    Error::invalid_data(format!(
        "Value is too large or too small for {}. Path '{}'.",
        type_name::<T>(),
        reader.path()
    ))
}

pub(crate) fn read_float(reader: &dyn TokenReader) -> Result<f64, Error> {
    match (reader.token_kind(), reader.value()) {
        (TokenKind::Float | TokenKind::Integer, TokenValue::Str(text))
        | (TokenKind::String, TokenValue::Str(text)) => match text.trim() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other.parse::<f64>().map_err(|_| {
                Error::invalid_data(format!(
                    "Could not convert string to double: {}. Path '{}'.",
                    text,
                    reader.path()
                ))
            }),
        },
        (TokenKind::Float | TokenKind::Integer, value) => value
            .as_f64()
            .ok_or_else(|| reader.unexpected("Float")),
        _ => Err(reader.unexpected("Float")),
    }
}

macro_rules! impl_num_serializer {
    ($ty:ty, $variant:ident) => {
        impl Serializer for $ty {
            #[inline(always)]
            fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
                writer.write_value(&TokenValue::$variant(*self))
            }

            #[inline(always)]
            fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
                read_integer::<$ty>(reader)
            }
        }
    };
}

impl_num_serializer!(i8, I8);
impl_num_serializer!(i16, I16);
impl_num_serializer!(i32, I32);
impl_num_serializer!(i64, I64);
impl_num_serializer!(u8, U8);
impl_num_serializer!(u16, U16);
impl_num_serializer!(u32, U32);
impl_num_serializer!(u64, U64);

impl Serializer for f64 {
    #[inline(always)]
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::F64(*self))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        read_float(reader)
    }
}

impl Serializer for f32 {
    #[inline(always)]
    fn spool_write(&self, writer: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        writer.write_value(&TokenValue::F64(*self as f64))
    }

    fn spool_read(reader: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        read_float(reader).map(|v| v as f32)
    }
}
