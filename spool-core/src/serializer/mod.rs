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

//! The default (non-converter) read and write path.
//!
//! Nested values are always read and written through [`Spool::read`] and
//! [`Spool::write`] so that converters registered for element types are
//! honoured at every depth.

mod big_number;
mod bool;
mod bytes;
mod datetime;
mod list;
mod map;
mod normalized;
mod number;
mod option;
mod string;

use crate::error::Error;
use crate::spool::Spool;
use crate::token::{TokenReader, TokenWriter};

pub use bytes::Bytes;

/// Token-level serialization of one Rust type.
///
/// Readers are positioned on the first token of the value and must be left
/// on its last token; for scalars those are the same token.
pub trait Serializer: 'static {
    fn spool_write(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<(), Error>;

    fn spool_read(reader: &mut dyn TokenReader, spool: &Spool) -> Result<Self, Error>
    where
        Self: Sized;

    /// Populates an existing value. Types that can reuse their storage
    /// override this.
    fn spool_read_into(&mut self, reader: &mut dyn TokenReader, spool: &Spool) -> Result<(), Error>
    where
        Self: Sized,
    {
        *self = Self::spool_read(reader, spool)?;
        Ok(())
    }
}
