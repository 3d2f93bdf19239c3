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

//! # Spool Core
//!
//! The core of the Spool serialization engine: pooled scratch buffers, a
//! streaming Base64 encoder, a token model with JSON adapters, converter
//! dispatch and the materializer that builds self-serializing types.
//!
//! ## Architecture
//!
//! - **`buffer`**: [`buffer::BufferPool`] array pools and the incremental
//!   [`buffer::Base64Encoder`]
//! - **`token`**: [`token::TokenReader`] / [`token::TokenWriter`], token
//!   recording and path tracking
//! - **`json`**: [`json::JsonReader`] and [`json::JsonWriter`] over JSON text
//! - **`resolver`**: the ordered [`resolver::ConverterRegistry`] and the
//!   per-type [`resolver::TypeRegistry`]
//! - **`materialize`**: constructor shapes, the object materializer and the
//!   token normalizer
//! - **`serializer`**: the default read/write path for std and chrono types
//! - **`spool`**: the [`Spool`] facade
//! - **`config`** and **`error`**
//!
//! ## Constructor shapes
//!
//! A self-serializing type declares which constructors it offers through
//! [`materialize::Constructors`]. The materializer prefers, in order, a
//! constructor taking the reader and the engine, one taking only the reader,
//! and a parameterless constructor followed by in-place population. Types
//! that only offer a legacy constructor receive a
//! [`materialize::PropertyBag`] of normalized values instead. When a type
//! offers both kinds and the preferred one fails, the legacy one is tried on
//! a replay of the same tokens.
//!
//! ## Usage
//!
//! This crate is typically used through the `spool` crate, which adds the
//! `SpoolObject` derive macro.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use spool_core::resolver::FnConverter;
//! use spool_core::token::TokenValue;
//! use spool_core::Spool;
//!
//! let flag = FnConverter::<bool>::new()
//!     .with_write(|writer, value: &bool, _| writer.write_value(&TokenValue::from(if *value { "Y" } else { "N" })));
//! let spool = Spool::default().converter(Arc::new(flag));
//!
//! let mut flags = BTreeMap::new();
//! flags.insert("enabled".to_string(), true);
//! assert_eq!(spool.to_string(&flags).unwrap(), r#"{"enabled":"Y"}"#);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod json;
pub mod materialize;
pub mod resolver;
pub mod serializer;
pub mod spool;
pub mod token;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::materialize::{Constructors, Materialize, NormalizedValue, SelfSerialize};
pub use crate::serializer::{Bytes, Serializer};
pub use crate::spool::Spool;
pub use crate::token::{TokenKind, TokenReader, TokenValue, TokenWriter};
