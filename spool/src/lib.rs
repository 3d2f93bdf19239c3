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

//! # Spool
//!
//! Spool reads and writes Rust values through a token stream, with JSON text
//! as the built-in framing. It is built for engines that must honour custom
//! converters at every nesting level and construct types through whatever
//! constructor they offer.
//!
//! ## Key Features
//!
//! - **Converters**: an ordered list of [`Converter`]s consulted before the
//!   default path, for the top-level value and every nested one
//! - **Constructor shapes**: self-serializing types are built through a
//!   reader constructor, a parameterless constructor plus population, or a
//!   legacy constructor fed a [`PropertyBag`] of normalized values
//! - **Pooled buffers**: scratch arrays are rented from [`BufferPool`]s
//!   shared through a [`PoolSet`]
//! - **Streaming Base64**: byte payloads are encoded incrementally, from
//!   slices or `io::Read` streams, and asynchronously with cancellation
//!
//! ## Object serialization
//!
//! ```rust
//! use spool::{Error, Spool, SpoolObject};
//!
//! #[derive(SpoolObject, Debug, Default, PartialEq)]
//! struct Address {
//!     street: String,
//!     city: String,
//! }
//!
//! #[derive(SpoolObject, Debug, Default, PartialEq)]
//! struct Person {
//!     #[spool(rename = "fullName")]
//!     name: String,
//!     age: i32,
//!     address: Address,
//!     hobbies: Vec<String>,
//!     #[spool(skip)]
//!     session: Option<u64>,
//! }
//!
//! # fn main() -> Result<(), Error> {
//! let spool = Spool::default();
//! let person = Person {
//!     name: "John Doe".to_string(),
//!     age: 30,
//!     address: Address {
//!         street: "123 Main St".to_string(),
//!         city: "New York".to_string(),
//!     },
//!     hobbies: vec!["reading".to_string()],
//!     session: Some(7),
//! };
//!
//! let json = spool.to_string(&person)?;
//! assert!(json.starts_with(r#"{"fullName":"John Doe","age":30"#));
//! let back: Person = spool.from_str(&json)?;
//! assert_eq!(back.address, person.address);
//! assert_eq!(back.session, None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Converters
//!
//! ```rust
//! use std::sync::Arc;
//! use spool::{FnConverter, Spool, TokenValue};
//!
//! let cents = FnConverter::<i64>::new()
//!     .with_write(|writer, value: &i64, _| {
//!         writer.write_value(&TokenValue::from(format!("{}.{:02}", value / 100, value % 100)))
//!     });
//! let spool = Spool::default().converter(Arc::new(cents));
//! assert_eq!(spool.to_string(&vec![1250i64]).unwrap(), r#"["12.50"]"#);
//! ```
//!
//! ## Configuration
//!
//! [`Spool`] carries a [`Config`]; the builder methods on [`Spool`] set its
//! fields:
//!
//! ```rust
//! use spool::config::{DateParseHandling, FloatParseHandling, Formatting};
//! use spool::Spool;
//!
//! let spool = Spool::default()
//!     .date_parse_handling(DateParseHandling::DateTimeOffset)
//!     .float_parse_handling(FloatParseHandling::Decimal)
//!     .formatting(Formatting::Indented)
//!     .max_depth(32);
//! assert_eq!(spool.config().max_depth(), 32);
//! ```

pub use spool_core::{
    buffer, config, error, json, materialize, resolver, serializer, token, Bytes, Config,
    Constructors, Error, Materialize, NormalizedValue, SelfSerialize, Serializer, Spool,
    TokenKind, TokenReader, TokenValue, TokenWriter,
};
pub use spool_core::buffer::{Base64Encoder, BufferPool, PoolSet};
pub use spool_core::materialize::{InfoContext, PropertyBag};
pub use spool_core::resolver::{Converter, FnConverter, SelfSerializingConverter, TypeKey};
pub use spool_derive::SpoolObject;
