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

//! # Spool Derive Macros
//!
//! `#[derive(SpoolObject)]` turns a struct with named fields into a
//! self-serializing type for the Spool engine. The macro implements:
//!
//! - `SelfSerialize`: reads the members of a JSON-like object into `self`
//!   and writes them back, returning a bitmask of the members touched
//!   (bit `i` for the `i`-th serialized field; fields from the 32nd on share bit 31)
//! - `Materialize`: a parameterless constructor through `Default`, or the
//!   constructors returned by `#[spool(constructors = path)]`
//! - `Serializer`: so the type nests inside lists, maps and options
//!
//! ## Attributes
//!
//! - `#[spool(rename = "name")]` on a field: member name used in the text
//! - `#[spool(skip)]` on a field: neither read nor written
//! - `#[spool(constructors = path)]` on the struct: a `fn() -> Constructors<Self>`
//!   used instead of the `Default`-based one
//!
//! ```rust,ignore
//! use spool::SpoolObject;
//!
//! #[derive(SpoolObject, Default, Debug, PartialEq)]
//! struct Account {
//!     #[spool(rename = "accountId")]
//!     id: u64,
//!     owner: String,
//!     tags: Vec<String>,
//!     #[spool(skip)]
//!     cached_balance: Option<f64>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;

/// Derive macro for self-serializing objects.
///
/// Unknown members are skipped when reading. A member missing from the input
/// keeps the value the constructor gave it.
#[proc_macro_derive(SpoolObject, attributes(spool))]
pub fn proc_macro_derive_spool_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_spool_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
