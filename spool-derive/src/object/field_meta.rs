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

//! Parsing of `#[spool(...)]` attributes.

use syn::{Attribute, Field, LitStr, Path};

/// Parsed `#[spool(...)]` field attributes.
#[derive(Debug, Clone, Default)]
pub struct SpoolFieldMeta {
    pub rename: Option<String>,
    pub skip: bool,
}

/// Parsed `#[spool(...)]` container attributes.
#[derive(Debug, Clone, Default)]
pub struct SpoolContainerMeta {
    pub constructors: Option<Path>,
}

pub fn parse_field_meta(field: &Field) -> syn::Result<SpoolFieldMeta> {
    let mut meta = SpoolFieldMeta::default();
    for attr in spool_attrs(&field.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("rename") {
                let lit: LitStr = nested.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(syn::Error::new(lit.span(), "rename must not be empty"));
                }
                meta.rename = Some(lit.value());
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else {
                return Err(nested.error("unknown spool field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

pub fn parse_container_meta(attrs: &[Attribute]) -> syn::Result<SpoolContainerMeta> {
    let mut meta = SpoolContainerMeta::default();
    for attr in spool_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("constructors") {
                meta.constructors = Some(nested.value()?.parse()?);
            } else {
                return Err(nested.error("unknown spool container attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

fn spool_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("spool"))
}
