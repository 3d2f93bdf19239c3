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

use std::collections::HashSet;

use proc_macro2::Ident;
use syn::{Data, DeriveInput, Fields, Type};

use super::field_meta::parse_field_meta;

/// Index of the bit shared by the 32nd and every later member.
pub(super) const SHARED_BIT_INDEX: u32 = u32::BITS - 1;

/// One serialized member of the derived struct.
pub(super) struct MemberField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    /// Member name in the token stream.
    pub name: String,
    /// Restored/written bitmask contribution. Members from [`SHARED_BIT_INDEX`]
    /// on all share the top bit, so the mask is never zero for them.
    pub bit: u32,
}

/// Serialized fields in declaration order, skipping `#[spool(skip)]`.
pub(super) fn member_fields(input: &DeriveInput) -> syn::Result<Vec<MemberField<'_>>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "SpoolObject requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "SpoolObject can only be derived for structs",
            ))
        }
    };

    let mut members = Vec::with_capacity(fields.len());
    let mut seen = HashSet::new();
    for field in fields {
        let meta = parse_field_meta(field)?;
        if meta.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = meta
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        if !seen.insert(name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate member name `{name}`"),
            ));
        }
        let index = members.len() as u32;
        members.push(MemberField {
            ident,
            ty: &field.ty,
            name,
            bit: member_bit(index),
        });
    }
    Ok(members)
}

#[inline]
pub(super) fn member_bit(index: u32) -> u32 {
    1u32 << index.min(SHARED_BIT_INDEX)
}

/// Bitmask with every member's bit set.
pub(super) fn all_bits(members: &[MemberField<'_>]) -> u32 {
    members.iter().fold(0, |mask, m| mask | m.bit)
}
