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

mod field_meta;
mod read;
mod util;
mod write;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, DeriveInput, GenericParam};

use field_meta::parse_container_meta;

pub fn derive_spool_object(input: &DeriveInput) -> syn::Result<TokenStream> {
    let container = parse_container_meta(&input.attrs)?;
    let members = util::member_fields(input)?;
    let name = &input.ident;

    let mut generics = input.generics.clone();
    for param in generics.params.iter_mut() {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!('static));
        }
    }
    {
        let (_, self_generics, _) = input.generics.split_for_impl();
        let where_clause = generics.make_where_clause();
        if container.constructors.is_none() {
            where_clause
                .predicates
                .push(parse_quote!(#name #self_generics: ::std::default::Default));
        }
        for member in &members {
            let ty = member.ty;
            where_clause
                .predicates
                .push(parse_quote!(#ty: spool_core::serializer::Serializer));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let read_from = read::gen_read_from(&members);
    let write_to = write::gen_write_to(&members);
    let spool_write = write::gen_spool_write();
    let spool_read = read::gen_spool_read(container.constructors.is_none());
    let constructors = match &container.constructors {
        Some(path) => quote! { #path() },
        None => quote! {
            spool_core::materialize::Constructors::new()
                .parameterless(<Self as ::std::default::Default>::default)
        },
    };

    Ok(quote! {
        impl #impl_generics spool_core::materialize::SelfSerialize for #name #ty_generics #where_clause {
            #read_from
            #write_to
        }

        impl #impl_generics spool_core::materialize::Materialize for #name #ty_generics #where_clause {
            fn constructors() -> spool_core::materialize::Constructors<Self> {
                #constructors
            }
        }

        impl #impl_generics spool_core::serializer::Serializer for #name #ty_generics #where_clause {
            #spool_write
            #spool_read
        }
    })
}
