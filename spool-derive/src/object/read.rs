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

use proc_macro2::TokenStream;
use quote::quote;

use super::util::MemberField;

pub(super) fn gen_read_from(members: &[MemberField<'_>]) -> TokenStream {
    let arms = members.iter().map(|member| {
        let ident = member.ident;
        let name = &member.name;
        let bit = member.bit;
        quote! {
            #name => {
                self.#ident = spool.read(reader)?;
                restored |= #bit;
            }
        }
    });
    quote! {
        fn read_from(
            &mut self,
            reader: &mut dyn spool_core::token::TokenReader,
            spool: &spool_core::Spool,
        ) -> ::std::result::Result<u32, spool_core::error::Error> {
            reader.expect(spool_core::token::TokenKind::StartObject)?;
            let mut restored: u32 = 0;
            while let ::std::option::Option::Some(name) = reader.read_property_name()? {
                reader.read_required()?;
                match name.as_str() {
                    #(#arms)*
                    _ => reader.skip()?,
                }
            }
            ::std::result::Result::Ok(restored)
        }
    }
}

/// `Serializer::spool_read`, plus `spool_read_into` when the type reuses
/// its `Default` instance.
pub(super) fn gen_spool_read(reuse_default: bool) -> TokenStream {
    let read_into = if reuse_default {
        quote! {
            fn spool_read_into(
                &mut self,
                reader: &mut dyn spool_core::token::TokenReader,
                spool: &spool_core::Spool,
            ) -> ::std::result::Result<(), spool_core::error::Error> {
                let mut slot = ::std::option::Option::Some(::std::mem::take(self));
                spool.materialize_into(reader, &mut slot)?;
                match slot {
                    ::std::option::Option::Some(value) => {
                        *self = value;
                        ::std::result::Result::Ok(())
                    }
                    ::std::option::Option::None => {
                        ::std::result::Result::Err(reader.unexpected("StartObject"))
                    }
                }
            }
        }
    } else {
        quote! {}
    };
    quote! {
        fn spool_read(
            reader: &mut dyn spool_core::token::TokenReader,
            spool: &spool_core::Spool,
        ) -> ::std::result::Result<Self, spool_core::error::Error> {
            match spool.materialize::<Self>(reader)? {
                ::std::option::Option::Some(value) => ::std::result::Result::Ok(value),
                ::std::option::Option::None => {
                    ::std::result::Result::Err(reader.unexpected("StartObject"))
                }
            }
        }

        #read_into
    }
}
