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

use super::util::{all_bits, MemberField};

pub(super) fn gen_write_to(members: &[MemberField<'_>]) -> TokenStream {
    let writes = members.iter().map(|member| {
        let ident = member.ident;
        let name = &member.name;
        quote! {
            writer.write_property_name(#name)?;
            spool.write(writer, &self.#ident)?;
        }
    });
    let written = all_bits(members);
    quote! {
        fn write_to(
            &self,
            writer: &mut dyn spool_core::token::TokenWriter,
            spool: &spool_core::Spool,
        ) -> ::std::result::Result<u32, spool_core::error::Error> {
            writer.write_start_object()?;
            #(#writes)*
            writer.write_end_object()?;
            ::std::result::Result::Ok(#written)
        }
    }
}

pub(super) fn gen_spool_write() -> TokenStream {
    quote! {
        fn spool_write(
            &self,
            writer: &mut dyn spool_core::token::TokenWriter,
            spool: &spool_core::Spool,
        ) -> ::std::result::Result<(), spool_core::error::Error> {
            spool_core::materialize::SelfSerialize::write_to(self, writer, spool)?;
            ::std::result::Result::Ok(())
        }
    }
}
