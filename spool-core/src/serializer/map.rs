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

use std::collections::{BTreeMap, HashMap};

use crate::error::Error;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenKind, TokenReader, TokenWriter};

macro_rules! impl_map_serializer {
    ($map:ident) => {
        impl<V: Serializer> Serializer for $map<String, V> {
            fn spool_write(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<(), Error> {
                writer.write_start_object()?;
                for (key, value) in self {
                    writer.write_property_name(key)?;
                    spool.write(writer, value)?;
                }
                writer.write_end_object()
            }

            fn spool_read(reader: &mut dyn TokenReader, spool: &Spool) -> Result<Self, Error> {
                let mut map = $map::new();
                reader.expect(TokenKind::StartObject)?;
                while let Some(name) = reader.read_property_name()? {
                    reader.read_required()?;
                    let value = spool.read::<V>(reader)?;
                    map.insert(name, value);
                }
                Ok(map)
            }
        }
    };
}

impl_map_serializer!(HashMap);
impl_map_serializer!(BTreeMap);
