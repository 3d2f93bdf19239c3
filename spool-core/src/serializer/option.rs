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

use crate::error::Error;
use crate::serializer::Serializer;
use crate::spool::Spool;
use crate::token::{TokenReader, TokenWriter};

impl<T: Serializer> Serializer for Option<T> {
    fn spool_write(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<(), Error> {
        match self {
            Some(value) => spool.write(writer, value),
            None => writer.write_null(),
        }
    }

    fn spool_read(reader: &mut dyn TokenReader, spool: &Spool) -> Result<Self, Error> {
        if reader.token_kind().is_null() {
            return Ok(None);
        }
        Ok(Some(spool.read::<T>(reader)?))
    }
}
