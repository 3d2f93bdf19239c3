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
use crate::token::{TokenKind, TokenReader, TokenWriter};

impl<T: Serializer> Serializer for Vec<T> {
    fn spool_write(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<(), Error> {
        writer.write_start_array()?;
        for item in self {
            spool.write(writer, item)?;
        }
        writer.write_end_array()
    }

    fn spool_read(reader: &mut dyn TokenReader, spool: &Spool) -> Result<Self, Error> {
        let mut list = Vec::new();
        read_elements(&mut list, reader, spool)?;
        Ok(list)
    }

    fn spool_read_into(&mut self, reader: &mut dyn TokenReader, spool: &Spool) -> Result<(), Error> {
        self.clear();
        read_elements(self, reader, spool)
    }
}

fn read_elements<T: Serializer>(
    list: &mut Vec<T>,
    reader: &mut dyn TokenReader,
    spool: &Spool,
) -> Result<(), Error> {
    reader.expect(TokenKind::StartArray)?;
    loop {
        reader.read_required()?;
        if reader.token_kind() == TokenKind::EndArray {
            return Ok(());
        }
        list.push(spool.read::<T>(reader)?);
    }
}
