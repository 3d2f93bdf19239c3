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
use std::sync::Arc;
use std::thread;

use spool::{Bytes, Spool, SpoolObject};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_simple_multi_thread() {
    init_logging();
    let spool = Arc::new(Spool::default());
    let src: HashSet<i32> = [41, 42, 43, 45, 46, 47].into_iter().collect();

    let mut handles = vec![];
    for item in &src {
        let spool = Arc::clone(&spool);
        let item = *item;
        handles.push(thread::spawn(move || spool.to_string(&item).unwrap()));
    }
    let texts: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let mut handles = vec![];
    for text in texts {
        let spool = Arc::clone(&spool);
        handles.push(thread::spawn(move || spool.from_str::<i32>(&text).unwrap()));
    }
    let dest: HashSet<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(dest, src);
}

#[derive(SpoolObject, Debug, Default, PartialEq, Eq, Hash, Clone)]
struct Item {
    f1: i32,
    payload: Bytes,
}

#[test]
fn test_struct_multi_thread() -> anyhow::Result<()> {
    init_logging();
    let spool = Arc::new(Spool::default());
    let src: HashSet<Item> = (0..16)
        .map(|i| Item {
            f1: 40 + i,
            payload: Bytes(vec![i as u8; i as usize * 3]),
        })
        .collect();

    let mut handles = vec![];
    for item in src.iter().cloned() {
        let spool = Arc::clone(&spool);
        handles.push(thread::spawn(move || spool.to_string(&item)));
    }
    let mut texts = vec![];
    for handle in handles {
        texts.push(handle.join().unwrap()?);
    }

    // every reader races the lazy registration of Item
    let mut handles = vec![];
    for text in texts {
        let spool = Arc::clone(&spool);
        handles.push(thread::spawn(move || spool.from_str::<Item>(&text)));
    }
    let mut dest = HashSet::new();
    for handle in handles {
        dest.insert(handle.join().unwrap()?);
    }
    assert_eq!(dest, src);
    assert_eq!(spool.type_registry().len(), 1);
    Ok(())
}
