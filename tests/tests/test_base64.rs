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

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};

use spool_core::buffer::{Base64Encoder, PoolSet, LINE_BYTES};

fn encode_in_chunks(pools: &PoolSet, data: &[u8], cuts: &[usize]) -> String {
    let mut encoder = Base64Encoder::new(String::new(), pools);
    let mut start = 0;
    for &cut in cuts {
        let end = cut.min(data.len()).max(start);
        encoder.encode(&data[start..end]).unwrap();
        assert!(encoder.carry_len() <= 2);
        start = end;
    }
    encoder.encode(&data[start..]).unwrap();
    encoder.flush().unwrap();
    encoder.into_inner()
}

#[test]
fn test_two_chunk_example() {
    let pools = PoolSet::default();
    let data = [0x4D, 0x61, 0x6E, 0x20];
    assert_eq!(encode_in_chunks(&pools, &data, &[2]), "TWFuIA==");
    assert_eq!(encode_in_chunks(&pools, &data, &[]), "TWFuIA==");
}

#[test]
fn test_random_chunkings_match_single_call() {
    let pools = PoolSet::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let len = rng.gen_range(0..LINE_BYTES * 5);
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let mut cuts: Vec<usize> = (0..rng.gen_range(0..12))
            .map(|_| rng.gen_range(0..=len))
            .collect();
        cuts.sort_unstable();
        assert_eq!(encode_in_chunks(&pools, &data, &cuts), STANDARD.encode(&data));
    }
}

#[test]
fn test_single_byte_chunks() {
    let pools = PoolSet::default();
    let data: Vec<u8> = (0..=255u8).collect();
    let cuts: Vec<usize> = (1..data.len()).collect();
    assert_eq!(encode_in_chunks(&pools, &data, &cuts), STANDARD.encode(&data));
}

#[test]
fn test_encode_span_limits_count() {
    let pools = PoolSet::default();
    let mut encoder = Base64Encoder::new(String::new(), &pools);
    encoder.encode_span(b"Many hands", 4).unwrap();
    encoder.flush().unwrap();
    assert_eq!(encoder.into_inner(), "TWFueQ==");
}

#[test]
fn test_encode_reader_with_length() {
    let pools = PoolSet::default();
    let data = vec![0x42u8; 10_000];
    let mut encoder = Base64Encoder::new(String::new(), &pools);
    let consumed = encoder.encode_reader(data.as_slice(), Some(9_000)).unwrap();
    encoder.flush().unwrap();
    assert_eq!(consumed, 9_000);
    assert_eq!(encoder.into_inner(), STANDARD.encode(&data[..9_000]));
    // the read buffer went back to the pool
    assert_eq!(pools.bytes().locked_count(), 0);
}

#[test]
fn test_flush_then_reuse_starts_new_sequence() {
    let pools = PoolSet::default();
    let mut encoder = Base64Encoder::new(String::new(), &pools);
    encoder.encode(b"a").unwrap();
    encoder.flush().unwrap();
    encoder.encode(b"b").unwrap();
    encoder.flush().unwrap();
    assert_eq!(encoder.into_inner(), "YQ==Yg==");
}

#[test]
fn test_line_buffer_returns_to_char_pool() {
    let pools = PoolSet::default();
    {
        let mut encoder = Base64Encoder::new(String::new(), &pools);
        encoder.encode(b"abc").unwrap();
        assert_eq!(pools.chars().locked_count(), 1);
    }
    assert_eq!(pools.chars().locked_count(), 0);
}

proptest! {
    #[test]
    fn prop_chunk_invariance(data in proptest::collection::vec(any::<u8>(), 0..600), cuts in proptest::collection::vec(0usize..600, 0..10)) {
        let pools = PoolSet::default();
        let mut cuts = cuts;
        cuts.sort_unstable();
        let text = encode_in_chunks(&pools, &data, &cuts);
        prop_assert_eq!(&text, &STANDARD.encode(&data));
        prop_assert_eq!(STANDARD.decode(text.as_bytes()).unwrap(), data);
    }
}
