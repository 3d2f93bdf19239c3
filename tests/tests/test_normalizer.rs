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

use chrono::{NaiveDate, TimeZone, Utc};
use num_bigint::BigInt;
use proptest::prelude::*;

use spool::config::{DateParseHandling, FloatParseHandling};
use spool::json::{JsonReader, JsonWriter};
use spool::materialize::normalize;
use spool::{Config, Error, NormalizedValue, Spool, TokenReader};

fn normalize_json(json: &str, config: &Config) -> Result<NormalizedValue, Error> {
    let mut reader = JsonReader::new(json, config)?;
    reader.read_required()?;
    normalize(&mut reader)
}

/// Writes `value` as JSON text, reads it back and normalizes it again.
fn round_trip(value: &NormalizedValue, config: &Config) -> NormalizedValue {
    let spool = Spool::new(config.clone());
    let mut writer = JsonWriter::new(String::new(), spool.pool_set());
    value.write(&mut writer).unwrap();
    normalize_json(&writer.into_inner(), config).unwrap()
}

#[test]
fn test_integer_narrowing() {
    let config = Config::default();
    assert_eq!(normalize_json("-5", &config).unwrap(), NormalizedValue::I64(-5));
    assert_eq!(
        normalize_json("18446744073709551615", &config).unwrap(),
        NormalizedValue::U64(u64::MAX)
    );
    let huge = "123456789012345678901234567890";
    assert_eq!(
        normalize_json(huge, &config).unwrap(),
        NormalizedValue::BigInt(huge.parse::<BigInt>().unwrap())
    );
}

#[test]
fn test_floats_by_parse_handling() {
    let config = Config::default();
    assert_eq!(normalize_json("1.25", &config).unwrap(), NormalizedValue::Double(1.25));

    let config = Config {
        float_parse_handling: FloatParseHandling::Decimal,
        ..Config::default()
    };
    // decimals that fit a double are surfaced as doubles
    assert_eq!(normalize_json("1.25", &config).unwrap(), NormalizedValue::Double(1.25));
}

#[test]
fn test_dates_follow_parse_handling() {
    let text = r#""2023-06-01T10:30:00+02:00""#;

    let config = Config::default();
    let expected = NaiveDate::from_ymd_opt(2023, 6, 1)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .unwrap();
    assert_eq!(normalize_json(text, &config).unwrap(), NormalizedValue::DateTime(expected));

    let config = Config {
        date_parse_handling: DateParseHandling::DateTimeOffset,
        ..Config::default()
    };
    match normalize_json(text, &config).unwrap() {
        NormalizedValue::DateTimeOffset(d) => {
            assert_eq!(d.offset().local_minus_utc(), 2 * 3600);
            assert_eq!(d.naive_local(), expected);
        }
        other => panic!("expected an offset date, got {other:?}"),
    }

    let config = Config {
        date_parse_handling: DateParseHandling::None,
        ..Config::default()
    };
    assert_eq!(
        normalize_json(text, &config).unwrap(),
        NormalizedValue::String("2023-06-01T10:30:00+02:00".to_string())
    );
}

#[test]
fn test_structural_nodes_are_captured() {
    let config = Config::default();
    let value = normalize_json(r#"{"a":[1,2],"b":{"c":null}}"#, &config).unwrap();
    let node = value.as_node().unwrap();
    assert!(node.is_object());
    let entries = node.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "a");
    let list = entries[0].1.as_node().unwrap().elements().unwrap();
    assert_eq!(list, vec![NormalizedValue::I64(1), NormalizedValue::I64(2)]);
    let inner = entries[1].1.as_node().unwrap().entries().unwrap();
    assert_eq!(inner, vec![("c".to_string(), NormalizedValue::Null)]);
}

#[test]
fn test_depth_limit() {
    let config = Config {
        max_depth: 3,
        ..Config::default()
    };
    assert!(normalize_json("[[[1]]]", &config).is_ok());
    let err = normalize_json("[[[[1]]]]", &config).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn test_round_trip_is_stable() {
    let config = Config::default();
    let date = NaiveDate::from_ymd_opt(1999, 12, 31)
        .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 250))
        .unwrap();
    let values = [
        NormalizedValue::I64(i64::MIN),
        NormalizedValue::U64(u64::MAX),
        NormalizedValue::BigInt("-98765432109876543210".parse().unwrap()),
        NormalizedValue::String("tab\tquote\"".to_string()),
        NormalizedValue::DateTime(date),
        NormalizedValue::Bool(false),
        NormalizedValue::Null,
    ];
    for value in &values {
        assert_eq!(&round_trip(value, &config), value);
    }

    let config = Config {
        date_parse_handling: DateParseHandling::DateTimeOffset,
        ..Config::default()
    };
    let offset = Utc
        .with_ymd_and_hms(2020, 1, 2, 3, 4, 5)
        .unwrap()
        .fixed_offset();
    let value = NormalizedValue::DateTimeOffset(offset);
    assert_eq!(round_trip(&value, &config), value);
}

#[test]
fn test_non_finite_doubles_read_back_as_strings() {
    let config = Config::default();
    let value = round_trip(&NormalizedValue::Double(f64::NAN), &config);
    assert_eq!(value, NormalizedValue::String("NaN".to_string()));
}

proptest! {
    #[test]
    fn prop_integers_are_idempotent(v in any::<i64>()) {
        let config = Config::default();
        let value = normalize_json(&v.to_string(), &config).unwrap();
        prop_assert_eq!(&value, &NormalizedValue::I64(v));
        prop_assert_eq!(round_trip(&value, &config), value);
    }

    #[test]
    fn prop_strings_are_idempotent(s in "\\PC*") {
        let config = Config {
            date_parse_handling: DateParseHandling::None,
            ..Config::default()
        };
        let value = NormalizedValue::String(s);
        prop_assert_eq!(round_trip(&value, &config), value);
    }

    #[test]
    fn prop_dates_are_idempotent(secs in 0i64..4_000_000_000, millis in 0u32..1000) {
        let config = Config::default();
        let date = chrono::DateTime::from_timestamp(secs, millis * 1_000_000)
            .unwrap()
            .naive_utc();
        let value = NormalizedValue::DateTime(date);
        prop_assert_eq!(round_trip(&value, &config), value);
    }
}
