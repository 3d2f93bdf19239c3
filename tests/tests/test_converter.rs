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

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use spool::{
    Converter, Error, FnConverter, Spool, SpoolObject, TokenKind, TokenReader, TokenValue,
    TokenWriter, TypeKey,
};
use spool_core::json::{JsonReader, JsonWriter};
use spool_core::resolver::TypeFamily;

#[derive(SpoolObject, Debug, Default, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Celsius(f64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fahrenheit(f64);

/// One converter for every temperature type, written as `"<value><unit>"`.
struct TemperatureConverter {
    family: TypeFamily,
}

impl TemperatureConverter {
    fn new() -> Self {
        TemperatureConverter {
            family: TypeFamily::new().with::<Celsius>().with::<Fahrenheit>(),
        }
    }
}

impl Converter for TemperatureConverter {
    fn can_convert(&self, key: &TypeKey) -> bool {
        self.family.contains(key)
    }

    fn read_value(
        &self,
        reader: &mut dyn TokenReader,
        key: &TypeKey,
        _existing: Option<Box<dyn Any>>,
        _spool: &Spool,
    ) -> Result<Box<dyn Any>, Error> {
        let text = reader
            .value()
            .as_str()
            .ok_or_else(|| reader.unexpected("String"))?;
        let (number, unit) = text.split_at(text.len().saturating_sub(1));
        let value: f64 = number
            .parse()
            .map_err(|_| Error::invalid_data(format!("bad temperature {text}")))?;
        match unit {
            "C" if key.is::<Celsius>() => Ok(Box::new(Celsius(value))),
            "F" if key.is::<Fahrenheit>() => Ok(Box::new(Fahrenheit(value))),
            _ => Err(Error::invalid_data(format!("unit {unit} does not match {key}"))),
        }
    }

    fn write_value(&self, writer: &mut dyn TokenWriter, value: &dyn Any, _: &Spool) -> Result<(), Error> {
        let text = if let Some(c) = value.downcast_ref::<Celsius>() {
            format!("{}C", c.0)
        } else if let Some(f) = value.downcast_ref::<Fahrenheit>() {
            format!("{}F", f.0)
        } else {
            return Err(Error::type_error("not a temperature"));
        };
        writer.write_value(&TokenValue::Str(text))
    }

    fn name(&self) -> &str {
        "temperature"
    }
}

// Temperatures only serialize through the converter.
impl spool::Serializer for Celsius {
    fn spool_write(&self, _: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        Err(Error::unsupported("Celsius needs a converter"))
    }

    fn spool_read(_: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        Err(Error::unsupported("Celsius needs a converter"))
    }
}

impl spool::Serializer for Fahrenheit {
    fn spool_write(&self, _: &mut dyn TokenWriter, _: &Spool) -> Result<(), Error> {
        Err(Error::unsupported("Fahrenheit needs a converter"))
    }

    fn spool_read(_: &mut dyn TokenReader, _: &Spool) -> Result<Self, Error> {
        Err(Error::unsupported("Fahrenheit needs a converter"))
    }
}

fn tagged_point_converter(tag: &'static str) -> Arc<dyn Converter> {
    Arc::new(FnConverter::<Point>::new().with_write(move |writer, p: &Point, _| {
        writer.write_value(&TokenValue::from(format!("{tag}:{},{}", p.x, p.y)))
    }))
}

#[test]
fn test_family_converter_nested_in_collections() {
    let spool = Spool::default().converter(Arc::new(TemperatureConverter::new()));
    let mut readings = HashMap::new();
    readings.insert("kitchen".to_string(), vec![Celsius(21.5), Celsius(22.0)]);
    let json = spool.to_string(&readings).unwrap();
    assert_eq!(json, r#"{"kitchen":["21.5C","22C"]}"#);

    let back: HashMap<String, Vec<Celsius>> = spool.from_str(&json).unwrap();
    assert_eq!(back, readings);

    let outside: Option<Fahrenheit> = spool.from_str(r#""70.5F""#).unwrap();
    assert_eq!(outside, Some(Fahrenheit(70.5)));
    let missing: Option<Fahrenheit> = spool.from_str("null").unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_converter_errors_propagate() {
    let spool = Spool::default().converter(Arc::new(TemperatureConverter::new()));
    let err = spool.from_str::<Celsius>(r#""70F""#).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
    let err = spool.from_str::<Celsius>("12").unwrap_err();
    assert!(matches!(err, Error::TokenMismatch { .. }));
}

#[test]
fn test_without_converter_default_path_runs() {
    let spool = Spool::default();
    let err = spool.to_string(&Celsius(1.0)).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[test]
fn test_first_registered_converter_wins() {
    let spool = Spool::default()
        .converter(tagged_point_converter("first"))
        .converter(tagged_point_converter("second"));
    let json = spool.to_string(&Point { x: 1, y: 2 }).unwrap();
    assert_eq!(json, r#""first:1,2""#);
}

#[test]
fn test_self_serializing_converter_as_override_and_fallback() {
    let point = Point { x: 3, y: 4 };

    let spool = Spool::default();
    spool.register::<Point>();
    let spool = spool
        .clone()
        .converter(spool.self_serializing_converter())
        .converter(tagged_point_converter("tagged"));
    assert_eq!(spool.to_string(&point).unwrap(), r#"{"x":3,"y":4}"#);

    let spool = Spool::default();
    spool.register::<Point>();
    let spool = spool
        .clone()
        .converter(tagged_point_converter("tagged"))
        .converter(spool.self_serializing_converter());
    assert_eq!(spool.to_string(&point).unwrap(), r#""tagged:3,4""#);
}

#[test]
fn test_self_serializing_converter_rejects_null() {
    let spool = Spool::default();
    spool.register::<Point>();
    let spool = spool.clone().converter(spool.self_serializing_converter());
    let err = spool.from_str::<Point>("null").unwrap_err();
    match err {
        Error::TokenMismatch { found, .. } => assert_eq!(found, TokenKind::Null),
        other => panic!("unexpected error {other:?}"),
    }
    // an optional slot takes the null before any converter is consulted
    assert_eq!(spool.from_str::<Option<Point>>("null").unwrap(), None);
}

#[test]
fn test_converter_returning_wrong_type() {
    let liar = FnConverter::<u32>::new().with_read(|_, _, _| Ok(1));
    struct Wrong(Arc<dyn Converter>);
    impl Converter for Wrong {
        fn can_convert(&self, key: &TypeKey) -> bool {
            key.is::<i64>()
        }
        fn read_value(
            &self,
            reader: &mut dyn TokenReader,
            _: &TypeKey,
            existing: Option<Box<dyn Any>>,
            spool: &Spool,
        ) -> Result<Box<dyn Any>, Error> {
            self.0.read_value(reader, &TypeKey::of::<u32>(), existing, spool)
        }
        fn write_value(&self, _: &mut dyn TokenWriter, _: &dyn Any, _: &Spool) -> Result<(), Error> {
            Ok(())
        }
    }
    let spool = Spool::default().converter(Arc::new(Wrong(Arc::new(liar))));
    let err = spool.from_str::<i64>("5").unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
}

#[test]
fn test_dynamic_read_and_write() {
    let spool = Spool::default();
    spool.register::<Point>();
    let key = TypeKey::of::<Point>();

    let mut reader = JsonReader::new(r#"{"y":9,"x":8}"#, spool.config()).unwrap();
    let value = spool.read_dyn(&mut reader, &key, None).unwrap().unwrap();
    let point = value.downcast_ref::<Point>().unwrap();
    assert_eq!(point, &Point { x: 8, y: 9 });

    let mut writer = JsonWriter::new(String::new(), spool.pool_set());
    spool.write_dyn(&mut writer, &key, point).unwrap();
    assert_eq!(writer.into_inner(), r#"{"x":8,"y":9}"#);

    let mut reader = JsonReader::new("null", spool.config()).unwrap();
    assert!(spool.read_dyn(&mut reader, &key, None).unwrap().is_none());
}

#[test]
fn test_read_into_with_fn_converter_existing_value() {
    let merge = FnConverter::<Point>::new().with_read(|reader, existing, spool| {
        let mut point = existing.unwrap_or_default();
        let delta: Vec<i32> = spool.read(reader)?;
        point.x += delta.first().copied().unwrap_or(0);
        point.y += delta.get(1).copied().unwrap_or(0);
        Ok(point)
    });
    let spool = Spool::default().converter(Arc::new(merge));
    let mut reader = JsonReader::new("[10,20]", spool.config()).unwrap();
    let mut point = Point { x: 1, y: 2 };
    spool.read_into(&mut reader, &mut point).unwrap();
    assert_eq!(point, Point { x: 11, y: 22 });
}
