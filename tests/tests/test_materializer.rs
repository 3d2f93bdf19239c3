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

use spool::config::ObjectCreationHandling;
use spool::json::JsonReader;
use spool::materialize::{Constructors, InfoContext, Materialize, PropertyBag, SelfSerialize};
use spool::{Error, NormalizedValue, Spool, SpoolObject, TokenKind, TokenReader, TokenWriter};

/// Reads `{"id": n}` into `id`, recording which route built the value.
fn read_id(reader: &mut dyn TokenReader, spool: &Spool) -> Result<Option<i64>, Error> {
    reader.expect(TokenKind::StartObject)?;
    let mut id = None;
    while let Some(name) = reader.read_property_name()? {
        reader.read_required()?;
        if name == "id" {
            id = Some(spool.read::<i64>(reader)?);
        } else {
            reader.skip()?;
        }
    }
    Ok(id)
}

fn write_id(writer: &mut dyn TokenWriter, spool: &Spool, id: i64) -> Result<u32, Error> {
    writer.write_start_object()?;
    writer.write_property_name("id")?;
    spool.write(writer, &id)?;
    writer.write_end_object()?;
    Ok(1)
}

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Default, PartialEq)]
        struct $name {
            id: i64,
            built_by: &'static str,
        }

        impl SelfSerialize for $name {
            fn read_from(&mut self, reader: &mut dyn TokenReader, spool: &Spool) -> Result<u32, Error> {
                if let Some(id) = read_id(reader, spool)? {
                    self.id = id;
                }
                if self.built_by.is_empty() {
                    self.built_by = "parameterless";
                } else {
                    self.built_by = "populated";
                }
                Ok(1)
            }

            fn write_to(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<u32, Error> {
                write_id(writer, spool, self.id)
            }
        }
    };
}

id_type!(ReaderOrDefault);

impl Materialize for ReaderOrDefault {
    fn constructors() -> Constructors<Self> {
        Constructors::new()
            .parameterless(ReaderOrDefault::default)
            .reader_only(|reader| {
                let id = read_id(reader, &Spool::default())?.unwrap_or(-1);
                Ok(ReaderOrDefault {
                    id,
                    built_by: "reader",
                })
            })
    }
}

id_type!(AllShapes);

impl Materialize for AllShapes {
    fn constructors() -> Constructors<Self> {
        Constructors::new()
            .parameterless(AllShapes::default)
            .reader_only(|_| Err(Error::unsupported("never chosen")))
            .reader_plus_helper(|reader, spool| {
                let id = read_id(reader, spool)?.unwrap_or(-1);
                Ok(AllShapes {
                    id,
                    built_by: "reader+helper",
                })
            })
            .legacy_info(|_| Err(Error::unsupported("never chosen")))
    }
}

id_type!(Legacy);

impl Materialize for Legacy {
    fn constructors() -> Constructors<Self> {
        Constructors::new().legacy_info_context(legacy_with_context)
    }
}

fn legacy_with_context(bag: PropertyBag, ctx: &InfoContext<'_>) -> Result<Legacy, Error> {
    assert_eq!(bag.type_name(), std::any::type_name::<Legacy>());
    let a = bag.require("a")?;
    assert_eq!(a, &NormalizedValue::I64(1));
    assert_eq!(bag.get("b").and_then(NormalizedValue::as_str), Some("x"));
    assert!(ctx.spool().config().max_depth() > 0);
    Ok(Legacy {
        id: a.as_i64().unwrap_or_default(),
        built_by: if ctx.path().is_empty() { "legacy@root" } else { "legacy@nested" },
    })
}

id_type!(StrictWithFallback);

impl Materialize for StrictWithFallback {
    fn constructors() -> Constructors<Self> {
        Constructors::new()
            .reader_only(|reader| match read_id(reader, &Spool::default())? {
                Some(id) => Ok(StrictWithFallback {
                    id,
                    built_by: "reader",
                }),
                None => Err(Error::invalid_data("member 'id' is required")),
            })
            .legacy_info(|bag| {
                let id = bag
                    .get("legacyId")
                    .and_then(NormalizedValue::as_i64)
                    .ok_or_else(|| Error::construction("no legacy id either"))?;
                Ok(StrictWithFallback {
                    id,
                    built_by: "legacy",
                })
            })
    }
}

id_type!(Strict);

impl Materialize for Strict {
    fn constructors() -> Constructors<Self> {
        Constructors::new().reader_only(|reader| {
            read_id(reader, &Spool::default())?
                .map(|id| Strict { id, built_by: "reader" })
                .ok_or_else(|| Error::invalid_data("member 'id' is required"))
        })
    }
}

id_type!(Shape);

impl Materialize for Shape {
    fn constructors() -> Constructors<Self> {
        Constructors::abstract_type()
    }
}

id_type!(Unconstructible);

impl Materialize for Unconstructible {
    fn constructors() -> Constructors<Self> {
        Constructors::new()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Polyline {
    points: Vec<i64>,
}

impl SelfSerialize for Polyline {
    fn read_from(&mut self, reader: &mut dyn TokenReader, spool: &Spool) -> Result<u32, Error> {
        self.points = spool.read(reader)?;
        Ok(1)
    }

    fn write_to(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<u32, Error> {
        spool.write(writer, &self.points)?;
        Ok(1)
    }
}

impl Materialize for Polyline {
    fn constructors() -> Constructors<Self> {
        Constructors::new().legacy_info(|mut bag| {
            let values = bag
                .take("$values")
                .ok_or_else(|| Error::construction("array payload expected"))?;
            let node = values
                .as_node()
                .ok_or_else(|| Error::construction("array payload expected"))?;
            let points = node
                .elements()?
                .iter()
                .map(|v| v.as_i64().ok_or_else(|| Error::invalid_data("not an integer")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Polyline { points })
        })
    }
}

fn materialize<T: Materialize>(spool: &Spool, json: &str) -> Result<Option<T>, Error> {
    let mut reader = JsonReader::new(json, spool.config())?;
    spool.materialize::<T>(&mut reader)
}

#[test]
fn test_reader_only_preferred_over_parameterless() {
    let spool = Spool::default();
    let value: ReaderOrDefault = materialize(&spool, r#"{"id":5}"#).unwrap().unwrap();
    assert_eq!(value.built_by, "reader");
    assert_eq!(value.id, 5);
}

#[test]
fn test_reader_plus_helper_preferred_over_everything() {
    let spool = Spool::default();
    let value: AllShapes = materialize(&spool, r#"{"id":6}"#).unwrap().unwrap();
    assert_eq!(value, AllShapes { id: 6, built_by: "reader+helper" });
}

#[test]
fn test_legacy_constructor_receives_normalized_bag() {
    let spool = Spool::default();
    let value: Legacy = materialize(&spool, r#"{"a":1,"b":"x"}"#).unwrap().unwrap();
    assert_eq!(value, Legacy { id: 1, built_by: "legacy@root" });
}

#[test]
fn test_legacy_missing_member() {
    let spool = Spool::default();
    let err = materialize::<Legacy>(&spool, r#"{"b":"x"}"#).unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
    assert!(err.to_string().contains("Member 'a' was not found"));
}

#[test]
fn test_legacy_array_payload() {
    let spool = Spool::default();
    let value: Polyline = materialize(&spool, "[1,2,3]").unwrap().unwrap();
    assert_eq!(value.points, vec![1, 2, 3]);
}

#[test]
fn test_legacy_rejects_scalar_payload() {
    let spool = Spool::default();
    let err = materialize::<Polyline>(&spool, "42").unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
}

#[test]
fn test_fallback_to_legacy_on_replayed_tokens() {
    let spool = Spool::default();
    let value: StrictWithFallback = materialize(&spool, r#"{"legacyId":9,"extra":[1,{"a":2}]}"#)
        .unwrap()
        .unwrap();
    assert_eq!(value, StrictWithFallback { id: 9, built_by: "legacy" });

    let value: StrictWithFallback = materialize(&spool, r#"{"id":3}"#).unwrap().unwrap();
    assert_eq!(value.built_by, "reader");
}

#[test]
fn test_fallback_failure_is_hard() {
    let spool = Spool::default();
    let err = materialize::<StrictWithFallback>(&spool, r#"{"other":1}"#).unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
}

#[test]
fn test_preferred_failure_without_legacy_is_construction_error() {
    let spool = Spool::default();
    let err = materialize::<Strict>(&spool, "{}").unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
    assert!(err.to_string().contains("member 'id' is required"));
}

id_type!(DefaultOnly);

impl Materialize for DefaultOnly {
    fn constructors() -> Constructors<Self> {
        Constructors::new().parameterless(DefaultOnly::default)
    }
}

#[test]
fn test_population_failure_is_construction_error_with_path() {
    let spool = Spool::default();
    let built = materialize::<DefaultOnly>(&spool, r#"{"id":5}"#).unwrap().unwrap();
    assert_eq!(built.built_by, "parameterless");

    let err = materialize::<DefaultOnly>(&spool, r#"{"id":true}"#).unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
    let message = err.to_string();
    assert!(message.contains("Parameterless constructor"));
    assert!(message.ends_with("Unexpected token Boolean when expecting Integer. Path 'id'."));
}

#[test]
fn test_abstract_type_cannot_be_created() {
    let spool = Spool::default();
    let err = materialize::<Shape>(&spool, r#"{"id":1}"#).unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
    assert!(err.to_string().contains("abstract"));
}

#[test]
fn test_abstract_type_can_be_populated() {
    let spool = Spool::default();
    let mut reader = JsonReader::new(r#"{"id":4}"#, spool.config()).unwrap();
    let mut slot = Some(Shape {
        id: 0,
        built_by: "caller",
    });
    spool.materialize_into(&mut reader, &mut slot).unwrap();
    assert_eq!(slot, Some(Shape { id: 4, built_by: "populated" }));
}

#[test]
fn test_replace_ignores_existing_instance() {
    let spool = Spool::default().object_creation_handling(ObjectCreationHandling::Replace);
    let mut reader = JsonReader::new(r#"{"id":4}"#, spool.config()).unwrap();
    let mut slot = Some(ReaderOrDefault {
        id: 0,
        built_by: "caller",
    });
    spool.materialize_into(&mut reader, &mut slot).unwrap();
    assert_eq!(slot, Some(ReaderOrDefault { id: 4, built_by: "reader" }));
}

#[test]
fn test_no_constructor() {
    let spool = Spool::default();
    let err = materialize::<Unconstructible>(&spool, "{}").unwrap_err();
    assert!(err.to_string().starts_with("Unable to find a constructor"));
}

#[test]
fn test_null_yields_none() {
    let spool = Spool::default();
    assert!(materialize::<Legacy>(&spool, "null").unwrap().is_none());
    let mut reader = JsonReader::new("null", spool.config()).unwrap();
    let mut slot = Some(ReaderOrDefault::default());
    spool.materialize_into(&mut reader, &mut slot).unwrap();
    assert!(slot.is_none());
}

#[test]
fn test_registration_is_cached_per_spool() {
    let spool = Spool::default();
    assert!(spool.type_registry().is_empty());
    let _: ReaderOrDefault = materialize(&spool, r#"{"id":1}"#).unwrap().unwrap();
    let _: ReaderOrDefault = materialize(&spool, r#"{"id":2}"#).unwrap().unwrap();
    assert_eq!(spool.type_registry().len(), 1);
}

#[derive(SpoolObject, Debug, Default, PartialEq)]
struct Envelope {
    inner: Legacy,
    trailer: String,
}

impl spool::Serializer for Legacy {
    fn spool_write(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<(), Error> {
        self.write_to(writer, spool).map(|_| ())
    }

    fn spool_read(reader: &mut dyn TokenReader, spool: &Spool) -> Result<Self, Error> {
        spool
            .materialize::<Legacy>(reader)?
            .ok_or_else(|| reader.unexpected("StartObject"))
    }
}

#[test]
fn test_nested_legacy_leaves_reader_after_value() {
    let spool = Spool::default();
    let envelope: Envelope = spool
        .from_str(r#"{"inner":{"a":1,"b":"x","c":{"deep":[1,2]}},"trailer":"end"}"#)
        .unwrap();
    assert_eq!(envelope.inner.built_by, "legacy@nested");
    assert_eq!(envelope.trailer, "end");
}
