//! End-to-end model behavior against the in-memory store.

use chrono::{Datelike, Utc};
use serde_json::json;
use simplendb::{
    ndb_enum, Client, EnumValue, Error, FetchOptions, FieldValue, GeoPt, Key, Model, ModelClass,
    NdbEnum, Operator, Options, PropertyType, QueryArgs, Schema, TypeError, Value, ValueType,
};

ndb_enum! {
    pub enum Types {
        Cast = 0,
        Wrought = 1,
        Bronze = 2,
        NotKnown = 3,
    }
}

ndb_enum! {
    pub enum Quality {
        Gold = 2,
        Silver = 1,
        Bronze = 0,
    }
}

fn gun_schema(schema: &mut Schema) {
    schema
        .property("gunid", PropertyType::Integer, Options::new())
        .property("location", PropertyType::GeoPt, Options::new())
        .property("type", PropertyType::Enum, Options::new().enum_of::<Types>())
        .property(
            "quality",
            PropertyType::Enum,
            Options::new()
                .enum_of::<Quality>()
                .default(EnumValue::of(Quality::Bronze)),
        )
        .property("description", PropertyType::String, Options::new())
        .property("name", PropertyType::String, Options::new())
        .property("date", PropertyType::DateTime, Options::new().auto_now())
        .property("site", PropertyType::String, Options::new())
        .property("collection", PropertyType::Boolean, Options::new())
        .property("images", PropertyType::Text, Options::new().repeated())
        .property("markings", PropertyType::Boolean, Options::new())
        .property("country", PropertyType::String, Options::new().default("none"))
        .property("weight", PropertyType::Float, Options::new())
        .property("geocode", PropertyType::Json, Options::new())
        .property(
            "neighbour",
            PropertyType::Key,
            Options::new().repeated().kind(GUN),
        );
}

const GUN: ModelClass = ModelClass::new("Gun", gun_schema);

fn site_schema(schema: &mut Schema) {
    schema.property("name", PropertyType::String, Options::new());
}

const SITE: ModelClass = ModelClass::new("Site", site_schema);

#[test]
fn new_model_has_defaults_and_partial_key() {
    let client = Client::in_memory("test-project");
    let gun = Model::new(&client, GUN).unwrap();

    assert_eq!(gun.get_enum::<Quality>("quality"), Some(Quality::Bronze));
    assert_eq!(gun.get_list("images"), Some(vec![]));
    assert_eq!(gun.get_string("country").as_deref(), Some("none"));
    assert_eq!(gun.kind(), "Gun");
    assert_eq!(gun.class(), GUN);

    let key = gun.get_key().unwrap();
    assert_eq!(key.kind(), "Gun");
    assert_eq!(key.project(), "test-project");
    assert!(key.id().is_none());

    let date = gun.get_datetime("date").unwrap();
    assert_eq!(date.year(), Utc::now().year());
}

#[test]
fn put_then_get_by_id() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();
    gun.set("location", GeoPt::coerce(52, 1).unwrap()).unwrap();
    gun.set("geocode", json!({"test": "name", "test2": "name2"}))
        .unwrap();

    let key = gun.put(&client).unwrap();
    let id = key.id().unwrap();
    assert_eq!(gun.get_key().and_then(|k| k.id()), Some(id));

    let fetched = GUN.get_by_id(&client, id).unwrap().unwrap();
    assert_eq!(fetched.get_enum::<Quality>("quality"), Some(Quality::Bronze));
    assert_eq!(fetched.get_list("images"), Some(vec![]));
    assert_eq!(fetched.get_key().unwrap().kind(), "Gun");
    assert_eq!(
        fetched.get_datetime("date").map(|d| d.year()),
        Some(Utc::now().year())
    );
    assert_eq!(fetched.get_geo("location"), Some(GeoPt::new(52.0, 1.0)));

    let geocode = fetched.get_json("geocode").unwrap();
    assert_eq!(geocode, json!({"test": "name", "test2": "name2"}));
    assert_eq!(geocode.attr("test"), Some(&json!("name")));

    fetched.delete(&client).unwrap();
    assert!(GUN.get_by_id(&client, id).unwrap().is_none());
    // The in-memory model is still usable.
    assert_eq!(fetched.get_geo("location"), Some(GeoPt::new(52.0, 1.0)));
}

#[test]
fn construction_values_apply_after_defaults() {
    let client = Client::in_memory("test-project");
    let gun = Model::with_values(
        &client,
        GUN,
        None,
        vec![
            ("country", FieldValue::from("Scotland")),
            ("images", FieldValue::from("front.jpg")),
        ],
    )
    .unwrap();
    assert_eq!(gun.get_string("country").as_deref(), Some("Scotland"));
    assert_eq!(gun.get_list("images"), Some(vec![FieldValue::from("front.jpg")]));
    assert_eq!(gun.get_enum::<Quality>("quality"), Some(Quality::Bronze));

    let err = Model::with_values(
        &client,
        GUN,
        None,
        vec![("gunid", FieldValue::from("twelve"))],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Type(TypeError::Mismatch { ref property, .. }) if property == "gunid"
    ));
}

#[test]
fn populate_sets_each_value() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();
    gun.populate(vec![
        ("name", FieldValue::from("Culverin")),
        ("markings", FieldValue::from(true)),
    ])
    .unwrap();
    assert_eq!(gun.get_string("name").as_deref(), Some("Culverin"));
    assert_eq!(gun.get_bool("markings"), Some(true));

    let err = gun
        .populate(vec![("markings", FieldValue::from("yes"))])
        .unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(gun.get_bool("markings"), Some(true));
}

#[test]
fn non_repeated_type_checks() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();

    let err = gun.set("gunid", "string").unwrap_err();
    assert_eq!(
        err.as_type_error(),
        Some(&TypeError::Mismatch {
            property: "gunid".to_string(),
            expected: ValueType::Integer,
            received: "string".to_string(),
        })
    );
    assert!(gun.set("gunid", true).is_err());
    assert!(gun.set("weight", 3).is_err());
    assert!(gun.set("name", 3.5).is_err());
    assert!(gun.set("collection", 1).is_err());
    assert!(gun.set("location", "52,1").is_err());
    assert!(gun.set("date", "today").is_err());

    gun.set("gunid", 42).unwrap();
    gun.set("weight", 1.5).unwrap();
    gun.set("name", "Saker").unwrap();
    gun.set("collection", false).unwrap();
    assert_eq!(gun.get_integer("gunid"), Some(42));
    assert_eq!(gun.get_float("weight"), Some(1.5));
    assert_eq!(gun.get_string("name").as_deref(), Some("Saker"));
    assert_eq!(gun.get_bool("collection"), Some(false));
}

#[test]
fn repeated_append_replace_reject() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();

    gun.set("images", "a.jpg").unwrap();
    gun.set("images", "b.jpg").unwrap();
    assert_eq!(
        gun.get_list("images"),
        Some(vec![FieldValue::from("a.jpg"), FieldValue::from("b.jpg")])
    );

    gun.set("images", vec!["c.jpg", "d.jpg"]).unwrap();
    assert_eq!(gun.raw("images"), Some(&Value::from(vec!["c.jpg", "d.jpg"])));

    let mixed = FieldValue::List(vec![FieldValue::from("e.jpg"), FieldValue::from(5)]);
    assert!(gun.set("images", mixed).unwrap_err().is_type_error());
    assert!(gun.set("images", 5).unwrap_err().is_type_error());
    assert_eq!(gun.raw("images"), Some(&Value::from(vec!["c.jpg", "d.jpg"])));
}

#[test]
fn enum_rejects_other_enums() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();

    let err = gun.set_enum("type", Quality::Gold).unwrap_err();
    assert_eq!(
        err.as_type_error(),
        Some(&TypeError::EnumMismatch {
            property: "type".to_string(),
            expected: "Types",
            received: "Quality",
        })
    );
    assert!(gun.set("type", 1).is_err());

    gun.set_enum("type", Types::Wrought).unwrap();
    assert_eq!(gun.raw("type"), Some(&Value::Integer(1)));
    assert_eq!(gun.get_enum::<Types>("type"), Some(Types::Wrought));
    assert_eq!(gun.get_enum::<Quality>("type"), None);
    assert_eq!(Types::Wrought.value(), 1);
}

#[test]
fn key_property_checks_kind() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();
    let other = Model::new(&client, GUN).unwrap().put(&client).unwrap();
    let site = SITE.key(&client, "fort").unwrap();

    let err = gun.set("neighbour", site).unwrap_err();
    assert!(matches!(
        err.as_type_error(),
        Some(TypeError::KindMismatch { expected, received, .. })
            if expected == "Gun" && received == "Site"
    ));
    assert!(gun.set("neighbour", "Gun:1").is_err());

    gun.set("neighbour", other.clone()).unwrap();
    let neighbours = gun.get_list("neighbour").unwrap();
    let neighbour = neighbours[0].as_key().unwrap();
    assert_eq!(neighbour, &other);
    assert_eq!(neighbour.class(), Some(GUN));

    let fetched = neighbour.get(&client).unwrap().unwrap();
    assert_eq!(fetched.get_key(), Some(other));
}

#[test]
fn geopt_coercion() {
    assert_eq!(GeoPt::coerce("", "").unwrap(), GeoPt::new(0.0, 0.0));
    assert_eq!(GeoPt::coerce("52.5", 1).unwrap(), GeoPt::new(52.5, 1.0));
    assert!(matches!(
        GeoPt::coerce("abc", 1),
        Err(TypeError::Coordinate { .. })
    ));
}

#[test]
fn queries_filter_order_and_scope() {
    let client = Client::in_memory("test-project");
    let site = SITE.key(&client, "fort").unwrap();

    for (gunid, name) in [(3, "Saker"), (1, "Minion"), (2, "Falcon")] {
        let mut gun = Model::with_parent(&client, GUN, &site).unwrap();
        gun.set("gunid", gunid).unwrap();
        gun.set("name", name).unwrap();
        gun.put(&client).unwrap();
    }
    let mut stray = Model::new(&client, GUN).unwrap();
    stray.set("gunid", 9).unwrap();
    stray.put(&client).unwrap();

    let ordered = GUN
        .query(&client)
        .unwrap()
        .order("gunid")
        .fetch(FetchOptions::default())
        .unwrap();
    let ids: Vec<_> = ordered.iter().filter_map(|g| g.get_integer("gunid")).collect();
    assert_eq!(ids, vec![1, 2, 3, 9]);

    let at_site = GUN
        .query_with(
            &client,
            QueryArgs::new()
                .ancestor(site.clone())
                .filter("gunid", Operator::GreaterThan, 1)
                .order("-gunid"),
        )
        .unwrap()
        .fetch(FetchOptions::default())
        .unwrap();
    let names: Vec<_> = at_site.iter().filter_map(|g| g.get_string("name")).collect();
    assert_eq!(names, vec!["Saker".to_string(), "Falcon".to_string()]);

    let first = GUN
        .query(&client)
        .unwrap()
        .filter("name", "=", "Minion")
        .unwrap()
        .get(FetchOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(first.get_integer("gunid"), Some(1));
    assert_eq!(first.get_key().and_then(|k| k.parent()), Some(site));
}

#[test]
fn unindexed_properties_do_not_match_filters() {
    let client = Client::in_memory("test-project");
    let mut gun = Model::new(&client, GUN).unwrap();
    gun.set("weight", 2.5).unwrap();
    gun.put(&client).unwrap();

    let found = GUN
        .query(&client)
        .unwrap()
        .filter("weight", "=", 2.5)
        .unwrap()
        .fetch(FetchOptions::default())
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn raw_query_has_no_class() {
    let client = Client::in_memory("test-project");
    Model::new(&client, GUN).unwrap().put(&client).unwrap();

    let query = client.query(QueryArgs::new().kind("Gun")).unwrap();
    assert_eq!(query.fetch_entities(FetchOptions::default()).unwrap().len(), 1);
    assert!(matches!(
        query.fetch(FetchOptions::default()),
        Err(Error::Type(TypeError::UnboundQuery))
    ));

    let bound = query.bind(GUN).fetch(FetchOptions::default()).unwrap();
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].class(), GUN);
}

#[test]
fn key_from_parts_is_bound() {
    let client = Client::in_memory("test-project");
    let key = Key::new(&client, GUN, Some(7.into()), None).unwrap();
    assert_eq!(key.class(), Some(GUN));
    assert_eq!(key.id(), Some(7));
    assert!(key.get(&client).unwrap().is_none());
}
