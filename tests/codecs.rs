use autoserde::{json, Codec, CodecOptions, CodecRegistry, Map, Value};
use proptest::prelude::*;

fn value() -> impl Strategy<Value = Value> {
    keyed_value(".*")
}

// bson keys are nul-terminated.
fn keyed_value(keys: &'static str) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::Float),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 8, move |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec((keys, inner), 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map>())),
        ]
    })
}

fn object() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-z@_]{1,8}", keyed_value("[a-z@_]{1,8}")), 0..8)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map>()))
}

fn round_trip(codec: &dyn Codec, value: &Value, options: &CodecOptions) -> Value {
    let mut bytes = Vec::new();
    codec.dump(value, &mut bytes, options).unwrap();
    codec.load(&mut &bytes[..], options).unwrap()
}

proptest! {
    #[test]
    fn json_is_a_bijection(v in value()) {
        let compact = json::to_vec(&v, &CodecOptions::new()).unwrap();
        let decoded = json::from_slice(&compact).unwrap();
        prop_assert_eq!(&decoded, &v);
        prop_assert_eq!(json::to_vec(&decoded, &CodecOptions::new()).unwrap(), compact);

        let indented = json::to_vec(&v, &CodecOptions::new().indent(2)).unwrap();
        prop_assert_eq!(json::from_slice(&indented).unwrap(), v);
    }

    #[test]
    fn binary_codecs_round_trip(v in value()) {
        let codecs = CodecRegistry::new();
        for format in &["msgpack", "cbor"] {
            let codec = codecs.resolve(format).unwrap();
            prop_assert_eq!(round_trip(&*codec, &v, &CodecOptions::new()), v.clone());
        }
    }

    #[test]
    fn bson_round_trips_documents(v in object()) {
        let codec = CodecRegistry::new().resolve("bson").unwrap();
        prop_assert_eq!(round_trip(&*codec, &v, &CodecOptions::new()), v);
    }
}

#[test]
fn json_rejects_what_the_mapping_form_cannot_hold() {
    assert!(json::from_slice(br#"{"a": 1, "a": 2}"#).is_err());
    assert!(json::from_slice(b"18446744073709551615").is_err());
    assert!(json::from_slice(b"NaN").is_err());
    assert!(json::from_slice(b"").is_err());
}

#[test]
fn every_builtin_codec_keeps_key_order() {
    let mut m = Map::new();
    for key in &["zulu", "alpha", "@", "mike"] {
        m.insert(key.to_string(), Value::from(*key));
    }
    let value = Value::Object(m);

    let codecs = CodecRegistry::new();
    for (name, extensions) in codecs.formats() {
        let codec = codecs.resolve(&extensions[0]).unwrap();
        let back = round_trip(&*codec, &value, &CodecOptions::new());
        let keys: Vec<&str> = back.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zulu", "alpha", "@", "mike"], "{}", name);
    }
}
