//! Owned documents dumped to bytes and loaded back.

use bflat::{Decoder, Document, Type, Value};

fn reload(doc: &Document) -> Document {
    let bytes = doc.to_bytes().unwrap();
    assert_eq!(bytes.len(), doc.encoded_len().unwrap());
    Document::from_bytes(&bytes).unwrap()
}

fn types_of(doc: &Document) -> Vec<(String, Type, bool, usize)> {
    let bytes = doc.to_bytes().unwrap();
    let mut decoder = Decoder::new();
    decoder.parse(&bytes);
    decoder
        .map(|v| {
            let v = v.unwrap();
            (v.tag().unwrap().to_owned(), v.value_type(), v.is_array(), v.count())
        })
        .collect()
}

#[test]
fn integers() {
    let doc: Document = vec![
        ("zero", 0i64),
        ("byte", -128),
        ("short", 300),
        ("int", -70_000),
        ("long", 1 << 40),
        ("min", i64::MIN),
    ]
    .into_iter()
    .collect();
    assert_eq!(reload(&doc), doc);
    let types: Vec<Type> = types_of(&doc).into_iter().map(|t| t.1).collect();
    assert_eq!(
        types,
        [Type::Int8, Type::Int8, Type::Int16, Type::Int32, Type::Int64, Type::Int64]
    );
}

#[test]
fn doubles_and_strings() {
    let mut doc = Document::new();
    doc.insert("ratio", 0.625);
    doc.insert("neg", -0.5);
    doc.insert("name", "bflat");
    doc.insert("empty", "");
    doc.insert("blob", &b"\x00\x01\x02"[..]);
    doc.insert("nothing", ());
    assert_eq!(reload(&doc), doc);
    assert_eq!(doc.get("name").and_then(Value::as_str), Some("bflat"));
    assert_eq!(doc.get("blob").and_then(Value::as_slice), Some(&[0u8, 1, 2][..]));
    assert!(doc.get("nothing").unwrap().is_null());
}

#[test]
fn bools_become_integers() {
    let mut doc = Document::new();
    doc.insert("yes", true);
    doc.insert("no", false);
    let loaded = reload(&doc);
    assert_eq!(loaded.get("yes"), Some(&Value::Int(1)));
    assert_eq!(loaded.get("no"), Some(&Value::Int(0)));
}

#[test]
fn arrays() {
    let mut doc = Document::new();
    doc.insert("ints", vec![Value::from(1), Value::from(2), Value::from(3)]);
    doc.insert("wide", vec![Value::from(1), Value::from(100_000)]);
    doc.insert("words", vec![Value::from("a"), Value::from("bc")]);
    doc.insert("reals", vec![Value::from(1.5), Value::from(-2.25)]);
    assert_eq!(reload(&doc), doc);
    assert_eq!(
        types_of(&doc),
        [
            ("ints".to_owned(), Type::Int8, true, 3),
            ("wide".to_owned(), Type::Int32, true, 2),
            ("words".to_owned(), Type::String, true, 2),
            ("reals".to_owned(), Type::Double, true, 2),
        ]
    );
}

#[test]
fn mixed_array_splits_into_runs() {
    let mut doc = Document::new();
    let items = vec![
        Value::from(1),
        Value::from(2),
        Value::from("x"),
        Value::from(40_000),
        Value::Null,
    ];
    doc.insert("mixed", items.clone());
    assert_eq!(
        types_of(&doc),
        [
            ("mixed".to_owned(), Type::Int8, true, 2),
            ("mixed".to_owned(), Type::String, true, 1),
            ("mixed".to_owned(), Type::Int32, true, 1),
            ("mixed".to_owned(), Type::Null, true, 1),
        ]
    );
    assert_eq!(reload(&doc).get("mixed"), Some(&Value::Array(items)));
}

#[test]
fn big_strings() {
    let mut doc = Document::new();
    for shift in 0..=15 {
        let text = "t".repeat(1 << shift);
        doc.push(text.clone(), text);
    }
    let loaded = reload(&doc);
    assert_eq!(loaded, doc);
    assert_eq!(loaded.len(), 16);
    let longest = "t".repeat(1 << 15);
    assert_eq!(loaded.get(&longest).and_then(Value::as_str), Some(longest.as_str()));
}

#[test]
fn unicode_tags_and_values() {
    let mut doc = Document::new();
    doc.insert("größe", "€5");
    doc.insert("ᄑᄑᄑᄑᄑᄑᄑᄑ", "睷".repeat(100));
    doc.insert("clef 𝄞", vec![Value::from("𝄞"), Value::from("")]);
    assert_eq!(reload(&doc), doc);
}

#[test]
fn serde_json_bridge() {
    let json = r#"{"id":42,"name":"probe","ratio":0.25,"tags":["a","b"],"gone":null}"#;
    let doc: Document = serde_json::from_str(json).unwrap();
    assert_eq!(doc.len(), 5);
    assert_eq!(doc.get("id"), Some(&Value::Int(42)));
    let loaded = reload(&doc);
    assert_eq!(loaded, doc);
    let back: serde_json::Value = serde_json::to_value(&loaded).unwrap();
    let expected: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(back, expected);
}
