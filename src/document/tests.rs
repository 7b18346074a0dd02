use super::*;
use serde_json::json;

fn record(value: Value) -> Candidate {
    match value {
        Value::Object(map) => Candidate::Record(map),
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn test_structured_doc_passes_through() {
    let doc = RetrievedDoc::new("d1", "Paris is the capital of France", 0.9);
    let normalized = Candidate::from(doc.clone()).normalize(0);
    assert_eq!(normalized, Some(doc));
}

#[test]
fn test_record_with_all_fields() {
    let candidate = record(json!({"id": "doc1", "text": "Document 1", "score": 0.4}));
    let doc = candidate.normalize(3).expect("record has text");
    assert_eq!(doc.id, "doc1");
    assert_eq!(doc.text, "Document 1");
    assert!((doc.score - 0.4).abs() < 1e-6);
}

#[test]
fn test_record_missing_score_defaults_to_one() {
    let candidate = record(json!({"id": "doc1", "text": "Document 1"}));
    let doc = candidate.normalize(0).unwrap();
    assert_eq!(doc.score, 1.0);
}

#[test]
fn test_record_non_numeric_score_defaults_to_one() {
    let candidate = record(json!({"id": "doc1", "text": "Document 1", "score": "high"}));
    assert_eq!(candidate.normalize(0).unwrap().score, 1.0);
}

#[test]
fn test_record_numeric_id_is_stringified() {
    let candidate = record(json!({"id": 42, "text": "answer"}));
    assert_eq!(candidate.normalize(0).unwrap().id, "42");
}

#[test]
fn test_record_missing_id_uses_position() {
    let candidate = record(json!({"text": "answer", "score": 0.2}));
    assert_eq!(candidate.normalize(7).unwrap().id, "7");
}

#[test]
fn test_record_content_fallback() {
    let candidate = record(json!({"id": "c", "content": "from content"}));
    assert_eq!(candidate.normalize(0).unwrap().text, "from content");
}

#[test]
fn test_record_without_text_is_dropped() {
    let candidate = record(json!({"id": "empty", "score": 0.9}));
    assert!(candidate.normalize(0).is_none());
}

#[test]
fn test_untagged_deserialization_picks_shape() {
    let full: Candidate =
        serde_json::from_value(json!({"id": "a", "text": "t", "score": 0.5})).unwrap();
    assert!(matches!(full, Candidate::Doc(_)));

    let loose: Candidate = serde_json::from_value(json!({"id": "a", "text": "t"})).unwrap();
    assert!(matches!(loose, Candidate::Record(_)));
}

#[test]
fn test_normalize_candidates_keeps_order_and_skips_invalid() {
    let batch = vec![
        Candidate::from(RetrievedDoc::new("a", "first", 0.1)),
        record(json!({"id": "broken"})),
        record(json!({"id": "c", "text": "third"})),
    ];

    let docs = normalize_candidates(batch);
    let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn test_sort_by_score_desc_is_stable() {
    let mut docs = vec![
        RetrievedDoc::new("a", "", 0.0),
        RetrievedDoc::new("b", "", 0.5),
        RetrievedDoc::new("c", "", 0.0),
        RetrievedDoc::new("d", "", 0.5),
    ];

    sort_by_score_desc(&mut docs);

    let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "d", "a", "c"]);
}

#[test]
fn test_sort_by_score_desc_treats_signed_zeros_as_equal() {
    let mut docs = vec![
        RetrievedDoc::new("neg", "", -0.0),
        RetrievedDoc::new("pos", "", 0.0),
        RetrievedDoc::new("top", "", 0.1),
    ];

    sort_by_score_desc(&mut docs);

    let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["top", "neg", "pos"]);
}
