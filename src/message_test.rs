use super::*;

// =============================================================
// Constructors and projections
// =============================================================

#[test]
fn constructors_set_kind() {
    assert_eq!(ChatMessage::user("q").kind(), MessageKind::User);
    assert_eq!(ChatMessage::bot("a").kind(), MessageKind::Bot);
    assert_eq!(ChatMessage::sources(vec![]).kind(), MessageKind::Sources);
    assert_eq!(ChatMessage::loading("Reasoning").kind(), MessageKind::Loading);
    assert!(ChatMessage::loading("Reasoning").is_loading());
    assert!(!ChatMessage::bot("a").is_loading());
}

#[test]
fn ids_are_unique() {
    let a = ChatMessage::user("same");
    let b = ChatMessage::user("same");
    assert_ne!(a.id, b.id);
    assert_eq!(a.body, b.body);
}

#[test]
fn text_is_none_for_sources() {
    assert_eq!(ChatMessage::bot("500mg").text(), Some("500mg"));
    assert_eq!(ChatMessage::sources(vec!["https://x.example".into()]).text(), None);
}

#[test]
fn bodies_with_same_text_but_different_kind_differ() {
    assert_ne!(MessageBody::User("x".into()), MessageBody::Bot("x".into()));
}

// =============================================================
// Serialization shape
// =============================================================

#[test]
fn serializes_with_type_and_content() {
    let msg = ChatMessage::sources(vec!["https://druginfo.example/paracetamol".into()]);
    let value = serde_json::to_value(&msg).expect("serialize");
    assert_eq!(value["type"], "sources");
    assert_eq!(value["content"][0], "https://druginfo.example/paracetamol");
    assert_eq!(value["id"], msg.id.to_string());
}
