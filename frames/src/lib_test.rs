use super::*;

#[test]
fn encode_query_produces_single_field_object() {
    let text = encode_query("What is the dosage of paracetamol?");
    let value: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value, serde_json::json!({"query": "What is the dosage of paracetamol?"}));
}

#[test]
fn encode_query_escapes_quotes_and_unicode() {
    let text = encode_query("say \"hi\" – ibuprofène");
    let frame: QueryFrame = serde_json::from_str(&text).expect("query frame");
    assert_eq!(frame.query, "say \"hi\" – ibuprofène");
}

#[test]
fn decode_final_with_sources() {
    let event = decode_event(
        r#"{"type":"final","answer":"500mg every 6 hours","sources":["https://druginfo.example/paracetamol"]}"#,
    )
    .expect("event");
    assert_eq!(
        event,
        ServerEvent::Final(FinalAnswer::new(
            "500mg every 6 hours",
            vec!["https://druginfo.example/paracetamol".to_owned()],
        ))
    );
}

#[test]
fn decode_final_tolerates_null_answer_and_missing_sources() {
    let event = decode_event(r#"{"type":"final","answer":null}"#).expect("event");
    assert_eq!(event, ServerEvent::Final(FinalAnswer::default()));

    let event = decode_event(r#"{"type":"final","answer":"ok","sources":null}"#).expect("event");
    assert_eq!(event, ServerEvent::Final(FinalAnswer::new("ok", Vec::new())));
}

#[test]
fn decode_stream_frames() {
    assert_eq!(
        decode_event(r#"{"type":"stream","chunk":"50"}"#).expect("event"),
        ServerEvent::Stream { chunk: "50".to_owned() }
    );
    assert_eq!(
        decode_event(r#"{"type":"stream_end","final":"500mg"}"#).expect("event"),
        ServerEvent::StreamEnd { text: "500mg".to_owned() }
    );
}

#[test]
fn decode_error_frame() {
    let event = decode_event(r#"{"type":"error","message":"Empty query"}"#).expect("event");
    assert_eq!(event, ServerEvent::Error { message: "Empty query".to_owned() });
    assert_eq!(event.tag(), "error");
}

#[test]
fn decode_unknown_type_is_other() {
    let event = decode_event(r#"{"type":"progress","step":"retrieve"}"#).expect("event");
    assert_eq!(event, ServerEvent::Other("progress".to_owned()));
    assert_eq!(event.tag(), "progress");
}

#[test]
fn decode_rejects_malformed_frames() {
    assert!(matches!(decode_event("not json"), Err(CodecError::Json(_))));
    assert!(matches!(decode_event("[1,2]"), Err(CodecError::NotAnObject)));
    assert!(matches!(decode_event(r#"{"answer":"x"}"#), Err(CodecError::MissingType)));
    assert!(matches!(
        decode_event(r#"{"type":"final","answer":"x","sources":[1]}"#),
        Err(CodecError::Json(_))
    ));
}
