use super::*;

#[test]
fn ask_request_deserializes() {
    let request: AskRequest =
        serde_json::from_str(r#"{"question":"what is rust?"}"#).expect("should deserialize");
    assert_eq!(request.question, "what is rust?");
}

#[test]
fn error_response_serializes_with_error_field() {
    let body = serde_json::to_value(ErrorResponse {
        error: "boom".to_string(),
    })
    .expect("should serialize");
    assert_eq!(body["error"], "boom");
}

#[test]
fn embedded_ui_has_question_and_upload_controls() {
    assert!(INDEX_HTML.contains("id=\"question\""));
    assert!(INDEX_HTML.contains("id=\"files\""));
    assert!(INDEX_HTML.contains("/api/ask"));
    assert!(INDEX_HTML.contains("/api/upload"));
}
