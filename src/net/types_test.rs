use super::*;

#[test]
fn with_bearer_attaches_token() {
    let request = ApiRequest::get("/api/rooms").with_bearer(Some("A1"));
    assert_eq!(request.bearer_token(), Some("A1"));
    assert_eq!(request.headers, vec![("Authorization".to_owned(), "Bearer A1".to_owned())]);
}

#[test]
fn with_bearer_none_strips_existing_authorization() {
    let request = ApiRequest::get("/api/rooms")
        .header("authorization", "Bearer stale")
        .header("X-Trace", "t1")
        .with_bearer(None);
    assert_eq!(request.bearer_token(), None);
    assert_eq!(request.headers, vec![("X-Trace".to_owned(), "t1".to_owned())]);
}

#[test]
fn with_bearer_leaves_original_untouched() {
    let original = ApiRequest::post("/api/tasks").json(serde_json::json!({ "title": "Turn down 204" }));
    let authorized = original.with_bearer(Some("A1"));
    assert!(original.headers.is_empty());
    assert_eq!(authorized.body, original.body);
}

#[test]
fn response_into_result_splits_on_status() {
    assert!(ApiResponse::new(204, "").into_result().is_ok());
    let err = ApiResponse::new(404, "missing").into_result().unwrap_err();
    assert_eq!(err, ApiError::Status { status: 404, body: "missing".to_owned() });
}

#[test]
fn response_json_decode_error_is_typed() {
    let err = ApiResponse::new(200, "not json").json::<User>().unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn login_response_parses_camel_case_with_optional_user() {
    let body = r#"{"accessToken":"A1","refreshToken":"R1"}"#;
    let parsed: LoginResponse = serde_json::from_str(body).unwrap();
    assert!(parsed.user.is_none());
    assert_eq!(parsed.credentials(), CredentialPair::new("A1", "R1"));
}

#[test]
fn renewal_response_refresh_token_is_optional() {
    let parsed: RenewalResponse = serde_json::from_str(r#"{"accessToken":"A2"}"#).unwrap();
    assert_eq!(parsed.access_token, "A2");
    assert!(parsed.refresh_token.is_none());
}
