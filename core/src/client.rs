//! Stateless HTTP request builder and response parser for the kudos API.
//!
//! # Design
//! `KudosClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the actual HTTP round-trip, keeping the core deterministic
//! and free of I/O dependencies.
//!
//! Every mutating request routes its body through [`build_body`] in auto
//! mode: payloads carrying a binary attachment go out as multipart, the rest
//! as JSON. The client never picks a wire format itself.

use uuid::Uuid;

use crate::body::{build_body, BodyData, EncodingMode};
use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
use crate::payload::Payload;
use crate::types::{
    CreateFavor, Favor, Handshake, Message, Profile, ProposeHandshake, SendMessage, UpdateFavor,
    UpdateProfile,
};

/// Synchronous, stateless client for the kudos API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct KudosClient {
    base_url: String,
}

impl KudosClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode `payload` and attach the resulting body and headers.
    fn request_with_body(
        &self,
        method: HttpMethod,
        path: String,
        payload: Payload,
        mode: EncodingMode,
    ) -> Result<HttpRequest, ApiError> {
        let encoded = build_body(payload, mode)?;
        let body = match encoded.data {
            BodyData::Json(payload) => {
                let json = serde_json::to_string(&payload.to_json_value()?)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                HttpBody::Json(json)
            }
            BodyData::Form(fields) => HttpBody::Multipart(fields),
        };
        Ok(HttpRequest {
            method,
            path,
            headers: encoded.headers,
            body: Some(body),
        })
    }

    // --- favors ---

    pub fn build_list_favors(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/favors", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_favor(&self, id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/favors/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_favor(&self, input: CreateFavor) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Post,
            format!("{}/favors", self.base_url),
            input.into_payload(),
            EncodingMode::Auto,
        )
    }

    pub fn build_update_favor(&self, id: Uuid, input: &UpdateFavor) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Put,
            format!("{}/favors/{id}", self.base_url),
            input.to_payload(),
            EncodingMode::Auto,
        )
    }

    pub fn build_delete_favor(&self, id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/favors/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_favors(&self, response: HttpResponse) -> Result<Vec<Favor>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_get_favor(&self, response: HttpResponse) -> Result<Favor, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_create_favor(&self, response: HttpResponse) -> Result<Favor, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_update_favor(&self, response: HttpResponse) -> Result<Favor, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_delete_favor(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }

    // --- handshakes ---

    pub fn build_propose_handshake(
        &self,
        favor_id: Uuid,
        input: &ProposeHandshake,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Post,
            format!("{}/favors/{favor_id}/handshakes", self.base_url),
            input.to_payload(),
            EncodingMode::Auto,
        )
    }

    pub fn build_accept_handshake(&self, id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/handshakes/{id}/accept", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_propose_handshake(&self, response: HttpResponse) -> Result<Handshake, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_accept_handshake(&self, response: HttpResponse) -> Result<Handshake, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    // --- messages ---

    pub fn build_send_message(
        &self,
        handshake_id: Uuid,
        input: SendMessage,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Post,
            format!("{}/handshakes/{handshake_id}/messages", self.base_url),
            input.into_payload(),
            EncodingMode::Auto,
        )
    }

    pub fn parse_send_message(&self, response: HttpResponse) -> Result<Message, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    // --- profiles ---

    pub fn build_get_profile(&self, user_id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/profiles/{user_id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfile,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Put,
            format!("{}/profiles/{user_id}", self.base_url),
            input.into_payload(),
            EncodingMode::Auto,
        )
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Attachment, FormValue};
    use crate::types::FavorKind;

    fn client() -> KudosClient {
        KudosClient::new("http://localhost:3000")
    }

    fn plain_favor() -> CreateFavor {
        CreateFavor {
            title: "Help needed".to_string(),
            kind: FavorKind::Request,
            description: "Move a couch".to_string(),
            tags: vec!["urgent".to_string(), "local".to_string()],
            location: None,
            cover: None,
        }
    }

    #[test]
    fn build_list_favors_produces_correct_request() {
        let req = client().build_list_favors();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/favors");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_favor_produces_correct_request() {
        let req = client().build_get_favor(Uuid::nil());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.path,
            "http://localhost:3000/favors/00000000-0000-0000-0000-000000000000"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn create_favor_without_cover_goes_out_as_json() {
        let req = client().build_create_favor(plain_favor()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/favors");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let Some(HttpBody::Json(json)) = req.body else {
            panic!("expected JSON body");
        };
        let body: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(body["title"], "Help needed");
        assert_eq!(body["kind"], "request");
        assert_eq!(body["tags"], serde_json::json!(["urgent", "local"]));
        assert!(body["location"].is_null());
    }

    #[test]
    fn create_favor_with_cover_goes_out_as_multipart() {
        let mut input = plain_favor();
        input.cover = Some(Attachment::new("couch.jpg", vec![0xff, 0xd8]));
        let req = client().build_create_favor(input).unwrap();
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "multipart/form-data".to_string())]
        );
        let Some(HttpBody::Multipart(fields)) = req.body else {
            panic!("expected multipart body");
        };
        // location was null, so it must not appear as a field.
        assert!(fields.iter().all(|f| f.name != "location"));
        let tags = fields.iter().find(|f| f.name == "tags").unwrap();
        assert_eq!(tags.value, FormValue::Text(r#"["urgent","local"]"#.to_string()));
        let cover = fields.iter().find(|f| f.name == "cover").unwrap();
        match &cover.value {
            FormValue::Binary(a) => {
                assert_eq!(a.file_name.as_deref(), Some("couch.jpg"));
                assert_eq!(a.bytes, vec![0xff, 0xd8]);
            }
            other => panic!("expected binary cover, got {other:?}"),
        }
    }

    #[test]
    fn update_favor_sends_only_present_fields() {
        let input = UpdateFavor {
            title: Some("Updated".to_string()),
            ..Default::default()
        };
        let req = client().build_update_favor(Uuid::nil(), &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        let Some(HttpBody::Json(json)) = req.body else {
            panic!("expected JSON body");
        };
        let body: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(body["title"], "Updated");
        assert!(body.get("description").is_none());
    }

    #[test]
    fn build_delete_favor_produces_correct_request() {
        let req = client().build_delete_favor(Uuid::nil());
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn send_message_with_attachments_expands_indexed_fields() {
        let input = SendMessage {
            body: "Here are the photos".to_string(),
            attachments: vec![
                Attachment::new("a.jpg", vec![1]),
                Attachment::new("b.jpg", vec![2]),
            ],
        };
        let req = client().build_send_message(Uuid::nil(), input).unwrap();
        let Some(HttpBody::Multipart(fields)) = req.body else {
            panic!("expected multipart body");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["body", "attachments[0]", "attachments[1]"]);
    }

    #[test]
    fn send_message_without_attachments_stays_json() {
        let input = SendMessage {
            body: "On my way".to_string(),
            attachments: vec![],
        };
        let req = client().build_send_message(Uuid::nil(), input).unwrap();
        assert!(matches!(req.body, Some(HttpBody::Json(_))));
    }

    #[test]
    fn update_profile_with_avatar_goes_out_as_multipart() {
        let input = UpdateProfile {
            display_name: Some("Alice".to_string()),
            bio: None,
            avatar: Some(Attachment::new("me.png", vec![3])),
        };
        let req = client().build_update_profile(Uuid::nil(), input).unwrap();
        assert_eq!(
            req.path,
            "http://localhost:3000/profiles/00000000-0000-0000-0000-000000000000"
        );
        assert!(matches!(req.body, Some(HttpBody::Multipart(_))));
    }

    #[test]
    fn parse_list_favors_success() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"[{"id":"00000000-0000-0000-0000-000000000001","title":"Test","kind":"request","description":"d","tags":[],"location":null,"cover":null}]"#.to_string(),
        };
        let favors = client().parse_list_favors(response).unwrap();
        assert_eq!(favors.len(), 1);
        assert_eq!(favors[0].title, "Test");
    }

    #[test]
    fn parse_get_favor_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = client().parse_get_favor(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_favor_wrong_status() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
        };
        let err = client().parse_create_favor(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_propose_handshake_success() {
        let response = HttpResponse {
            status: 201,
            headers: Vec::new(),
            body: r#"{"id":"00000000-0000-0000-0000-000000000002","favor_id":"00000000-0000-0000-0000-000000000001","proposer_id":"00000000-0000-0000-0000-000000000003","message":"I can help","accepted":false}"#.to_string(),
        };
        let handshake = client().parse_propose_handshake(response).unwrap();
        assert_eq!(handshake.message, "I can help");
        assert!(!handshake.accepted);
    }

    #[test]
    fn parse_delete_favor_success() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(client().parse_delete_favor(response).is_ok());
    }

    #[test]
    fn parse_profile_bad_json() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = client().parse_get_profile(response).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = KudosClient::new("http://localhost:3000/");
        let req = client.build_list_favors();
        assert_eq!(req.path, "http://localhost:3000/favors");
    }
}
