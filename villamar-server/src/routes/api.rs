use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::mailer::ContactMessage;
use crate::SharedState;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub interest: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsletterPayload {
    pub email: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// `POST /api/contact` — validate, relay exactly one email, done. No retry,
/// no persistence.
pub async fn contact(
    State(state): State<SharedState>,
    Json(payload): Json<ContactPayload>,
) -> Response {
    let Some(name) = trimmed(&payload.name) else {
        return bad_request("name is required");
    };
    let Some(email) = trimmed(&payload.email) else {
        return bad_request("email is required");
    };
    if !email.contains('@') {
        return bad_request("a valid email address is required");
    }
    let Some(message) = trimmed(&payload.message) else {
        return bad_request("message is required");
    };

    let submission = ContactMessage {
        name,
        email,
        phone: trimmed(&payload.phone),
        interest: trimmed(&payload.interest),
        message,
    };
    match state.notifier.contact_inquiry(&submission).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "contact email dispatch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": GENERIC_FAILURE })),
            )
                .into_response()
        }
    }
}

/// `POST /api/newsletter`
pub async fn newsletter(
    State(state): State<SharedState>,
    Json(payload): Json<NewsletterPayload>,
) -> Response {
    let email = trimmed(&payload.email).filter(|email| email.contains('@'));
    let Some(email) = email else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "A valid email address is required.",
            })),
        )
            .into_response();
    };

    match state.notifier.newsletter_signup(&email).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Thank you for subscribing.",
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "newsletter email dispatch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": GENERIC_FAILURE,
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_router, FakeSource, RecordingNotifier};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn post_json(
        router: axum::Router,
        uri: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_contact_missing_email_is_rejected_without_sending() {
        let notifier = Arc::new(RecordingNotifier::default());
        let router = test_router(FakeSource::default(), notifier.clone());
        let (status, body) = post_json(
            router,
            "/api/contact",
            r#"{"name": "Sam", "message": "Call me"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "email is required");
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_email_without_at_is_rejected() {
        let notifier = Arc::new(RecordingNotifier::default());
        let router = test_router(FakeSource::default(), notifier.clone());
        let (status, body) = post_json(
            router,
            "/api/contact",
            r#"{"name": "Sam", "email": "nope", "message": "Call me"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "a valid email address is required");
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_sends_exactly_one_email() {
        let notifier = Arc::new(RecordingNotifier::default());
        let router = test_router(FakeSource::default(), notifier.clone());
        let (status, body) = post_json(
            router,
            "/api/contact",
            r#"{"name": "Sam", "email": "sam@example.com", "phone": "+971 50 000 0000", "message": "Viewing please"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), ["contact:sam@example.com"]);
    }

    #[tokio::test]
    async fn test_contact_smtp_failure_yields_generic_500() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let router = test_router(FakeSource::default(), notifier.clone());
        let (status, body) = post_json(
            router,
            "/api/contact",
            r#"{"name": "Sam", "email": "sam@example.com", "message": "Hi"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        // The relay error must never leak to the caller.
        assert!(!message.contains("smtp"));
        assert_eq!(message, super::GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_newsletter_round_trip() {
        let notifier = Arc::new(RecordingNotifier::default());
        let router = test_router(FakeSource::default(), notifier.clone());

        let (status, body) =
            post_json(router.clone(), "/api/newsletter", r#"{"email": "invalid"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = post_json(
            router,
            "/api/newsletter",
            r#"{"email": "sam@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Thank you for subscribing.");
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), ["newsletter:sam@example.com"]);
    }
}
