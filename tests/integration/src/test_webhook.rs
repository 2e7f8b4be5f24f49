//! Webhook deliveries against the mock BVNK API.

#[cfg(test)]
mod tests {
    use bvnk_auth::webhook::sign_webhook;
    use http::StatusCode;
    use http::header::CONTENT_TYPE;

    use crate::{MockBvnk, WEBHOOK_PATH, WEBHOOK_SECRET, send};

    const BODY: &[u8] = br#"{"source":"payment","event":"statusChanged","data":{"status":"COMPLETE"}}"#;

    fn delivery(
        mock: &MockBvnk,
        body: &[u8],
        signature: Option<&str>,
        content_type: Option<&str>,
    ) -> http::Request<Vec<u8>> {
        let mut builder = http::Request::builder()
            .method("POST")
            .uri(format!("{}{WEBHOOK_PATH}", mock.base_url()));
        if let Some(sig) = signature {
            builder = builder.header("x-signature", sig);
        }
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(body.to_vec()).unwrap()
    }

    fn signature(body: &[u8], content_type: &str) -> String {
        sign_webhook(WEBHOOK_SECRET.as_bytes(), WEBHOOK_PATH, content_type, body)
    }

    #[tokio::test]
    async fn test_should_dispatch_signed_payment_status_change() {
        let mock = MockBvnk::start(false).await.unwrap();
        let sig = signature(BODY, "application/json");

        let (status, body) = send(delivery(&mock, BODY, Some(&sig), Some("application/json")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
        let fields: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(fields["data"]["status"], "COMPLETE");
    }

    #[tokio::test]
    async fn test_should_sign_with_delivered_content_type() {
        let mock = MockBvnk::start(false).await.unwrap();
        let content_type = "application/json; charset=utf-8";
        let sig = signature(BODY, content_type);

        let (status, _) = send(delivery(&mock, BODY, Some(&sig), Some(content_type)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);

        // Signed with the default content type but delivered with another.
        let sig = signature(BODY, "application/json");
        let (status, body) = send(delivery(&mock, BODY, Some(&sig), Some(content_type)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "signature mismatch");
    }

    #[tokio::test]
    async fn test_should_drop_unsigned_delivery() {
        let mock = MockBvnk::start(false).await.unwrap();
        let (status, body) = send(delivery(&mock, BODY, None, Some("application/json")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "missing signature");
    }

    #[tokio::test]
    async fn test_should_drop_tampered_delivery() {
        let mock = MockBvnk::start(false).await.unwrap();
        let sig = signature(BODY, "application/json");
        let tampered = String::from_utf8(BODY.to_vec())
            .unwrap()
            .replace("COMPLETE", "REFUNDED");

        let (status, body) = send(delivery(
            &mock,
            tampered.as_bytes(),
            Some(&sig),
            Some("application/json"),
        ))
        .await
        .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "signature mismatch");
    }

    #[tokio::test]
    async fn test_should_ignore_authentic_non_payment_event() {
        let mock = MockBvnk::start(false).await.unwrap();
        let body = br#"{"source":"channel","event":"statusChanged"}"#;
        let sig = signature(body, "application/json");

        let (status, _) = send(delivery(&mock, body, Some(&sig), Some("application/json")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_should_verify_non_ascii_body_bytes() {
        let mock = MockBvnk::start(false).await.unwrap();
        let body = "{\"source\":\"payment\",\"event\":\"statusChanged\",\"memo\":\"caf\u{e9} \u{20ac}\"}";
        let sig = signature(body.as_bytes(), "application/json");

        let (status, response) = send(delivery(
            &mock,
            body.as_bytes(),
            Some(&sig),
            Some("application/json"),
        ))
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK, "{response}");
    }
}
