//! Hawk-signed API calls against the mock BVNK API.

#[cfg(test)]
mod tests {
    use bvnk_auth::{FixedClock, HawkSigner, HttpMethod, SystemClock};
    use bvnk_core::{ApiClient, BvnkConfig, Operation};
    use http::StatusCode;

    use crate::{HAWK_SECRET, KEY_ID, MockBvnk, credential, send};

    fn client(mock: &MockBvnk, payload_hashing: bool) -> ApiClient {
        ApiClient::new(mock.base_url(), credential(payload_hashing), HawkSigner::default())
    }

    #[tokio::test]
    async fn test_should_accept_signed_list_wallets() {
        let mock = MockBvnk::start(false).await.unwrap();
        let request = client(&mock, false).build(&Operation::ListWallets).unwrap();

        let (status, body) = send(request).await.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["keyId"], KEY_ID);
        assert_eq!(json["path"], "/api/wallet");
    }

    #[tokio::test]
    async fn test_should_accept_hashed_custom_call_with_query() {
        let mock = MockBvnk::start(true).await.unwrap();
        let operation = Operation::CustomApiCall {
            method: HttpMethod::Post,
            path: "/api/v1/pay/summary?merchantId=m-1".to_owned(),
            body: Some(r#"{"amount": 10, "currency": "EUR"}"#.to_owned()),
        };
        let request = client(&mock, true).build(&operation).unwrap();
        assert!(
            request.headers()[http::header::AUTHORIZATION]
                .to_str()
                .unwrap()
                .contains("hash=\"")
        );

        let (status, body) = send(request).await.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    #[tokio::test]
    async fn test_should_accept_every_method() {
        let mock = MockBvnk::start(true).await.unwrap();
        let client = client(&mock, true);
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            let body = (!method.is_bodyless()).then(|| r#"{"note":"x"}"#.to_owned());
            let operation = Operation::CustomApiCall {
                method,
                path: "/api/wallet/42".to_owned(),
                body,
            };
            let (status, body) = send(client.build(&operation).unwrap()).await.unwrap();
            assert_eq!(status, StatusCode::OK, "{method}: {body}");
        }
    }

    #[tokio::test]
    async fn test_should_reject_wrong_secret() {
        let mock = MockBvnk::start(false).await.unwrap();
        let wrong = bvnk_auth::Credential::new(KEY_ID, format!("{HAWK_SECRET}-wrong"));
        let client = ApiClient::new(mock.base_url(), wrong, HawkSigner::default());

        let (status, body) = send(client.build(&Operation::ListWallets).unwrap())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("MAC does not match"), "{body}");
    }

    #[tokio::test]
    async fn test_should_reject_unknown_key_id() {
        let mock = MockBvnk::start(false).await.unwrap();
        let stranger = bvnk_auth::Credential::new("someone-else", HAWK_SECRET);
        let client = ApiClient::new(mock.base_url(), stranger, HawkSigner::default());

        let (status, body) = send(client.build(&Operation::ListWallets).unwrap())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Unknown Hawk key id"), "{body}");
    }

    #[tokio::test]
    async fn test_should_reject_stale_timestamp() {
        let mock = MockBvnk::start(false).await.unwrap();
        let signer = HawkSigner::default().with_clock(FixedClock(1_000_000_000));
        let client = ApiClient::new(mock.base_url(), credential(false), signer);

        let (status, body) = send(client.build(&Operation::ListWallets).unwrap())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Stale timestamp"), "{body}");
    }

    #[tokio::test]
    async fn test_should_reject_body_changed_after_signing() {
        let mock = MockBvnk::start(true).await.unwrap();
        let operation = Operation::CustomApiCall {
            method: HttpMethod::Post,
            path: "/api/pay".to_owned(),
            body: Some(r#"{"amount":10}"#.to_owned()),
        };
        let mut request = client(&mock, true).build(&operation).unwrap();
        *request.body_mut() = br#"{"amount":1000}"#.to_vec();

        let (status, body) = send(request).await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("payload hash does not match"), "{body}");
    }

    #[tokio::test]
    async fn test_should_build_client_from_environment_style_config() {
        let mock = MockBvnk::start(false).await.unwrap();
        let base_url = format!("{}/", mock.base_url());
        let config = BvnkConfig::from_lookup(|key| match key {
            "BVNK_HAWK_ID" => Some(KEY_ID.to_owned()),
            "BVNK_HAWK_SECRET" => Some(HAWK_SECRET.to_owned()),
            "BVNK_BASE_URL" => Some(base_url.clone()),
            _ => None,
        })
        .unwrap();
        let client = ApiClient::from_config(&config).unwrap();

        let (status, body) = send(client.build(&Operation::ListWallets).unwrap())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    #[test]
    fn test_should_verify_locally_signed_request() {
        use bvnk_auth::hawk::DEFAULT_TIMESTAMP_SKEW_SECS;
        use bvnk_auth::{OutboundRequest, RequestBody, StaticCredentialProvider, verify_authorization};

        let request = OutboundRequest::new(HttpMethod::Put, "https://api.bvnk.com/api/wallet/1")
            .unwrap()
            .with_body(RequestBody::Text("{\"label\":\"ops\"}".to_owned()));
        let signed = HawkSigner::default().sign(&credential(true), request).unwrap();

        let provider = StaticCredentialProvider::new([credential(true)]);
        let header =
            verify_authorization(&signed, &provider, &SystemClock, DEFAULT_TIMESTAMP_SKEW_SECS)
                .unwrap();
        assert_eq!(header.id, KEY_ID);
        assert!(header.hash.is_some());
    }
}
