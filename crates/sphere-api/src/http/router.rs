//! Axum router configuration with middleware.
//!
//! Routes: `POST /chat`, `GET /session`, `GET /health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/session", get(handlers::session::get_session))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use sphere_core::ledger::{BoxLedgerClient, LedgerClient};
    use sphere_core::transport::{BoxInferenceTransport, InferenceTransport, TransportResponse};
    use sphere_types::amount::TokenAmount;
    use sphere_types::config::BrokerConfig;
    use sphere_types::error::{BrokerError, LedgerError};
    use sphere_types::llm::ChatCompletionRequest;
    use sphere_types::provider::{
        FundingPurpose, ProviderAddress, ProviderRecord, ProvisionOutcome, ServiceMetadata,
        ServiceType,
    };

    /// Registry with a single provider that accepts every call.
    struct StubLedger;

    impl LedgerClient for StubLedger {
        fn account(&self) -> &str {
            "0xstubaccount"
        }

        async fn list_providers(
            &self,
            service_type: &ServiceType,
        ) -> Result<Vec<ProviderRecord>, LedgerError> {
            Ok(vec![ProviderRecord {
                address: ProviderAddress::new("0xnode"),
                service_type: service_type.clone(),
                endpoint_url: "https://node.example".to_string(),
                model: None,
            }])
        }

        async fn deposit_funds(&self, _amount: TokenAmount) -> Result<ProvisionOutcome, LedgerError> {
            Ok(ProvisionOutcome::AlreadyProvisioned)
        }

        async fn transfer_funds(
            &self,
            _provider: &ProviderAddress,
            _purpose: FundingPurpose,
            _amount: TokenAmount,
        ) -> Result<ProvisionOutcome, LedgerError> {
            Ok(ProvisionOutcome::Applied)
        }

        async fn acknowledge_signer(
            &self,
            _provider: &ProviderAddress,
        ) -> Result<ProvisionOutcome, LedgerError> {
            Ok(ProvisionOutcome::Applied)
        }

        async fn get_metadata(
            &self,
            _provider: &ProviderAddress,
        ) -> Result<ServiceMetadata, LedgerError> {
            Ok(ServiceMetadata {
                endpoint: "https://node.example/v1/proxy".to_string(),
                model: "llama-3.3-70b-instruct".to_string(),
            })
        }

        async fn get_request_headers(
            &self,
            _provider: &ProviderAddress,
        ) -> Result<HashMap<String, String>, LedgerError> {
            Ok(HashMap::from([(
                "Authorization".to_string(),
                "Bearer billing-token".to_string(),
            )]))
        }
    }

    /// Provider that always answers with the same status and body.
    struct FixedTransport {
        status: u16,
        body: String,
    }

    impl InferenceTransport for FixedTransport {
        async fn send_completion(
            &self,
            _url: &str,
            _headers: &HashMap<String, String>,
            _request: &ChatCompletionRequest,
        ) -> Result<TransportResponse, BrokerError> {
            Ok(TransportResponse::new(self.status, self.body.clone()))
        }
    }

    fn app(status: u16, body: &str) -> (Router, AppState) {
        let transport = FixedTransport {
            status,
            body: body.to_string(),
        };
        let state = AppState::from_parts(
            BoxLedgerClient::new(StubLedger),
            BoxInferenceTransport::new(transport),
            BrokerConfig::default(),
        );
        (build_router(state.clone()), state)
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const ANSWER: &str = r#"{"choices":[{"message":{"content":"Osmosis is diffusion of water."}}]}"#;

    #[tokio::test]
    async fn test_chat_returns_text() {
        let (router, _) = app(200, ANSWER);

        let response = router
            .oneshot(post_chat(
                r#"{"message":"What is osmosis?","environmentHashes":["0xroot"],"useWebSearch":true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["text"], "Osmosis is diffusion of water.");
    }

    #[tokio::test]
    async fn test_chat_without_optional_fields() {
        let (router, _) = app(200, ANSWER);

        let response = router
            .oneshot(post_chat(r#"{"message":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let (router, _) = app(200, ANSWER);

        let response = router
            .oneshot(post_chat(r#"{"msg": 42"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(
            json["error"],
            "Failed to connect to the compute network or perform inference."
        );
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn test_provider_failure_uses_error_envelope() {
        let (router, _) = app(503, "overloaded");

        let response = router
            .oneshot(post_chat(r#"{"message":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        let details = json["details"].as_str().unwrap();
        assert!(details.contains("503"));
        assert!(details.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(200, ANSWER);

        let response = router.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_session_is_null_until_first_chat() {
        let (router, _) = app(200, ANSWER);

        let response = router.clone().oneshot(get("/session")).await.unwrap();
        let json = json_body(response).await;
        assert!(json["session"].is_null());

        router
            .clone()
            .oneshot(post_chat(r#"{"message":"hi"}"#))
            .await
            .unwrap();

        let response = router.oneshot(get("/session")).await.unwrap();
        let json = json_body(response).await;
        assert_eq!(json["session"]["provider"], "0xnode");
        assert_eq!(json["session"]["model"], "llama-3.3-70b-instruct");
        assert_eq!(json["session"]["headerNames"][0], "Authorization");
        assert!(!json.to_string().contains("billing-token"));
    }

    #[tokio::test]
    async fn test_requests_share_one_session() {
        let (router, state) = app(200, ANSWER);

        for _ in 0..3 {
            let response = router
                .clone()
                .oneshot(post_chat(r#"{"message":"hi"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let first = state.chat_service.cache().peek().await.unwrap();
        let again = state.chat_service.cache().get().await.unwrap();
        assert_eq!(first, again);
    }
}
