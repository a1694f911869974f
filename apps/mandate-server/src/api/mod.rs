// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{mandate::MandateForm, state::AppState};

pub mod health;
pub mod keys;
pub mod mandates;
pub mod pages;

pub fn router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::sign_in))
        .route("/home", get(pages::home).post(pages::submit_mandate))
        .route(
            "/queryMandate",
            get(pages::query_form).post(pages::submit_query),
        )
        .route("/createKey", get(pages::create_key));

    let v1_routes = Router::new()
        .route("/keys", post(keys::create_key))
        .route("/mandates/encrypt", post(mandates::encrypt_mandate))
        .route("/mandates/query", post(mandates::query_mandate));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(page_routes)
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        keys::create_key,
        mandates::encrypt_mandate,
        mandates::query_mandate,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            MandateForm,
            keys::KeyResponse,
            mandates::SealedMandate,
            mandates::QueryRequest,
            mandates::QueryResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Keys", description = "AES key generation"),
        (name = "Mandates", description = "Mandate encryption and gateway lookup"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;


#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{header as header_matcher, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::test_support::{test_state, TEST_KEY};
    use super::*;
    use crate::crypto;

    async fn send(request: Request<Body>) -> Response {
        router(test_state()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, value: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap()
    }

    fn mandate_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("consumerRefNumber", "LOAN-42"),
            ("referenceNumber", "SRC-0001"),
            ("amount", "2500"),
            ("frqcy", "MNTH"),
            ("firstCollectionDate", "2026-11-01"),
            ("finalCollectionDate", "2027-10-01"),
            ("dbtrNm", "Asha Rao"),
            ("mobile", "9876543210"),
            ("dbtrAccNo", "001234567890"),
            ("dbtrAccTp", "SAVINGS"),
            ("bnkId", "HDFC0000001"),
        ]
    }

    /// Base URL of a gateway that has already shut down.
    async fn closed_gateway_uri() -> String {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        drop(mock_server);
        uri
    }

    async fn mount_lookup(mock_server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v1/mandates/source-reference/.+$"))
            .and(header_matcher("X-API-KEY", "merchant-key"))
            .respond_with(template)
            .mount(mock_server)
            .await;
    }

    /// Pull the value of `<input ... name="{name}" value="...">` out of a page.
    fn hidden_value(html: &str, name: &str) -> String {
        let marker = format!(r#"name="{name}" value=""#);
        let start = html.find(&marker).unwrap() + marker.len();
        let end = html[start..].find('"').unwrap();
        html[start..start + end].to_string()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn root_renders_sign_in() {
        let response = send(get_request("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Sign in"));
    }

    #[tokio::test]
    async fn home_renders_code_lists() {
        let response = send(get_request("/home")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="MNTH">Monthly</option>"#));
        assert!(html.contains(r#"<option value="CURRENT">Current</option>"#));
    }

    #[tokio::test]
    async fn posting_mandate_renders_gateway_redirect() {
        let response = send(form_request("/home", &mandate_fields())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;

        assert!(html.contains(r#"action="https://gateway.example.com/mandate/create""#));
        assert_eq!(hidden_value(&html, "clientId"), "demo-client");

        let enc_data = hidden_value(&html, "encData");
        let json: Value = serde_json::from_str(&crypto::decrypt(TEST_KEY, &enc_data).unwrap()).unwrap();
        assert_eq!(json["utilityCode"], "NACH0000MUTHPLBARB");
        assert_eq!(json["schmNm"], "Vehicle");
        assert_eq!(json["consRefNo"], "LOAN-42");
        assert_eq!(json["colltnAmt"], "2500.00");
    }

    #[tokio::test]
    async fn posting_invalid_mandate_renders_error_page() {
        let mut fields = mandate_fields();
        fields.retain(|(name, _)| *name != "frqcy");
        fields.push(("frqcy", "monthly"));

        let response = send(form_request("/home", &fields)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("unknown frequency code"));
    }

    #[tokio::test]
    async fn posting_mandate_without_field_renders_400_page() {
        let mut fields = mandate_fields();
        fields.retain(|(name, _)| *name != "bnkId");

        let response = send(form_request("/home", &fields)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let html = body_text(response).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("bnkId"));
    }

    #[tokio::test]
    async fn query_page_without_field_renders_400_page() {
        let response = send(form_request(
            "/queryMandate",
            &[("referenceNumber", "SRC-0001"), ("encryptionKey", TEST_KEY)],
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn query_page_starts_empty() {
        let response = send(get_request("/queryMandate")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"name="apiKey""#));
        assert!(!html.contains(r#"id="encResponse""#));
    }

    #[tokio::test]
    async fn query_page_shows_gateway_response() {
        let mock_server = MockServer::start().await;
        let body = crypto::encrypt(TEST_KEY, "ACTIVE").unwrap();
        mount_lookup(&mock_server, ResponseTemplate::new(200).set_body_string(body)).await;

        let uri = mock_server.uri();
        let response = send(form_request(
            "/queryMandate",
            &[
                ("referenceNumber", "SRC-0001"),
                ("encryptionKey", TEST_KEY),
                ("url", uri.as_str()),
                ("apiKey", "merchant-key"),
            ],
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"<pre id="decResponse">ACTIVE</pre>"#));
        assert!(html.contains(r#"value="SRC-0001""#));
    }

    #[tokio::test]
    async fn query_page_summarises_error_status() {
        let mock_server = MockServer::start().await;
        mount_lookup(
            &mock_server,
            ResponseTemplate::new(404).set_body_string("mandate not found"),
        )
        .await;

        let uri = mock_server.uri();
        let response = send(form_request(
            "/queryMandate",
            &[
                ("referenceNumber", "SRC-0404"),
                ("encryptionKey", TEST_KEY),
                ("url", uri.as_str()),
                ("apiKey", "merchant-key"),
            ],
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"<pre id="encResponse">HTTP 404: mandate not found</pre>"#));
        assert!(html.contains(r#"<pre id="decResponse">HTTP 404: mandate not found</pre>"#));
    }

    #[tokio::test]
    async fn query_page_reports_bad_key_inline() {
        let uri = closed_gateway_uri().await;
        let response = send(form_request(
            "/queryMandate",
            &[
                ("referenceNumber", "SRC-0001"),
                ("encryptionKey", "short"),
                ("url", uri.as_str()),
                ("apiKey", "k"),
            ],
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"<pre id="encData">Failed to encrypt data</pre>"#));
        assert!(html.contains(r#"<pre id="urlEnc">Failed to encode data</pre>"#));
        assert!(html.contains("payload encryption failed"));
    }

    #[tokio::test]
    async fn create_key_page_shows_usable_key() {
        let response = send(get_request("/createKey")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        let start = html.find(r#"<pre id="key">"#).unwrap() + r#"<pre id="key">"#.len();
        let end = html[start..].find("</pre>").unwrap();
        assert!(crypto::validate_key(&html[start..start + end]).is_ok());
    }

    #[tokio::test]
    async fn json_key_endpoint_returns_key() {
        let response = send(json_request("/v1/keys", json!({}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(crypto::validate_key(body["key"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn json_encrypt_endpoint_validates_input() {
        let mut fields: serde_json::Map<String, Value> = mandate_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();

        let ok = send(json_request("/v1/mandates/encrypt", Value::Object(fields.clone()))).await;
        assert_eq!(ok.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(ok).await).unwrap();
        assert_eq!(body["client_id"], "demo-client");
        assert!(crypto::decrypt(TEST_KEY, body["enc_data"].as_str().unwrap()).is_ok());

        fields.insert("mobile".into(), Value::String("12".into()));
        let bad = send(json_request("/v1/mandates/encrypt", Value::Object(fields))).await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(bad).await).unwrap();
        assert_eq!(body["error"], "mobile is invalid: must be 10 digits");
    }

    #[tokio::test]
    async fn json_encrypt_endpoint_rejects_missing_fields_as_json_400() {
        let response = send(json_request(
            "/v1/mandates/encrypt",
            json!({ "consumerRefNumber": "LOAN-42" }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("referenceNumber"));
    }

    #[tokio::test]
    async fn json_query_endpoint_rejects_missing_fields_as_json_400() {
        let response = send(json_request(
            "/v1/mandates/query",
            json!({ "referenceNumber": "SRC-0001" }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn json_query_endpoint_returns_decrypted_response() {
        let mock_server = MockServer::start().await;
        let sealed = crypto::encrypt(TEST_KEY, "ACTIVE").unwrap();
        mount_lookup(
            &mock_server,
            ResponseTemplate::new(200).set_body_string(sealed.clone()),
        )
        .await;

        let response = send(json_request(
            "/v1/mandates/query",
            json!({
                "referenceNumber": "SRC-0001",
                "encryptionKey": TEST_KEY,
                "url": mock_server.uri(),
                "apiKey": "merchant-key"
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["status"], 200);
        assert_eq!(body["enc_response"], sealed.as_str());
        assert_eq!(body["dec_response"], "ACTIVE");

        let enc_data = body["enc_data"].as_str().unwrap();
        assert_eq!(crypto::decrypt(TEST_KEY, enc_data).unwrap(), "SRC-0001");
        assert_eq!(body["url_enc"], crypto::url_encode(enc_data).as_str());
    }

    #[tokio::test]
    async fn json_query_endpoint_reports_error_status() {
        let mock_server = MockServer::start().await;
        mount_lookup(
            &mock_server,
            ResponseTemplate::new(404).set_body_string("mandate not found"),
        )
        .await;

        let response = send(json_request(
            "/v1/mandates/query",
            json!({
                "referenceNumber": "SRC-0404",
                "encryptionKey": TEST_KEY,
                "url": mock_server.uri(),
                "apiKey": "merchant-key"
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 404);
        assert_eq!(body["enc_response"], "HTTP 404: mandate not found");
        assert_eq!(body["dec_response"], "HTTP 404: mandate not found");
    }

    #[tokio::test]
    async fn json_query_endpoint_maps_unreachable_gateway_to_502() {
        let uri = closed_gateway_uri().await;
        let response = send(json_request(
            "/v1/mandates/query",
            json!({
                "referenceNumber": "SRC-0001",
                "encryptionKey": TEST_KEY,
                "url": uri,
                "apiKey": "k"
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_ok_with_valid_key() {
        let response = send(get_request("/health/ready")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["checks"]["encryption"], "ok");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = send(get_request("/health/live")).await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
