//! Chat completion against a local stand-in for the Perplexity API.

use perplexity_client::{ChatRequest, Message, PerplexityClient, PerplexityError, SONAR_PRO};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ChatRequest {
    ChatRequest::new(SONAR_PRO)
        .message(Message::user("Find fintech founders"))
        .search_domains(["linkedin.com", "crunchbase.com"])
        .max_citations(15)
}

#[tokio::test]
async fn test_chat_completion_returns_content_and_citations() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer pplx-test"))
        .and(body_partial_json(json!({
            "model": "sonar-pro",
            "search_domain_filter": ["linkedin.com", "crunchbase.com"],
            "max_citations": 15
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "[{\"name\": \"Ada\"}]"}}],
            "citations": ["https://www.crunchbase.com/person/ada"],
            "usage": {"prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PerplexityClient::new("pplx-test").with_base_url(server.uri());
    let response = client.chat_completion(request()).await.unwrap();

    assert_eq!(response.content, "[{\"name\": \"Ada\"}]");
    assert_eq!(response.citations, vec!["https://www.crunchbase.com/person/ada"]);
    assert_eq!(response.usage.unwrap().total_tokens, 42);
}

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = PerplexityClient::new("pplx-test").with_base_url(server.uri());
    let err = client.chat_completion(request()).await.unwrap_err();

    match err {
        PerplexityError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = PerplexityClient::new("pplx-test").with_base_url(server.uri());
    let err = client.chat_completion(request()).await.unwrap_err();

    assert!(matches!(err, PerplexityError::Parse(_)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Port 1 is reserved and nothing listens on it.
    let client = PerplexityClient::new("pplx-test").with_base_url("http://127.0.0.1:1");
    let err = client.chat_completion(request()).await.unwrap_err();

    assert!(matches!(err, PerplexityError::Network(_)));
    assert!(err.is_transport());
}
