use std::sync::Arc;

use axum::body::Body;
use axum::http::{ Request, StatusCode };
use axum::Router;
use clap::Parser;
use http_body_util::BodyExt;
use httpmock::Method::POST;
use httpmock::{ Mock, MockServer };
use serde_json::{ json, Value };
use tower::ServiceExt;

use policy_assistant::build_rag_engine;
use policy_assistant::cli::Args;
use policy_assistant::config::prompt::DEFAULT_FALLBACK_ANSWER;
use policy_assistant::server::{ build_router, AppState };

const SEARCH_PATH: &str = "/indexes/handbook/docs/search";
const COMPLETION_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";
const PREFIX: &str = "https://acct.blob.core.windows.net/handbooks/mansur/";

fn args_for(server: &MockServer) -> Args {
    Args::try_parse_from([
        "policy-assistant",
        "--storage-account-url",
        "https://acct.blob.core.windows.net",
        "--container-name",
        "handbooks",
        "--employee-folder",
        "mansur",
        "--search-endpoint",
        &server.base_url(),
        "--search-index-name",
        "handbook",
        "--search-api-key",
        "search-key",
        "--openai-endpoint",
        &server.base_url(),
        "--openai-api-key",
        "model-key",
        "--openai-deployment",
        "gpt-4o",
        "--openai-api-version",
        "2024-02-01",
        "--search-api-version",
        "2023-11-01",
        "--top-k",
        "3",
        "--temperature",
        "0.3",
        "--max-tokens",
        "1000",
    ]).unwrap()
}

fn app(args: &Args) -> Router {
    let rag = build_rag_engine(args).unwrap();
    build_router(AppState { rag: Arc::new(rag) })
}

async fn post_chat(app: Router, body: Body) -> (StatusCode, Value) {
    post_chat_as(app, "application/json", body).await
}

async fn post_chat_as(app: Router, content_type: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", content_type)
                .header("origin", "http://localhost:3000")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn ask(app: Router, message: Value) -> (StatusCode, Value) {
    post_chat(app, Body::from(message.to_string())).await
}

async fn search_returning<'a>(server: &'a MockServer, status: u16, body: Value) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(status)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

async fn completion_returning<'a>(server: &'a MockServer, status: u16, body: Value) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST).path(COMPLETION_PATH);
            then.status(status)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

fn completion_body(content: &str) -> Value {
    json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn answers_from_retrieved_documents() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(SEARCH_PATH)
                .query_param("api-version", "2023-11-01")
                .header("api-key", "search-key")
                .body_includes("\"search\":\"What are the working hours?\"")
                .body_includes(&format!("metadata_storage_path ge '{}'", PREFIX))
                .body_includes(&format!("metadata_storage_path lt '{}~'", PREFIX))
                .body_includes("\"select\":\"content,metadata_storage_path\"")
                .body_includes("\"top\":3");
            then.status(200).json_body(json!({
                "value": [
                    {"content": "Office hours are 9 to 5.", "metadata_storage_path": format!("{}hours.pdf", PREFIX)},
                    {"content": "Fridays end at 3.", "metadata_storage_path": format!("{}fridays.pdf", PREFIX)}
                ]
            }));
        })
        .await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(COMPLETION_PATH)
                .query_param("api-version", "2024-02-01")
                .header("api-key", "model-key")
                .body_includes("\"role\":\"system\"")
                .body_includes(
                    &format!(
                        "Source: {p}hours.pdf\\nOffice hours are 9 to 5.\\n\\nSource: {p}fridays.pdf\\nFridays end at 3.",
                        p = PREFIX
                    ),
                )
                .body_includes("Question:\\nWhat are the working hours?")
                .body_includes("\"temperature\":0.3")
                .body_includes("\"max_tokens\":1000");
            then.status(200).json_body(completion_body("Working hours are 9 to 5, Fridays until 3."));
        })
        .await;

    let (status, body) = ask(app(&args_for(&server)), json!({"message": "What are the working hours?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": "Working hours are 9 to 5, Fridays until 3."}));
    search.assert_calls(1);
    completion.assert_calls(1);
}

#[tokio::test]
async fn blank_questions_are_rejected_without_calling_collaborators() {
    let server = MockServer::start_async().await;
    let search = search_returning(&server, 200, json!({"value": []})).await;
    let completion = completion_returning(&server, 200, completion_body("unused")).await;
    let app = app(&args_for(&server));

    for message in [json!({"message": ""}), json!({"message": "   \t\n"}), json!({})] {
        let (status, body) = ask(app.clone(), message).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Message is required"}));
    }

    search.assert_calls(0);
    completion.assert_calls(0);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let server = MockServer::start_async().await;
    let search = search_returning(&server, 200, json!({"value": []})).await;

    let (status, body) = post_chat(app(&args_for(&server)), Body::from("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request body"}));
    search.assert_calls(0);
}

#[tokio::test]
async fn json_body_is_accepted_whatever_the_content_type() {
    let server = MockServer::start_async().await;
    let search = search_returning(&server, 200, json!({
        "value": [{"content": "Hours are 9 to 5.", "metadata_storage_path": format!("{}hours.pdf", PREFIX)}]
    })).await;
    let completion = completion_returning(&server, 200, completion_body("9 to 5.")).await;

    let (status, body) = post_chat_as(
        app(&args_for(&server)),
        "text/plain;charset=UTF-8",
        Body::from(json!({"message": "What are the working hours?"}).to_string()),
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": "9 to 5."}));
    search.assert_calls(1);
    completion.assert_calls(1);
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let server = MockServer::start_async().await;
    let response = app(&args_for(&server))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("origin", "http://localhost:3000")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn search_outage_falls_back_to_hr_referral() {
    let server = MockServer::start_async().await;
    let search = search_returning(&server, 503, json!({"error": "unavailable"})).await;
    let completion = completion_returning(&server, 200, completion_body("unused")).await;

    let (status, body) = ask(app(&args_for(&server)), json!({"message": "What is the leave policy?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": DEFAULT_FALLBACK_ANSWER}));
    search.assert_calls(1);
    completion.assert_calls(0);
}

#[tokio::test]
async fn no_matching_documents_falls_back_without_completion() {
    let server = MockServer::start_async().await;
    let search = search_returning(&server, 200, json!({"value": []})).await;
    let completion = completion_returning(&server, 200, completion_body("unused")).await;

    let (status, body) = ask(app(&args_for(&server)), json!({"message": "Parking?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], DEFAULT_FALLBACK_ANSWER);
    search.assert_calls(1);
    completion.assert_calls(0);
}

#[tokio::test]
async fn completion_failure_is_a_server_error() {
    let server = MockServer::start_async().await;
    let search = search_returning(
        &server,
        200,
        json!({"value": [{"content": "Remote two days a week.", "metadata_storage_path": format!("{}remote.pdf", PREFIX)}]}),
    ).await;
    let completion = completion_returning(&server, 500, json!({"error": {"message": "boom"}})).await;

    let (status, body) = ask(app(&args_for(&server)), json!({"message": "Remote work?"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to process your request"}));
    search.assert_calls(1);
    completion.assert_calls(1);
}

#[tokio::test]
async fn completion_without_choices_is_a_server_error() {
    let server = MockServer::start_async().await;
    search_returning(
        &server,
        200,
        json!({"value": [{"content": "text", "metadata_storage_path": format!("{}a.pdf", PREFIX)}]}),
    ).await;
    completion_returning(&server, 200, json!({"choices": []})).await;

    let (status, _) = ask(app(&args_for(&server)), json!({"message": "Anything?"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn hits_missing_fields_are_read_as_empty_strings() {
    let server = MockServer::start_async().await;
    search_returning(&server, 200, json!({"value": [{"@search.score": 1.2}]})).await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path(COMPLETION_PATH).body_includes("Context:\\nSource: \\n\\n\\nQuestion:");
            then.status(200).json_body(completion_body("Not in the handbook."));
        })
        .await;

    let (status, body) = ask(app(&args_for(&server)), json!({"message": "Dress code?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Not in the handbook.");
    completion.assert_calls(1);
}

#[tokio::test]
async fn unconfigured_search_degrades_to_fallback() {
    let args = Args::try_parse_from([
        "policy-assistant",
        "--storage-account-url",
        "",
        "--container-name",
        "",
        "--employee-folder",
        "mansur",
        "--search-endpoint",
        "",
        "--search-index-name",
        "",
        "--search-api-key",
        "",
        "--openai-endpoint",
        "",
        "--openai-api-key",
        "",
        "--openai-deployment",
        "",
    ]).unwrap();

    let (status, body) = ask(app(&args), json!({"message": "Holidays?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], DEFAULT_FALLBACK_ANSWER);
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start_async().await;
    let response = app(&args_for(&server))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!({"status": "ok"}));
}
