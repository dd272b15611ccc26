use axum::{http::StatusCode, Router};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use reminder_shared::config::ServiceConfig;
use reminder_shared::models::WorkflowRunStatus;
use reminder_shared::test_utils::http_test_utils::{content_type, response_to_json};
use reminder_shared::test_utils::jwt::{create_auth_header, create_raw_request, create_test_request};
use reminder_shared::test_utils::mock_auth_resolver::MockAuthResolver;
use reminder_shared::test_utils::mock_workflow_run_store::MockWorkflowRunStore;
use reminder_shared::test_utils::test_logging::init_test_logging;

use crate::models::{DEFAULT_INTENT, SUCCESS_MESSAGE};
use crate::routes::{create_router_with_backends, BASE_PATH, FUNCTION_PATH};

const TEST_USER_ID: &str = "0b7f5f1e-1b7a-4b43-9b39-6f7f0e1f2a10";

fn function_path() -> String {
    format!("{}{}", BASE_PATH, FUNCTION_PATH)
}

fn test_config() -> ServiceConfig {
    ServiceConfig::with_supabase("https://project.supabase.co", "anon-key")
}

// Helper to set up the test application over in-memory collaborators
fn create_test_app_with(
    config: ServiceConfig,
    auth: MockAuthResolver,
    store: MockWorkflowRunStore,
) -> (Router, Arc<MockAuthResolver>, Arc<MockWorkflowRunStore>) {
    init_test_logging();

    let auth = Arc::new(auth);
    let store = Arc::new(store);
    let app = create_router_with_backends(config, auth.clone(), store.clone());
    (app, auth, store)
}

fn create_test_app() -> (Router, Arc<MockAuthResolver>, Arc<MockWorkflowRunStore>) {
    create_test_app_with(
        test_config(),
        MockAuthResolver::with_users([TEST_USER_ID]),
        MockWorkflowRunStore::new(),
    )
}

#[tokio::test]
async fn test_send_reminder_saves_trimmed_intent() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            &function_path(),
            TEST_USER_ID,
            Some(json!({ "intent": "  Buy milk  " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");
    let body = response_to_json(response).await;
    assert_eq!(body, json!({ "ok": true, "message": SUCCESS_MESSAGE }));

    let runs = store.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].user_id, TEST_USER_ID);
    assert_eq!(runs[0].intent, "Buy milk");
    assert_eq!(runs[0].status, WorkflowRunStatus::Completed);
}

#[tokio::test]
async fn test_send_reminder_uses_caller_credential_for_insert() {
    let (app, _, store) = create_test_app();
    let (_, auth_value) = create_auth_header(TEST_USER_ID);

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            Some(&auth_value),
            Some(json!({ "intent": "Call mom" }).to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.authorizations(), vec![auth_value]);
}

#[tokio::test]
async fn test_send_reminder_defaults_blank_or_missing_intent() {
    let bodies = [
        Some(json!({}).to_string()),
        Some(json!({ "intent": "   " }).to_string()),
        Some(json!({ "intent": null }).to_string()),
        Some(json!({ "intent": 42 }).to_string()),
        Some(json!({ "intent": { "text": "Buy milk" } }).to_string()),
        None,
    ];

    for body in bodies {
        let (app, _, store) = create_test_app();
        let (_, auth_value) = create_auth_header(TEST_USER_ID);

        let response = app
            .oneshot(create_raw_request(
                "POST",
                &function_path(),
                Some(&auth_value),
                body.clone(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "body: {:?}", body);
        let runs = store.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].intent, DEFAULT_INTENT, "body: {:?}", body);
    }
}

#[tokio::test]
async fn test_send_reminder_tolerates_malformed_json() {
    let (app, _, store) = create_test_app();
    let (_, auth_value) = create_auth_header(TEST_USER_ID);

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            Some(&auth_value),
            Some("{\"intent\": \"Buy milk\"".to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let runs = store.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].intent, DEFAULT_INTENT);
}

#[tokio::test]
async fn test_send_reminder_accepts_large_body() {
    let (app, _, store) = create_test_app();
    let (_, auth_value) = create_auth_header(TEST_USER_ID);
    let body = json!({ "intent": "Buy milk", "notes": "x".repeat(70 * 1024) }).to_string();

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            Some(&auth_value),
            Some(body),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let runs = store.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].intent, "Buy milk");
}

#[tokio::test]
async fn test_send_reminder_repeated_intent_keeps_last() {
    let (app, _, store) = create_test_app();
    let (_, auth_value) = create_auth_header(TEST_USER_ID);

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            Some(&auth_value),
            Some(r#"{"intent": "first", "intent": "Buy milk"}"#.to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let runs = store.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].intent, "Buy milk");
}

#[tokio::test]
async fn test_send_reminder_keeps_next_line_intent() {
    let (app, _, store) = create_test_app();
    let (_, auth_value) = create_auth_header(TEST_USER_ID);

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            Some(&auth_value),
            Some(r#"{"intent": "\u0085"}"#.to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let runs = store.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].intent, "\u{85}");
}

#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    for method in ["GET", "PUT", "PATCH", "DELETE", "OPTIONS"] {
        let (app, auth, store) = create_test_app();

        let response = app
            .oneshot(create_test_request(
                method,
                &function_path(),
                TEST_USER_ID,
                Some(json!({ "intent": "Buy milk" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(content_type(&response), "application/json");
        let body = response_to_json(response).await;
        assert_eq!(body, json!({ "error": "Method not allowed" }));
        assert_eq!(auth.calls(), 0);
        assert!(store.runs().is_empty());
    }
}

#[tokio::test]
async fn test_method_check_precedes_config_check() {
    let (app, _, _) = create_test_app_with(
        ServiceConfig::from_lookup(|_| None),
        MockAuthResolver::new(),
        MockWorkflowRunStore::new(),
    );

    let response = app
        .oneshot(create_raw_request("GET", &function_path(), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_missing_config_is_server_error() {
    let partial_configs = [
        ServiceConfig::from_lookup(|_| None),
        ServiceConfig::from_lookup(|name| {
            (name == "SUPABASE_URL").then(|| "https://project.supabase.co".to_string())
        }),
        ServiceConfig::from_lookup(|name| {
            (name == "SUPABASE_ANON_KEY").then(|| "anon-key".to_string())
        }),
    ];

    for config in partial_configs {
        let (app, auth, store) = create_test_app_with(
            config,
            MockAuthResolver::with_users([TEST_USER_ID]),
            MockWorkflowRunStore::new(),
        );

        // Valid credentials make no difference
        let response = app
            .oneshot(create_test_request(
                "POST",
                &function_path(),
                TEST_USER_ID,
                Some(json!({ "intent": "Buy milk" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_to_json(response).await;
        assert_eq!(
            body,
            json!({ "error": "Missing SUPABASE_URL or SUPABASE_ANON_KEY" })
        );
        assert_eq!(auth.calls(), 0);
        assert!(store.runs().is_empty());
    }
}

#[tokio::test]
async fn test_missing_authorization_is_unauthorized() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            None,
            Some(json!({ "intent": "Buy milk" }).to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_to_json(response).await;
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert!(store.runs().is_empty());
    assert!(store.authorizations().is_empty());
}

#[tokio::test]
async fn test_invalid_token_never_inserts() {
    let (app, _, store) = create_test_app();

    // Repeating the same rejected call must never produce a row
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(create_raw_request(
                "POST",
                &function_path(),
                Some("Bearer invalid.token.format"),
                Some(json!({ "intent": "Buy milk" }).to_string()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    assert!(store.runs().is_empty());
}

#[tokio::test]
async fn test_unknown_user_is_unauthorized() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            &function_path(),
            "someone-else",
            Some(json!({ "intent": "Buy milk" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.runs().is_empty());
}

#[tokio::test]
async fn test_store_rejection_is_bad_request_with_store_message() {
    let message = "duplicate key value violates unique constraint \"workflow_runs_pkey\"";
    let (app, _, store) = create_test_app_with(
        test_config(),
        MockAuthResolver::with_users([TEST_USER_ID]),
        MockWorkflowRunStore::new_rejecting(message),
    );

    let response = app
        .oneshot(create_test_request(
            "POST",
            &function_path(),
            TEST_USER_ID,
            Some(json!({ "intent": "Buy milk" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body, json!({ "error": message }));
    assert!(store.runs().is_empty());
}

#[tokio::test]
async fn test_auth_transport_failure_is_server_error() {
    let (app, _, store) = create_test_app_with(
        test_config(),
        MockAuthResolver::new_error(),
        MockWorkflowRunStore::new(),
    );

    let response = app
        .oneshot(create_test_request(
            "POST",
            &function_path(),
            TEST_USER_ID,
            Some(json!({ "intent": "Buy milk" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_to_json(response).await;
    assert_eq!(body["error"], "Transport error: Mock auth service unreachable");
    assert!(store.authorizations().is_empty());
}

#[tokio::test]
async fn test_store_transport_failure_is_server_error() {
    let (app, _, _) = create_test_app_with(
        test_config(),
        MockAuthResolver::with_users([TEST_USER_ID]),
        MockWorkflowRunStore::new_error(),
    );

    let response = app
        .oneshot(create_test_request(
            "POST",
            &function_path(),
            TEST_USER_ID,
            Some(json!({ "intent": "Buy milk" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_to_json(response).await;
    assert_eq!(body["error"], "Transport error: Mock store unreachable");
}

#[tokio::test]
async fn test_base_path_can_be_removed() {
    let mut config = test_config();
    config.remove_base_path = true;
    let (app, _, store) = create_test_app_with(
        config,
        MockAuthResolver::with_users([TEST_USER_ID]),
        MockWorkflowRunStore::new(),
    );

    let response = app
        .clone()
        .oneshot(create_test_request("POST", FUNCTION_PATH, TEST_USER_ID, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.runs().len(), 1);

    let response = app
        .oneshot(create_test_request("POST", &function_path(), TEST_USER_ID, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(create_test_request("POST", "/functions/v1/other", TEST_USER_ID, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&response), "application/json");
    let body = response_to_json(response).await;
    assert_eq!(body, json!({ "error": "Not found" }));
}

// End to end over the real Supabase clients, with mockito standing in for the project
#[tokio::test]
async fn test_send_reminder_against_supabase_endpoints() {
    use reminder_shared::auth::gotrue::GoTrueAuthResolver;
    use reminder_shared::store::postgrest::PostgrestWorkflowRunStore;

    init_test_logging();

    let mut server = mockito::Server::new_async().await;
    let user_mock = server
        .mock("GET", "/auth/v1/user")
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer user-token")
        .with_status(200)
        .with_body(json!({ "id": TEST_USER_ID, "aud": "authenticated" }).to_string())
        .create_async()
        .await;
    let insert_mock = server
        .mock("POST", "/rest/v1/workflow_runs")
        .match_header("authorization", "Bearer user-token")
        .match_body(mockito::Matcher::Json(json!({
            "user_id": TEST_USER_ID,
            "intent": "Water plants",
            "status": "Completed"
        })))
        .with_status(201)
        .create_async()
        .await;

    let app = create_router_with_backends(
        ServiceConfig::with_supabase(server.url(), "anon-key"),
        Arc::new(GoTrueAuthResolver::new()),
        Arc::new(PostgrestWorkflowRunStore::new()),
    );

    let response = app
        .oneshot(create_raw_request(
            "POST",
            &function_path(),
            Some("Bearer user-token"),
            Some(json!({ "intent": " Water plants " }).to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    user_mock.assert_async().await;
    insert_mock.assert_async().await;
}

#[tokio::test]
async fn test_panic_is_mapped_to_server_error() {
    let (app, _, _) = create_test_app_with(
        test_config(),
        MockAuthResolver::with_users([TEST_USER_ID]),
        MockWorkflowRunStore::new_panicking(),
    );

    let response = app
        .oneshot(create_test_request(
            "POST",
            &function_path(),
            TEST_USER_ID,
            Some(json!({ "intent": "Buy milk" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type(&response), "application/json");
    let body = response_to_json(response).await;
    assert_eq!(body, json!({ "error": "mock store exploded" }));
}
