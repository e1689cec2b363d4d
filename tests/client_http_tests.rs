//! HTTP behaviour of the directory client against a mock server

mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::RecordingSleeper;
use orgsync::client::{CreateOutcome, DirectoryApi, DirectoryClient};
use orgsync::config::SyncConfig;
use orgsync::models::{DepartmentPatch, DepartmentRecord, NewDepartment, NewUser, UserRecord};
use orgsync::resilience::RetryPolicy;
use orgsync::SyncError;

const DEPARTMENTS_PATH: &str = "/org/42/departments";

fn test_config(api_base: String) -> SyncConfig {
    SyncConfig {
        org_id: "42".to_string(),
        token: "test-token".to_string(),
        api_base,
        ..SyncConfig::default()
    }
}

fn client_with(config: &SyncConfig, sleeper: Arc<RecordingSleeper>) -> DirectoryClient {
    DirectoryClient::new(config)
        .unwrap()
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)).with_sleeper(sleeper))
}

fn client_for(server: &MockServer, sleeper: Arc<RecordingSleeper>) -> DirectoryClient {
    client_with(&test_config(server.uri()), sleeper)
}

#[tokio::test]
async fn test_listing_follows_all_pages_with_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .and(query_param("page", "1"))
        .and(query_param("perPage", "100"))
        .and(header("Authorization", "OAuth test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "departments": [{"id": 1, "name": "All employees", "parentId": 0, "externalId": ""}],
            "page": 1,
            "pages": 2,
            "perPage": 100,
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "departments": [{"id": "7", "name": "Sales", "parentId": 1, "externalId": "sales"}],
            "page": 2,
            "pages": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(RecordingSleeper::default()));
    let departments = client.list_all_departments().await.unwrap();

    assert_eq!(departments.len(), 2);
    assert_eq!(departments[0].id, "1");
    assert!(!departments[0].is_managed());
    assert_eq!(departments[0].parent_id, None);
    assert_eq!(departments[1].external_id, "sales");
    assert_eq!(departments[1].parent_id.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_transient_failures_are_retried_with_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "departments": [],
            "pages": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client_for(&server, sleeper.clone());

    let page = client.list_departments_page(1).await.unwrap();

    assert!(page.departments.is_empty());
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
}

#[tokio::test]
async fn test_persistent_overload_exhausts_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client_for(&server, sleeper.clone());

    match client.list_all_departments().await {
        Err(SyncError::RetriesExhausted {
            operation,
            attempts,
            ..
        }) => {
            assert_eq!(operation, "list_departments_page");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    // No sleep after the final attempt
    assert_eq!(sleeper.delays().len(), 2);
}

#[tokio::test]
async fn test_request_timeout_is_retried_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"departments": [], "pages": 1}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let config = SyncConfig {
        request_timeout_ms: 50,
        ..test_config(server.uri())
    };
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client_with(&config, sleeper.clone());

    match client.list_departments_page(1).await {
        Err(SyncError::RetriesExhausted {
            attempts,
            last_error,
            ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.starts_with("HTTP transport error"), "{last_error}");
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
}

#[tokio::test]
async fn test_transport_error_without_timeout_is_not_retried() {
    // The base URL cannot be parsed, so every request fails before it is sent
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client_with(&test_config("not a url".to_string()), sleeper.clone());

    match client.list_departments_page(1).await {
        Err(SyncError::Transport(e)) => assert!(!e.is_timeout() && !e.is_connect()),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_permanent_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad parentId"))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client_for(&server, sleeper.clone());
    let department = NewDepartment::from_record(&DepartmentRecord::new("eng", "Engineering"), None);

    match client.create_department(&department).await {
        Err(SyncError::Api { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad parentId");
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_create_department_sends_typed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEPARTMENTS_PATH))
        .and(body_json(json!({
            "name": "Engineering",
            "externalId": "eng",
            "parentId": 5,
            "label": "eng"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "name": "Engineering",
            "parentId": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(RecordingSleeper::default()));
    let record = DepartmentRecord::new("eng", "Engineering").with_label("eng");
    let department = NewDepartment::from_record(&record, Some("5".to_string()));

    match client.create_department(&department).await.unwrap() {
        CreateOutcome::Created(created) => {
            assert_eq!(created.id, "12");
            assert_eq!(created.parent_id.as_deref(), Some("5"));
        }
        CreateOutcome::Conflict { detail } => panic!("unexpected conflict: {detail}"),
    }
}

#[tokio::test]
async fn test_conflict_is_returned_as_signal_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_string("already exists"))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client_for(&server, sleeper.clone());
    let department = NewDepartment::from_record(&DepartmentRecord::new("eng", "Engineering"), None);

    let outcome = client.create_department(&department).await.unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Conflict {
            detail: "already exists".to_string()
        }
    );
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_update_department_patches_metadata_only() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/org/42/departments/3"))
        .and(body_json(json!({"externalId": "sales", "description": "Field sales"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "name": "Sales",
            "externalId": "sales"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(RecordingSleeper::default()));
    let record = DepartmentRecord::new("sales", "Sales").with_description("Field sales");

    let updated = client
        .update_department("3", &DepartmentPatch::adopt(&record))
        .await
        .unwrap();

    assert_eq!(updated.id, "3");
    assert_eq!(updated.external_id, "sales");
}

#[tokio::test]
async fn test_create_user_sends_defaults_and_maps_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/org/42/users"))
        .and(body_json(json!({
            "nickname": "ivan.petrov",
            "departmentId": 7,
            "name": {"first": "Ivan", "last": "Petrov", "middle": ""},
            "position": "",
            "language": "ru",
            "timezone": "Europe/Moscow",
            "externalId": "",
            "password": "",
            "passwordChangeRequired": true
        })))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(RecordingSleeper::default()));
    let user = NewUser::from_record(&UserRecord::new("ivan.petrov", "Ivan", "Petrov", "eng"), "7");

    let outcome = client.create_user(&user).await.unwrap();

    assert!(outcome.is_conflict());
}

#[tokio::test]
async fn test_unexpected_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPARTMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(RecordingSleeper::default()));

    assert!(matches!(
        client.list_departments_page(1).await,
        Err(SyncError::Parse(_))
    ));
}
