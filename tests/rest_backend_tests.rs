use actix_web::{App, HttpResponse, web};
use findcoach::application::session_service::SessionService;
use findcoach::data::remote::RestBackend;
use findcoach::data::storage::MemoryStorage;
use findcoach::domain::backend::{AuthBackend, CoachBackend, RequestBackend, TokenStorage};
use findcoach::domain::coach::CoachProfile;
use findcoach::domain::error::StoreError;
use findcoach::domain::request::RequestMessage;
use findcoach::domain::session::{
    AuthMode, Credentials, TOKEN_EXPIRATION_KEY, TOKEN_KEY, USER_ID_KEY,
};
use findcoach::infrastructure::config::BackendConfig;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

async fn sign_in(body: web::Json<serde_json::Value>) -> HttpResponse {
    if body["password"] == "correct-horse" {
        HttpResponse::Ok().json(json!({
            "idToken": "T",
            "localId": "U",
            "expiresIn": "3600"
        }))
    } else {
        HttpResponse::BadRequest().json(json!({
            "error": { "message": "INVALID_PASSWORD" }
        }))
    }
}

async fn sign_up(_body: web::Json<serde_json::Value>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "idToken": "T2",
        "localId": "U2",
        "expiresIn": "1800"
    }))
}

async fn coaches_collection() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "c1": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "description": "Numbers and engines",
            "hourlyRate": "120.00",
            "areas": ["backend"]
        },
        "c2": {
            "firstName": "Grace",
            "lastName": "Hopper",
            "description": "Compilers",
            "hourlyRate": "150.50",
            "areas": ["backend", "career"]
        }
    }))
}

async fn empty_collection() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::Value::Null)
}

async fn put_coach(
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
    captured: web::Data<Captured>,
) -> HttpResponse {
    let mut entry = body.into_inner();
    entry["_key"] = json!(path.into_inner());
    captured.lock().unwrap().push(entry.clone());
    HttpResponse::Ok().json(entry)
}

async fn push_request(body: web::Json<serde_json::Value>, captured: web::Data<Captured>) -> HttpResponse {
    captured.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({ "name": "-NGeneratedKey1" }))
}

async fn requests_collection() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "r1": { "userEmail": "visitor@example.com", "message": "Hello!" }
    }))
}

async fn denied() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": "Permission denied" }))
}

fn start_stub(captured: Captured) -> actix_test::TestServer {
    actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&captured)))
            .route("/v1/accounts:signInWithPassword", web::post().to(sign_in))
            .route("/v1/accounts:signUp", web::post().to(sign_up))
            .route("/coaches.json", web::get().to(coaches_collection))
            .route("/coaches/{id}.json", web::put().to(put_coach))
            .route("/requests/{id}.json", web::post().to(push_request))
            .route("/requests/{id}.json", web::get().to(requests_collection))
    })
}

fn backend_for(srv: &actix_test::TestServer) -> RestBackend {
    let base = Url::parse(&format!("http://{}", srv.addr())).unwrap();
    RestBackend::new(BackendConfig::new(base.clone(), base, "test-key"))
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "a@b.com".to_string(),
        password: password.to_string(),
    }
}

#[actix_web::test]
async fn test_authenticate_parses_grant() {
    let srv = start_stub(Captured::default());
    let backend = backend_for(&srv);

    let grant = backend
        .authenticate(AuthMode::Login, &credentials("correct-horse"))
        .await
        .unwrap();

    assert_eq!(grant.token, "T");
    assert_eq!(grant.user_id, "U");
    assert_eq!(grant.expires_in, Duration::from_secs(3600));
}

#[actix_web::test]
async fn test_signup_uses_its_own_endpoint() {
    let srv = start_stub(Captured::default());
    let backend = backend_for(&srv);

    let grant = backend
        .authenticate(AuthMode::Signup, &credentials("whatever"))
        .await
        .unwrap();

    assert_eq!(grant.token, "T2");
    assert_eq!(grant.user_id, "U2");
    assert_eq!(grant.expires_in, Duration::from_secs(1800));
}

#[actix_web::test]
async fn test_authentication_failure_surfaces_remote_message() {
    let srv = start_stub(Captured::default());
    let backend = backend_for(&srv);

    let err = backend
        .authenticate(AuthMode::Login, &credentials("wrong"))
        .await
        .unwrap_err();

    let store_err = err.downcast_ref::<StoreError>().unwrap();
    assert!(matches!(store_err, StoreError::Remote(m) if m == "INVALID_PASSWORD"));
}

#[actix_web::test]
async fn test_fetch_coaches_flattens_keyed_documents() {
    let srv = start_stub(Captured::default());
    let backend = backend_for(&srv);

    let coaches = backend.fetch_coaches().await.unwrap();

    assert_eq!(coaches.len(), 2);
    assert_eq!(coaches[0].id, "c1");
    assert_eq!(coaches[0].full_name(), "Ada Lovelace");
    assert_eq!(coaches[1].id, "c2");
    assert_eq!(coaches[1].hourly_rate, Decimal::new(15050, 2));
    assert!(coaches[1].has_area("career"));
}

#[actix_web::test]
async fn test_fetch_coaches_treats_null_body_as_empty() {
    let srv = actix_test::start(|| {
        App::new().route("/coaches.json", web::get().to(empty_collection))
    });
    let backend = backend_for(&srv);

    let coaches = backend.fetch_coaches().await.unwrap();
    assert!(coaches.is_empty());
}

#[actix_web::test]
async fn test_fetch_coaches_error_uses_database_error_string() {
    let srv = actix_test::start(|| App::new().route("/coaches.json", web::get().to(denied)));
    let backend = backend_for(&srv);

    let err = backend.fetch_coaches().await.unwrap_err();
    let store_err = err.downcast_ref::<StoreError>().unwrap();
    assert!(matches!(store_err, StoreError::Remote(m) if m == "Permission denied"));
}

#[actix_web::test]
async fn test_put_coach_writes_camel_case_document_under_user_id() {
    let captured = Captured::default();
    let srv = start_stub(Arc::clone(&captured));
    let backend = backend_for(&srv);

    let profile = CoachProfile {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        description: "Numbers and engines".to_string(),
        hourly_rate: Decimal::new(12000, 2),
        areas: vec!["backend".to_string()],
    };
    backend.put_coach("user-9", &profile).await.unwrap();

    let writes = captured.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["_key"], "user-9");
    assert_eq!(writes[0]["firstName"], "Ada");
    assert_eq!(writes[0]["hourlyRate"], "120.00");
    assert_eq!(writes[0]["areas"], json!(["backend"]));
}

#[actix_web::test]
async fn test_send_request_returns_generated_key() {
    let captured = Captured::default();
    let srv = start_stub(Arc::clone(&captured));
    let backend = backend_for(&srv);

    let key = backend
        .send_request(
            "c1",
            &RequestMessage {
                user_email: "visitor@example.com".to_string(),
                message: "Hello!".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(key, "-NGeneratedKey1");
    let writes = captured.lock().unwrap();
    assert_eq!(writes[0]["userEmail"], "visitor@example.com");
}

#[actix_web::test]
async fn test_fetch_requests_flattens_and_tags_coach_id() {
    let srv = start_stub(Captured::default());
    let backend = backend_for(&srv);

    let requests = backend.fetch_requests("c1").await.unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id, "r1");
    assert_eq!(requests[0].coach_id, "c1");
    assert_eq!(requests[0].user_email, "visitor@example.com");
}

#[actix_web::test]
async fn test_login_against_stub_persists_and_commits_session() {
    let srv = start_stub(Captured::default());
    let backend = Arc::new(backend_for(&srv));
    let storage = Arc::new(MemoryStorage::new());
    let service = SessionService::new(backend, Arc::clone(&storage));

    let before_ms = chrono::Utc::now().timestamp_millis();
    service.login(&credentials("correct-horse")).await.unwrap();
    let after_ms = chrono::Utc::now().timestamp_millis();

    assert_eq!(storage.get(TOKEN_KEY).await.unwrap().as_deref(), Some("T"));
    assert_eq!(storage.get(USER_ID_KEY).await.unwrap().as_deref(), Some("U"));
    let expiration: i64 = storage
        .get(TOKEN_EXPIRATION_KEY)
        .await
        .unwrap()
        .unwrap()
        .parse()
        .unwrap();
    assert!(expiration >= before_ms + 3_600_000);
    assert!(expiration <= after_ms + 3_600_000);

    let session = service.session().await.unwrap();
    assert_eq!(session.token, "T");
    assert_eq!(session.user_id, "U");
}
