use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::cache::{ObjectCache, object_cache::moka::MokaCacheWrapper};
use crate::grading::{GradingEngine, GradingPolicy};
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::hash_password;
use crate::utils::{json_error_handler, query_error_handler};

macro_rules! test_app {
    ($storage:expr, $engine:expr) => {{
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_capacity(100, 60));
        test::init_service(
            App::new()
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new(cache))
                .app_data(web::Data::new($engine.clone()))
                .configure(super::configure_auth_routes)
                .configure(super::configure_user_routes)
                .configure(super::configure_grading_routes),
        )
        .await
    }};
}

async fn state() -> (Arc<dyn Storage>, Arc<GradingEngine>) {
    let storage: Arc<dyn Storage> = Arc::new(
        SeaOrmStorage::in_memory()
            .await
            .expect("in-memory storage should start"),
    );
    let engine = Arc::new(GradingEngine::new(storage.clone(), GradingPolicy::default()));
    (storage, engine)
}

async fn user(storage: &Arc<dyn Storage>, username: &str, role: UserRole, password: &str) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password: hash_password(password).unwrap(),
            role,
            display_name: None,
        })
        .await
        .unwrap()
}

fn bearer(user: &User) -> (&'static str, String) {
    let token = JwtUtils::generate_access_token(user.id, &user.role.to_string()).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_login_and_me() {
    let (storage, engine) = state().await;
    user(&storage, "admin", UserRole::Admin, "Secret123!").await;
    let app = test_app!(storage, engine);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "admin", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "admin", "password": "Secret123!"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    assert!(body["data"]["user"].get("password_hash").is_none());

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user"]["username"], "admin");
    assert_eq!(body["data"]["user"]["role"], "admin");
}

#[actix_web::test]
async fn test_role_enforcement() {
    let (storage, engine) = state().await;
    let examiner = user(&storage, "alice", UserRole::Examiner, "Secret123!").await;
    let app = test_app!(storage, engine);

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/stats")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/stats")
        .insert_header(bearer(&examiner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer(&examiner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/my-assignments")
        .insert_header(bearer(&examiner))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_block_validation_and_errors() {
    let (storage, engine) = state().await;
    let admin = user(&storage, "admin", UserRole::Admin, "Secret123!").await;
    let app = test_app!(storage, engine);

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/blocks")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "block_code": "bad code!",
            "subject_id": 1,
            "exam_id": 1,
            "question_number": 1,
            "max_score": 10.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let create = || {
        test::TestRequest::post()
            .uri("/api/v1/grading/blocks")
            .insert_header(bearer(&admin))
            .set_json(json!({
                "block_code": "B-001",
                "subject_id": 1,
                "exam_id": 1,
                "question_number": 1,
                "max_score": 10.0
            }))
            .to_request()
    };
    let resp = test::call_service(&app, create()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = test::call_service(&app, create()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/compare/B-404")
        .insert_header(bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/compare/B-001")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "PENDING");
    assert!(body["data"]["final_score"].is_null());

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/approve/B-001")
        .insert_header(bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/assignments")
        .insert_header(bearer(&admin))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_full_grading_flow() {
    let (storage, engine) = state().await;
    let admin = user(&storage, "admin", UserRole::Admin, "Secret123!").await;
    let alice = user(&storage, "alice", UserRole::Examiner, "Secret123!").await;
    let bob = user(&storage, "bob", UserRole::Examiner, "Secret123!").await;
    let app = test_app!(storage, engine);

    for examiner in [&alice, &bob] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/subjects", examiner.id))
            .insert_header(bearer(&admin))
            .set_json(json!({"subject_id": 7}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/blocks")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "block_code": "ESSAY-1",
            "subject_id": 7,
            "exam_id": 3,
            "question_number": 2,
            "max_score": 20.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/assignments/auto-assign")
        .insert_header(bearer(&admin))
        .set_json(json!({"block_codes": ["ESSAY-1", "MISSING"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["succeeded"], 1);
    assert_eq!(body["data"]["failed"], 1);
    let assignments = body["data"]["results"][0]["assignments"].as_array().unwrap().clone();
    assert_eq!(assignments.len(), 2);

    for (assignment, score) in assignments.iter().zip([14.0, 14.5]) {
        let owner = if assignment["examiner_id"] == alice.id { &alice } else { &bob };
        let req = test::TestRequest::post()
            .uri("/api/v1/grading/results")
            .insert_header(bearer(owner))
            .set_json(json!({
                "assignment_id": assignment["id"],
                "score": score,
                "comments": "clear argument"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/compare/ESSAY-1")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "MATCHED");
    assert_eq!(body["data"]["final_score"], 14.25);
    assert_eq!(body["data"]["approved"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/assign-third-round/ESSAY-1")
        .insert_header(bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/approve/ESSAY-1")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["final_score"], 14.25);
    assert_eq!(body["data"]["overridden"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/grading/approve/ESSAY-1")
        .insert_header(bearer(&admin))
        .set_json(json!({"final_score": 15.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/grading/stats")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["blocks"]["approved"], 1);
    assert_eq!(body["data"]["assignments"]["completed"], 2);
}
