use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use anyhow::anyhow;
use async_trait::async_trait;
use enduser_api::application::service::UserService;
use enduser_api::data::memory::InMemoryUserRepository;
use enduser_api::domain::repository::UserRepository;
use enduser_api::domain::user::{EndUser, NewEndUser};
use enduser_api::presentation::handlers::{AppState, Envelope};
use enduser_api::presentation::middleware::{
    REQUEST_ID_HEADER, RESPONSE_TIME_HEADER, RequestLogMiddleware,
};
use enduser_api::presentation::routes;
use std::sync::Arc;

macro_rules! setup_enduser_test {
    () => {{
        let repository = InMemoryUserRepository::new();
        let state = web::Data::new(AppState {
            service: UserService::new(Arc::new(repository)),
        });

        test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(RequestLogMiddleware)
                .configure(routes::configure),
        )
        .await
    }};
}

fn random_user() -> NewEndUser {
    let id = fastrand::i32(1..100_000);
    NewEndUser {
        id: Some(id),
        email: format!("ronald{}@gmail.com", id),
        password: "randompass".to_string(),
    }
}

fn failure(message: &str) -> Envelope {
    Envelope::failure(message)
}

#[actix_web::test]
async fn test_create_duplicate_email_conflicts_and_keeps_original() {
    let app = setup_enduser_test!();
    let original = NewEndUser {
        id: Some(10),
        email: "somebody@gmail.com".to_string(),
        password: "something".to_string(),
    };

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_json(&original)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_json(&NewEndUser {
            id: Some(11),
            email: "somebody@gmail.com".to_string(),
            password: "other".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user already exists"));

    let req = test::TestRequest::get()
        .uri("/enduser/somebody@gmail.com")
        .to_request();
    let user: EndUser = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user.id, 10);
    assert_eq!(user.password, "something");
}

#[actix_web::test]
async fn test_create_with_malformed_json_is_bad_request() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::post()
        .uri("/enduser")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"email": "broken@x.com", "password": "#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("Invalid data given"));
}

#[actix_web::test]
async fn test_create_without_email_is_bad_request() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_payload(r#"{"id": 3, "password": "p"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_without_id_assigns_one() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_payload(r#"{"email": "noid@x.com", "password": "p"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/enduser/noid@x.com").to_request();
    let user: EndUser = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user.id, 1);
}

#[actix_web::test]
async fn test_read_nonexistent_user_is_not_found() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::get()
        .uri("/enduser/notanyonehere@gmail.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user not found"));
}

#[actix_web::test]
async fn test_update_ignores_fields_other_than_password() {
    let app = setup_enduser_test!();
    let user = random_user();

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_json(&user)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/enduser/{}", user.email))
        .set_payload(r#"{"password": "pass42", "email": "hijack@x.com", "id": 1}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/enduser/{}", user.email))
        .to_request();
    let stored: EndUser = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored.password, "pass42");
    assert_eq!(Some(stored.id), user.id);
    assert_eq!(stored.email, user.email);
}

#[actix_web::test]
async fn test_update_nonexistent_user_is_not_found() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::put()
        .uri("/enduser/adfsdfsad@gmail.com")
        .set_payload(r#"{"password": "pass1"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user not found"));
}

#[actix_web::test]
async fn test_update_with_bad_body_prefers_not_found_for_missing_user() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::put()
        .uri("/enduser/ghost@x.com")
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_with_bad_body_is_bad_request_for_existing_user() {
    let app = setup_enduser_test!();
    let user = random_user();

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_json(&user)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/enduser/{}", user.email))
        .set_payload(r#"{"pass": "missing field"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("Invalid data given"));

    let req = test::TestRequest::get()
        .uri(&format!("/enduser/{}", user.email))
        .to_request();
    let stored: EndUser = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored.password, "randompass");
}

#[actix_web::test]
async fn test_delete_nonexistent_user_is_not_found() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::delete()
        .uri("/enduser/nobody@gmail.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user not found"));
}

#[actix_web::test]
async fn test_delete_twice_second_is_not_found() {
    let app = setup_enduser_test!();
    let user = random_user();

    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_json(&user)
        .to_request();
    test::call_service(&app, req).await;

    let uri = format!("/enduser/{}", user.email);
    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_error_responses_carry_tracing_headers() {
    let app = setup_enduser_test!();

    let req = test::TestRequest::get()
        .uri("/enduser/missing@x.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    assert!(resp.headers().contains_key(RESPONSE_TIME_HEADER));
}

struct UnreachableRepository;

#[async_trait]
impl UserRepository for UnreachableRepository {
    async fn insert_user(&self, _user: NewEndUser) -> anyhow::Result<EndUser> {
        Err(anyhow!("connection reset"))
    }

    async fn find_user_by_email(&self, _email: &str) -> anyhow::Result<Option<EndUser>> {
        Err(anyhow!("connection reset"))
    }

    async fn update_password(&self, _email: &str, _password: &str) -> anyhow::Result<bool> {
        Err(anyhow!("connection reset"))
    }

    async fn delete_user(&self, _email: &str) -> anyhow::Result<bool> {
        Err(anyhow!("connection reset"))
    }
}

#[actix_web::test]
async fn test_store_failures_map_to_conflict_and_not_found() {
    let state = web::Data::new(AppState {
        service: UserService::new(Arc::new(UnreachableRepository)),
    });
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure),
    )
    .await;

    // Any failed insert reads as a taken email
    let req = test::TestRequest::post()
        .uri("/enduser")
        .set_json(&random_user())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user already exists"));

    // Failed lookups and conditional statements read as a missing row
    let req = test::TestRequest::get().uri("/enduser/a@x.com").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user not found"));

    let req = test::TestRequest::put()
        .uri("/enduser/a@x.com")
        .set_payload(r#"{"password": "p2"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/enduser/a@x.com")
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri("/enduser/a@x.com").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Envelope = test::read_body_json(resp).await;
    assert_eq!(body, failure("user not found"));
}
