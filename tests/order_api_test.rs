//! HTTP-level tests for the order endpoints, running the real handlers and
//! auth extractor against an in-memory repository.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use commerce_service::application::order_service::OrderService;
use commerce_service::auth::AuthKeys;
use commerce_service::domain::ports::SharedOrderRepo;
use commerce_service::handlers;
use commerce_service::testing::MemoryRepo;

const SECRET: &str = "integration-test-secret";
const ADMIN_ROLE: i32 = 1;
const CLIENT_ROLE: i32 = 2;

// ── Test harness ─────────────────────────────────────────────────────────────

/// App data for a test instance of the order routes. Build the app inline:
///
/// ```ignore
/// let (service, keys_data, keys) = test_state(repo);
/// let app = test::init_service(
///     App::new().app_data(service).app_data(keys_data).configure(handlers::orders::routes),
/// ).await;
/// ```
fn test_state(
    repo: MemoryRepo,
) -> (
    web::Data<OrderService<SharedOrderRepo>>,
    web::Data<AuthKeys>,
    AuthKeys,
) {
    let shared: SharedOrderRepo = Arc::new(repo);
    (
        web::Data::new(OrderService::new(shared)),
        web::Data::new(AuthKeys::new(SECRET)),
        AuthKeys::new(SECRET),
    )
}

macro_rules! order_app {
    ($repo:expr) => {{
        let (service, keys_data, keys) = test_state($repo);
        let app = test::init_service(
            App::new()
                .app_data(service)
                .app_data(keys_data)
                .configure(handlers::orders::routes),
        )
        .await;
        (app, keys)
    }};
}

fn bearer(keys: &AuthKeys, username: &str, role: i32) -> (&'static str, String) {
    let token = keys.issue(username, role).expect("issue token");
    ("Authorization", format!("Bearer {token}"))
}

async fn body_json(resp: ServiceResponse<impl MessageBody>) -> Value {
    let bytes = test::read_body(resp).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[actix_web::test]
async fn client_order_for_other_account_is_unauthorized_and_writes_nothing() {
    let repo = MemoryRepo::new().with_user(1, "alice").with_products(&[1]);
    let (app, keys) = order_app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/orders/alice/create")
        .insert_header(bearer(&keys, "bob", CLIENT_ROLE))
        .set_json(json!({ "payment_method_id": 1, "order_products_id": [1] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(repo.order_count(), 0);
}

#[actix_web::test]
async fn admin_order_with_unknown_product_is_not_found_and_writes_nothing() {
    let repo = MemoryRepo::new().with_user(1, "alice").with_products(&[1]);
    let (app, keys) = order_app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({
            "user_id": 1,
            "payment_method_id": 1,
            "status_id": 1,
            "order_products_id": [1, 999]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(repo.order_count(), 0);
}

#[actix_web::test]
async fn admin_order_with_unknown_user_is_not_found() {
    let repo = MemoryRepo::new().with_products(&[1]);
    let (app, keys) = order_app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({
            "user_id": 42,
            "payment_method_id": 1,
            "status_id": 1,
            "order_products_id": [1]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(repo.order_count(), 0);
}

#[actix_web::test]
async fn missing_fields_are_unprocessable() {
    let repo = MemoryRepo::new();
    let (app, keys) = order_app!(repo);

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({ "payment_method_id": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert!(body["fields"]["user_id"].is_array());
}

#[actix_web::test]
async fn non_admin_cannot_use_admin_create() {
    let repo = MemoryRepo::new().with_user(1, "alice").with_products(&[1]);
    let (app, keys) = order_app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "alice", CLIENT_ROLE))
        .set_json(json!({
            "user_id": 1,
            "payment_method_id": 1,
            "status_id": 1,
            "order_products_id": [1]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(repo.order_count(), 0);
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let (app, _keys) = order_app!(MemoryRepo::new());

    let req = test::TestRequest::get().uri("/orders").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn client_order_expands_repeated_refs_into_quantities() {
    let repo = MemoryRepo::new()
        .with_user(1, "alice")
        .with_products(&[3, 7]);
    let (app, keys) = order_app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/orders/alice/create")
        .insert_header(bearer(&keys, "alice", CLIENT_ROLE))
        .set_json(json!({ "payment_method_id": 2, "order_products_id": [7, 7, 3, 7] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["order_details"]["user_details"]["username"], "alice");
    assert_eq!(
        body["order_details"]["order_products"],
        json!([
            { "product_id": 7, "quantity": 3 },
            { "product_id": 3, "quantity": 1 }
        ])
    );

    let orders = repo.orders();
    assert_eq!(orders[0].record.status_id, None);
    let total: i32 = orders[0].items.iter().map(|i| i.quantity).sum();
    assert_eq!(total, 4);
}

#[actix_web::test]
async fn status_update_of_missing_order_is_not_found() {
    let (app, keys) = order_app!(MemoryRepo::new());

    let req = test::TestRequest::put()
        .uri("/orders/status/99")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({ "status_id": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_archives_and_then_reports_not_found() {
    let repo = MemoryRepo::new().with_user(1, "alice").with_products(&[1]);
    let (app, keys) = order_app!(repo.clone());

    let create = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({
            "user_id": 1,
            "payment_method_id": 1,
            "status_id": 1,
            "order_products_id": [1, 1]
        }))
        .to_request();
    let resp = test::call_service(&app, create).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let id = body_json(resp).await["id"].as_i64().expect("order id");

    let delete = test::TestRequest::delete()
        .uri(&format!("/orders/delete/{id}"))
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .to_request();
    let resp = test::call_service(&app, delete).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(repo.orders().is_empty());
    let archived = repo.archived();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].record.product_refs, vec![1, 1]);

    let delete_again = test::TestRequest::delete()
        .uri(&format!("/orders/delete/{id}"))
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .to_request();
    let resp = test::call_service(&app, delete_again).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_can_fetch_order_summary() {
    let repo = MemoryRepo::new().with_user(1, "alice").with_products(&[5]);
    let (app, keys) = order_app!(repo);

    let create = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({
            "user_id": 1,
            "payment_method_id": 1,
            "status_id": 1,
            "order_products_id": [5]
        }))
        .to_request();
    let resp = test::call_service(&app, create).await;
    let id = body_json(resp).await["id"].as_i64().expect("order id");

    let get = test::TestRequest::get()
        .uri(&format!("/orders/{id}"))
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .to_request();
    let resp = test::call_service(&app, get).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["username"], "alice");
}

#[actix_web::test]
async fn admin_can_fetch_order_detail_with_lines_and_total() {
    let repo = MemoryRepo::new()
        .with_user(1, "alice")
        .with_priced_product(7, "burger", 350)
        .with_priced_product(3, "fries", 150);
    let (app, keys) = order_app!(repo);

    let create = test::TestRequest::post()
        .uri("/orders")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .set_json(json!({
            "user_id": 1,
            "payment_method_id": 1,
            "status_id": 1,
            "order_products_id": [7, 7, 3]
        }))
        .to_request();
    let resp = test::call_service(&app, create).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let id = body_json(resp).await["id"].as_i64().expect("order id");

    let get = test::TestRequest::get()
        .uri(&format!("/orders/{id}/detail"))
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .to_request();
    let resp = test::call_service(&app, get).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;

    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(
        body["products"],
        json!([
            { "name": "burger", "unit_price": 350, "quantity": 2 },
            { "name": "fries", "unit_price": 150, "quantity": 1 }
        ])
    );
    assert_eq!(body["total_price"], 2 * 350 + 150);
}

#[actix_web::test]
async fn order_detail_of_missing_order_is_not_found() {
    let (app, keys) = order_app!(MemoryRepo::new());

    let req = test::TestRequest::get()
        .uri("/orders/99/detail")
        .insert_header(bearer(&keys, "root", ADMIN_ROLE))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
