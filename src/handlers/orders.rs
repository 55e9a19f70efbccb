use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Identity;
use crate::domain::order::{NewOrderRecord, OrderDetail, OrderSummary, PlacedOrder, UserProfile};
use crate::errors::AppError;
use crate::AppOrderService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(required(message = "Missing/invalid user ID"))]
    pub user_id: Option<i32>,
    #[validate(required(message = "Missing/invalid payment method ID"))]
    pub payment_method_id: Option<i32>,
    #[validate(required(message = "Missing/invalid status ID"))]
    pub status_id: Option<i32>,
    /// Raw product-reference list; repeats encode quantity.
    #[validate(
        required(message = "Missing/invalid order products IDs"),
        length(min = 1, message = "Order must reference at least one product")
    )]
    pub order_products_id: Option<Vec<i32>>,
}

impl CreateOrderRequest {
    fn into_record(self) -> Option<NewOrderRecord> {
        Some(NewOrderRecord {
            user_id: self.user_id?,
            payment_method_id: self.payment_method_id?,
            status_id: Some(self.status_id?),
            product_refs: self.order_products_id?,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientOrderRequest {
    #[validate(required(message = "Missing/invalid payment method ID"))]
    pub payment_method_id: Option<i32>,
    #[validate(
        required(message = "Missing/invalid order products IDs"),
        length(min = 1, message = "Order must reference at least one product")
    )]
    pub order_products_id: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(required(message = "Missing/invalid status ID"))]
    pub status_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: i32,
    pub placed_at: String,
    pub username: String,
    pub address: String,
    pub payment_method: String,
    pub status: String,
    pub products: Vec<String>,
    pub total_price: i64,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(s: OrderSummary) -> Self {
        Self {
            id: s.id,
            placed_at: s.placed_at.to_rfc3339(),
            username: s.username,
            address: s.address,
            payment_method: s.payment_method,
            status: s.status,
            products: s.products,
            total_price: s.total_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderSummaryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductLineResponse {
    pub name: String,
    pub unit_price: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub payment_method: String,
    pub status: String,
    pub products: Vec<ProductLineResponse>,
    pub total_price: i64,
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(d: OrderDetail) -> Self {
        Self {
            id: d.id,
            username: d.username,
            fullname: d.fullname,
            address: d.address,
            phone: d.phone,
            email: d.email,
            payment_method: d.payment_method,
            status: d.status,
            products: d
                .lines
                .into_iter()
                .map(|l| ProductLineResponse {
                    name: l.name,
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                })
                .collect(),
            total_price: d.total_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailsResponse {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl From<UserProfile> for UserDetailsResponse {
    fn from(u: UserProfile) -> Self {
        Self {
            id: u.id,
            username: u.username,
            fullname: u.fullname,
            address: u.address,
            phone: u.phone,
            email: u.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientOrderDetails {
    pub user_details: UserDetailsResponse,
    pub payment_method_id: i32,
    pub order_products: Vec<LineItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientOrderResponse {
    pub id: i32,
    pub message: String,
    pub order_details: ClientOrderDetails,
}

fn line_item_responses(placed: &PlacedOrder) -> Vec<LineItemResponse> {
    placed
        .line_items
        .iter()
        .map(|item| LineItemResponse {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect()
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(create_order))
            .route("/status/{id}", web::put().to(update_order_status))
            .route("/delete/{id}", web::delete().to(delete_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/detail", web::get().to(get_order_detail))
            .route("/{username}/create", web::post().to(create_client_order)),
    );
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Returns summaries of every order: who placed it, how it is paid, its
/// status, the product names and the total price.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = ListOrdersResponse),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<AppOrderService>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;

    let service = service.get_ref().clone();
    let summaries = web::block(move || service.list_orders())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        orders: summaries.into_iter().map(Into::into).collect(),
    }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderSummaryResponse),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    identity: Identity,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let order_id = path.into_inner();

    let service = service.get_ref().clone();
    let summary = web::block(move || service.order_summary(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderSummaryResponse::from(summary)))
}

/// GET /orders/{id}/detail
///
/// Full order detail including the buyer's contact data and per-line prices.
#[utoipa::path(
    get,
    path = "/orders/{id}/detail",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail", body = OrderDetailResponse),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_detail(
    service: web::Data<AppOrderService>,
    identity: Identity,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let order_id = path.into_inner();

    let service = service.get_ref().clone();
    let detail = web::block(move || service.order_detail(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderDetailResponse::from(detail)))
}

/// POST /orders
///
/// Admin-placed order for an arbitrary user, with an explicit status. The
/// user and every referenced product must exist before anything is written;
/// the header and line items are then inserted atomically.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "User or product not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    identity: Identity,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;

    let body = body.into_inner();
    body.validate()?;
    let record = body
        .into_record()
        .ok_or_else(|| AppError::Internal("Validated request missing fields".to_string()))?;

    let service = service.get_ref().clone();
    let placed = web::block(move || service.place_order(record))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "id": placed.id,
        "message": "Order placed"
    })))
}

/// POST /orders/{username}/create
///
/// Client-placed order for the caller's own account. The authenticated
/// username must match the path; otherwise the request is rejected before
/// any read or write. The order status takes the schema default.
#[utoipa::path(
    post,
    path = "/orders/{username}/create",
    params(("username" = String, Path, description = "Account the order is placed for")),
    request_body = CreateClientOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = ClientOrderResponse),
        (status = 401, description = "Caller identity does not match the account"),
        (status = 404, description = "User or product not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_client_order(
    service: web::Data<AppOrderService>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CreateClientOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();

    let body = body.into_inner();
    body.validate()?;
    let (Some(payment_method_id), Some(product_refs)) =
        (body.payment_method_id, body.order_products_id)
    else {
        return Err(AppError::Internal(
            "Validated request missing fields".to_string(),
        ));
    };

    let caller = identity.username.clone();
    let service = service.get_ref().clone();
    let (user, placed) = web::block(move || {
        service.place_order_for(&caller, &username, payment_method_id, product_refs)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let order_products = line_item_responses(&placed);
    Ok(HttpResponse::Ok().json(ClientOrderResponse {
        id: placed.id,
        message: "Order placed".to_string(),
        order_details: ClientOrderDetails {
            user_details: user.into(),
            payment_method_id,
            order_products,
        },
    }))
}

/// PUT /orders/status/{id}
///
/// Not-found is decided by the update's matched-row count.
#[utoipa::path(
    put,
    path = "/orders/status/{id}",
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<AppOrderService>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let order_id = path.into_inner();

    let body = body.into_inner();
    body.validate()?;
    let status_id = body
        .status_id
        .ok_or_else(|| AppError::Internal("Validated request missing fields".to_string()))?;

    let service = service.get_ref().clone();
    web::block(move || service.update_status(order_id, status_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Order status updated" })))
}

/// DELETE /orders/delete/{id}
///
/// Archives the order row, then removes its line items and the order itself,
/// all in one transaction.
#[utoipa::path(
    delete,
    path = "/orders/delete/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<AppOrderService>,
    identity: Identity,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let order_id = path.into_inner();

    let service = service.get_ref().clone();
    web::block(move || service.delete_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Order deleted" })))
}
