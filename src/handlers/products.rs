use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Identity;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::models::{NewProductRow, ProductRow};
use crate::schema::products;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    #[validate(
        required(message = "Missing/invalid product name"),
        length(min = 1, message = "Missing/invalid product name")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(
        required(message = "Missing/invalid product price"),
        range(min = 0, message = "Missing/invalid product price")
    )]
    pub price: Option<i32>,
    #[validate(
        required(message = "Missing/invalid product stock"),
        range(min = 0, message = "Missing/invalid product stock")
    )]
    pub stock: Option<i32>,
    #[validate(
        required(message = "Missing/invalid picture URL"),
        url(message = "Missing/invalid picture URL")
    )]
    pub picture: Option<String>,
}

impl ProductRequest {
    fn into_row(self) -> Option<NewProductRow> {
        Some(NewProductRow {
            name: self.name?,
            description: self.description,
            price: self.price?,
            stock: self.stock?,
            picture: self.picture?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i32,
    pub stock: i32,
    pub picture: String,
}

impl From<ProductRow> for ProductResponse {
    fn from(p: ProductRow) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            stock: p.stock,
            picture: p.picture,
        }
    }
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/delete/{id}", web::delete().to(delete_product))
            .route("/{id}", web::get().to(get_product))
            .route("/{id}", web::put().to(update_product)),
    );
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Public listing of products currently in stock.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "In-stock products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows = products::table
            .filter(products::stock.gt(0))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let product_id = path.into_inner();

    let row = web::block(move || {
        let mut conn = pool.get()?;
        let row = products::table
            .find(product_id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(row)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound("Product not found".to_string())),
    }
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product created"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    identity: Identity,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;

    let body = body.into_inner();
    body.validate()?;
    let row = body
        .into_row()
        .ok_or_else(|| AppError::Internal("Validated request missing fields".to_string()))?;

    let id = web::block(move || {
        let mut conn = pool.get()?;
        let id: i32 = diesel::insert_into(products::table)
            .values(&row)
            .returning(products::id)
            .get_result(&mut conn)?;
        Ok::<_, AppError>(id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "id": id, "message": "Product created" })))
}

/// PUT /products/{id}
///
/// Full update; not-found is decided by the matched-row count.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let product_id = path.into_inner();

    let body = body.into_inner();
    body.validate()?;
    let changes = body
        .into_row()
        .ok_or_else(|| AppError::Internal("Validated request missing fields".to_string()))?;

    let affected = web::block(move || {
        let mut conn = pool.get()?;
        let affected = diesel::update(products::table.find(product_id))
            .set(&changes)
            .execute(&mut conn)?;
        Ok::<_, AppError>(affected)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match affected {
        0 => Err(AppError::NotFound("Product not found".to_string())),
        _ => Ok(HttpResponse::Ok().json(json!({ "message": "Product updated" }))),
    }
}

/// DELETE /products/delete/{id}
#[utoipa::path(
    delete,
    path = "/products/delete/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let product_id = path.into_inner();

    let affected = web::block(move || {
        let mut conn = pool.get()?;
        let affected = diesel::delete(products::table.find(product_id)).execute(&mut conn)?;
        Ok::<_, AppError>(affected)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match affected {
        0 => Err(AppError::NotFound("Product not found".to_string())),
        _ => Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted" }))),
    }
}
