use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::Identity;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::models::UserRow;
use crate::schema::users;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub role_id: i32,
}

impl From<UserRow> for UserResponse {
    fn from(u: UserRow) -> Self {
        Self {
            id: u.id,
            username: u.username,
            fullname: u.fullname,
            address: u.address,
            phone: u.phone,
            email: u.email,
            role_id: u.role_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(required(message = "Missing/invalid role ID"))]
    pub role_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteUserRequest {
    pub id: Option<i32>,
    pub username: Option<String>,
}

impl DeleteUserRequest {
    fn ensure_target(&self) -> Result<(), AppError> {
        if self.id.is_none() && self.username.is_none() {
            let mut errors = ValidationErrors::new();
            let mut error = ValidationError::new("required");
            error.message = Some("Either id or username must be provided".into());
            errors.add("id", error);
            return Err(AppError::Validation(errors));
        }
        Ok(())
    }
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/admin/details/{id}", web::get().to(get_user_by_id))
            .route("/admin/{id}/role", web::put().to(update_user_role))
            .route("/admin/delete", web::delete().to(delete_user))
            .route("/{username}/details", web::get().to(get_user_details)),
    );
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /user/{username}/details
///
/// Callers can only read their own profile.
#[utoipa::path(
    get,
    path = "/user/{username}/details",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Caller identity does not match the account"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn get_user_details(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    if identity.username != username {
        return Err(AppError::Unauthorized(
            "You can only view your own account".to_string(),
        ));
    }

    let row = web::block(move || {
        let mut conn = pool.get()?;
        let row = users::table
            .filter(users::username.eq(&username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(row)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "user_details": UserResponse::from(user)
        }))),
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}

/// GET /user/admin/details/{id}
#[utoipa::path(
    get,
    path = "/user/admin/details/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn get_user_by_id(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let user_id = path.into_inner();

    let row = web::block(move || {
        let mut conn = pool.get()?;
        let row = users::table
            .find(user_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(row)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "user_details": UserResponse::from(user)
        }))),
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}

/// PUT /user/admin/{id}/role
#[utoipa::path(
    put,
    path = "/user/admin/{id}/role",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn update_user_role(
    pool: web::Data<DbPool>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;
    let user_id = path.into_inner();

    let body = body.into_inner();
    body.validate()?;
    let role_id = body
        .role_id
        .ok_or_else(|| AppError::Internal("Validated request missing fields".to_string()))?;

    let affected = web::block(move || {
        let mut conn = pool.get()?;
        let affected = diesel::update(users::table.find(user_id))
            .set(users::role_id.eq(role_id))
            .execute(&mut conn)?;
        Ok::<_, AppError>(affected)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match affected {
        0 => Err(AppError::NotFound("User not found".to_string())),
        _ => Ok(HttpResponse::Ok().json(json!({ "message": "User role updated" }))),
    }
}

/// DELETE /user/admin/delete
///
/// Deletes by id when given, otherwise by username.
#[utoipa::path(
    delete,
    path = "/user/admin/delete",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Missing credentials or not an administrator"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    pool: web::Data<DbPool>,
    identity: Identity,
    body: web::Json<DeleteUserRequest>,
) -> Result<HttpResponse, AppError> {
    identity.require_admin()?;

    let body = body.into_inner();
    body.ensure_target()?;

    let affected = web::block(move || {
        let mut conn = pool.get()?;
        let affected = match (body.id, body.username) {
            (Some(id), _) => diesel::delete(users::table.find(id)).execute(&mut conn)?,
            (None, Some(username)) => {
                diesel::delete(users::table.filter(users::username.eq(username)))
                    .execute(&mut conn)?
            }
            (None, None) => 0,
        };
        Ok::<_, AppError>(affected)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match affected {
        0 => Err(AppError::NotFound("User not found".to_string())),
        _ => Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" }))),
    }
}
