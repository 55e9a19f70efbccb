pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
#[doc(hidden)]
pub mod testing;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use auth::AuthKeys;
use domain::ports::SharedOrderRepo;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool, DEFAULT_POOL_SIZE};

/// The order service as wired in production: the diesel repository behind the
/// repository trait object.
pub type AppOrderService = OrderService<SharedOrderRepo>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::get_order_detail,
        handlers::orders::create_order,
        handlers::orders::create_client_order,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::users::get_user_details,
        handlers::users::get_user_by_id,
        handlers::users::update_user_role,
        handlers::users::delete_user,
    ),
    components(schemas(
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateClientOrderRequest,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::OrderSummaryResponse,
        handlers::orders::ListOrdersResponse,
        handlers::orders::ProductLineResponse,
        handlers::orders::OrderDetailResponse,
        handlers::orders::UserDetailsResponse,
        handlers::orders::LineItemResponse,
        handlers::orders::ClientOrderDetails,
        handlers::orders::ClientOrderResponse,
        handlers::products::ProductRequest,
        handlers::products::ProductResponse,
        handlers::users::UserResponse,
        handlers::users::UpdateRoleRequest,
        handlers::users::DeleteUserRequest,
    )),
    tags(
        (name = "orders", description = "Order placement and lifecycle"),
        (name = "products", description = "Product catalog"),
        (name = "users", description = "User administration"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    jwt_secret: &str,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let repo: SharedOrderRepo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let service = web::Data::new(OrderService::new(repo));
    let pool = web::Data::new(pool);
    let auth_keys = web::Data::new(AuthKeys::new(jwt_secret));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(service.clone())
            .app_data(auth_keys.clone())
            .wrap(Logger::default())
            .configure(handlers::orders::routes)
            .configure(handlers::products::routes)
            .configure(handlers::users::routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
