use commerce_service::{build_server, create_pool, run_migrations, DEFAULT_POOL_SIZE};
use dotenvy::dotenv;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let pool_size: u32 = env::var("DATABASE_POOL_SIZE")
        .unwrap_or_else(|_| DEFAULT_POOL_SIZE.to_string())
        .parse()
        .expect("DATABASE_POOL_SIZE must be a valid number");

    let pool = create_pool(&database_url, pool_size);
    run_migrations(&pool);

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(pool, &jwt_secret, &host, port)?.await
}
