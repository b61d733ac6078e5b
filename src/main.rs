mod controllers {
    pub mod cart;
    pub mod categories;
    pub mod functions;
    pub mod orders;
    pub mod pages;
    pub mod products;
}
mod insertables;
use actix_web::{web, App, HttpServer};
use controllers::cart;
use controllers::categories;
use controllers::orders;
use controllers::pages;
use controllers::products;
use diesel::{r2d2, PgConnection};
use dotenvy::dotenv;
use rust_shop_api::config::MailConfig;
use rust_shop_api::mailer::OrderMailer;
use rust_shop_api::session::CartStore;
use std::env;
use tracing_subscriber::EnvFilter;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;
use r2d2_redis::{r2d2 as redis_r2d2, RedisConnectionManager};
type RedisPool = redis_r2d2::Pool<RedisConnectionManager>;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let db_pool = initialize_db_pool();
    let cart_store = CartStore::new(initialize_redis_pool());
    let mailer = OrderMailer::new(MailConfig::from_env()).expect("Mailer Error");
    tracing::info!("starting storefront api");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(cart_store.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .service(products::get_products)
            // fixed product routes go before the slug catch-all
            .service(products::get_featured_products)
            .service(products::get_new_arrivals)
            .service(products::get_product)
            .service(products::search_products)
            .service(categories::get_categories)
            .service(cart::view_cart)
            .service(cart::add_to_cart)
            .service(cart::update_cart_item)
            .service(cart::remove_cart_item)
            .service(cart::clear_cart)
            .service(orders::checkout)
            .service(orders::get_order)
            .service(pages::get_page)
    })
    .bind((
        "127.0.0.1",
        env::var("PORT")
            .expect("env_err")
            .parse::<u16>()
            .expect("parse_err"),
    ))?
    .run()
    .await
}

fn initialize_db_pool() -> DbPool {
    let conn_spec = std::env::var("DATABASE_URL").expect("Variable not defined");
    let manager = r2d2::ConnectionManager::<PgConnection>::new(conn_spec);
    r2d2::Pool::builder().build(manager).expect("DB Error")
}

fn initialize_redis_pool() -> RedisPool {
    let conn_spec =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_owned());
    let manager = RedisConnectionManager::new(conn_spec).expect("Redis URL Error");
    redis_r2d2::Pool::builder().build(manager).expect("Redis Error")
}
