pub mod cart;
pub mod config;
pub mod errors;
pub mod mailer;
pub mod models;
pub mod pagination;
pub mod schema;
pub mod session;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::env;

pub fn establish_connection() -> PgConnection {
    let database_url = env::var("DATABASE_URL").expect("env_err");
    PgConnection::establish(&database_url)
        .unwrap_or_else(|_| panic!("Error connecting to {}", database_url))
}
