use actix_web::{get, web, HttpResponse, Responder, Result};
use diesel::{prelude::*, r2d2};
use rust_shop_api::errors::ShopError;
use rust_shop_api::models::Category;
use rust_shop_api::schema::categories;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

pub fn get_active_categories(conn: &mut PgConnection) -> Result<Vec<Category>, ShopError> {
    let active = categories::table
        .filter(categories::is_active.eq(true))
        .order(categories::name.asc())
        .select(Category::as_select())
        .load(conn)?;
    Ok(active)
}

#[get("/api/categories")]
async fn get_categories(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let all_categories = web::block(move || {
        let mut conn = pool.get()?;
        get_active_categories(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(all_categories))
}
