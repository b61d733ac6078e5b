use crate::controllers::functions::{self, CatalogQuery};
use actix_web::{get, web, HttpResponse, Responder, Result};
use chrono::{Duration, Utc};
use diesel::{prelude::*, r2d2};
use rust_decimal::Decimal;
use rust_shop_api::errors::ShopError;
use rust_shop_api::models::{Category, Product, ProductImage, ProductReview, ProductSize, Size};
use rust_shop_api::schema::{product_images, product_reviews, product_sizes, products, sizes};
use serde::{Deserialize, Serialize};

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

const NEW_ARRIVAL_DAYS: i64 = 30;

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub category: Option<Category>,
    pub page: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Serialize)]
pub struct SizeOption {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub is_on_sale: bool,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub sku: Option<String>,
}

#[derive(Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub is_on_sale: bool,
    pub discount_percentage: Decimal,
    pub sizes: Vec<SizeOption>,
    pub images: Vec<ProductImage>,
    pub related_products: Vec<Product>,
    pub reviews: Vec<ProductReview>,
    pub avg_rating: Decimal,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub products: Vec<Product>,
    pub search_query: String,
    pub results_count: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Detail view: all size variants (in stock or not) with effective prices,
/// images main-first, related products, approved reviews and their average.
pub fn get_product_detail(conn: &mut PgConnection, slug: &str) -> Result<ProductDetail, ShopError> {
    let product: Product = products::table
        .filter(products::slug.eq(slug))
        .filter(products::is_active.eq(true))
        .select(Product::as_select())
        .first(conn)
        .optional()?
        .ok_or(ShopError::NotFound("product"))?;

    let size_rows: Vec<(ProductSize, Size)> = product_sizes::table
        .inner_join(sizes::table)
        .filter(product_sizes::product_id.eq(product.id))
        .order(sizes::code.asc())
        .select((ProductSize::as_select(), Size::as_select()))
        .load(conn)?;
    let size_options = size_rows
        .into_iter()
        .map(|(product_size, size)| SizeOption {
            id: product_size.id,
            code: size.code,
            name: size.name,
            price: product_size.final_price(&product),
            old_price: product_size.final_old_price(&product),
            is_on_sale: product_size.is_on_sale(&product),
            in_stock: product_size.in_stock,
            stock_quantity: product_size.stock_quantity,
            sku: product_size.sku,
        })
        .collect();

    let images = ProductImage::belonging_to(&product)
        .order((product_images::is_main.desc(), product_images::created_at.asc()))
        .select(ProductImage::as_select())
        .load(conn)?;

    let reviews = ProductReview::belonging_to(&product)
        .filter(product_reviews::is_approved.eq(true))
        .order(product_reviews::created_at.desc())
        .select(ProductReview::as_select())
        .load(conn)?;

    let avg_rating = functions::average_rating(conn, product.id)?;
    let related_products = functions::related_products(conn, &product)?;
    let is_on_sale = product.is_on_sale();
    let discount_percentage = product.discount_percentage();

    Ok(ProductDetail {
        product,
        is_on_sale,
        discount_percentage,
        sizes: size_options,
        images,
        related_products,
        reviews,
        avg_rating,
    })
}

pub fn get_featured_list(conn: &mut PgConnection) -> Result<Vec<Product>, ShopError> {
    let featured = functions::visible_products()
        .filter(products::is_featured.eq(true))
        .load(conn)?;
    Ok(featured)
}

pub fn get_new_arrivals_list(conn: &mut PgConnection) -> Result<Vec<Product>, ShopError> {
    let cutoff = Utc::now().naive_utc() - Duration::days(NEW_ARRIVAL_DAYS);
    let arrivals = functions::visible_products()
        .filter(products::created_at.ge(cutoff))
        .order(products::created_at.desc())
        .load(conn)?;
    Ok(arrivals)
}

#[get("/api/products")]
async fn get_products(
    pool: web::Data<DbPool>,
    query: web::Query<CatalogQuery>,
) -> Result<impl Responder> {
    let page = web::block(move || {
        let mut conn = pool.get()?;
        functions::list_products(&mut conn, &query)
    })
    .await??;
    Ok(HttpResponse::Ok().json(ProductListResponse {
        products: page.products,
        category: page.category,
        page: page.page,
        total: page.total,
        total_pages: page.total_pages,
    }))
}

#[get("/api/products/featured")]
async fn get_featured_products(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let featured = web::block(move || {
        let mut conn = pool.get()?;
        get_featured_list(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(featured))
}

#[get("/api/products/new")]
async fn get_new_arrivals(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let arrivals = web::block(move || {
        let mut conn = pool.get()?;
        get_new_arrivals_list(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(arrivals))
}

#[get("/api/products/{product_slug}")]
async fn get_product(
    pool: web::Data<DbPool>,
    product_slug: web::Path<String>,
) -> Result<impl Responder> {
    let detail = web::block(move || {
        let mut conn = pool.get()?;
        get_product_detail(&mut conn, &product_slug)
    })
    .await??;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/api/search")]
async fn search_products(
    pool: web::Data<DbPool>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder> {
    let SearchQuery { q, page } = query.into_inner();
    let search_query = q.clone().unwrap_or_default();
    let filter = CatalogQuery {
        q,
        page,
        ..Default::default()
    };
    let page = web::block(move || {
        let mut conn = pool.get()?;
        functions::list_products(&mut conn, &filter)
    })
    .await??;
    Ok(HttpResponse::Ok().json(SearchResponse {
        products: page.products,
        search_query,
        results_count: page.total,
        page: page.page,
        total_pages: page.total_pages,
    }))
}
