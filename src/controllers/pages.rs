use actix_web::{get, web, HttpResponse, Responder, Result};
use rust_shop_api::errors::ShopError;
use serde_json::json;

/// Static informational pages served alongside the catalog.
const PAGES: &[(&str, &str, &str)] = &[
    (
        "delivery",
        "Delivery",
        "Orders are shipped within 2-3 business days. Courier delivery is available inside the city, postal delivery everywhere else.",
    ),
    (
        "returns",
        "Returns",
        "Unworn items can be returned within 14 days of delivery with the original tags attached.",
    ),
    (
        "privacy",
        "Privacy Policy",
        "Customer data is used only to process orders and is never shared with third parties.",
    ),
    (
        "agreement",
        "User Agreement",
        "By placing an order you accept the store's terms of service and return policy.",
    ),
    (
        "faq",
        "FAQ",
        "Answers to common questions about sizing, payment and delivery.",
    ),
    (
        "contacts",
        "Contacts",
        "Reach the store by email or phone on business days from 10:00 to 19:00.",
    ),
    (
        "about",
        "About Us",
        "A small clothing store focused on quality basics in a full size range.",
    ),
    (
        "payment",
        "Payment",
        "Orders are paid on delivery. Online payment is not available.",
    ),
];

#[get("/api/pages/{page_slug}")]
async fn get_page(page_slug: web::Path<String>) -> Result<impl Responder> {
    let &(slug, title, body) = PAGES
        .iter()
        .find(|(slug, _, _)| *slug == page_slug.as_str())
        .ok_or(ShopError::NotFound("page"))?;
    Ok(HttpResponse::Ok().json(json!({
        "slug": slug,
        "title": title,
        "body": body,
    })))
}
