use diesel::dsl::{exists, sql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Double;
use rust_decimal::Decimal;
use rust_shop_api::errors::ShopError;
use rust_shop_api::models::{Category, Product};
use rust_shop_api::pagination::{requested_page, Paginate};
use rust_shop_api::schema::{categories, product_reviews, product_sizes, products, sizes};
use serde::Deserialize;

/// Query-string filters shared by the product listing and search endpoints.
/// `page`, `price_min` and `price_max` stay strings: malformed values are
/// ignored or clamped, never rejected.
#[derive(Deserialize, Debug, Default)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub size: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
}

pub struct ProductPage {
    pub products: Vec<Product>,
    pub category: Option<Category>,
    pub page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Active products with at least one size variant in stock. Every listing
/// starts from this; direct detail lookups only require `is_active`.
pub fn visible_products() -> products::BoxedQuery<'static, Pg> {
    let has_stock = product_sizes::table
        .filter(product_sizes::product_id.eq(products::id))
        .filter(product_sizes::in_stock.eq(true));
    products::table
        .filter(products::is_active.eq(true))
        .filter(exists(has_stock))
        .into_boxed()
}

fn filtered_products(
    filter: &CatalogQuery,
    category_id: Option<i32>,
) -> products::BoxedQuery<'static, Pg> {
    let mut query = visible_products();

    if let Some(category_id) = category_id {
        query = query.filter(products::category_id.eq(category_id));
    }

    if let Some(code) = filter.size.as_deref().filter(|code| *code != "all") {
        let size_in_stock = product_sizes::table
            .inner_join(sizes::table)
            .filter(product_sizes::product_id.eq(products::id))
            .filter(product_sizes::in_stock.eq(true))
            .filter(sizes::code.eq(code.to_owned()));
        query = query.filter(exists(size_in_stock));
    }

    // malformed price bounds are ignored, matching the lenient query surface
    if let Some(min) = parse_price(filter.price_min.as_deref()) {
        query = query.filter(products::price.ge(min));
    }
    if let Some(max) = parse_price(filter.price_max.as_deref()) {
        query = query.filter(products::price.le(max));
    }

    if let Some(term) = filter.q.as_deref().filter(|term| !term.trim().is_empty()) {
        let pattern = format!("%{}%", term.trim());
        let category_name_match = categories::table
            .filter(categories::id.eq(products::category_id))
            .filter(categories::name.ilike(pattern.clone()));
        query = query.filter(
            products::name
                .ilike(pattern.clone())
                .nullable()
                .or(products::description.ilike(pattern).nullable())
                .or(exists(category_name_match).nullable()),
        );
    }

    apply_sort(query, filter.sort.as_deref(), filter.order.as_deref())
}

fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|value| value.trim().parse::<Decimal>().ok())
}

fn apply_sort(
    query: products::BoxedQuery<'static, Pg>,
    sort: Option<&str>,
    order: Option<&str>,
) -> products::BoxedQuery<'static, Pg> {
    let descending = order == Some("desc");
    match sort.unwrap_or("name") {
        "price" if descending => query.order(products::price.desc()),
        "price" => query.order(products::price.asc()),
        "created" if descending => query.order(products::created_at.desc()),
        "created" => query.order(products::created_at.asc()),
        "popular" => query.order(sql::<Double>("RANDOM()")),
        "name" if descending => query.order(products::name.desc()),
        // unknown sort keys fall back to name ascending
        _ => query.order(products::name.asc()),
    }
}

pub fn load_active_category(conn: &mut PgConnection, slug: &str) -> Result<Category, ShopError> {
    categories::table
        .filter(categories::slug.eq(slug))
        .filter(categories::is_active.eq(true))
        .select(Category::as_select())
        .first(conn)
        .optional()?
        .ok_or(ShopError::NotFound("category"))
}

/// Filtered, sorted, paginated listing. Pages past the end are clamped to
/// the last non-empty page; the total is known from the first pass.
pub fn list_products(
    conn: &mut PgConnection,
    filter: &CatalogQuery,
) -> Result<ProductPage, ShopError> {
    let category = match filter.category.as_deref() {
        Some(slug) => Some(load_active_category(conn, slug)?),
        None => None,
    };
    let category_id = category.as_ref().map(|category| category.id);

    let mut page = requested_page(filter.page.as_deref());
    let (mut records, mut total, mut total_pages) = filtered_products(filter, category_id)
        .paginate(page)
        .load_and_count_pages::<Product>(conn)?;

    if records.is_empty() && total > 0 && page > total_pages {
        page = total_pages;
        (records, total, total_pages) = filtered_products(filter, category_id)
            .paginate(page)
            .load_and_count_pages::<Product>(conn)?;
    }

    Ok(ProductPage {
        products: records,
        category,
        page,
        total,
        total_pages,
    })
}

/// Up to four in-stock products from the same category, excluding the
/// product itself.
pub fn related_products(
    conn: &mut PgConnection,
    product: &Product,
) -> Result<Vec<Product>, ShopError> {
    let related = visible_products()
        .filter(products::category_id.eq(product.category_id))
        .filter(products::id.ne(product.id))
        .limit(4)
        .load(conn)?;
    Ok(related)
}

/// Average rating over approved reviews, one decimal place, zero when there
/// are none.
pub fn average_rating(conn: &mut PgConnection, product_id: i32) -> Result<Decimal, ShopError> {
    let average: Option<Decimal> = product_reviews::table
        .filter(product_reviews::product_id.eq(product_id))
        .filter(product_reviews::is_approved.eq(true))
        .select(diesel::dsl::avg(product_reviews::rating))
        .get_result(conn)?;
    Ok(round_rating(average))
}

pub fn round_rating(average: Option<Decimal>) -> Decimal {
    average.unwrap_or_default().round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn no_approved_reviews_means_zero_rating() {
        assert_eq!(round_rating(None), Decimal::ZERO);
    }

    #[test]
    fn rating_rounds_to_one_decimal() {
        assert_eq!(round_rating(Some(dec!(4.4444))), dec!(4.4));
        assert_eq!(round_rating(Some(dec!(3.75))), dec!(3.8));
    }

    #[test]
    fn malformed_price_bounds_are_ignored() {
        assert_eq!(parse_price(Some("abc")), None);
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(Some(" 99.90 ")), Some(dec!(99.90)));
        assert_eq!(parse_price(None), None);
    }
}
