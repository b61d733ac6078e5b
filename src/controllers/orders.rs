use crate::insertables::{NewOrder, NewOrderItem};
use actix_web::{get, post, web, HttpResponse, Responder, Result};
use chrono::{NaiveDate, Utc};
use diesel::{prelude::*, r2d2};
use rand::Rng;
use rust_decimal::Decimal;
use rust_shop_api::cart::Cart;
use rust_shop_api::errors::ShopError;
use rust_shop_api::mailer::OrderMailer;
use rust_shop_api::models::{Order, OrderItem, OrderStatus, Product, Size};
use rust_shop_api::schema::{order_items, orders, product_sizes, products, sizes};
use rust_shop_api::session::{CartStore, VisitorSession};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

const ORDER_NUMBER_SUFFIX_DIGITS: u32 = 1_000_000;

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CheckoutDto {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_comment: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

impl CheckoutDto {
    fn validate_fields(&self) -> Result<(), ShopError> {
        if self.customer_name.trim().is_empty() {
            return Err(ShopError::InvalidInput("name is required".to_owned()));
        }
        if !looks_like_email(&self.customer_email) {
            return Err(ShopError::InvalidInput(
                "a valid email address is required".to_owned(),
            ));
        }
        if self.customer_phone.trim().is_empty() {
            return Err(ShopError::InvalidInput("phone is required".to_owned()));
        }
        if self.customer_address.trim().is_empty() {
            return Err(ShopError::InvalidInput(
                "delivery address is required".to_owned(),
            ));
        }
        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    matches!(
        value.trim().split_once('@'),
        Some((local, domain)) if !local.is_empty() && !domain.is_empty()
    )
}

#[derive(Serialize)]
pub struct OrderItemView {
    pub product_name: String,
    pub product_slug: String,
    pub size_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
}

#[derive(Serialize)]
pub struct OrderView {
    pub id: i32,
    pub order_number: String,
    pub status: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_comment: Option<String>,
    pub total_amount: Decimal,
    pub created_at: String,
    pub items: Vec<OrderItemView>,
}

/// Date-prefixed order number: day-sortable, uniqueness enforced only by the
/// storage constraint. A collision surfaces as a persistence failure, it is
/// not retried.
pub fn generate_order_number() -> String {
    let suffix = rand::thread_rng().gen_range(0..ORDER_NUMBER_SUFFIX_DIGITS);
    order_number_for(Utc::now().date_naive(), suffix)
}

fn order_number_for(date: NaiveDate, suffix: u32) -> String {
    format!("{}{:06}", date.format("%Y%m%d"), suffix)
}

pub fn validate_checkout(cart: &Cart, form: &CheckoutDto) -> Result<(), ShopError> {
    if cart.is_empty() {
        return Err(ShopError::EmptyCart);
    }
    form.validate_fields()?;
    if !form.agree_to_terms {
        return Err(ShopError::TermsNotAccepted);
    }
    Ok(())
}

fn build_new_order(cart: &Cart, form: &CheckoutDto, order_number: String) -> NewOrder {
    NewOrder {
        customer_name: form.customer_name.trim().to_owned(),
        customer_email: form.customer_email.trim().to_owned(),
        customer_phone: form.customer_phone.trim().to_owned(),
        customer_address: form.customer_address.trim().to_owned(),
        customer_comment: form
            .customer_comment
            .as_deref()
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_owned),
        total_amount: cart.total,
        status: OrderStatus::New.as_str().to_owned(),
        order_number,
        agreed_to_terms: form.agree_to_terms,
    }
}

fn build_order_items(order_id: i32, cart: &Cart) -> Vec<NewOrderItem> {
    cart.items
        .iter()
        .map(|item| NewOrderItem {
            order_id,
            product_id: item.product_id,
            product_size_id: item.size_id,
            quantity: item.quantity,
            price: item.price,
        })
        .collect()
}

/// Persists the order and its lines from the cart as-is: the total is the
/// cart total, the line prices are the add-time snapshots. Stock is not
/// re-validated here.
pub fn insert_new_order(
    conn: &mut PgConnection,
    cart: &Cart,
    form: &CheckoutDto,
) -> Result<Order, ShopError> {
    validate_checkout(cart, form)?;

    let new_order = build_new_order(cart, form, generate_order_number());
    let created_order: Order = diesel::insert_into(orders::table)
        .values(&new_order)
        .get_result(conn)?;
    for item in build_order_items(created_order.id, cart) {
        diesel::insert_into(order_items::table)
            .values(&item)
            .execute(conn)?;
    }
    Ok(created_order)
}

pub fn get_order_with_items(
    conn: &mut PgConnection,
    order_id: i32,
) -> Result<OrderView, ShopError> {
    let order: Order = orders::table
        .filter(orders::id.eq(order_id))
        .select(Order::as_select())
        .first(conn)
        .optional()?
        .ok_or(ShopError::NotFound("order"))?;

    let rows: Vec<(OrderItem, Product, Size)> = order_items::table
        .inner_join(products::table)
        .inner_join(product_sizes::table.inner_join(sizes::table))
        .filter(order_items::order_id.eq(order.id))
        .select((
            OrderItem::as_select(),
            Product::as_select(),
            Size::as_select(),
        ))
        .load(conn)?;
    let items = rows
        .into_iter()
        .map(|(item, product, size)| OrderItemView {
            product_name: product.name,
            product_slug: product.slug,
            size_name: size.name,
            quantity: item.quantity,
            price: item.price,
            total_price: item.total_price(),
        })
        .collect();

    Ok(OrderView {
        id: order.id,
        order_number: order.order_number.clone(),
        status: order.status.clone(),
        customer_name: order.customer_name.clone(),
        customer_email: order.customer_email.clone(),
        customer_phone: order.customer_phone.clone(),
        customer_address: order.customer_address.clone(),
        customer_comment: order.customer_comment.clone(),
        total_amount: order.total_amount,
        created_at: order.created_at_display(),
        items,
    })
}

#[post("/api/checkout")]
async fn checkout(
    pool: web::Data<DbPool>,
    store: web::Data<CartStore>,
    mailer: web::Data<OrderMailer>,
    session: VisitorSession,
    form: web::Json<CheckoutDto>,
) -> Result<impl Responder> {
    let session_id = session.id.clone();
    let order = web::block(move || {
        let mut conn = pool.get()?;
        let cart = store.load(&session_id)?;
        let order = insert_new_order(&mut conn, &cart, &form)?;

        // best-effort: the order is already persisted
        if let Err(err) = mailer.send_order_notification(&order, &cart.items) {
            warn!(order_number = %order.order_number, error = %err, "order notification failed");
        }
        if let Err(err) = store.clear(&session_id) {
            warn!(order_number = %order.order_number, error = %err, "failed to clear cart after checkout");
        }
        info!(order_number = %order.order_number, total = %order.total_amount, "order placed");
        Ok::<_, ShopError>(order)
    })
    .await??;

    let mut response = HttpResponse::Created();
    session.attach_cookie(&mut response);
    Ok(response.json(json!({
        "message": format!("Order #{} placed successfully", order.order_number),
        "order_id": order.id,
        "order_number": order.order_number,
    })))
}

#[get("/api/orders/{order_id}")]
async fn get_order(pool: web::Data<DbPool>, order_id: web::Path<i32>) -> Result<impl Responder> {
    let order = web::block(move || {
        let mut conn = pool.get()?;
        get_order_with_items(&mut conn, *order_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use rust_shop_api::cart::CartItem;

    fn filled_cart() -> Cart {
        let mut cart = Cart::default();
        cart.add_item(CartItem {
            product_id: 1,
            size_id: 10,
            quantity: 2,
            price: dec!(100.00),
            product_name: "Linen shirt".into(),
            size_name: "Medium".into(),
            image_url: String::new(),
        });
        cart
    }

    fn valid_form() -> CheckoutDto {
        CheckoutDto {
            customer_name: "Anna".into(),
            customer_email: "anna@example.com".into(),
            customer_phone: "+7 901 234-56-78".into(),
            customer_address: "Tverskaya 1, Moscow".into(),
            customer_comment: None,
            agree_to_terms: true,
        }
    }

    #[test]
    fn empty_cart_fails_before_anything_else() {
        let result = validate_checkout(&Cart::default(), &valid_form());
        assert!(matches!(result, Err(ShopError::EmptyCart)));
    }

    #[test]
    fn missing_terms_agreement_is_rejected() {
        let form = CheckoutDto {
            agree_to_terms: false,
            ..valid_form()
        };
        let result = validate_checkout(&filled_cart(), &form);
        assert!(matches!(result, Err(ShopError::TermsNotAccepted)));
    }

    #[test]
    fn blank_and_malformed_fields_are_rejected() {
        for form in [
            CheckoutDto {
                customer_name: "  ".into(),
                ..valid_form()
            },
            CheckoutDto {
                customer_email: "not-an-email".into(),
                ..valid_form()
            },
            CheckoutDto {
                customer_phone: String::new(),
                ..valid_form()
            },
            CheckoutDto {
                customer_address: String::new(),
                ..valid_form()
            },
        ] {
            let result = validate_checkout(&filled_cart(), &form);
            assert!(matches!(result, Err(ShopError::InvalidInput(_))));
        }
    }

    #[test]
    fn valid_checkout_passes_validation() {
        assert!(validate_checkout(&filled_cart(), &valid_form()).is_ok());
    }

    #[test]
    fn order_total_is_the_cart_total_not_recomputed() {
        let cart = filled_cart();
        let order = build_new_order(&cart, &valid_form(), generate_order_number());
        assert_eq!(order.total_amount, dec!(200.00));
        assert_eq!(order.status, "new");
    }

    #[test]
    fn order_items_snapshot_quantity_and_price() {
        let cart = filled_cart();
        let items = build_order_items(42, &cart);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, 42);
        assert_eq!(items[0].product_size_id, 10);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price, dec!(100.00));
    }

    #[test]
    fn blank_comment_is_stored_as_none() {
        let form = CheckoutDto {
            customer_comment: Some("   ".into()),
            ..valid_form()
        };
        let order = build_new_order(&filled_cart(), &form, generate_order_number());
        assert_eq!(order.customer_comment, None);
    }

    #[test]
    fn order_number_is_date_prefixed_with_six_digit_suffix() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(order_number_for(date, 42), "20240510000042");
        let number = order_number_for(date, 999_999);
        assert_eq!(number, "20240510999999");
        assert_eq!(number.len(), 14);

        let generated = generate_order_number();
        assert_eq!(generated.len(), 14);
        assert!(generated.chars().all(|c| c.is_ascii_digit()));
    }
}
