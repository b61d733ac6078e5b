use diesel::Insertable;
use rust_decimal::Decimal;
use rust_shop_api::schema::{order_items, orders};

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name=orders)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_comment: Option<String>,
    pub total_amount: Decimal,
    pub status: String,
    pub order_number: String,
    pub agreed_to_terms: bool,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name=order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub product_size_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}
