use crate::schema::{
    categories, order_items, orders, product_images, product_reviews, product_sizes, products,
    sizes,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

/// Display offset for order timestamps (Moscow, UTC+3).
const DISPLAY_UTC_OFFSET_SECS: i32 = 3 * 3600;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = sizes)]
pub struct Size {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Category))]
#[diesel(table_name = products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub category_id: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn is_on_sale(&self) -> bool {
        matches!(self.old_price, Some(old) if old > self.price)
    }

    /// Discount percentage against the old price, one decimal place.
    pub fn discount_percentage(&self) -> Decimal {
        match self.old_price {
            Some(old) if old > self.price => {
                ((old - self.price) / old * Decimal::from(100)).round_dp(1)
            }
            _ => Decimal::ZERO,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(belongs_to(Size))]
#[diesel(table_name = product_sizes)]
pub struct ProductSize {
    pub id: i32,
    pub product_id: i32,
    pub size_id: i32,
    pub price: Option<Decimal>,
    pub old_price: Option<Decimal>,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub sku: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProductSize {
    /// Size-specific price when set, otherwise the product's base price.
    pub fn final_price(&self, product: &Product) -> Decimal {
        self.price.unwrap_or(product.price)
    }

    pub fn final_old_price(&self, product: &Product) -> Option<Decimal> {
        self.old_price.or(product.old_price)
    }

    pub fn is_on_sale(&self, product: &Product) -> bool {
        matches!(self.final_old_price(product), Some(old) if old > self.final_price(product))
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = product_images)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image: String,
    pub alt_text: String,
    pub is_main: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = product_reviews)]
pub struct ProductReview {
    pub id: i32,
    pub product_id: i32,
    pub author_name: String,
    pub email: String,
    pub rating: i16,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_comment: Option<String>,
    pub total_amount: Decimal,
    pub status: String,
    pub order_number: String,
    pub agreed_to_terms: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Order {
    /// Creation time in the fixed display timezone, `dd.mm.YYYY HH:MM`.
    /// Timestamps are stored naive in UTC.
    pub fn created_at_display(&self) -> String {
        let offset = FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).expect("static offset");
        DateTime::<Utc>::from_naive_utc_and_offset(self.created_at, Utc)
            .with_timezone(&offset)
            .format("%d.%m.%Y %H:%M")
            .to_string()
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(Product))]
#[diesel(belongs_to(ProductSize))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_size_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn product(price: Decimal, old_price: Option<Decimal>) -> Product {
        Product {
            id: 1,
            name: "Linen shirt".into(),
            slug: "linen-shirt".into(),
            description: None,
            image: None,
            price,
            old_price,
            category_id: 1,
            is_active: true,
            is_featured: false,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn product_size(price: Option<Decimal>, old_price: Option<Decimal>) -> ProductSize {
        ProductSize {
            id: 7,
            product_id: 1,
            size_id: 3,
            price,
            old_price,
            in_stock: true,
            stock_quantity: 5,
            sku: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    #[test]
    fn size_without_override_uses_base_price_and_sale_status() {
        let product = product(dec!(100.00), Some(dec!(150.00)));
        let size = product_size(None, None);
        assert_eq!(size.final_price(&product), dec!(100.00));
        assert_eq!(size.final_old_price(&product), Some(dec!(150.00)));
        assert!(size.is_on_sale(&product));
    }

    #[test]
    fn size_with_override_reports_its_own_values() {
        let product = product(dec!(100.00), None);
        let size = product_size(Some(dec!(80.00)), Some(dec!(120.00)));
        assert_eq!(size.final_price(&product), dec!(80.00));
        assert_eq!(size.final_old_price(&product), Some(dec!(120.00)));
        assert!(size.is_on_sale(&product));
    }

    #[test]
    fn equal_old_price_is_not_a_sale() {
        let product = product(dec!(100.00), Some(dec!(100.00)));
        assert!(!product.is_on_sale());
        assert_eq!(product.discount_percentage(), Decimal::ZERO);
    }

    #[test]
    fn discount_percentage_rounds_to_one_decimal() {
        let product = product(dec!(70.00), Some(dec!(90.00)));
        assert_eq!(product.discount_percentage(), dec!(22.2));
    }

    #[test]
    fn order_item_total_is_price_times_quantity() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            product_size_id: 7,
            quantity: 2,
            price: dec!(100.00),
        };
        assert_eq!(item.total_price(), dec!(200.00));
    }

    #[test]
    fn order_created_at_shifts_into_display_offset() {
        let order = Order {
            id: 1,
            customer_name: "Ivan".into(),
            customer_email: "ivan@example.com".into(),
            customer_phone: "+7 900 000-00-00".into(),
            customer_address: "Moscow".into(),
            customer_comment: None,
            total_amount: dec!(200.00),
            status: OrderStatus::New.as_str().into(),
            order_number: "20240510123456".into(),
            agreed_to_terms: true,
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        assert_eq!(order.created_at_display(), "10.05.2024 15:00");
    }
}
