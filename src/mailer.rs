use crate::cart::CartItem;
use crate::config::MailConfig;
use crate::errors::ShopError;
use crate::models::Order;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fmt::Write;

/// Sends the plain-text order summary to the shop admin. Delivery is
/// best-effort: callers log the returned error and move on, the order itself
/// is already persisted.
#[derive(Clone)]
pub struct OrderMailer {
    transport: SmtpTransport,
    config: MailConfig,
}

impl OrderMailer {
    pub fn new(config: MailConfig) -> Result<Self, ShopError> {
        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => SmtpTransport::relay(&config.smtp_host)
                .map_err(|err| ShopError::Notification(err.to_string()))?
                .port(config.smtp_port)
                .credentials(Credentials::new(username.clone(), password.clone())),
            // local relay without TLS or auth
            _ => SmtpTransport::builder_dangerous(&config.smtp_host).port(config.smtp_port),
        };
        Ok(OrderMailer {
            transport: builder.build(),
            config,
        })
    }

    pub fn send_order_notification(
        &self,
        order: &Order,
        items: &[CartItem],
    ) -> Result<(), ShopError> {
        let email = Message::builder()
            .from(parse_mailbox(&self.config.from_address)?)
            .to(parse_mailbox(&self.config.admin_address)?)
            .subject(format!("New order #{}", order.order_number))
            .header(ContentType::TEXT_PLAIN)
            .body(compose_order_email(order, items))
            .map_err(|err| ShopError::Notification(err.to_string()))?;
        self.transport
            .send(&email)
            .map_err(|err| ShopError::Notification(err.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ShopError> {
    address
        .parse()
        .map_err(|err: lettre::address::AddressError| ShopError::Notification(err.to_string()))
}

/// Plain-text order summary for the admin notification.
pub fn compose_order_email(order: &Order, items: &[CartItem]) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "New order #{} placed {}",
        order.order_number,
        order.created_at_display()
    );
    let _ = writeln!(body);
    let _ = writeln!(body, "Customer: {}", order.customer_name);
    let _ = writeln!(body, "Email: {}", order.customer_email);
    let _ = writeln!(body, "Phone: {}", order.customer_phone);
    let _ = writeln!(body, "Address: {}", order.customer_address);
    if let Some(comment) = &order.customer_comment {
        let _ = writeln!(body, "Comment: {comment}");
    }
    let _ = writeln!(body);
    let _ = writeln!(body, "Items:");
    for item in items {
        let _ = writeln!(
            body,
            "- {} ({}) x {} @ {} = {}",
            item.product_name,
            item.size_name,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    let _ = writeln!(body);
    let _ = writeln!(body, "Total: {}", order.total_amount);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn body_lists_items_total_and_display_time() {
        let order = Order {
            id: 1,
            customer_name: "Anna".into(),
            customer_email: "anna@example.com".into(),
            customer_phone: "+7 901 234-56-78".into(),
            customer_address: "Tverskaya 1, Moscow".into(),
            customer_comment: Some("call before delivery".into()),
            total_amount: dec!(249.90),
            status: OrderStatus::New.as_str().into(),
            order_number: "20240510000042".into(),
            agreed_to_terms: true,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 10)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            updated_at: NaiveDate::from_ymd_opt(2024, 5, 10)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };
        let items = vec![
            CartItem {
                product_id: 1,
                size_id: 10,
                quantity: 2,
                price: dec!(100.00),
                product_name: "Linen shirt".into(),
                size_name: "Medium".into(),
                image_url: String::new(),
            },
            CartItem {
                product_id: 2,
                size_id: 20,
                quantity: 1,
                price: dec!(49.90),
                product_name: "Wool scarf".into(),
                size_name: "Universal".into(),
                image_url: String::new(),
            },
        ];

        let body = compose_order_email(&order, &items);
        assert!(body.contains("New order #20240510000042 placed 10.05.2024 12:30"));
        assert!(body.contains("- Linen shirt (Medium) x 2 @ 100.00 = 200.00"));
        assert!(body.contains("- Wool scarf (Universal) x 1 @ 49.90 = 49.90"));
        assert!(body.contains("Comment: call before delivery"));
        assert!(body.contains("Total: 249.90"));
    }
}
