use std::env;

/// Outbound mail settings, built once at startup and handed to the mailer.
/// Kept explicit so nothing in the notification path reads the environment.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
    pub admin_address: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        MailConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_owned()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(25),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from_address: env::var("SHOP_FROM_EMAIL")
                .unwrap_or_else(|_| "shop@localhost".to_owned()),
            admin_address: env::var("SHOP_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@localhost".to_owned()),
        }
    }
}
