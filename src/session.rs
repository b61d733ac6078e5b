use crate::cart::Cart;
use crate::errors::ShopError;
use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder};
use r2d2_redis::r2d2::Pool;
use r2d2_redis::redis::Commands;
use r2d2_redis::RedisConnectionManager;
use std::future::{ready, Ready};
use uuid::Uuid;

pub type RedisPool = Pool<RedisConnectionManager>;

pub const SESSION_COOKIE: &str = "shop_session";
const CART_KEY_PREFIX: &str = "cart:";
const CART_TTL_SECS: usize = 60 * 60 * 24 * 7;

/// Per-visitor session identity, read from the session cookie or minted on
/// first contact. Handlers attach the cookie to their response for new
/// visitors via `attach_cookie`.
pub struct VisitorSession {
    pub id: String,
    pub is_new: bool,
}

impl VisitorSession {
    pub fn attach_cookie(&self, response: &mut HttpResponseBuilder) {
        if self.is_new {
            response.cookie(
                Cookie::build(SESSION_COOKIE, self.id.clone())
                    .path("/")
                    .http_only(true)
                    .finish(),
            );
        }
    }
}

impl FromRequest for VisitorSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = match req.cookie(SESSION_COOKIE) {
            Some(cookie) => VisitorSession {
                id: cookie.value().to_owned(),
                is_new: false,
            },
            None => VisitorSession {
                id: Uuid::new_v4().simple().to_string(),
                is_new: true,
            },
        };
        ready(Ok(session))
    }
}

/// Redis-backed session bucket for the cart, one JSON value per visitor.
#[derive(Clone)]
pub struct CartStore {
    pool: RedisPool,
}

impl CartStore {
    pub fn new(pool: RedisPool) -> Self {
        CartStore { pool }
    }

    fn key(session_id: &str) -> String {
        format!("{CART_KEY_PREFIX}{session_id}")
    }

    /// Missing or unreadable payloads yield a fresh empty cart; only an
    /// unreachable store is an error.
    pub fn load(&self, session_id: &str) -> Result<Cart, ShopError> {
        let mut conn = self.pool.get()?;
        let raw: Option<String> = conn.get(Self::key(session_id))?;
        Ok(raw
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default())
    }

    pub fn save(&self, session_id: &str, cart: &Cart) -> Result<(), ShopError> {
        let json = serde_json::to_string(cart)?;
        let mut conn = self.pool.get()?;
        let _: () = conn.set_ex(Self::key(session_id), json, CART_TTL_SECS)?;
        Ok(())
    }

    pub fn clear(&self, session_id: &str) -> Result<(), ShopError> {
        let mut conn = self.pool.get()?;
        let _: () = conn.del(Self::key(session_id))?;
        Ok(())
    }
}
