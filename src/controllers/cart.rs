use actix_web::{get, post, web, HttpResponse, Responder, Result};
use diesel::{prelude::*, r2d2};
use rust_decimal::Decimal;
use rust_shop_api::cart::{Cart, CartItem, QuantityChange};
use rust_shop_api::errors::ShopError;
use rust_shop_api::models::{Product, ProductSize, Size};
use rust_shop_api::schema::{product_sizes, products, sizes};
use rust_shop_api::session::{CartStore, VisitorSession};
use serde::{Deserialize, Serialize};

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize)]
pub struct AddToCartDto {
    pub product_id: i32,
    pub size_id: i32,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct UpdateCartDto {
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct CartItemView {
    pub index: usize,
    pub product_id: i32,
    pub size_id: i32,
    pub product_name: String,
    pub product_slug: String,
    pub size_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
    pub in_stock: bool,
    pub image_url: String,
}

#[derive(Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub count: usize,
    pub total: Decimal,
    /// Lines dropped because their product or size left the catalog.
    pub dropped: Vec<String>,
}

#[derive(Serialize)]
pub struct CartMessage {
    pub message: String,
    pub count: usize,
    pub total: Decimal,
}

impl CartMessage {
    fn new(message: String, cart: &Cart) -> Self {
        CartMessage {
            message,
            count: cart.count(),
            total: cart.total,
        }
    }
}

/// Validates the requested line against live catalog rows and snapshots it
/// into the session cart. Stock is checked against the total recorded
/// quantity; quantities already sitting in carts are not reserved.
pub fn add_item_to_cart(
    conn: &mut PgConnection,
    store: &CartStore,
    session_id: &str,
    dto: &AddToCartDto,
) -> Result<(Cart, String), ShopError> {
    if dto.quantity < 1 {
        return Err(ShopError::InvalidInput(
            "quantity must be at least 1".to_owned(),
        ));
    }

    let product: Product = products::table
        .filter(products::id.eq(dto.product_id))
        .select(Product::as_select())
        .first(conn)
        .optional()?
        .ok_or(ShopError::NotFound("product"))?;
    let (product_size, size): (ProductSize, Size) = product_sizes::table
        .inner_join(sizes::table)
        .filter(product_sizes::id.eq(dto.size_id))
        .filter(product_sizes::product_id.eq(product.id))
        .select((ProductSize::as_select(), Size::as_select()))
        .first(conn)
        .optional()?
        .ok_or(ShopError::NotFound("size"))?;

    if !product_size.in_stock || dto.quantity > product_size.stock_quantity {
        return Err(ShopError::OutOfStock);
    }

    let mut cart = store.load(session_id)?;
    cart.add_item(CartItem {
        product_id: product.id,
        size_id: product_size.id,
        quantity: dto.quantity,
        price: product_size.final_price(&product),
        product_name: product.name.clone(),
        size_name: size.name.clone(),
        image_url: product.image.clone().unwrap_or_default(),
    });
    store.save(session_id, &cart)?;

    let message = format!("\"{}\" ({}) added to cart", product.name, size.name);
    Ok((cart, message))
}

/// Resolves every line against the live catalog. Lines whose product or size
/// no longer exists are dropped from the cart, and the dropped names are
/// reported back instead of silently disappearing.
pub fn view_cart_contents(
    conn: &mut PgConnection,
    store: &CartStore,
    session_id: &str,
) -> Result<CartView, ShopError> {
    let mut cart = store.load(session_id)?;

    let mut resolved: Vec<Option<(ProductSize, Product)>> = Vec::with_capacity(cart.count());
    let mut stale = Vec::new();
    let mut dropped = Vec::new();
    for (index, item) in cart.items.iter().enumerate() {
        let row = product_sizes::table
            .inner_join(products::table)
            .filter(product_sizes::id.eq(item.size_id))
            .filter(product_sizes::product_id.eq(item.product_id))
            .select((ProductSize::as_select(), Product::as_select()))
            .first::<(ProductSize, Product)>(conn)
            .optional()?;
        if row.is_none() {
            stale.push(index);
            dropped.push(format!("{} ({})", item.product_name, item.size_name));
        }
        resolved.push(row);
    }
    if !stale.is_empty() {
        cart.drop_indices(&stale);
        store.save(session_id, &cart)?;
    }

    let items = cart
        .items
        .iter()
        .zip(resolved.into_iter().flatten())
        .enumerate()
        .map(|(index, (item, (product_size, product)))| CartItemView {
            index,
            product_id: item.product_id,
            size_id: item.size_id,
            product_name: item.product_name.clone(),
            product_slug: product.slug.clone(),
            size_name: item.size_name.clone(),
            quantity: item.quantity,
            price: item.price,
            total_price: item.line_total(),
            in_stock: product_size.in_stock,
            image_url: item.image_url.clone(),
        })
        .collect();

    Ok(CartView {
        items,
        count: cart.count(),
        total: cart.total,
        dropped,
    })
}

/// Re-validates the new quantity against a fresh stock lookup, then updates
/// the line. Zero or less removes the line instead.
pub fn update_cart_line(
    conn: &mut PgConnection,
    store: &CartStore,
    session_id: &str,
    index: usize,
    quantity: i32,
) -> Result<(Cart, String), ShopError> {
    let mut cart = store.load(session_id)?;
    let item = cart.items.get(index).ok_or(ShopError::IndexOutOfRange)?;

    if quantity > 0 {
        let product_size: ProductSize = product_sizes::table
            .filter(product_sizes::id.eq(item.size_id))
            .filter(product_sizes::product_id.eq(item.product_id))
            .select(ProductSize::as_select())
            .first(conn)
            .optional()?
            .ok_or(ShopError::NotFound("size"))?;
        if quantity > product_size.stock_quantity {
            return Err(ShopError::OutOfStock);
        }
    }

    let message = match cart.set_quantity(index, quantity)? {
        QuantityChange::Updated => "cart updated".to_owned(),
        QuantityChange::Removed(removed) => {
            format!("\"{}\" removed from cart", removed.product_name)
        }
    };
    store.save(session_id, &cart)?;
    Ok((cart, message))
}

pub fn remove_cart_line(
    store: &CartStore,
    session_id: &str,
    index: usize,
) -> Result<(Cart, String), ShopError> {
    let mut cart = store.load(session_id)?;
    let removed = cart.remove_item(index)?;
    store.save(session_id, &cart)?;
    let message = format!(
        "\"{}\" ({}) removed from cart",
        removed.product_name, removed.size_name
    );
    Ok((cart, message))
}

#[get("/api/cart")]
async fn view_cart(
    pool: web::Data<DbPool>,
    store: web::Data<CartStore>,
    session: VisitorSession,
) -> Result<impl Responder> {
    let session_id = session.id.clone();
    let view = web::block(move || {
        let mut conn = pool.get()?;
        view_cart_contents(&mut conn, &store, &session_id)
    })
    .await??;
    let mut response = HttpResponse::Ok();
    session.attach_cookie(&mut response);
    Ok(response.json(view))
}

#[post("/api/cart/add")]
async fn add_to_cart(
    pool: web::Data<DbPool>,
    store: web::Data<CartStore>,
    session: VisitorSession,
    form: web::Json<AddToCartDto>,
) -> Result<impl Responder> {
    let session_id = session.id.clone();
    let (cart, message) = web::block(move || {
        let mut conn = pool.get()?;
        add_item_to_cart(&mut conn, &store, &session_id, &form)
    })
    .await??;
    let mut response = HttpResponse::Ok();
    session.attach_cookie(&mut response);
    Ok(response.json(CartMessage::new(message, &cart)))
}

#[post("/api/cart/update/{item_index}")]
async fn update_cart_item(
    pool: web::Data<DbPool>,
    store: web::Data<CartStore>,
    session: VisitorSession,
    item_index: web::Path<usize>,
    form: web::Json<UpdateCartDto>,
) -> Result<impl Responder> {
    let session_id = session.id.clone();
    let (cart, message) = web::block(move || {
        let mut conn = pool.get()?;
        update_cart_line(&mut conn, &store, &session_id, *item_index, form.quantity)
    })
    .await??;
    let mut response = HttpResponse::Ok();
    session.attach_cookie(&mut response);
    Ok(response.json(CartMessage::new(message, &cart)))
}

#[post("/api/cart/remove/{item_index}")]
async fn remove_cart_item(
    store: web::Data<CartStore>,
    session: VisitorSession,
    item_index: web::Path<usize>,
) -> Result<impl Responder> {
    let session_id = session.id.clone();
    let (cart, message) =
        web::block(move || remove_cart_line(&store, &session_id, *item_index)).await??;
    let mut response = HttpResponse::Ok();
    session.attach_cookie(&mut response);
    Ok(response.json(CartMessage::new(message, &cart)))
}

#[post("/api/cart/clear")]
async fn clear_cart(
    store: web::Data<CartStore>,
    session: VisitorSession,
) -> Result<impl Responder> {
    let session_id = session.id.clone();
    web::block(move || store.clear(&session_id)).await??;
    let mut response = HttpResponse::Ok();
    session.attach_cookie(&mut response);
    Ok(response.json(CartMessage::new("cart cleared".to_owned(), &Cart::default())))
}
