use crate::errors::ShopError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line, keyed by the (product, size) pair. Price, names and image
/// are snapshots taken at add-time; live rows are only consulted again by the
/// controllers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CartItem {
    pub product_id: i32,
    pub size_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: String,
    pub size_name: String,
    pub image_url: String,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Session cart: an ordered line list plus a running total. All mutations go
/// through the methods below, each of which recomputes the total from
/// scratch so it can never drift from the items.
///
/// `Decimal` serializes as a string, which keeps the total safe to round-trip
/// through the session bucket.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

/// Outcome of `set_quantity`, so callers can phrase the right message.
#[derive(Debug, PartialEq)]
pub enum QuantityChange {
    Updated,
    Removed(CartItem),
}

impl Cart {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a line, merging into an existing (product, size) line by
    /// incrementing its quantity in place.
    pub fn add_item(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id && line.size_id == item.size_id)
        {
            Some(line) => line.quantity += item.quantity,
            None => self.items.push(item),
        }
        self.recompute_total();
    }

    /// Sets the quantity of the line at `index`. A quantity of zero or less
    /// removes the line instead.
    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<QuantityChange, ShopError> {
        if quantity <= 0 {
            return Ok(QuantityChange::Removed(self.remove_item(index)?));
        }
        let line = self.items.get_mut(index).ok_or(ShopError::IndexOutOfRange)?;
        line.quantity = quantity;
        self.recompute_total();
        Ok(QuantityChange::Updated)
    }

    pub fn remove_item(&mut self, index: usize) -> Result<CartItem, ShopError> {
        if index >= self.items.len() {
            return Err(ShopError::IndexOutOfRange);
        }
        let removed = self.items.remove(index);
        self.recompute_total();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_total();
    }

    /// Drops the lines at the given indices (reconciliation against deleted
    /// catalog rows). Unknown indices are ignored.
    pub fn drop_indices(&mut self, indices: &[usize]) {
        let mut index = 0;
        self.items.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = self.items.iter().map(CartItem::line_total).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(product_id: i32, size_id: i32, quantity: i32, price: Decimal) -> CartItem {
        CartItem {
            product_id,
            size_id,
            quantity,
            price,
            product_name: format!("product-{product_id}"),
            size_name: format!("size-{size_id}"),
            image_url: String::new(),
        }
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut cart = Cart::default();
        assert_eq!(cart.total, Decimal::ZERO);

        cart.add_item(item(1, 10, 2, dec!(100.00)));
        assert_eq!(cart.total, dec!(200.00));

        cart.add_item(item(2, 20, 1, dec!(49.90)));
        assert_eq!(cart.total, dec!(249.90));

        cart.set_quantity(1, 3).unwrap();
        assert_eq!(cart.total, dec!(349.70));

        cart.remove_item(0).unwrap();
        assert_eq!(cart.total, dec!(149.70));

        cart.clear();
        assert_eq!(cart.total, Decimal::ZERO);
        assert!(cart.is_empty());
    }

    #[test]
    fn adding_same_product_and_size_merges_quantities() {
        let mut cart = Cart::default();
        cart.add_item(item(1, 10, 1, dec!(100.00)));
        cart.add_item(item(1, 10, 2, dec!(100.00)));
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total, dec!(300.00));
    }

    #[test]
    fn same_product_different_size_appends_a_line() {
        let mut cart = Cart::default();
        cart.add_item(item(1, 10, 1, dec!(100.00)));
        cart.add_item(item(1, 11, 1, dec!(100.00)));
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let mut cart = Cart::default();
        cart.add_item(item(1, 10, 2, dec!(100.00)));
        let change = cart.set_quantity(0, 0).unwrap();
        assert!(matches!(change, QuantityChange::Removed(removed) if removed.product_id == 1));
        assert!(cart.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn out_of_range_index_leaves_cart_unchanged() {
        let mut cart = Cart::default();
        cart.add_item(item(1, 10, 2, dec!(100.00)));
        let before = cart.clone();

        assert!(matches!(cart.remove_item(5), Err(ShopError::IndexOutOfRange)));
        assert!(matches!(cart.set_quantity(5, 1), Err(ShopError::IndexOutOfRange)));
        assert_eq!(cart, before);
    }

    #[test]
    fn drop_indices_recomputes_total() {
        let mut cart = Cart::default();
        cart.add_item(item(1, 10, 1, dec!(100.00)));
        cart.add_item(item(2, 20, 1, dec!(50.00)));
        cart.add_item(item(3, 30, 1, dec!(25.00)));

        cart.drop_indices(&[0, 2]);
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.items[0].product_id, 2);
        assert_eq!(cart.total, dec!(50.00));
    }

    #[test]
    fn cart_round_trips_through_json_with_string_total() {
        let mut cart = Cart::default();
        cart.add_item(item(1, 10, 2, dec!(100.00)));

        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.contains("\"200.00\""));

        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
