use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One line of a client-owned cart. Prices are whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

/// Explicit cart store. The cart lives with the client session and is never
/// persisted; handlers rebuild it from the request payload.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CartLine>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line; an existing line for the same product has its quantity
    /// increased instead of duplicating the line.
    pub fn add(&mut self, line: CartLine) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == line.product_id)
        {
            existing.quantity += line.quantity;
        } else {
            self.items.push(line);
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Decrease a line's quantity by one; a line that reaches zero is removed.
    pub fn decrement(&mut self, product_id: Uuid) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            existing.quantity -= 1;
        }
        self.items.retain(|item| item.quantity > 0);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Saturating on purpose: line values are client-supplied, and a junk
    /// payload must not be able to panic the arithmetic. Range enforcement
    /// happens in the pricing validation.
    pub fn subtotal(&self) -> i64 {
        self.items.iter().fold(0i64, |acc, item| {
            acc.saturating_add(item.price.saturating_mul(item.quantity as i64))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: i32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            name: "Alphonso Box".into(),
            price,
            quantity,
            image_url: None,
        }
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let cart = Cart::with_items(vec![line(250, 2), line(100, 3)]);
        assert_eq!(cart.subtotal(), 800);
    }

    #[test]
    fn empty_cart_subtotal_is_zero() {
        assert_eq!(Cart::new().subtotal(), 0);
    }

    #[test]
    fn add_merges_lines_for_same_product() {
        let mut cart = Cart::new();
        let first = line(250, 1);
        let mut second = first.clone();
        second.quantity = 2;

        cart.add(first);
        cart.add(second);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn decrement_to_zero_removes_line() {
        let item = line(250, 1);
        let id = item.product_id;
        let mut cart = Cart::with_items(vec![item]);

        cart.decrement(id);

        assert!(cart.is_empty());
    }

    #[test]
    fn subtotal_saturates_instead_of_overflowing() {
        let cart = Cart::with_items(vec![line(i64::MAX, 2)]);
        assert_eq!(cart.subtotal(), i64::MAX);

        let cart = Cart::with_items(vec![line(i64::MAX, 1), line(i64::MAX, 1)]);
        assert_eq!(cart.subtotal(), i64::MAX);
    }

    #[test]
    fn remove_and_clear() {
        let a = line(250, 1);
        let b = line(100, 2);
        let id = a.product_id;
        let mut cart = Cart::with_items(vec![a, b]);

        cart.remove(id);
        assert_eq!(cart.items().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }
}
