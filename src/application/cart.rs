use crate::application::catalog::ProductCatalog;
use crate::domain::cart::CartItem;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Local cart state. Purely synchronous, never talks to the backend.
///
/// The total is always derived from the current lines on read; there is no
/// running accumulator to drift.
pub struct CartStore {
    catalog: Arc<ProductCatalog>,
    items: RwLock<Vec<CartItem>>,
}

impl CartStore {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self {
            catalog,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Adds one unit of the product: bumps the existing line or appends a new
    /// one. An id the catalog does not know is a no-op returning `false`.
    pub fn add_to_cart(&self, product_id: &str) -> bool {
        let Some(product) = self.catalog.find(product_id) else {
            warn!(product_id = product_id, "Ignoring add for unknown product");
            return false;
        };

        let mut items = self.items.write();
        if let Some(item) = items.iter_mut().find(|i| i.product_id == product.id) {
            item.quantity += 1;
            debug!(product_id = product_id, quantity = item.quantity, "Cart line incremented");
        } else {
            items.push(CartItem::from_product(product));
            debug!(product_id = product_id, "Cart line added");
        }
        true
    }

    /// Removes the whole line regardless of quantity. An id not in the cart
    /// is a no-op returning `false`.
    pub fn remove_from_cart(&self, product_id: &str) -> bool {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|i| i.product_id != product_id);
        let removed = items.len() != before;
        if removed {
            debug!(product_id = product_id, "Cart line removed");
        }
        removed
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.items.read().clone()
    }

    pub fn total(&self) -> Decimal {
        self.items.read().iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    pub fn quantity(&self) -> u32 {
        self.items.read().iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::Product;

    fn store() -> CartStore {
        CartStore::new(Arc::new(ProductCatalog::new(vec![
            Product {
                id: "a".to_string(),
                title: "Widget".to_string(),
                image: "widget.jpg".to_string(),
                price: Decimal::new(1299, 2), // 12.99
            },
            Product {
                id: "b".to_string(),
                title: "Gadget".to_string(),
                image: "gadget.jpg".to_string(),
                price: Decimal::new(501, 2), // 5.01
            },
        ])))
    }

    #[test]
    fn test_adding_same_product_twice_increments_quantity() {
        let cart = store();
        assert!(cart.add_to_cart("a"));
        assert!(cart.add_to_cart("a"));

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        // Exactly 2 x 12.99, no accumulation drift
        assert_eq!(cart.total(), Decimal::new(2598, 2));
    }

    #[test]
    fn test_adding_different_products_appends_lines() {
        let cart = store();
        cart.add_to_cart("a");
        cart.add_to_cart("b");

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.quantity(), 2);
        assert_eq!(cart.total(), Decimal::new(1800, 2));
    }

    #[test]
    fn test_adding_unknown_product_is_a_noop() {
        let cart = store();
        assert!(!cart.add_to_cart("missing"));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_removing_line_drops_whole_quantity() {
        let cart = store();
        cart.add_to_cart("a");
        cart.add_to_cart("a");
        cart.add_to_cart("b");

        assert!(cart.remove_from_cart("a"));
        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "b");
        assert_eq!(cart.total(), Decimal::new(501, 2));
    }

    #[test]
    fn test_removing_absent_product_leaves_cart_unchanged() {
        let cart = store();
        cart.add_to_cart("a");
        let before = cart.items();

        assert!(!cart.remove_from_cart("missing"));
        assert_eq!(cart.items(), before);
        assert_eq!(cart.total(), Decimal::new(1299, 2));
    }

    #[test]
    fn test_total_is_derived_from_lines() {
        let cart = store();
        for _ in 0..100 {
            cart.add_to_cart("b"); // 5.01 each
        }
        cart.remove_from_cart("b");
        assert_eq!(cart.total(), Decimal::ZERO);

        cart.add_to_cart("b");
        assert_eq!(cart.total(), Decimal::new(501, 2));
    }
}
