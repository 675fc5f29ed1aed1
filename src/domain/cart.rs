use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub image: String,
    pub price: Decimal,
}

/// One line in the cart. The price is the unit price at the time the line was
/// created; the line total is always derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: String,
    pub title: String,
    pub image: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl CartItem {
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
