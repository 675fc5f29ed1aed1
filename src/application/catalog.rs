use crate::domain::cart::Product;
use rust_decimal::Decimal;

/// The fixed product list the cart sells from. Read-only after construction.
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn demo() -> Self {
        Self::new(vec![
            Product {
                id: "p1".to_string(),
                title: "Gaming Mouse".to_string(),
                image: "https://example.com/images/mouse.jpg".to_string(),
                price: Decimal::new(5999, 2),
            },
            Product {
                id: "p2".to_string(),
                title: "Mechanical Keyboard".to_string(),
                image: "https://example.com/images/keyboard.jpg".to_string(),
                price: Decimal::new(11999, 2),
            },
            Product {
                id: "p3".to_string(),
                title: "27\" Monitor".to_string(),
                image: "https://example.com/images/monitor.jpg".to_string(),
                price: Decimal::new(34950, 2),
            },
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_lookup() {
        let catalog = ProductCatalog::demo();
        assert_eq!(catalog.products().len(), 3);

        let keyboard = catalog.find("p2").unwrap();
        assert_eq!(keyboard.title, "Mechanical Keyboard");
        assert_eq!(keyboard.price, Decimal::new(11999, 2));

        assert!(catalog.find("p999").is_none());
    }
}
