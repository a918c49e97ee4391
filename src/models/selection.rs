use serde::{Deserialize, Serialize};

use crate::models::catalog::{ProductItem, ServiceItem};

/// The cart: chosen services plus products with quantities. Totals are
/// always recomputed from the entries, never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    pub services: Vec<ServiceItem>,
    pub products: Vec<SelectedProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl Selection {
    /// Add the service if absent, remove it if present.
    pub fn toggle_service(&mut self, service: &ServiceItem) {
        if self.services.iter().any(|s| s.id == service.id) {
            self.services.retain(|s| s.id != service.id);
        } else {
            self.services.push(service.clone());
        }
    }

    /// Apply a signed quantity delta (the inline +/- stepper). A result of
    /// zero or less drops the entry; a positive delta on an absent product
    /// creates it.
    pub fn update_product_qty(&mut self, product: &ProductItem, delta: i64) {
        if let Some(entry) = self.products.iter_mut().find(|p| p.id == product.id) {
            entry.quantity += delta;
            self.products.retain(|p| p.quantity > 0);
        } else if delta > 0 {
            self.products.push(SelectedProduct {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity: delta,
            });
        }
    }

    /// Add an absolute quantity on top of whatever is already selected
    /// (the product detail dialog confirms a count rather than stepping).
    pub fn add_product(&mut self, product: &ProductItem, quantity: i64) {
        if quantity <= 0 {
            return;
        }
        if let Some(entry) = self.products.iter_mut().find(|p| p.id == product.id) {
            entry.quantity += quantity;
        } else {
            self.products.push(SelectedProduct {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity,
            });
        }
    }

    pub fn total_price(&self) -> f64 {
        let services: f64 = self.services.iter().map(|s| s.price).sum();
        let products: f64 = self
            .products
            .iter()
            .map(|p| p.price * p.quantity as f64)
            .sum();
        services + products
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.products.is_empty()
    }

    pub fn item_count(&self) -> i64 {
        self.services.len() as i64 + self.products.iter().map(|p| p.quantity).sum::<i64>()
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name.clone()).collect()
    }

    /// `"2x Pomada Black"` style lines for the booking snapshot.
    pub fn product_descriptions(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| format!("{}x {}", p.quantity, p.name))
            .collect()
    }

    pub fn clear(&mut self) {
        self.services.clear();
        self.products.clear();
    }
}
