use std::sync::Arc;

use crate::domain::models::product::{
    InventorySummary, NewProduct, Product, ProductInput, ProductUpdate,
};
use crate::error::AppError;
use crate::server::AppState;

/// Stock level below which a product counts as low-stock in the
/// inventory report.
const LOW_STOCK_THRESHOLD: u32 = 5;

pub struct ProductService {
    state: Arc<AppState>,
}

impl ProductService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.state.store.list_all().await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, AppError> {
        self.state
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found", id)))
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, AppError> {
        let (name, price, quantity) = required_fields(&input)?;

        let new = NewProduct {
            name,
            description: input.description.unwrap_or_default(),
            price,
            quantity,
            sku: input.sku,
            category: input.category,
            supplier: input.supplier,
        };

        self.state.store.append(new).await
    }

    pub async fn update_product(&self, id: &str, input: ProductInput) -> Result<Product, AppError> {
        let (name, price, quantity) = required_fields(&input)?;

        let update = ProductUpdate {
            name,
            description: input.description,
            price,
            quantity,
            sku: input.sku,
            category: input.category,
            supplier: input.supplier,
        };

        self.state.store.replace(id, update).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        self.state.store.remove(id).await
    }

    pub async fn inventory_summary(&self) -> Result<InventorySummary, AppError> {
        let products = self.state.store.list_all().await?;

        let total_quantity = products.iter().map(|p| u64::from(p.quantity)).sum();
        let total_value = products
            .iter()
            .map(|p| p.price * f64::from(p.quantity))
            .sum();
        let out_of_stock = products.iter().filter(|p| p.quantity == 0).count();
        let low_stock = products
            .iter()
            .filter(|p| p.quantity > 0 && p.quantity < LOW_STOCK_THRESHOLD)
            .count();

        Ok(InventorySummary {
            total_products: products.len(),
            total_quantity,
            total_value,
            out_of_stock,
            low_stock,
        })
    }
}

/// A product cannot exist without a name, a price and a quantity.
fn required_fields(input: &ProductInput) -> Result<(String, f64, u32), AppError> {
    let name = input
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

    let price = input
        .price
        .ok_or_else(|| AppError::Validation("price is required".to_string()))?;
    if price < 0.0 {
        return Err(AppError::Validation("price cannot be negative".to_string()));
    }

    let quantity = input
        .quantity
        .ok_or_else(|| AppError::Validation("quantity is required".to_string()))?;

    Ok((name, price, quantity))
}
