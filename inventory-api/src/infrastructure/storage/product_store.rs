use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::domain::models::product::{NewProduct, Product, ProductUpdate};
use crate::error::AppError;

/// File-backed product collection.
///
/// The store holds nothing in memory between requests: every operation
/// re-reads the whole JSON document and every mutation rewrites it
/// wholesale. The lock keeps a full read-modify-write cycle exclusive
/// within this process; plain reads take the shared side.
pub struct ProductStore {
    path: PathBuf,
    lock: RwLock<()>,
}

pub async fn init_store(config: &Config) -> Result<ProductStore, AppError> {
    tracing::info!("Initializing product store at {}", &config.storage.data_file);

    ProductStore::open(&config.storage.data_file).await
}

impl ProductStore {
    /// Open a store over the given data file, creating the parent
    /// directory if needed. The file itself is created lazily by the
    /// first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        Ok(Self {
            path,
            lock: RwLock::new(()),
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Product>, AppError> {
        let _guard = self.lock.read().await;
        self.read_collection().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Product>, AppError> {
        let products = self.list_all().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    /// Append a record, assigning the next identifier and stamping both
    /// timestamps with the same instant.
    pub async fn append(&self, new: NewProduct) -> Result<Product, AppError> {
        let _guard = self.lock.write().await;

        let mut products = self.read_collection().await?;
        let id = next_id(&products)?;
        let now = Utc::now();

        let product = Product {
            id: id.to_string(),
            name: new.name,
            description: new.description,
            price: new.price,
            quantity: new.quantity,
            sku: new.sku,
            category: new.category,
            supplier: new.supplier,
            created_at: now,
            updated_at: now,
        };

        products.push(product.clone());
        self.write_collection(&products).await?;

        Ok(product)
    }

    /// Merge `update` over the record with the given id. The identifier
    /// and `created_at` never change; `updated_at` is refreshed.
    pub async fn replace(&self, id: &str, update: ProductUpdate) -> Result<Product, AppError> {
        let _guard = self.lock.write().await;

        let mut products = self.read_collection().await?;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found", id)))?;

        product.name = update.name;
        product.price = update.price;
        product.quantity = update.quantity;

        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(sku) = update.sku {
            product.sku = Some(sku);
        }
        if let Some(category) = update.category {
            product.category = Some(category);
        }
        if let Some(supplier) = update.supplier {
            product.supplier = Some(supplier);
        }

        product.updated_at = Utc::now();

        let updated = product.clone();
        self.write_collection(&products).await?;

        Ok(updated)
    }

    /// Remove the record with the given id. The collection is only
    /// rewritten when something was actually removed.
    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.lock.write().await;

        let mut products = self.read_collection().await?;
        let before = products.len();
        products.retain(|p| p.id != id);

        if products.len() == before {
            return Err(AppError::NotFound(format!("Product with ID {} not found", id)));
        }

        self.write_collection(&products).await
    }

    async fn read_collection(&self) -> Result<Vec<Product>, AppError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // A store that has never been written to is empty, not broken.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Storage(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn write_collection(&self, products: &[Product]) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(products)
            .map_err(|e| AppError::Storage(format!("failed to serialize collection: {}", e)))?;

        fs::write(&self.path, json).await.map_err(|e| {
            AppError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// Next identifier: max numeric id + 1, so 1 for an empty collection.
/// Identifiers are required to be numeric; anything else in the
/// persisted collection is corruption.
fn next_id(products: &[Product]) -> Result<u64, AppError> {
    let mut max = 0u64;
    for product in products {
        let id: u64 = product.id.parse().map_err(|_| {
            AppError::Storage(format!(
                "non-numeric product id in collection: {:?}",
                product.id
            ))
        })?;
        max = max.max(id);
    }
    Ok(max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn widget(name: &str, price: f64, quantity: u32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price,
            quantity,
            sku: None,
            category: None,
            supplier: None,
        }
    }

    fn update(name: &str, price: f64, quantity: u32) -> ProductUpdate {
        ProductUpdate {
            name: name.to_string(),
            description: None,
            price,
            quantity,
            sku: None,
            category: None,
            supplier: None,
        }
    }

    async fn test_store(dir: &TempDir) -> ProductStore {
        ProductStore::open(dir.path().join("products.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn append_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let first = store.append(widget("Widget", 9.5, 3)).await.unwrap();
        let second = store.append(widget("Gadget", 4.0, 1)).await.unwrap();
        let third = store.append(widget("Gizmo", 2.5, 7)).await.unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(third.id, "3");
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn id_grows_past_remaining_max() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.append(widget("A", 1.0, 1)).await.unwrap();
        store.append(widget("B", 1.0, 1)).await.unwrap();
        store.append(widget("C", 1.0, 1)).await.unwrap();
        store.remove("2").await.unwrap();

        let next = store.append(widget("D", 1.0, 1)).await.unwrap();
        assert_eq!(next.id, "4");
    }

    #[tokio::test]
    async fn find_by_id_returns_appended_record() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let created = store.append(widget("Widget", 9.5, 3)).await.unwrap();
        let found = store.find_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert!(store.find_by_id("99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_preserves_id_and_created_at() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let created = store.append(widget("Widget", 9.5, 3)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let updated = store.replace("1", update("Widget", 12.0, 3)).await.unwrap();

        assert_eq!(updated.id, "1");
        assert_eq!(updated.price, 12.0);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.created_at);
    }

    #[tokio::test]
    async fn replace_merges_optional_fields() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let mut new = widget("Widget", 9.5, 3);
        new.sku = Some("W-001".to_string());
        new.description = "A widget".to_string();
        store.append(new).await.unwrap();

        // Absent optional fields keep their stored values.
        let updated = store.replace("1", update("Widget", 9.5, 4)).await.unwrap();
        assert_eq!(updated.sku.as_deref(), Some("W-001"));
        assert_eq!(updated.description, "A widget");

        // Provided optional fields replace them.
        let mut patch = update("Widget", 9.5, 4);
        patch.sku = Some("W-002".to_string());
        let updated = store.replace("1", patch).await.unwrap();
        assert_eq!(updated.sku.as_deref(), Some("W-002"));
    }

    #[tokio::test]
    async fn replace_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let result = store.replace("99", update("Widget", 1.0, 1)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_then_find_yields_none() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.append(widget("Widget", 9.5, 3)).await.unwrap();
        store.remove("1").await.unwrap();

        assert!(store.find_by_id("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let result = store.remove("99").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn round_trip_preserves_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");

        let written = {
            let store = ProductStore::open(&path).await.unwrap();
            store.append(widget("A", 1.5, 1)).await.unwrap();
            store.append(widget("B", 2.5, 2)).await.unwrap();
            store.append(widget("C", 3.5, 3)).await.unwrap();
            store.list_all().await.unwrap()
        };

        let reopened = ProductStore::open(&path).await.unwrap();
        let read_back = reopened.list_all().await.unwrap();

        assert_eq!(read_back, written);
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");
        fs::write(&path, b"not json at all").await.unwrap();

        let store = ProductStore::open(&path).await.unwrap();
        let result = store.list_all().await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn non_numeric_id_rejected_on_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");
        let doc = serde_json::json!([{
            "id": "abc",
            "name": "Legacy",
            "description": "",
            "price": 1.0,
            "quantity": 1,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }]);
        fs::write(&path, serde_json::to_vec_pretty(&doc).unwrap())
            .await
            .unwrap();

        let store = ProductStore::open(&path).await.unwrap();
        let result = store.append(widget("Widget", 1.0, 1)).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
