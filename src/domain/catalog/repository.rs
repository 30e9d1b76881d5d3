use async_trait::async_trait;

use super::entity::{NewProduct, NewSupplier, Product, Supplier};
use crate::domain::DomainError;

/// Persistence boundary for the supplier/product catalog
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a supplier and return its generated id
    async fn create_supplier(&self, supplier: NewSupplier) -> Result<i32, DomainError>;

    /// List all suppliers
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, DomainError>;

    /// Insert a product and return its generated id
    async fn create_product(&self, product: NewProduct) -> Result<i32, DomainError>;

    /// List all products
    async fn list_products(&self) -> Result<Vec<Product>, DomainError>;
}
