//! PostgreSQL-backed catalog repository

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::catalog::{CatalogRepository, NewProduct, NewSupplier, Product, Supplier};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensures the catalog tables exist
    pub async fn ensure_tables(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS suppliers (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                contact_info TEXT NOT NULL,
                product_category TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create suppliers table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                brand TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                supplier_id INTEGER NOT NULL REFERENCES suppliers(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create products table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn create_supplier(&self, supplier: NewSupplier) -> Result<i32, DomainError> {
        let row = sqlx::query(
            "INSERT INTO suppliers (name, contact_info, product_category) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_info)
        .bind(&supplier.product_category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert supplier: {}", e)))?;

        Ok(row.get("id"))
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, name, contact_info, product_category FROM suppliers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list suppliers: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| Supplier {
                id: row.get("id"),
                name: row.get("name"),
                contact_info: row.get("contact_info"),
                product_category: row.get("product_category"),
            })
            .collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<i32, DomainError> {
        let row = sqlx::query(
            "INSERT INTO products (name, brand, price, category, description, supplier_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.supplier_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert product: {}", e)))?;

        Ok(row.get("id"))
    }

    async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, name, brand, price, category, description, supplier_id \
             FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list products: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| Product {
                id: row.get("id"),
                name: row.get("name"),
                brand: row.get("brand"),
                price: row.get("price"),
                category: row.get("category"),
                description: row.get("description"),
                supplier_id: row.get("supplier_id"),
            })
            .collect())
    }
}
