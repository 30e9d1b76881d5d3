//! Supplier/product catalog entities and persistence boundary

mod entity;
mod repository;
mod validation;

pub use entity::{NewProduct, NewSupplier, Product, Supplier};
pub use repository::CatalogRepository;
pub use validation::{validate_new_product, validate_new_supplier, CatalogValidationError};

#[cfg(test)]
pub use repository::mock::InMemoryCatalogRepository;
