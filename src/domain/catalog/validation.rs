//! Catalog input validation

use std::fmt;

use super::entity::{NewProduct, NewSupplier};

/// Catalog validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValidationError {
    /// A required text field is empty or missing
    MissingField { field: &'static str },
    /// Price is not a positive finite number
    InvalidPrice { value: f64 },
    /// Supplier reference is not a positive id
    InvalidSupplierId { value: i32 },
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "Missing required field '{}'", field)
            }
            Self::InvalidPrice { value } => {
                write!(f, "Invalid price {}: must be a positive number", value)
            }
            Self::InvalidSupplierId { value } => {
                write!(f, "Invalid supplier_id {}: must be a positive id", value)
            }
        }
    }
}

impl std::error::Error for CatalogValidationError {}

/// Validate supplier input before insertion
pub fn validate_new_supplier(input: &NewSupplier) -> Result<(), CatalogValidationError> {
    require_text("name", &input.name)?;
    require_text("contact_info", &input.contact_info)?;
    require_text("product_category", &input.product_category)?;
    Ok(())
}

/// Validate product input before insertion
pub fn validate_new_product(input: &NewProduct) -> Result<(), CatalogValidationError> {
    require_text("name", &input.name)?;
    require_text("brand", &input.brand)?;
    require_text("category", &input.category)?;
    require_text("description", &input.description)?;

    if !input.price.is_finite() || input.price <= 0.0 {
        return Err(CatalogValidationError::InvalidPrice { value: input.price });
    }

    if input.supplier_id <= 0 {
        return Err(CatalogValidationError::InvalidSupplierId {
            value: input.supplier_id,
        });
    }

    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), CatalogValidationError> {
    if value.trim().is_empty() {
        return Err(CatalogValidationError::MissingField { field });
    }
    Ok(())
}
