//! Supplier endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::catalog::{validate_new_supplier, NewSupplier, Supplier};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSupplierResponse {
    pub supplier_id: i32,
}

/// POST /suppliers
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(request): Json<NewSupplier>,
) -> Result<Json<CreateSupplierResponse>, ApiError> {
    validate_new_supplier(&request).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let supplier_id = state.catalog.create_supplier(request).await?;
    info!(supplier_id, "Created supplier");

    Ok(Json(CreateSupplierResponse { supplier_id }))
}

/// GET /suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    let suppliers = state.catalog.list_suppliers().await?;
    Ok(Json(suppliers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_support::test_state;

    fn request() -> NewSupplier {
        NewSupplier {
            name: "Acme".to_string(),
            contact_info: "acme@example.com".to_string(),
            product_category: "tools".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_suppliers() {
        let state = test_state();

        let created = create_supplier(State(state.clone()), Json(request()))
            .await
            .unwrap();
        assert_eq!(created.supplier_id, 1);

        let suppliers = list_suppliers(State(state)).await.unwrap();
        assert_eq!(suppliers.len(), 1);
        assert_eq!(suppliers[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_create_supplier_missing_field() {
        let state = test_state();
        let mut input = request();
        input.name = String::new();

        let err = create_supplier(State(state), Json(input)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_suppliers_empty() {
        let suppliers = list_suppliers(State(test_state())).await.unwrap();
        assert!(suppliers.is_empty());
    }
}
