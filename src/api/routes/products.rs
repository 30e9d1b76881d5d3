//! Product endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::catalog::{validate_new_product, NewProduct, Product};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProductResponse {
    pub product_id: i32,
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<NewProduct>,
) -> Result<Json<CreateProductResponse>, ApiError> {
    validate_new_product(&request).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let product_id = state.catalog.create_product(request).await?;
    info!(product_id, "Created product");

    Ok(Json(CreateProductResponse { product_id }))
}

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_support::test_state;

    fn request() -> NewProduct {
        NewProduct {
            name: "Hammer".to_string(),
            brand: "Acme".to_string(),
            price: 9.99,
            category: "tools".to_string(),
            description: "A claw hammer".to_string(),
            supplier_id: 1,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_products() {
        let state = test_state();

        let created = create_product(State(state.clone()), Json(request()))
            .await
            .unwrap();
        assert_eq!(created.product_id, 1);

        let products = list_products(State(state)).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].brand, "Acme");
    }

    #[tokio::test]
    async fn test_create_product_invalid_price() {
        let state = test_state();
        let mut input = request();
        input.price = -2.0;

        let err = create_product(State(state), Json(input)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.response.error.message.contains("price"));
    }

    #[tokio::test]
    async fn test_create_product_invalid_supplier_id() {
        let state = test_state();
        let mut input = request();
        input.supplier_id = 0;

        let err = create_product(State(state), Json(input)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
