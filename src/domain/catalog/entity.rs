use serde::{Deserialize, Serialize};

/// A supplier in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i32,
    pub name: String,
    pub contact_info: String,
    pub product_category: String,
}

/// Input for creating a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_info: String,
    pub product_category: String,
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub supplier_id: i32,
}

/// Input for creating a product.
///
/// `price` and `supplier_id` are accepted as native numbers or numeric
/// strings, matching what clients already send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    pub category: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub supplier_id: i32,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => {
            if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
                return Err(serde::de::Error::custom(format!(
                    "invalid integer value {}",
                    n
                )));
            }
            Ok(n as i32)
        }
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}
