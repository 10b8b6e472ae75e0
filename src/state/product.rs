use serde::{Deserialize, Serialize};

/// A product extracted from a product page
///
/// Records are keyed by product id in the result store, so re-extracting the
/// same page overwrites the previous record instead of adding a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Display name, falls back to the product slug when the page has none
    pub name: String,

    /// Integer price taken from the price element's `content` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Display string such as "18,90 kr/l"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductRecord {
    /// Creates a record with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
            brand: None,
            unit_price: None,
            description: None,
        }
    }
}
