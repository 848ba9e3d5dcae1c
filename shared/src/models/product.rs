//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Product entity as delivered by the remote catalog
///
/// All fields arrive as strings; `price` is a decimal encoded as text and
/// `created_at` is an ISO-8601 timestamp (lexicographic compare is
/// date-correct).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Image URL
    pub image: String,
    /// Decimal price encoded as text (e.g. "15000")
    pub price: String,
    pub description: String,
    pub model: String,
    pub brand: String,
    pub created_at: String,
}

impl Product {
    /// Numeric price, falling back to zero when the text does not parse
    pub fn price_value(&self) -> Decimal {
        Decimal::from_str(&self.price).unwrap_or_default()
    }

    /// Display price with currency suffix
    pub fn formatted_price(&self) -> String {
        format!("{} ₺", self.price)
    }
}

// Identity is the catalog id only
impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

/// Listing sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortType {
    #[default]
    OldToNew,
    NewToOld,
    PriceHighToLow,
    PriceLowToHigh,
}

impl std::fmt::Display for SortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SortType::OldToNew => "Old to new",
            SortType::NewToOld => "New to old",
            SortType::PriceHighToLow => "Price high to low",
            SortType::PriceLowToHigh => "Price low to high",
        };
        f.write_str(label)
    }
}

/// Filter, search and sort options for the product listing
///
/// Empty collections and empty search text mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub sort_type: SortType,
    pub selected_brands: BTreeSet<String>,
    pub selected_models: BTreeSet<String>,
    pub search_text: String,
}
