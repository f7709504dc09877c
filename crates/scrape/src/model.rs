// ABOUTME: Canonical product schema shared by every marketplace, plus the raw per-listing record.
// ABOUTME: Absent values are always None (JSON null); the features mapping always carries every key.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of structured attribute keys carried by every product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Fit,
    Fabric,
    Pattern,
    CollarStyle,
    SleeveLength,
    Color,
    SizeOptions,
}

impl FeatureKey {
    /// Every feature key, in schema order.
    pub const ALL: [FeatureKey; 7] = [
        FeatureKey::Fit,
        FeatureKey::Fabric,
        FeatureKey::Pattern,
        FeatureKey::CollarStyle,
        FeatureKey::SleeveLength,
        FeatureKey::Color,
        FeatureKey::SizeOptions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::Fit => "fit",
            FeatureKey::Fabric => "fabric",
            FeatureKey::Pattern => "pattern",
            FeatureKey::CollarStyle => "collar_style",
            FeatureKey::SleeveLength => "sleeve_length",
            FeatureKey::Color => "color",
            FeatureKey::SizeOptions => "size_options",
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured attributes of a listing.
///
/// Every key serializes, `null` when the platform did not supply it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Features {
    pub fit: Option<String>,
    pub fabric: Option<String>,
    pub pattern: Option<String>,
    pub collar_style: Option<String>,
    pub sleeve_length: Option<String>,
    pub color: Option<String>,
    pub size_options: Option<String>,
}

impl Features {
    pub fn get(&self, key: FeatureKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    pub fn set(&mut self, key: FeatureKey, value: Option<String>) {
        *self.slot_mut(key) = value;
    }

    /// Returns true when no key carries a value.
    pub fn is_blank(&self) -> bool {
        FeatureKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    fn slot(&self, key: FeatureKey) -> &Option<String> {
        match key {
            FeatureKey::Fit => &self.fit,
            FeatureKey::Fabric => &self.fabric,
            FeatureKey::Pattern => &self.pattern,
            FeatureKey::CollarStyle => &self.collar_style,
            FeatureKey::SleeveLength => &self.sleeve_length,
            FeatureKey::Color => &self.color,
            FeatureKey::SizeOptions => &self.size_options,
        }
    }

    fn slot_mut(&mut self, key: FeatureKey) -> &mut Option<String> {
        match key {
            FeatureKey::Fit => &mut self.fit,
            FeatureKey::Fabric => &mut self.fabric,
            FeatureKey::Pattern => &mut self.pattern,
            FeatureKey::CollarStyle => &mut self.collar_style,
            FeatureKey::SleeveLength => &mut self.sleeve_length,
            FeatureKey::Color => &mut self.color,
            FeatureKey::SizeOptions => &mut self.size_options,
        }
    }
}

/// Price as shown by the marketplace. Kept verbatim, currency symbols and
/// separators included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Price {
    pub selling_price: Option<String>,
}

/// The unified, cross-platform product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub platform: String,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub price: Price,
    pub features: Features,
    pub customer_ratings: Option<String>,
    pub reviews: Vec<String>,
    pub delivery_details: Option<String>,
    pub seller_info: Option<String>,
    pub url: Option<String>,
}

impl CanonicalProduct {
    /// A record for `platform` with every optional field absent.
    pub fn empty(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            product_name: None,
            brand: None,
            price: Price::default(),
            features: Features::default(),
            customer_ratings: None,
            reviews: Vec::new(),
            delivery_details: None,
            seller_info: None,
            url: None,
        }
    }
}

/// Field values pulled from one result item, before normalization.
///
/// Values are trimmed but otherwise untouched; `url` may still be relative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
    pub features: BTreeMap<FeatureKey, Option<String>>,
    pub customer_ratings: Option<String>,
    pub delivery_details: Option<String>,
    pub seller_info: Option<String>,
}
