// ABOUTME: Normalization from a marketplace RawRecord to the CanonicalProduct schema.
// ABOUTME: Applies the platform's brand policy, resolves listing URLs and fills structural defaults.

//! Normalization of raw extracted values.
//!
//! Nothing here fails: an absent input becomes an absent output field, and a
//! listing with no price or name is still a valid record.

use url::Url;

use crate::extractors::rules::{BrandPolicy, RuleSet};
use crate::model::{CanonicalProduct, FeatureKey, Features, Price, RawRecord};

/// Normalizes one raw record for the marketplace described by `rules`.
///
/// `base` is the URL of the page the record was extracted from; relative
/// listing links are resolved against it.
pub fn normalize(rules: &RuleSet, base: Option<&Url>, raw: RawRecord) -> CanonicalProduct {
    let brand = match rules.brand_policy {
        BrandPolicy::Absent => None,
        BrandPolicy::Direct => raw.brand,
        BrandPolicy::DeriveFromName => derive_brand(raw.product_name.as_deref()),
    };

    let mut features = Features::default();
    for key in FeatureKey::ALL {
        features.set(key, raw.features.get(&key).cloned().flatten());
    }

    CanonicalProduct {
        platform: rules.platform.clone(),
        url: raw.url.as_deref().and_then(|href| resolve_url(base, href)),
        product_name: raw.product_name,
        brand,
        price: Price {
            selling_price: raw.price,
        },
        features,
        customer_ratings: raw.customer_ratings,
        reviews: Vec::new(),
        delivery_details: raw.delivery_details,
        seller_info: raw.seller_info,
    }
}

/// First whitespace-delimited token of the product name.
///
/// Multi-word brands ("Louis Philippe") come out as their first word only.
pub fn derive_brand(product_name: Option<&str>) -> Option<String> {
    product_name?.split_whitespace().next().map(str::to_string)
}

/// Resolves `href` to an absolute http(s) URL.
///
/// Relative links need a base; anything that does not end up http or https
/// (javascript:, mailto:, unparseable input) is dropped.
pub fn resolve_url(base: Option<&Url>, href: &str) -> Option<String> {
    let resolved = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
