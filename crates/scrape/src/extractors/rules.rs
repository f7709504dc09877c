// ABOUTME: Per-marketplace selector rule sets and the ordered registry that holds them.
// ABOUTME: Rules are pure data: priority-ordered CSS locators for the item boundary and each field.

//! Selector rule sets for marketplace search result pages.
//!
//! A [`RuleSet`] describes where each canonical field lives inside one
//! result item of a marketplace's search page. Every field rule is a list
//! of locators tried in order, so markup variants can be covered by adding
//! fallbacks instead of code. Adding a marketplace means adding a rule set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::model::FeatureKey;

/// Placeholder substituted with the encoded search term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Locates a value inside a result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Locator {
    /// A CSS selector whose first match contributes its trimmed text, e.g. "div._4rR01T"
    Css(String),
    /// A CSS selector with attribute extraction, e.g. ["a.s-link", "href"]
    CssAttr(Vec<String>),
}

impl Default for Locator {
    fn default() -> Self {
        Locator::Css(String::new())
    }
}

impl Locator {
    /// Splits the locator into its CSS selector and optional attribute name.
    ///
    /// A single-element `CssAttr` behaves like `Css`.
    pub fn parts(&self) -> (&str, Option<&str>) {
        match self {
            Locator::Css(css) => (css.as_str(), None),
            Locator::CssAttr(parts) => match parts.as_slice() {
                [css, attr, ..] => (css.as_str(), Some(attr.as_str())),
                [css] => (css.as_str(), None),
                [] => ("", None),
            },
        }
    }
}

/// Priority-ordered locators for one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default)]
    pub selectors: Vec<Locator>,
}

impl FieldRule {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selectors: vec![Locator::Css(selector.into())],
        }
    }

    pub fn attr(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            selectors: vec![Locator::CssAttr(vec![selector.into(), attr.into()])],
        }
    }

    /// Appends a fallback locator.
    pub fn or(mut self, locator: Locator) -> Self {
        self.selectors.push(locator);
        self
    }
}

/// How the canonical `brand` is obtained for a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandPolicy {
    /// Brand is never filled.
    #[default]
    Absent,
    /// Brand comes from the rule set's `brand` field; no derivation.
    Direct,
    /// Brand is the first whitespace token of the product name.
    DeriveFromName,
}

/// A complete extraction rule set for one marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Platform identifier stamped on every record, e.g. "Flipkart"
    pub platform: String,
    /// Search page URL with a `{query}` placeholder
    pub search_url: String,
    /// Result-item boundary selectors; the first that matches anything wins
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub product_name: FieldRule,
    #[serde(default)]
    pub price: FieldRule,
    /// Link to the listing; relative values are resolved against the page URL
    #[serde(default)]
    pub url: FieldRule,
    #[serde(default)]
    pub brand: Option<FieldRule>,
    #[serde(default)]
    pub brand_policy: BrandPolicy,
    #[serde(default)]
    pub features: BTreeMap<FeatureKey, FieldRule>,
    #[serde(default)]
    pub customer_ratings: Option<FieldRule>,
    #[serde(default)]
    pub delivery_details: Option<FieldRule>,
    #[serde(default)]
    pub seller_info: Option<FieldRule>,
}

impl RuleSet {
    /// Checks the structural requirements a rule set must meet before use.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let target = if self.platform.is_empty() {
            "<unnamed rule set>"
        } else {
            self.platform.as_str()
        };
        if self.platform.trim().is_empty() {
            return Err(ScrapeError::config(
                target,
                "Validate",
                Some(anyhow::anyhow!("platform must not be empty")),
            ));
        }
        if !self.search_url.contains(QUERY_PLACEHOLDER) {
            return Err(ScrapeError::config(
                target,
                "Validate",
                Some(anyhow::anyhow!(
                    "search_url must contain the {} placeholder",
                    QUERY_PLACEHOLDER
                )),
            ));
        }
        if self.items.iter().all(|s| s.trim().is_empty()) {
            return Err(ScrapeError::config(
                target,
                "Validate",
                Some(anyhow::anyhow!("items must list at least one selector")),
            ));
        }
        Ok(())
    }

    /// Every CSS selector string referenced by this rule set.
    pub fn css_selectors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.items.iter().map(String::as_str).collect();
        let fields = [&self.product_name, &self.price, &self.url]
            .into_iter()
            .chain(self.brand.iter())
            .chain(self.features.values())
            .chain(self.customer_ratings.iter())
            .chain(self.delivery_details.iter())
            .chain(self.seller_info.iter());
        for rule in fields {
            out.extend(rule.selectors.iter().map(|l| l.parts().0));
        }
        out
    }
}

/// Ordered collection of rule sets. Order is the aggregation order.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rule_sets: Vec<RuleSet>,
}

impl RuleRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a rule set. Platforms must be unique (case-insensitive).
    pub fn register(&mut self, rules: RuleSet) -> Result<(), ScrapeError> {
        rules.validate()?;
        if self.get(&rules.platform).is_some() {
            return Err(ScrapeError::config(
                rules.platform.clone(),
                "Register",
                Some(anyhow::anyhow!("duplicate platform")),
            ));
        }
        self.rule_sets.push(rules);
        Ok(())
    }

    /// Looks up a rule set by platform name, ignoring case.
    pub fn get(&self, platform: &str) -> Option<&RuleSet> {
        self.rule_sets
            .iter()
            .find(|r| r.platform.eq_ignore_ascii_case(platform))
    }

    /// Keeps only the named platforms, preserving registry order.
    pub fn retain_platforms<S: AsRef<str>>(&mut self, platforms: &[S]) {
        self.rule_sets.retain(|r| {
            platforms
                .iter()
                .any(|p| r.platform.eq_ignore_ascii_case(p.as_ref()))
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.rule_sets.iter()
    }

    /// Returns the number of registered rule sets.
    pub fn len(&self) -> usize {
        self.rule_sets.len()
    }

    /// Returns true if no rule sets are registered.
    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }

    pub fn into_vec(self) -> Vec<RuleSet> {
        self.rule_sets
    }
}
