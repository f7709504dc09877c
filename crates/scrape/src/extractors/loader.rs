// ABOUTME: Loads marketplace rule sets from embedded JSON or a user-supplied JSON file.
// ABOUTME: Provides load_builtin_registry() with the default Amazon, Flipkart and Snapdeal rules.

//! Rule set loading.
//!
//! Rule sets are plain JSON arrays of [`RuleSet`] objects. Loading validates
//! each one, rejects duplicate platforms, and warms the selector cache.

use std::fs;
use std::path::Path;

use crate::error::ScrapeError;
use crate::extractors::compiled::precompile_selectors;
use crate::extractors::rules::{RuleRegistry, RuleSet};

/// Embedded JSON containing the built-in marketplace rule sets.
const BUILTIN_RULES_JSON: &str = include_str!("../../data/marketplaces.json");

/// Parses a JSON array of rule sets into a validated registry.
///
/// `origin` names the source in error messages (a file path or "builtin").
pub fn parse_registry(json: &str, origin: &str) -> Result<RuleRegistry, ScrapeError> {
    let rule_sets: Vec<RuleSet> = serde_json::from_str(json).map_err(|e| {
        ScrapeError::config(origin, "Load", Some(anyhow::anyhow!("invalid rule JSON: {}", e)))
    })?;

    let mut registry = RuleRegistry::new();
    for rules in rule_sets {
        precompile_selectors(rules.css_selectors());
        registry.register(rules)?;
    }
    Ok(registry)
}

/// Loads rule sets from a JSON file on disk.
pub fn load_registry_from_path(path: impl AsRef<Path>) -> Result<RuleRegistry, ScrapeError> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|e| {
        ScrapeError::config(&origin, "Load", Some(anyhow::anyhow!("read failed: {}", e)))
    })?;
    parse_registry(&json, &origin)
}

/// Loads the built-in rule registry from embedded JSON.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or fails validation.
pub fn load_builtin_registry() -> RuleRegistry {
    parse_registry(BUILTIN_RULES_JSON, "builtin").expect("failed to parse builtin rule sets")
}
