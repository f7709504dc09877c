// ABOUTME: Declarative extraction for marketplace search pages.
// ABOUTME: Rule sets, the selector cache, the field extractor and the rule loader.

//! Extraction module.
//!
//! Submodules:
//! - `rules`: per-marketplace selector rule sets and their registry.
//! - `compiled`: cache of parsed CSS selectors.
//! - `select`: applies a rule set to a parsed page.
//! - `loader`: builtin and file-based rule set loading.

pub mod compiled;
pub mod loader;
pub mod rules;
pub mod select;
