// ABOUTME: Field extraction: applies a marketplace RuleSet to a parsed search page.
// ABOUTME: Produces one RawRecord per result item, capped and in document order.

//! Selector-based field extraction.
//!
//! Key behaviors:
//! - Boundary selectors are tried in order; the first with any match wins.
//! - At most `max_results` boundary nodes are visited, in document order.
//! - Each field is looked up under its own boundary node, independently of
//!   every other field. A missing node only blanks that one field.
//! - Field locators are tried in order; first non-empty value wins.
//! - Values are trimmed. Empty or whitespace-only values count as absent.

use scraper::{ElementRef, Html};

use crate::extractors::compiled::get_or_compile;
use crate::extractors::rules::{FieldRule, Locator, RuleSet};
use crate::model::RawRecord;

/// Extracts up to `max_results` raw records from `doc` according to `rules`.
pub fn extract(doc: &Html, rules: &RuleSet, max_results: usize) -> Vec<RawRecord> {
    boundary_nodes(doc, &rules.items, max_results)
        .into_iter()
        .map(|item| extract_record(item, rules))
        .collect()
}

/// Returns the first `max_results` nodes matched by the first boundary
/// selector that matches anything.
pub fn boundary_nodes<'a>(doc: &'a Html, items: &[String], max_results: usize) -> Vec<ElementRef<'a>> {
    if max_results == 0 {
        return Vec::new();
    }
    for css in items {
        let Some(selector) = get_or_compile(css) else {
            continue;
        };
        let nodes: Vec<ElementRef<'a>> = doc.select(&selector).take(max_results).collect();
        if !nodes.is_empty() {
            return nodes;
        }
    }
    Vec::new()
}

/// Applies every field rule of `rules` under one boundary node.
pub fn extract_record(item: ElementRef<'_>, rules: &RuleSet) -> RawRecord {
    let optional = |rule: &Option<FieldRule>| rule.as_ref().and_then(|r| extract_field(item, r));

    RawRecord {
        product_name: extract_field(item, &rules.product_name),
        brand: optional(&rules.brand),
        price: extract_field(item, &rules.price),
        url: extract_field(item, &rules.url),
        features: rules
            .features
            .iter()
            .map(|(key, rule)| (*key, extract_field(item, rule)))
            .collect(),
        customer_ratings: optional(&rules.customer_ratings),
        delivery_details: optional(&rules.delivery_details),
        seller_info: optional(&rules.seller_info),
    }
}

/// Returns the first non-empty value produced by the rule's locators.
pub fn extract_field(item: ElementRef<'_>, rule: &FieldRule) -> Option<String> {
    rule.selectors
        .iter()
        .find_map(|locator| extract_locator(item, locator))
}

fn extract_locator(item: ElementRef<'_>, locator: &Locator) -> Option<String> {
    let (css, attr) = locator.parts();
    let selector = get_or_compile(css)?;
    item.select(&selector).find_map(|el| match attr {
        Some(name) => el.value().attr(name).and_then(non_empty_trimmed),
        None => non_empty_trimmed(&el.text().collect::<String>()),
    })
}

fn non_empty_trimmed(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureKey;
    use pretty_assertions::assert_eq;

    const SAMPLE_HTML: &str = r#"
        <html><body>
          <ul>
            <li class="result">
              <h3>  Acme   Oxford Shirt </h3>
              <span class="price">₹1,299</span>
              <a class="title" href="/p/1">view</a>
              <span class="color">Blue</span>
            </li>
            <li class="result">
              <h3>Zed Polo</h3>
              <a class="title" href="/p/2">view</a>
            </li>
            <li class="result">
              <h3></h3>
              <h4>Fallback Name</h4>
              <span class="price">   </span>
            </li>
            <li class="result"><h3>Fourth</h3></li>
          </ul>
          <span class="price">outside</span>
        </body></html>
    "#;

    fn rules() -> RuleSet {
        RuleSet {
            platform: "Example".into(),
            search_url: "https://shop.example/s?q={query}".into(),
            items: vec!["li.result".into()],
            product_name: FieldRule::css("h3").or(Locator::Css("h4".into())),
            price: FieldRule::css("span.price"),
            url: FieldRule::attr("a.title", "href"),
            ..Default::default()
        }
    }

    #[test]
    fn caps_results_in_document_order() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let records = extract(&doc, &rules(), 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_name.as_deref(), Some("Acme   Oxford Shirt"));
        assert_eq!(records[1].product_name.as_deref(), Some("Zed Polo"));
    }

    #[test]
    fn returns_fewer_when_page_has_fewer() {
        let doc = Html::parse_document(SAMPLE_HTML);
        assert_eq!(extract(&doc, &rules(), 10).len(), 4);
    }

    #[test]
    fn zero_cap_yields_nothing() {
        let doc = Html::parse_document(SAMPLE_HTML);
        assert!(extract(&doc, &rules(), 0).is_empty());
    }

    #[test]
    fn missing_field_does_not_block_others() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let records = extract(&doc, &rules(), 2);
        let second = &records[1];
        assert_eq!(second.price, None);
        assert_eq!(second.url.as_deref(), Some("/p/2"));
        assert_eq!(second.product_name.as_deref(), Some("Zed Polo"));
    }

    #[test]
    fn fields_are_scoped_to_their_item() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let records = extract(&doc, &rules(), 4);
        // The stray span.price outside the list must never leak into an item.
        assert_eq!(records[3].price, None);
    }

    #[test]
    fn empty_text_falls_through_to_next_locator() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let records = extract(&doc, &rules(), 3);
        let third = &records[2];
        assert_eq!(third.product_name.as_deref(), Some("Fallback Name"));
        assert_eq!(third.price, None);
        assert_eq!(third.url, None);
    }

    #[test]
    fn boundary_fallback_selector_used_when_first_misses() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let mut rules = rules();
        rules.items = vec!["div.gone".into(), "[[[bad".into(), "li.result".into()];
        assert_eq!(extract(&doc, &rules, 3).len(), 3);
    }

    #[test]
    fn no_boundary_match_yields_empty() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(extract(&doc, &rules(), 5).is_empty());
    }

    #[test]
    fn declared_features_and_extras_are_extracted() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let mut rules = rules();
        rules
            .features
            .insert(FeatureKey::Color, FieldRule::css("span.color"));
        rules.seller_info = Some(FieldRule::css("span.seller"));
        let records = extract(&doc, &rules, 2);
        assert_eq!(
            records[0].features.get(&FeatureKey::Color),
            Some(&Some("Blue".to_string()))
        );
        assert_eq!(records[1].features.get(&FeatureKey::Color), Some(&None));
        assert_eq!(records[0].seller_info, None);
    }

    #[test]
    fn text_is_trimmed_only() {
        assert_eq!(non_empty_trimmed("  ₹ 1,299  "), Some("₹ 1,299".to_string()));
        assert_eq!(non_empty_trimmed(" \n\t "), None);
    }
}
