// ABOUTME: Integration tests for the pricelens binary against a mock marketplace server.
// ABOUTME: Covers JSON output, file output, platform filtering and the no-results exit code.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const LISTING: &str = r#"<html><body>
<div class="item"><h3>Acme Oxford Shirt</h3><span class="price">₹799</span><a href="/p/1">x</a></div>
<div class="item"><h3>Bolt Linen Shirt</h3><span class="price">₹999</span><a href="/p/2">x</a></div>
<div class="item"><h3>Crest Denim Shirt</h3><span class="price">₹1,199</span><a href="/p/3">x</a></div>
</body></html>"#;

fn write_rules(dir: &TempDir, server: &MockServer, paths: &[(&str, &str)]) -> PathBuf {
    let rule_sets: Vec<serde_json::Value> = paths
        .iter()
        .map(|(platform, path)| {
            serde_json::json!({
                "platform": platform,
                "search_url": format!("{}?q={{query}}", server.url(*path)),
                "items": ["div.item"],
                "product_name": {"selectors": ["h3"]},
                "price": {"selectors": ["span.price"]},
                "url": {"selectors": [["a", "href"]]},
                "brand_policy": "derive_from_name"
            })
        })
        .collect();
    let path = dir.path().join("rules.json");
    fs::write(&path, serde_json::to_string_pretty(&rule_sets).unwrap()).unwrap();
    path
}

fn serve_listing(server: &MockServer, path: &str) {
    server.mock(|when, then| {
        when.method(GET).path(path.to_string());
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(LISTING);
    });
}

fn pricelens() -> Command {
    Command::cargo_bin("pricelens").unwrap()
}

#[test]
fn json_output_lists_products_in_source_order() {
    let server = MockServer::start();
    serve_listing(&server, "/one");
    serve_listing(&server, "/two");
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one"), ("Two", "/two")]);

    let output = pricelens()
        .arg("--rules")
        .arg(&rules)
        .arg("--json")
        .args(["slim", "fit", "shirt"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let products: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 4);
    assert_eq!(products[0]["platform"], "One");
    assert_eq!(products[0]["product_name"], "Acme Oxford Shirt");
    assert_eq!(products[0]["brand"], "Acme");
    assert_eq!(products[1]["price"]["selling_price"], "₹999");
    assert_eq!(products[2]["platform"], "Two");
    assert_eq!(products[0]["url"], server.url("/p/1"));
}

#[test]
fn max_results_caps_each_source() {
    let server = MockServer::start();
    serve_listing(&server, "/one");
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one")]);

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .args(["--jsonl", "--max-results", "3", "shirt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Crest Denim Shirt"))
        .stdout(predicate::function(|s: &str| s.lines().count() == 3));
}

#[test]
fn output_flag_writes_file() {
    let server = MockServer::start();
    serve_listing(&server, "/one");
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one")]);
    let out = dir.path().join("products.json");

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .arg("--output")
        .arg(&out)
        .arg("shirt")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 products to"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 2);
}

#[test]
fn platform_filter_skips_other_sources() {
    let server = MockServer::start();
    serve_listing(&server, "/one");
    let skipped = server.mock(|when, then| {
        when.method(GET).path("/two");
        then.status(200).body(LISTING);
    });
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one"), ("Two", "/two")]);

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .args(["--platform", "one", "shirt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[One] Acme Oxford Shirt"));
    assert_eq!(skipped.calls(), 0);
}

#[test]
fn unknown_platform_is_an_error() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one")]);

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .args(["--platform", "Nowhere", "shirt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nowhere"));
}

#[test]
fn no_products_exits_with_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/one");
        then.status(503);
    });
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one")]);

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .arg("shirt")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No products found."))
        .stderr(predicate::str::contains("One failed"));
}

#[test]
fn no_products_in_json_mode_keeps_stdout_parseable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/one");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body><p>No results</p></body></html>");
    });
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one")]);

    let output = pricelens()
        .arg("--rules")
        .arg(&rules)
        .args(["--json", "shirt"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let products: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(products, serde_json::json!([]));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No products found."));

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .args(["--jsonl", "shirt"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No products found."));
}

#[test]
fn blank_prompted_term_is_rejected() {
    pricelens()
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("search term must not be empty"));
}

#[test]
fn prompted_term_is_used() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(GET).path("/one").query_param("q", "linen");
        then.status(200)
            .header("content-type", "text/html")
            .body(LISTING);
    });
    let dir = TempDir::new().unwrap();
    let rules = write_rules(&dir, &server, &[("One", "/one")]);

    pricelens()
        .arg("--rules")
        .arg(&rules)
        .write_stdin("linen\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Enter a search term: "));
    search.assert();
}

#[test]
fn missing_rules_file_is_an_error() {
    pricelens()
        .args(["--rules", "/nonexistent/rules.json", "shirt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
