//! Integration tests for the rewrite core and validators through the
//! public library API: locality of single-field patches, full-list
//! replacement, and the interplay between patch output and validation.

use indexmap::IndexMap;
use sitesync::models::{FieldValue, NavEntry};
use sitesync::services::patch::{FIELD_RULES, PatchEngine, rule_for_path};
use sitesync::services::validator::{validate_anchors, validate_syntax};

fn managed_block() -> String {
    let mut doc = String::from("const config = {\n");
    for rule in FIELD_RULES {
        let key = rule.path.rsplit('.').next().unwrap();
        doc.push_str("  ");
        doc.push_str(rule.anchor);
        doc.push('\n');
        let value = match rule.kind {
            sitesync::ValueKind::Str => "\"placeholder\"".to_string(),
            sitesync::ValueKind::Bool => "false".to_string(),
            sitesync::ValueKind::Int => "0".to_string(),
            sitesync::ValueKind::NavList => "[\n  ]".to_string(),
        };
        doc.push_str(&format!("  {key}: {value},\n"));
    }
    doc.push_str("};\n");
    doc
}

fn pairs(items: &[(&str, FieldValue)]) -> IndexMap<String, FieldValue> {
    items
        .iter()
        .map(|(p, v)| (p.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_every_rule_is_patchable() {
    let engine = PatchEngine::new();
    let doc = managed_block();

    let mut all = IndexMap::new();
    for rule in FIELD_RULES {
        let value = match rule.kind {
            sitesync::ValueKind::Str => FieldValue::Str(format!("v-{}", rule.path)),
            sitesync::ValueKind::Bool => FieldValue::Bool(true),
            sitesync::ValueKind::Int => FieldValue::Int(42),
            sitesync::ValueKind::NavList => FieldValue::NavList(vec![NavEntry {
                title: "Home".to_string(),
                url: "/".to_string(),
            }]),
        };
        all.insert(rule.path.to_string(), value);
    }

    let outcome = engine.apply(&doc, &all).unwrap();
    assert!(outcome.skipped_fields.is_empty());
    assert_eq!(outcome.applied_anchors.len(), FIELD_RULES.len());

    // The result passes both validation checks.
    assert!(validate_anchors(&outcome.text, &outcome.applied_anchors).is_valid());
    assert!(validate_syntax(&outcome.text).is_valid(), "{}", outcome.text);

    // And no placeholder survives.
    assert!(!outcome.text.contains("placeholder"));
}

#[test]
fn test_locality_of_incremental_patch() {
    let engine = PatchEngine::new();
    let doc = managed_block();

    let outcome = engine
        .apply(
            &doc,
            &pairs(&[("theme.accentColor", FieldValue::Str("#aa3311".to_string()))]),
        )
        .unwrap();

    let before: Vec<&str> = doc.lines().collect();
    let after: Vec<&str> = outcome.text.lines().collect();
    assert_eq!(before.len(), after.len());

    let differing: Vec<usize> = (0..before.len())
        .filter(|&i| before[i] != after[i])
        .collect();
    assert_eq!(differing.len(), 1, "exactly one value line changes");
    assert_eq!(after[differing[0]], "  accentColor: \"#aa3311\",");

    // The changed line sits directly under the field's anchor.
    let anchor = rule_for_path("theme.accentColor").unwrap().anchor;
    assert!(before[differing[0] - 1].contains(anchor));
}

#[test]
fn test_nav_list_round_trip_preserves_entries() {
    let engine = PatchEngine::new();
    let doc = managed_block();

    let entries: Vec<NavEntry> = (1..=7)
        .map(|i| NavEntry {
            title: format!("Page {i}"),
            url: format!("/page-{i}"),
        })
        .collect();

    let outcome = engine
        .apply(
            &doc,
            &pairs(&[("navigation.entries", FieldValue::NavList(entries.clone()))]),
        )
        .unwrap();

    // Re-read the emitted list: same count, same titles/urls, same order.
    let emitted: Vec<(String, String)> = outcome
        .text
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let title = line.strip_prefix("{ title: \"")?;
            let (title, rest) = title.split_once("\", url: \"")?;
            let url = rest.strip_suffix("\" },")?;
            Some((title.to_string(), url.to_string()))
        })
        .collect();

    assert_eq!(emitted.len(), entries.len());
    for (entry, (title, url)) in entries.iter().zip(&emitted) {
        assert_eq!(&entry.title, title);
        assert_eq!(&entry.url, url);
    }

    assert!(validate_syntax(&outcome.text).is_valid());
}

#[test]
fn test_value_line_tail_is_preserved_byte_for_byte() {
    let engine = PatchEngine::new();

    // Developers annotate managed lines in place; the comma, the spacing
    // before the comment, and the comment itself must all survive a patch.
    let doc = managed_block()
        .replace(
            "  pageTitle: \"placeholder\",",
            "  pageTitle: \"placeholder\",   // shown in the tab bar",
        )
        .replace(
            "  readerLineWidth: 0,",
            "  readerLineWidth: 0, // px, measured at 1x zoom",
        );

    let outcome = engine
        .apply(
            &doc,
            &pairs(&[
                ("site.pageTitle", FieldValue::Str("New".to_string())),
                ("theme.readerLineWidth", FieldValue::Int(640)),
            ]),
        )
        .unwrap();

    assert!(outcome
        .text
        .contains("  pageTitle: \"New\",   // shown in the tab bar"));
    assert!(outcome
        .text
        .contains("  readerLineWidth: 640, // px, measured at 1x zoom"));

    // Each patched line keeps its tail byte-for-byte.
    let before: Vec<&str> = doc.lines().collect();
    let after: Vec<&str> = outcome.text.lines().collect();
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        if b != a {
            let tail = |line: &str| {
                let head = line.split_once(':').map_or(0, |(k, _)| k.len() + 1);
                line[head..]
                    .find(|c| c == ',' || c == '/')
                    .map(|i| line[head + i..].to_string())
                    .unwrap_or_default()
            };
            assert_eq!(tail(b), tail(a), "tail changed on line {b:?}");
        }
    }

    assert!(validate_syntax(&outcome.text).is_valid());
}

#[test]
fn test_patched_text_with_duplicate_anchor_fails_validation() {
    let engine = PatchEngine::new();
    let anchor = rule_for_path("site.pageTitle").unwrap().anchor;
    let doc = format!("{}{anchor}\n  pageTitle: \"dup\",\n", managed_block());

    let outcome = engine
        .apply(
            &doc,
            &pairs(&[("site.pageTitle", FieldValue::Str("x".to_string()))]),
        )
        .unwrap();

    let result = validate_anchors(&outcome.text, &outcome.applied_anchors);
    assert!(!result.is_valid());
}
