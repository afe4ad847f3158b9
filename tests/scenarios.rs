//! Black-box scenario tests against the public `extract_rows` entry point (§8 end-to-end
//! scenarios S2, S4, S5, S6). No recorded real documents are available for this exercise, so
//! fixtures are built in-line to exercise the same properties the scenarios name rather than to
//! reproduce proprietary vendor documents byte-for-byte (S1's 15-page/130-code document and
//! S3's exact HarperCollins PO are not reproducible without that data; DESIGN.md records this).

use invoice_webhook::document::{
    RawEntity, RawPageAnchor, RawPageRef, RawStructuredDocument, RawTextAnchor, RawTextSegment,
};
use invoice_webhook::{extract_rows, CoreError, Vendor};
use pretty_assertions::assert_eq;

fn invoice_date_entity(mention_text: &str) -> RawEntity {
    RawEntity {
        type_: "invoice_date".to_string(),
        mention_text: mention_text.to_string(),
        confidence: 0.95,
        properties: vec![],
        page_anchor: None,
        text_anchor: None,
    }
}

fn invoice_id_entity(mention_text: &str) -> RawEntity {
    RawEntity {
        type_: "invoice_id".to_string(),
        mention_text: mention_text.to_string(),
        confidence: 0.95,
        properties: vec![],
        page_anchor: None,
        text_anchor: None,
    }
}

/// S2 — Creative Co-op with an Excel-serial order date and four sample tabular codes.
#[test]
fn s2_creative_coop_excel_serial_date_and_sample_codes() {
    let text = "Creative Co-op Wholesale Invoice\n\
                XS9826A | 123456789012 | Stoneware Bowl 6\"H | 24 | 0 | 24 | 0 | ea | 3.20 | 1.60 | 38.40\n\
                XS9482 | 123456789013 | Fabric Coaster Set | 12 | 0 | 12 | 0 | ea | 5.60 | 2.80 | 33.60\n\
                XS8185 | 123456789014 | Wood Serving Tray | 16 | 0 | 16 | 0 | ea | 24.00 | 12.00 | 192.00\n\
                XS3844 | 123456789015 | Glass Vase Large | 4 | 0 | 4 | 0 | ea | 37.60 | 18.80 | 75.20\n";

    let raw = RawStructuredDocument {
        text: Some(text.to_string()),
        entities: vec![invoice_date_entity("45674"), invoice_id_entity("CS003837319")],
        pages: vec![],
        tables: vec![],
    };

    let response = extract_rows(raw).expect("well-formed document should not error");
    assert_eq!(response.vendor, Vendor::CreativeCoop);

    let expected = [
        ("XS9826A", 24u32, "$1.60"),
        ("XS9482", 12u32, "$2.80"),
        ("XS8185", 16u32, "$12.00"),
        ("XS3844", 4u32, "$18.80"),
    ];

    for (code, quantity, price) in expected {
        let row = response
            .rows
            .iter()
            .find(|r| r.item_description.starts_with(code))
            .unwrap_or_else(|| panic!("expected a row for {code}"));
        assert_eq!(row.quantity, quantity.to_string());
        assert_eq!(row.unit_price, price);
        assert_eq!(row.order_date, "1/17/2025");
        assert_eq!(row.vendor, "Creative Co-op");
        assert_eq!(row.invoice_number, "CS003837319");
    }
}

/// S4 — OneHundred80 invoice: vendor detected, at least one row, every description non-empty.
#[test]
fn s4_onehundred80_invoice_yields_nonempty_rows() {
    let item = RawEntity {
        type_: "line_item".to_string(),
        mention_text: "Napkin Set".to_string(),
        confidence: 0.92,
        properties: vec![
            RawEntity {
                type_: "line_item/product_code".to_string(),
                mention_text: "OH-100".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            },
            RawEntity {
                type_: "line_item/description".to_string(),
                mention_text: "Napkin Set".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            },
            RawEntity {
                type_: "line_item/unit_price".to_string(),
                mention_text: "$6.00".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            },
            RawEntity {
                type_: "line_item/quantity".to_string(),
                mention_text: "2".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            },
        ],
        page_anchor: None,
        text_anchor: None,
    };

    let raw = RawStructuredDocument {
        text: Some("OneHundred80 Invoice\nThank you for your order.".to_string()),
        entities: vec![item],
        pages: vec![],
        tables: vec![],
    };

    let response = extract_rows(raw).unwrap();
    assert_eq!(response.vendor, Vendor::OneHundred80);
    assert!(!response.rows.is_empty());
    assert!(response.rows.iter().all(|r| !r.item_description.trim().is_empty()));
}

/// S5 — a corrupted document with neither text nor entities fails the request with a
/// diagnostic, without panicking (§7: `InputShapeError` is surfaced, not locally recovered).
#[test]
fn s5_corrupted_document_fails_without_panicking() {
    let raw = RawStructuredDocument {
        text: None,
        entities: vec![],
        pages: vec![],
        tables: vec![],
    };
    match extract_rows(raw) {
        Err(CoreError::InputShapeError(_)) => {}
        other => panic!("expected InputShapeError, got {other:?}"),
    }
}

/// S5 variant — text is `None` but entities are present: not a shape error, degrades to
/// whatever the entity-based extractors can recover (possibly zero rows), never a panic.
#[test]
fn s5_missing_text_but_present_entities_does_not_error() {
    let item = RawEntity {
        type_: "line_item".to_string(),
        mention_text: "Widget".to_string(),
        confidence: 0.9,
        properties: vec![
            RawEntity {
                type_: "line_item/unit_price".to_string(),
                mention_text: "$4.50".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            },
            RawEntity {
                type_: "line_item/quantity".to_string(),
                mention_text: "3".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            },
        ],
        page_anchor: None,
        text_anchor: None,
    };
    let raw = RawStructuredDocument {
        text: None,
        entities: vec![item],
        pages: vec![],
        tables: vec![],
    };
    let response = extract_rows(raw).expect("entities alone should satisfy the shape check");
    assert_eq!(response.rows.len(), 1);
}

/// S6 — the same Creative Co-op product code split across two `line_item` entities on
/// different pages merges into exactly one row.
#[test]
fn s6_continuation_entities_merge_into_one_row() {
    let text = "XS9826A | 123456789012 | Stoneware Bowl | 24 | 0 | 24 | 0 | ea | 3.20 | 1.60 | 38.40\n";

    let page_0_fragment = RawEntity {
        type_: "line_item".to_string(),
        mention_text: "XS9826A Stoneware Bowl, glazed finish".to_string(),
        confidence: 0.9,
        properties: vec![],
        page_anchor: Some(RawPageAnchor {
            page_refs: vec![RawPageRef { page: 0 }],
        }),
        text_anchor: Some(RawTextAnchor {
            text_segments: vec![RawTextSegment {
                start_index: 0,
                end_index: 40,
            }],
        }),
    };
    let page_1_fragment = RawEntity {
        type_: "line_item".to_string(),
        mention_text: "XS9826A continuation: round wooden base".to_string(),
        confidence: 0.9,
        properties: vec![],
        page_anchor: Some(RawPageAnchor {
            page_refs: vec![RawPageRef { page: 1 }],
        }),
        text_anchor: Some(RawTextAnchor {
            text_segments: vec![RawTextSegment {
                start_index: 2000,
                end_index: 2040,
            }],
        }),
    };

    let raw = RawStructuredDocument {
        text: Some(text.to_string()),
        entities: vec![page_0_fragment, page_1_fragment],
        pages: vec![],
        tables: vec![],
    };

    let response = extract_rows(raw).unwrap();
    let matches: Vec<_> = response
        .rows
        .iter()
        .filter(|r| r.item_description.starts_with("XS9826A"))
        .collect();
    assert_eq!(matches.len(), 1, "expected exactly one merged row for XS9826A");
    assert!(
        matches[0].item_description.contains("wooden")
            || matches[0].item_description.contains("base")
            || matches[0].item_description.contains("continuation")
    );
}

/// Determinism property (§8 property 10): two runs over identical input produce byte-identical
/// row lists, since `extract_rows` takes the document by value and never reads shared state.
#[test]
fn determinism_two_runs_on_identical_input_match() {
    let text = "Creative Co-op Wholesale Invoice\n\
                XS9826A | 123456789012 | Stoneware Bowl 6\"H | 24 | 0 | 24 | 0 | ea | 3.20 | 1.60 | 38.40\n\
                XS9482 | 123456789013 | Fabric Coaster Set | 12 | 0 | 12 | 0 | ea | 5.60 | 2.80 | 33.60\n";
    let build = || RawStructuredDocument {
        text: Some(text.to_string()),
        entities: vec![invoice_date_entity("45674"), invoice_id_entity("CS003837319")],
        pages: vec![],
        tables: vec![],
    };

    let first = extract_rows(build()).unwrap();
    let second = extract_rows(build()).unwrap();
    assert_eq!(first.rows, second.rows);
}

/// Placeholder absence property: no explicit tabular `$1.60 / qty 24` evidence means the
/// sentinel pair never appears together in the output, even when the legacy free-text pattern
/// and page-context tiers are present elsewhere in the document.
#[test]
fn placeholder_pair_never_emitted_without_tabular_evidence() {
    let text = "XS5000A is a lovely item at $1.60 wholesale with a hint of 24 in unrelated text.\n\
                Nothing else establishes a tabular qty or price for this code.\n";
    let raw = RawStructuredDocument {
        text: Some(text.to_string()),
        entities: vec![],
        pages: vec![],
        tables: vec![],
    };
    let response = extract_rows(raw).unwrap();
    assert!(
        !response
            .rows
            .iter()
            .any(|r| r.unit_price == "$1.60" && r.quantity == "24"),
        "placeholder pair should never be emitted without tabular evidence"
    );
}
