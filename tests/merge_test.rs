//! Integration tests for normalization and merging.

use std::collections::BTreeSet;

use superjson::extract::{
    LayoutContent, LayoutPage, NativeFragment, TextLayerBlock, TextLayerContent, TextLayerPage,
};
use superjson::{
    merge, normalize_payload, Error, Extras, MergeEngine, NativeContent, NormalizeOptions,
    NormalizedOutput, Page, RawPayload, TextBlock, ToolKind,
};

/// Contribution with one block per page, ids scoped by tool and page.
fn contribution(tool: &str, kind: ToolKind, pages: &[(u32, &str)]) -> NormalizedOutput {
    let pages = pages
        .iter()
        .map(|&(index, text)| {
            let mut page = Page::with_text(index, text);
            page.add_block(TextBlock::new(
                format!("{}_p{}_b0", tool, index),
                index,
                text,
                tool,
            ));
            page
        })
        .collect();
    NormalizedOutput::new(tool, kind, pages)
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_scenario_two_tools_overlap() {
    let x = contribution("text_layer", ToolKind::TextLayer, &[(0, "A"), (1, "B")]);
    let y = contribution("layout", ToolKind::Layout, &[(1, "B2"), (2, "C")]);

    let doc = merge("doc", "/in/doc.pdf", &Extras::new(), [&x, &y]).unwrap();

    assert_eq!(doc.page_indices(), vec![0, 1, 2]);
    assert_eq!(doc.pages[0].text, "A");
    assert_eq!(doc.pages[1].text, "B");
    assert_eq!(doc.pages[2].text, "C");

    let page1_tools: Vec<&str> = doc.pages[1].blocks.iter().map(|b| b.tool.as_str()).collect();
    assert_eq!(page1_tools, vec!["text_layer", "layout"]);
    assert_eq!(doc.pages[1].blocks[1].text, "B2");
}

#[test]
fn test_scenario_all_tools_empty() {
    let outputs = vec![
        NormalizedOutput::skipped("text_layer", ToolKind::TextLayer, Some("broken".into())),
        NormalizedOutput::new("layout", ToolKind::Layout, Vec::new()),
        NormalizedOutput::skipped("cloud_ocr", ToolKind::CloudOcr, None),
    ];
    let result = merge("doc", "/in/doc.pdf", &Extras::new(), &outputs);
    assert!(matches!(result, Err(Error::EmptyContributionSet)));
}

#[test]
fn test_scenario_sparse_layout_table() {
    let payload: RawPayload = serde_json::from_str(
        r#"{"tool": "layout", "content": {"kind": "layout", "pages": [
            {"page_index": 0, "tables": [[["a", "b"], [null, "d"]]]}
        ]}}"#,
    )
    .unwrap();
    let output = normalize_payload(&payload, &NormalizeOptions::default()).unwrap();

    let cells: BTreeSet<(u32, u32, String)> = output.pages[0].tables[0]
        .cells
        .iter()
        .map(|c| (c.row, c.col, c.text.clone()))
        .collect();
    let expected: BTreeSet<(u32, u32, String)> = [(0, 0, "a"), (0, 1, "b"), (1, 1, "d")]
        .into_iter()
        .map(|(r, c, t)| (r, c, t.to_string()))
        .collect();
    assert_eq!(cells, expected);
}

#[test]
fn test_union_of_pages() {
    let cases: [&[u32]; 3] = [&[0, 2, 5], &[1, 2], &[7]];
    let pages = |indices: &[u32], text: &'static str| -> Vec<(u32, &'static str)> {
        indices.iter().map(|&i| (i, text)).collect()
    };
    let outputs = vec![
        contribution("text_layer", ToolKind::TextLayer, &pages(cases[0], "t")),
        contribution("layout", ToolKind::Layout, &pages(cases[1], "l")),
        contribution("cloud_ocr", ToolKind::CloudOcr, &pages(cases[2], "c")),
    ];
    let doc = MergeEngine::default()
        .merge("doc", "/in/doc.pdf", &Extras::new(), &outputs)
        .unwrap();

    let expected: Vec<u32> = cases
        .iter()
        .flat_map(|c| c.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    assert_eq!(doc.page_indices(), expected);
    assert_eq!(doc.metadata.page_count, expected.len() as u32);
}

#[test]
fn test_text_priority_independent_of_input_order() {
    let outputs = vec![
        contribution(
            "cloud_ocr",
            ToolKind::CloudOcr,
            &[(0, "ocr"), (1, "ocr1"), (2, "ocr2")],
        ),
        contribution("layout", ToolKind::Layout, &[(0, " "), (1, "layout1")]),
        contribution("text_layer", ToolKind::TextLayer, &[(0, ""), (2, "fast2")]),
    ];

    let mut results = Vec::new();
    for order in permutations(&outputs) {
        let doc = merge("doc", "/in/doc.pdf", &Extras::new(), &order).unwrap();
        results.push(doc);
    }

    let first = &results[0];
    let texts: Vec<&str> = first.pages.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["ocr", "layout1", "fast2"]);
    assert_eq!(first.tools_used, vec!["text_layer", "layout", "cloud_ocr"]);
    for doc in &results[1..] {
        assert_eq!(doc, first);
    }
}

#[test]
fn test_provenance_preserved() {
    let outputs = vec![
        contribution("text_layer", ToolKind::TextLayer, &[(0, "a"), (1, "b")]),
        contribution("layout", ToolKind::Layout, &[(1, "c")]),
    ];
    let doc = merge("doc", "/in/doc.pdf", &Extras::new(), &outputs).unwrap();

    for page in &doc.pages {
        for block in &page.blocks {
            assert!(!block.tool.is_empty());
            assert!(doc.tools_used.contains(&block.tool));
            assert_eq!(block.page_index, page.index);
        }
    }
    assert!(doc.validate().is_ok());
}

#[test]
fn test_idempotent_with_deterministic_ids() {
    let payloads = vec![
        RawPayload::new(
            "text_layer",
            NativeContent::TextLayer(TextLayerContent {
                pages: vec![TextLayerPage {
                    page_index: 0,
                    text: Some("Lease".to_string()),
                    blocks: vec![NativeFragment::from(TextLayerBlock::new(
                        0.0, 0.0, 5.0, 5.0, "Lease",
                    ))],
                }],
            }),
        ),
        RawPayload::new(
            "layout",
            NativeContent::Layout(LayoutContent {
                pages: vec![LayoutPage {
                    page_index: 0,
                    text: Some("Lease".to_string()),
                    blocks: Vec::new(),
                    tables: vec![vec![vec![Some("x".to_string())]]],
                }],
            }),
        ),
    ];

    let options = NormalizeOptions::new().deterministic_ids();
    let run = || {
        let outputs: Vec<NormalizedOutput> = payloads
            .iter()
            .map(|p| normalize_payload(p, &options).unwrap())
            .collect();
        merge("doc", "/in/doc.pdf", &Extras::new(), &outputs).unwrap()
    };
    assert_eq!(run(), run());

    // Random block ids differ between runs; everything else matches.
    let random = || {
        let outputs: Vec<NormalizedOutput> = payloads
            .iter()
            .map(|p| normalize_payload(p, &NormalizeOptions::default()).unwrap())
            .collect();
        merge("doc", "/in/doc.pdf", &Extras::new(), &outputs).unwrap()
    };
    let (a, b) = (random(), random());
    assert_ne!(a.pages[0].blocks[0].id, b.pages[0].blocks[0].id);
    assert_eq!(a.pages[0].tables, b.pages[0].tables);
    assert_eq!(a.pages[0].text, b.pages[0].text);
}

#[test]
fn test_skipped_tool_absent_from_tools_used() {
    let payloads = [
        RawPayload::skipped("cloud_ocr", ToolKind::CloudOcr, "missing processor id"),
        RawPayload::new(
            "layout",
            NativeContent::Layout(LayoutContent {
                pages: vec![LayoutPage {
                    page_index: 3,
                    text: Some("only page".to_string()),
                    blocks: Vec::new(),
                    tables: Vec::new(),
                }],
            }),
        ),
    ];
    let doc = superjson::merge_payloads("doc", "/in/doc.pdf", &Extras::new(), &payloads).unwrap();
    assert_eq!(doc.tools_used, vec!["layout"]);
    assert_eq!(doc.page_indices(), vec![3]);
    assert_eq!(doc.metadata.page_count, 1);
}

fn layout_page(index: u32, text: &str) -> RawPayload {
    RawPayload::new(
        "layout",
        NativeContent::Layout(LayoutContent {
            pages: vec![LayoutPage {
                page_index: index,
                text: Some(text.to_string()),
                blocks: Vec::new(),
                tables: Vec::new(),
            }],
        }),
    )
}

#[test]
fn test_blank_tool_not_counted_as_contributor() {
    let text_layer = RawPayload::new(
        "text_layer",
        NativeContent::TextLayer(TextLayerContent {
            pages: vec![TextLayerPage {
                page_index: 0,
                text: Some("A".to_string()),
                blocks: Vec::new(),
            }],
        }),
    );
    let payloads = [text_layer, layout_page(0, "")];
    let doc = superjson::merge_payloads("doc", "/in/doc.pdf", &Extras::new(), &payloads).unwrap();
    assert_eq!(doc.tools_used, vec!["text_layer"]);
    assert_eq!(doc.pages[0].text, "A");

    let result =
        superjson::merge_payloads("doc", "/in/doc.pdf", &Extras::new(), &[layout_page(0, " \n")]);
    assert!(matches!(result, Err(Error::EmptyContributionSet)));
}
