//! Behavioral properties of the path-addressed tree mutations
//!
//! This tests:
//! - Path round-trips through insert / update / find
//! - Purity of every primitive
//! - Move semantics within and across sequences
//! - Layout column merging
//! - The hero/text end-to-end scenario on JSON content

use kendr_blocks::{
    find_by_path, insert_by_path, move_by_path, remove_by_path, set_layout_preset,
    try_remove_by_path, update_data_by_path, BlockData, BlockNode, BlockType, LayoutPreset,
    PageContent, Path,
};
use serde_json::json;

fn node(id: &str, block_type: BlockType) -> BlockNode {
    BlockNode::with_data(id, block_type, BlockData::new().with_field("label", json!(id)))
}

fn ids(nodes: &[BlockNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

fn page_with_columns() -> anyhow::Result<PageContent> {
    let json = r#"[
        { "id": "hero", "type": "hero", "data": { "title": "Hi" } },
        { "id": "cols", "type": "layout", "data": {
            "preset": "33-33-33",
            "columns": [
                [ { "id": "a", "type": "text", "data": {} } ],
                [ { "id": "b", "type": "image", "data": {} }, { "id": "c", "type": "button", "data": {} } ],
                [ { "id": "d", "type": "text", "data": {} } ]
            ]
        } },
        { "id": "footer-text", "type": "text", "data": {} }
    ]"#;
    Ok(PageContent::from_json(json)?)
}

#[test]
fn test_insert_then_find_round_trip() -> anyhow::Result<()> {
    let page = page_with_columns()?;
    let targets = [
        Path::root(0),
        Path::root(3),
        Path::root(1).child(0, 1),
        Path::root(1).child(1, 0),
    ];

    for target in targets {
        let inserted = insert_by_path(&page, node("new", BlockType::Divider), &target);
        let found = find_by_path(&inserted, &target).expect("inserted node resolves");
        assert_eq!(found.id.as_str(), "new", "at {target}");
        assert_eq!(inserted.total_blocks(), page.total_blocks() + 1);
    }
    Ok(())
}

#[test]
fn test_update_then_find_round_trip() -> anyhow::Result<()> {
    let page = page_with_columns()?;
    let target = Path::root(1).child(1, 1);
    let data = BlockData::new().with_field("text", json!("Buy"));

    let updated = update_data_by_path(&page, &target, data.clone());
    let found = find_by_path(&updated, &target).expect("node still resolves");

    assert_eq!(found.data, data);
    assert_eq!(found.id.as_str(), "c");
    assert_eq!(found.block_type, BlockType::Button);
    Ok(())
}

#[test]
fn test_mutations_never_touch_their_input() -> anyhow::Result<()> {
    let page = page_with_columns()?;
    let snapshot = page.clone();
    let nested = Path::root(1).child(1, 0);

    let _ = insert_by_path(&page, node("x", BlockType::Text), &nested);
    let _ = remove_by_path(&page, &nested);
    let _ = move_by_path(&page, &nested, &Path::root(0));
    let _ = update_data_by_path(&page, &nested, BlockData::new());
    let _ = set_layout_preset(&page, &Path::root(1), LayoutPreset::new("100"));

    assert_eq!(page, snapshot);
    Ok(())
}

#[test]
fn test_move_onto_same_path_is_identity() -> anyhow::Result<()> {
    let page = page_with_columns()?;
    for path in page.paths() {
        assert_eq!(move_by_path(&page, &path, &path), page, "at {path}");
    }
    Ok(())
}

#[test]
fn test_move_forward_lands_after_target() {
    let page = PageContent::new(
        ["A", "B", "C", "D", "E"]
            .iter()
            .map(|id| node(id, BlockType::Text))
            .collect(),
    );

    let moved = move_by_path(&page, &Path::root(1), &Path::root(3));
    assert_eq!(ids(moved.nodes()), vec!["A", "C", "D", "B", "E"]);
}

#[test]
fn test_insert_at_length_appends() -> anyhow::Result<()> {
    let page = page_with_columns()?;
    let column = Path::root(1).child(1, 2);

    let appended = insert_by_path(&page, node("tail", BlockType::Text), &column);
    let columns = appended.nodes()[1].columns().expect("layout");
    assert_eq!(ids(&columns[1]), vec!["b", "c", "tail"]);

    let top = insert_by_path(&page, node("last", BlockType::Text), &Path::root(page.len()));
    assert_eq!(top.nodes().last().map(|n| n.id.as_str()), Some("last"));
    Ok(())
}

#[test]
fn test_removed_node_is_never_found_again() -> anyhow::Result<()> {
    let page = page_with_columns()?;

    for path in page.paths() {
        let removed_id = find_by_path(&page, &path).map(|n| n.id.clone());
        let after = try_remove_by_path(&page, &path)?;
        let found = find_by_path(&after, &path).map(|n| n.id.clone());
        assert_ne!(found, removed_id, "at {path}");
    }
    Ok(())
}

#[test]
fn test_shrinking_layout_merges_into_last_column() -> anyhow::Result<()> {
    let page = page_with_columns()?;
    let layout = Path::root(1);

    let two = set_layout_preset(&page, &layout, LayoutPreset::new("50-50"));
    let columns = two.nodes()[1].columns().expect("layout");
    assert_eq!(columns.len(), 2);
    assert_eq!(ids(&columns[1]), vec!["b", "c", "d"]);

    let one = set_layout_preset(&two, &layout, LayoutPreset::new("100"));
    let columns = one.nodes()[1].columns().expect("layout");
    assert_eq!(columns.len(), 1);
    assert_eq!(ids(&columns[0]), vec!["a", "b", "c", "d"]);
    assert_eq!(one.total_blocks(), page.total_blocks());
    Ok(())
}

#[test]
fn test_hero_text_scenario() -> anyhow::Result<()> {
    let page = PageContent::from_json(
        r#"[{ "id": "h1", "type": "hero", "data": { "title": "Welcome" } }]"#,
    )?;
    let text = BlockNode::with_data(
        "t1",
        BlockType::Text,
        BlockData::new().with_field("content", json!("Hello")),
    );

    let page = insert_by_path(&page, text, &Path::root(1));
    assert_eq!(ids(page.nodes()), vec!["h1", "t1"]);

    let page = move_by_path(&page, &Path::root(1), &Path::root(0));
    assert_eq!(ids(page.nodes()), vec!["t1", "h1"]);

    let page = remove_by_path(&page, &Path::root(0));
    assert_eq!(ids(page.nodes()), vec!["h1"]);
    assert_eq!(page.nodes()[0].data.field_str("title"), Some("Welcome"));

    let json: serde_json::Value = serde_json::from_str(&page.to_json()?)?;
    assert_eq!(
        json,
        json!([{ "id": "h1", "type": "hero", "data": { "title": "Welcome" } }])
    );
    Ok(())
}

#[test]
fn test_deep_nesting() -> anyhow::Result<()> {
    let mut page = PageContent::new(vec![]);
    let mut layout_path = Path::root(0);

    for depth in 0..6 {
        let layout = BlockNode::with_data(
            format!("layout-{depth}"),
            BlockType::Layout,
            BlockData::layout(LayoutPreset::new("100")),
        );
        page = insert_by_path(&page, layout, &layout_path);
        layout_path = layout_path.child(0, 0);
    }

    let leaf_parent = layout_path.parent().expect("nested path has a parent");
    let found = find_by_path(&page, &leaf_parent).expect("deepest layout");
    assert_eq!(found.id.as_str(), "layout-5");
    assert_eq!(leaf_parent.depth(), 5);
    Ok(())
}
