use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kendr_blocks::{
    find_by_path, insert_by_path, move_by_path, BlockDefaults, BlockNode, BlockType, LayoutPreset,
    PageContent, Path,
};

/// A page of `sections` two-column layouts with `per_column` texts each
fn build_page(sections: usize, per_column: usize) -> PageContent {
    let defaults = BlockDefaults::default();
    let preset = LayoutPreset::new("50-50");
    let mut page = PageContent::default();

    for section in 0..sections {
        let layout = BlockNode::new(BlockType::Layout, &defaults, Some(&preset));
        page = insert_by_path(&page, layout, &Path::root(section));
        for column in 0..2 {
            for index in 0..per_column {
                let text = BlockNode::new(BlockType::Text, &defaults, None);
                page = insert_by_path(&page, text, &Path::root(section).child(column, index));
            }
        }
    }

    page
}

fn find_nested(c: &mut Criterion) {
    let page = build_page(20, 5);
    let path = Path::root(19).child(1, 4);

    c.bench_function("find_nested", |b| {
        b.iter(|| find_by_path(black_box(&page), black_box(&path)))
    });
}

fn hover_reorder(c: &mut Criterion) {
    let page = build_page(20, 5);
    let from = Path::root(3).child(0, 2);
    let to = Path::root(15).child(1, 0);

    c.bench_function("hover_reorder_across_sections", |b| {
        b.iter(|| move_by_path(black_box(&page), black_box(&from), black_box(&to)))
    });
}

criterion_group!(benches, find_nested, hover_reorder);
criterion_main!(benches);
