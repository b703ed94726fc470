use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagekit_codec::{KeyStyle, PageCodec, PageTemplate, SectionTemplate, TemplateField};
use pagekit_core::config::EditorConfig;
use pagekit_core::field::{FieldDescriptor, FieldType, SubFieldDescriptor};
use pagekit_normalize::normalize_items;
use serde_json::{json, Value};

fn item_schema() -> Vec<SubFieldDescriptor> {
    vec![
        SubFieldDescriptor::text("title"),
        SubFieldDescriptor::new("description", "Description", FieldType::Textarea),
        SubFieldDescriptor::new("points", "Points", FieldType::List),
        SubFieldDescriptor::new("icon", "Icon", FieldType::Image),
    ]
}

/// A mix of every stored item shape: clean records, junk keys, bare strings
/// and character maps.
fn make_items(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| match i % 4 {
            0 => json!({"title": format!("item {i}"), "description": "d", "points": ["a", "b"], "icon": "/i.png"}),
            1 => json!({"title": format!("item {i}"), "extra": i, "0": "x"}),
            2 => json!(format!("bare {i}")),
            _ => json!({"0": "c", "1": "h", "2": "a", "3": "r"}),
        })
        .collect()
}

fn make_codec() -> PageCodec {
    let sections = (0..8)
        .map(|s| {
            SectionTemplate::new(
                format!("section-{s}"),
                format!("Section {s}"),
                vec![
                    FieldDescriptor::text("intro-title", "Title", "Default").into(),
                    FieldDescriptor::new("hero-image", "Image", FieldType::Image).into(),
                    TemplateField::new(FieldDescriptor::list("service-list", "Services", item_schema()))
                        .with_alias("services"),
                ],
            )
        })
        .collect();
    PageCodec::from_config(
        PageTemplate::new("bench", sections).with_key_style(KeyStyle::Camel),
        &EditorConfig::default(),
    )
}

fn make_page(items: &[Value]) -> Value {
    let mut container = serde_json::Map::new();
    for s in 0..8 {
        container.insert(
            format!("section-{s}"),
            json!({"enabled": true, "data": {"introTitle": "Custom", "heroImage": "blob:x", "services": items}}),
        );
    }
    json!({"data": {"data": container}})
}

fn bench_normalize(c: &mut Criterion) {
    let schema = item_schema();
    let items = make_items(1024);
    c.bench_function("normalize_items_1k", |b| {
        b.iter(|| normalize_items(black_box(&items), Some(&schema)))
    });
}

fn bench_decode_encode(c: &mut Criterion) {
    let codec = make_codec();
    let page = make_page(&make_items(64));

    c.bench_function("decode_page_8x64", |b| b.iter(|| codec.decode(Some(black_box(&page)))));

    let state = codec.decode(Some(&page));
    c.bench_function("encode_page_8x64", |b| b.iter(|| codec.encode(black_box(&state))));
}

criterion_group!(benches, bench_normalize, bench_decode_encode);
criterion_main!(benches);
