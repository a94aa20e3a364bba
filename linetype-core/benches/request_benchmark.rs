use criterion::{criterion_group, criterion_main, Criterion};
use linetype_core::{RenderRequest, Rgba};
use std::hint::black_box;

const REQUEST_JSON: &str = r##"{
    "text": "The quick brown fox jumps over the lazy dog",
    "fontFamily": ["Body", "Emoji", "Fallback"],
    "fontSize": 32,
    "width": 320,
    "ellipsis": "...",
    "alignHorizontal": "center",
    "fontColor": "#333333",
    "backgroundRGBA": [255, 255, 255, 255]
}"##;

fn bench_parse_request(c: &mut Criterion) {
    c.bench_function("parse_request_json", |b| {
        b.iter(|| RenderRequest::from_json(black_box(REQUEST_JSON)).unwrap());
    });
}

fn bench_parse_color(c: &mut Criterion) {
    c.bench_function("parse_hex_color", |b| {
        b.iter(|| black_box("#10203040").parse::<Rgba>().unwrap());
    });
}

criterion_group!(benches, bench_parse_request, bench_parse_color);
criterion_main!(benches);
