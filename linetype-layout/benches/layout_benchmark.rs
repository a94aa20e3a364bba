use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use linetype_core::{HorizontalAlign, RenderRequest, VerticalAlign};
use linetype_layout::{layout_request, LayoutEngine, LayoutOptions};
use linetype_text::testing::SyntheticFace;
use linetype_text::{FontHandle, FontRegistry, GlyphResolver, ResolvedGlyph};
use std::hint::black_box;
use std::sync::Arc;

fn registry() -> FontRegistry {
    let face = ('!'..='~').fold(SyntheticFace::new("latin", 1000), |face, ch| {
        face.with_box(ch, 450 + (ch as u16 % 5) * 30, -180, 720)
    });
    let registry = FontRegistry::new();
    registry.register_handle("Latin", FontHandle::single(Arc::new(face)));
    registry
}

fn glyphs(registry: &FontRegistry, len: usize) -> Vec<ResolvedGlyph> {
    let text: String = "abcdefghijklmnopqrstuvwxyz".chars().cycle().take(len).collect();
    GlyphResolver::new(registry, &["Latin"], 16.0)
        .unwrap()
        .resolve_str(&text)
}

/// Benchmark: lay out N glyphs with no width constraint
fn bench_layout_unconstrained(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("layout_unconstrained");

    for count in [16, 256] {
        let line = glyphs(&registry, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &line, |b, line| {
            let engine = LayoutEngine::default();
            b.iter(|| engine.layout(black_box(line.clone()), None).unwrap());
        });
    }

    group.finish();
}

/// Benchmark: truncate N glyphs down to a 120px budget
fn bench_layout_truncated(c: &mut Criterion) {
    let registry = registry();
    let ellipsis = GlyphResolver::new(&registry, &["Latin"], 16.0)
        .unwrap()
        .resolve_str("...");
    let engine = LayoutEngine::new(LayoutOptions {
        width: Some(120.0),
        height: Some(32.0),
        align_horizontal: HorizontalAlign::Center,
        align_vertical: VerticalAlign::Center,
    });
    let mut group = c.benchmark_group("layout_truncated");

    for count in [16, 256] {
        let line = glyphs(&registry, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &line, |b, line| {
            b.iter(|| {
                engine
                    .layout(black_box(line.clone()), Some(ellipsis.as_slice()))
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark: full request path (resolve text + ellipsis, then layout)
fn bench_layout_request(c: &mut Criterion) {
    let registry = registry();
    let request = RenderRequest {
        text: "The quick brown fox jumps over the lazy dog".into(),
        font_family: vec!["Latin".into()],
        font_size: 24.0,
        width: Some(200.0),
        ellipsis: Some("...".into()),
        ..Default::default()
    };

    c.bench_function("layout_request", |b| {
        b.iter(|| layout_request(&registry, black_box(&request)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_layout_unconstrained,
    bench_layout_truncated,
    bench_layout_request,
);
criterion_main!(benches);
