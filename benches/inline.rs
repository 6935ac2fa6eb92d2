//! Benchmarks for the inlining pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use mailman::StyleInliner;
use mailman::css::{Stylesheet, parse_declaration_list};
use mailman::dom::{parse_html, serialize_document};

const CSS: &str = "
body { margin: 0; padding: 0; font-family: Helvetica, Arial, sans-serif }
table { border-collapse: collapse }
td { padding: 8px; vertical-align: top }
.header { background: #222; color: #fff }
.header h1 { font-size: 24px; margin: 0 }
.item td.price { text-align: right; font-weight: bold !important }
.item:nth-child(2n) td { background: #f4f4f4 }
a { color: #06c } a:hover { color: #039 }
p.note, p.footer { color: #888; font-size: 12px }
@media (max-width: 600px) { td { display: block; width: 100% } }
";

/// A receipt-like email with `rows` line items.
fn sample_html(rows: usize) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><title>Receipt</title></head><body>\
         <table><tr class=\"header\"><td><h1>Thanks!</h1></td></tr>",
    );
    for i in 0..rows {
        html.push_str(&format!(
            "<tr class=\"item\"><td>Item {i}</td>\
             <td class=\"price\" style=\"color: #333\">${i}.00</td></tr>"
        ));
    }
    html.push_str(
        "</table><p class=\"note\">Questions? <a href=\"mailto:help@example.com\">Write us</a>.</p>\
         <p class=\"footer\">Example Inc.</p></body></html>",
    );
    html
}

// ============================================================================
// Parsing Benchmarks
// ============================================================================

fn bench_parse_stylesheet(c: &mut Criterion) {
    c.bench_function("parse_stylesheet", |b| {
        b.iter(|| Stylesheet::parse(black_box(CSS)));
    });
}

fn bench_parse_style_attribute(c: &mut Criterion) {
    c.bench_function("parse_style_attribute", |b| {
        b.iter(|| parse_declaration_list(black_box("color: red; margin: 0 auto; padding: 4px 8px")));
    });
}

fn bench_parse_html(c: &mut Criterion) {
    let html = sample_html(100);
    c.bench_function("parse_html", |b| {
        b.iter(|| parse_html(black_box(&html)));
    });
}

fn bench_serialize(c: &mut Criterion) {
    let parsed = parse_html(&sample_html(100));
    c.bench_function("serialize_document", |b| {
        b.iter(|| serialize_document(black_box(&parsed.dom)).unwrap());
    });
}

// ============================================================================
// Inlining Benchmarks
// ============================================================================

fn bench_inline(c: &mut Criterion) {
    let inliner = StyleInliner::new();
    let mut group = c.benchmark_group("inline");

    for rows in [10, 100, 1000] {
        let html = sample_html(rows);
        group.bench_function(format!("{rows}_rows"), |b| {
            b.iter(|| inliner.convert(black_box(&html), black_box(CSS)).unwrap());
        });
    }

    group.finish();
}

fn bench_inline_preparsed(c: &mut Criterion) {
    let inliner = StyleInliner::new();
    let sheet = Stylesheet::parse(CSS);
    let html = sample_html(100);

    c.bench_function("inline_preparsed_100_rows", |b| {
        b.iter(|| {
            inliner
                .convert_stylesheet(black_box(&html), black_box(&sheet))
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_parse_stylesheet,
    bench_parse_style_attribute,
    bench_parse_html,
    bench_serialize,
    bench_inline,
    bench_inline_preparsed,
);
criterion_main!(benches);
