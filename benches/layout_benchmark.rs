//! Performance benchmarks for layout reconstruction
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use legal_lens::layout::{normalize_text, reconstruct_page, GlyphRun, LayoutConfig};

/// Synthetic page: numbered clauses of wrapped lines, shuffled so the sort
/// has real work to do.
fn synthetic_page(clauses: usize, lines_per_clause: usize) -> Vec<GlyphRun> {
    let mut runs = Vec::new();
    let mut y = 800.0_f32;
    for clause in 0..clauses {
        runs.push(GlyphRun::new(
            format!("{}.", clause + 1),
            72.0,
            y,
            12.0,
            12.0,
            "Times-Bold",
        ));
        for line in 0..lines_per_clause {
            runs.push(GlyphRun::new(
                format!("The Tenant shall observe obligation {} of clause {}", line, clause),
                90.0,
                y,
                400.0,
                12.0,
                "Times-Roman",
            ));
            y -= 14.0;
        }
        y -= 20.0;
    }

    // Deterministic interleave in place of a shuffle
    let (even, odd): (Vec<_>, Vec<_>) = runs.into_iter().enumerate().partition(|(i, _)| i % 2 == 0);
    odd.into_iter()
        .rev()
        .chain(even)
        .map(|(_, run)| run)
        .collect()
}

/// Benchmark page reconstruction at several page densities
fn bench_reconstruct_page(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("reconstruct_page");

    for (clauses, lines) in [(5, 4), (20, 6), (60, 8)] {
        let page = synthetic_page(clauses, lines);
        group.throughput(Throughput::Elements(page.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(page.len()), &page, |b, page| {
            b.iter(|| reconstruct_page(black_box(page), &config));
        });
    }

    group.finish();
}

/// Benchmark blank-line normalization of a reconstructed document
fn bench_normalize(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let text = reconstruct_page(&synthetic_page(60, 8), &config).replace("\n\n", "\n \n\t\n\n");

    let mut group = c.benchmark_group("normalize_text");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("spaced_blank_lines", |b| {
        b.iter(|| normalize_text(black_box(&text)));
    });
    group.finish();
}

criterion_group!(benches, bench_reconstruct_page, bench_normalize);
criterion_main!(benches);
