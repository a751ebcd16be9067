use criterion::{black_box, criterion_group, criterion_main, Criterion};
use animerec_core::{ChunkHit, ContextSelector, PromptTemplate};

fn sample_hits(n: usize) -> Vec<ChunkHit> {
    (0..n)
        .map(|i| {
            ChunkHit::new(
                format!("Chunk {i} of a long synopsis about pirates, ninjas and giant robots."),
                (i % 7).to_string(),
                format!("Show {}", i % 7),
                0.05 + i as f64 * 0.03,
            )
        })
        .collect()
}

fn bench_select_context(c: &mut Criterion) {
    let selector = ContextSelector::default();
    let template = PromptTemplate::default();
    let hits = sample_hits(15);
    let wide = sample_hits(200);

    c.bench_function("select_context_k15", |b| {
        b.iter(|| selector.select(black_box(&hits)).render());
    });

    c.bench_function("select_context_k200", |b| {
        b.iter(|| selector.select(black_box(&wide)).render());
    });

    c.bench_function("prepare_prompt_k15", |b| {
        b.iter(|| {
            selector.prepare(
                black_box("mecha with a sad ending"),
                black_box(&hits),
                &template,
            )
        });
    });
}

criterion_group!(benches, bench_select_context);
criterion_main!(benches);
