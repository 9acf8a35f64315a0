//! Benchmarks for the Keyscribe data-preparation pipeline.
//!
//! Run with: cargo bench -p keyscribe-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyscribe_core::config::UnknownKeywordPolicy;
use keyscribe_core::{collate, tokenize, KeywordDictionary, Sample, Vectorizer, VocabularyIndex};

fn dictionary(size: usize) -> KeywordDictionary {
    KeywordDictionary::from_keywords((0..size).map(|i| format!("kw{i}")))
}

fn benchmark_vectorize(c: &mut Criterion) {
    let dict = dictionary(5000);
    let vectorizer = Vectorizer::new(&dict, UnknownKeywordPolicy::Fatal);
    let keywords = "kw12 kw4000 kw77 kw1999 kw3 kw12 kw4999";

    c.bench_function("vectorize_5000", |b| {
        b.iter(|| {
            let _ = vectorizer.vectorize(black_box(keywords), 0);
        })
    });
}

fn benchmark_tokenize(c: &mut Criterion) {
    let vocab = VocabularyIndex::from_tokens(["a", "man", "riding", "wave", "on", "top", "of", "surfboard", "."]);
    let caption = "A man riding a wave on top of a surfboard.";

    c.bench_function("tokenize_caption", |b| {
        b.iter(|| {
            let _ = tokenize(black_box(caption), &vocab);
        })
    });
}

fn benchmark_collate(c: &mut Criterion) {
    let width = 5000;
    let samples: Vec<Sample> = (0..128)
        .map(|i| {
            let mut vector = vec![0.0f32; width];
            vector[i * 31 % width] = 1.0;
            Sample::new(vector, vec![1; 2 + i % 18], i)
        })
        .collect();

    c.bench_function("collate_128x5000", |b| {
        b.iter(|| {
            let _ = collate(black_box(&samples));
        })
    });
}

criterion_group!(
    benches,
    benchmark_vectorize,
    benchmark_tokenize,
    benchmark_collate,
);
criterion_main!(benches);
