use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pantai_chat::corpus::{CommentRecord, Corpus};
use pantai_chat::embeddings::LocalEmbedder;
use pantai_chat::rag::{Chunker, VectorIndex};

fn sample_record(id: usize, repeats: usize) -> CommentRecord {
    CommentRecord {
        id,
        text: "Pantai ini sangat indah, pasirnya putih dan ombaknya tenang sekali. "
            .repeat(repeats),
        beach: Some("Pantai Mutun".to_string()),
        rating: Some(4.5),
    }
}

fn chunker_benchmark(c: &mut Criterion) {
    let chunker = Chunker::new(2500, 250);
    let record = sample_record(0, 512);

    c.bench_function("chunker_split_long_comment", |b| {
        b.iter(|| {
            let chunks = chunker.chunk_record(black_box(&record));
            black_box(chunks.len());
        });
    });
}

fn corpus_chunking_benchmark(c: &mut Criterion) {
    let chunker = Chunker::new(2500, 250);
    let records = (0..64).map(|id| sample_record(id, 64)).collect();
    let corpus = Corpus::from_records(records);

    c.bench_function("chunker_full_corpus", |b| {
        b.iter(|| {
            let chunks = chunker.chunk_corpus(black_box(&corpus));
            black_box(chunks.len());
        });
    });
}

fn index_search_benchmark(c: &mut Criterion) {
    let chunker = Chunker::new(200, 20);
    let embedder = LocalEmbedder::new(256);
    let records = (0..128).map(|id| sample_record(id, 8)).collect();
    let corpus = Corpus::from_records(records);
    let entries = chunker
        .chunk_corpus(&corpus)
        .into_iter()
        .map(|chunk| {
            let vector = embedder.embed(&chunk.text);
            (chunk, vector)
        })
        .collect();
    let index = VectorIndex::from_entries(entries);
    let query = embedder.embed("Bagaimana kondisi pasir dan ombak di pantai?");

    c.bench_function("index_search_top_k", |b| {
        b.iter(|| {
            let hits = index.search(black_box(&query), 120);
            black_box(hits.len());
        });
    });
}

criterion_group!(
    chunking,
    chunker_benchmark,
    corpus_chunking_benchmark,
    index_search_benchmark
);
criterion_main!(chunking);
