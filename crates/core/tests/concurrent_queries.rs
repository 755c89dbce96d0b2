//! Queries running on several threads while the index is refitted.

use docrank_core::error::RankerError;
use docrank_core::{CorpusIterator, HashingTfIdfVectorizer, Ranker, VectorizerConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn ranker_is_shareable_across_threads() {
    assert_send_sync::<Ranker<HashingTfIdfVectorizer>>();
    assert_send_sync::<Arc<Ranker<HashingTfIdfVectorizer>>>();
}

/// Ten documents with ids `<prefix>0..<prefix>9`; the first four mention "alpha".
fn corpus(prefix: &str, flavor: &str) -> CorpusIterator {
    CorpusIterator::from_documents(
        (0..10).map(|i| {
            let lead = if i < 4 { "alpha" } else { "omega" };
            (
                format!("{prefix}{i}"),
                format!("{lead} {flavor} document number{i} {flavor}{i}"),
            )
        }),
        3,
    )
    .unwrap()
}

#[test]
fn queries_see_one_whole_corpus_during_refits() {
    let dir = tempfile::tempdir().unwrap();
    let config = VectorizerConfig {
        index_path: dir.path().join("tfidf.idx"),
        hash_size: 1 << 18,
        ngram_range: (1, 1),
    };
    let ranker = Arc::new(Ranker::new(HashingTfIdfVectorizer::new(config).unwrap()));
    let left = corpus("left-", "red");
    let right = corpus("right-", "blue");
    ranker.fit_batch(&left).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let answered = Arc::new(AtomicUsize::new(0));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let ranker = Arc::clone(&ranker);
            let done = Arc::clone(&done);
            let answered = Arc::clone(&answered);
            thread::spawn(move || {
                let mut inconsistent = 0usize;
                while !done.load(Ordering::Relaxed) {
                    match ranker.rank("alpha", 5) {
                        Ok(ranking) => {
                            answered.fetch_add(1, Ordering::Relaxed);
                            let from_left =
                                ranking.doc_ids.iter().all(|id| id.starts_with("left-"));
                            let from_right =
                                ranking.doc_ids.iter().all(|id| id.starts_with("right-"));
                            if ranking.len() != 4 || !(from_left || from_right) {
                                inconsistent += 1;
                            }
                        }
                        Err(RankerError::NotReady) => {}
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                }
                inconsistent
            })
        })
        .collect();

    for round in 0..50 {
        let next = if round % 2 == 0 { &right } else { &left };
        ranker.fit_batch(next).unwrap();
    }
    while answered.load(Ordering::Relaxed) == 0 {
        thread::yield_now();
    }
    done.store(true, Ordering::Relaxed);

    let inconsistent: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(inconsistent, 0);
    assert!(answered.load(Ordering::Relaxed) > 0);
    assert!(ranker.is_ready());
}
