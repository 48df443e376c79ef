use catalog_core::traits::LexicalRanker;
use catalog_text::{tokenize, Bm25Params, Bm25Ranker};

fn equipment() -> Bm25Ranker {
    Bm25Ranker::new(["centrifugal pump", "rotary compressor", "centrifugal fan"], Bm25Params::default())
}

#[test]
fn exact_name_ranks_first_then_shared_token() {
    let ranker = equipment();
    let hits = ranker.score_all(&tokenize("centrifugal pump"), 2);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].position, 0, "exact match first");
    assert_eq!(hits[1].position, 2, "shared token 'centrifugal' second");
    assert!(hits[0].score > hits[1].score);
    assert!(hits[1].score > 0.0);
}

#[test]
fn empty_query_scores_every_entry_zero() {
    let ranker = equipment();
    let hits = ranker.score_all(&tokenize("   "), 10);
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.score == 0.0));
    assert_eq!(hits.iter().map(|h| h.position).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn query_case_is_ignored() {
    let ranker = equipment();
    let lower = ranker.scores(&tokenize("rotary"));
    let upper = ranker.scores(&tokenize("ROTARY"));
    assert_eq!(lower, upper);
    assert!(lower[1] > 0.0);
}

#[test]
fn k_larger_than_corpus_returns_everything() {
    let ranker = equipment();
    assert_eq!(ranker.score_all(&tokenize("fan"), 50).len(), ranker.len());
    assert!(ranker.score_all(&tokenize("fan"), 0).is_empty());
}

#[test]
fn custom_parameters_are_kept() {
    let params = Bm25Params { k1: 1.2, b: 0.5, epsilon: 0.1 };
    let ranker = Bm25Ranker::new(["a b", "c"], params);
    assert_eq!(ranker.params(), params);
}
