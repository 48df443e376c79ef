//! Max-normalized sigmoid calibration.
//!
//! `confidence = sigmoid(1 - score / (max(score) + 1e-6))`. The formula does
//! not know which ranker produced a score, so on a merged list a lower score
//! always maps to a higher confidence. Arithmetic runs in `f64`; an `f32`
//! maximum of 32 or more would swallow the epsilon.

use catalog_core::error::{Error, Result};
use catalog_core::types::SearchResult;

pub const MAX_SCORE_EPSILON: f64 = 1e-6;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn max_score(results: &[SearchResult]) -> f64 {
    results.iter().map(|r| f64::from(r.score)).fold(f64::NEG_INFINITY, f64::max) + MAX_SCORE_EPSILON
}

/// Fill `confidence` on every result. Order, ids, names and scores are kept.
pub fn calibrate(mut results: Vec<SearchResult>) -> Result<Vec<SearchResult>> {
    if results.is_empty() {
        return Err(Error::EmptyInput);
    }
    let max_score = max_score(&results);
    for r in &mut results {
        let ratio = if max_score == 0.0 { 0.0 } else { f64::from(r.score) / max_score };
        r.confidence = Some(sigmoid(1.0 - ratio) as f32);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::types::SourceKind;

    fn result(id: i64, score: f32) -> SearchResult {
        SearchResult { id, name: format!("item {id}"), score, confidence: None, source: SourceKind::Lexical }
    }

    fn confidences(results: &[SearchResult]) -> Vec<f32> {
        results.iter().map(|r| r.confidence.unwrap()).collect()
    }

    #[test]
    fn sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
        assert!(sigmoid(40.0) <= 1.0);
        assert!(sigmoid(-200.0) >= 0.0);
    }

    #[test]
    fn empty_input_is_error() {
        assert!(matches!(calibrate(Vec::new()), Err(Error::EmptyInput)));
    }

    #[test]
    fn listed_scores_give_strictly_decreasing_confidence() {
        let out = calibrate(vec![result(1, 0.1), result(2, 0.5), result(3, 1.0)]).unwrap();
        let c = confidences(&out);
        assert!(c[0] > c[1] && c[1] > c[2], "{c:?}");
        let max_score = 1.0 + MAX_SCORE_EPSILON;
        for (r, conf) in out.iter().zip(&c) {
            assert!((f64::from(*conf) - sigmoid(1.0 - f64::from(r.score) / max_score)).abs() < 1e-6);
        }
        assert!((c[0] - 0.710_949_5).abs() < 1e-4);
        assert!((c[2] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn only_confidence_changes() {
        let input = vec![result(7, 3.0), result(4, 0.0)];
        let out = calibrate(input.clone()).unwrap();
        for (before, after) in input.iter().zip(&out) {
            assert_eq!((before.id, &before.name, before.score, before.source), (after.id, &after.name, after.score, after.source));
        }
    }

    #[test]
    fn all_zero_scores_share_one_confidence() {
        let out = calibrate(vec![result(1, 0.0), result(2, 0.0)]).unwrap();
        let c = confidences(&out);
        assert_eq!(c[0], c[1]);
        assert!((f64::from(c[0]) - sigmoid(1.0)).abs() < 1e-6);
    }

    #[test]
    fn tiny_negative_max_stays_bounded() {
        let out = calibrate(vec![result(1, -1e-6)]).unwrap();
        let c = out[0].confidence.unwrap();
        assert!(c.is_finite() && (0.0..=1.0).contains(&c), "{c}");
    }

    #[test]
    fn epsilon_survives_large_scores() {
        let results = vec![result(1, 64.0), result(2, 12.5)];
        let max = max_score(&results);
        assert!(max > 64.0);
        assert!((max - 64.0 - MAX_SCORE_EPSILON).abs() < 1e-12);

        let out = calibrate(results).unwrap();
        let expected = sigmoid(1.0 - 12.5 / (64.0 + MAX_SCORE_EPSILON)) as f32;
        assert_eq!(out[1].confidence, Some(expected));
    }
}
