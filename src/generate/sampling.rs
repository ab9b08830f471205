//! Logit-filtering and sampling primitives.
//!
//! All functions operate on one row's logit vector. `f32::NEG_INFINITY`
//! marks a token as excluded: softmax collapses its probability to exactly
//! zero, so it can never be drawn.

use std::collections::HashSet;

use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Dampen logits of every token id already present in the history.
///
/// Each distinct id is divided by `penalty` once (CTRL-style repetition
/// penalty). `penalty == 1.0` is a no-op.
pub fn apply_repetition_penalty(
    logits: &mut Array1<f32>,
    past_tokens: ArrayView1<u32>,
    penalty: f32,
) {
    if penalty == 1.0 {
        return;
    }
    let seen: HashSet<u32> = past_tokens.iter().copied().collect();
    for id in seen {
        let idx = id as usize;
        if idx < logits.len() {
            logits[idx] /= penalty;
        }
    }
}

/// Keep only the `k` highest logits; everything strictly below the k-th
/// largest value becomes `-inf`. `k` is clamped to the vocabulary size;
/// `k == 0` disables the filter.
pub fn top_k_filter(logits: &mut Array1<f32>, k: usize) {
    let k = k.min(logits.len());
    if k == 0 {
        return;
    }
    let mut sorted: Vec<f32> = logits.iter().copied().collect();
    sorted.sort_unstable_by(|a, b| b.total_cmp(a));
    let threshold = sorted[k - 1];
    logits.mapv_inplace(|v| if v < threshold { f32::NEG_INFINITY } else { v });
}

/// Nucleus filtering: keep the smallest probability-sorted prefix whose
/// cumulative probability exceeds `p`, including the token that crosses
/// the threshold. The single most probable token always survives.
/// `p <= 0` disables the filter.
pub fn top_p_filter(logits: &mut Array1<f32>, p: f32) {
    if p <= 0.0 {
        return;
    }

    let mut order: Vec<usize> = (0..logits.len()).collect();
    order.sort_unstable_by(|&a, &b| logits[b].total_cmp(&logits[a]));

    let sorted = Array1::from_iter(order.iter().map(|&i| logits[i]));
    let probs = softmax(&sorted);

    let mut remove = vec![false; order.len()];
    let mut cumulative = 0.0;
    for (rank, &prob) in probs.iter().enumerate() {
        cumulative += prob;
        remove[rank] = cumulative > p;
    }
    // Shift the marks right by one so the first token crossing the
    // threshold is kept, and never remove the top-ranked token.
    for rank in (1..remove.len()).rev() {
        remove[rank] = remove[rank - 1];
    }
    if let Some(first) = remove.first_mut() {
        *first = false;
    }

    for (rank, &idx) in order.iter().enumerate() {
        if remove[rank] {
            logits[idx] = f32::NEG_INFINITY;
        }
    }
}

/// Numerically stable softmax. Excluded (`-inf`) entries get probability
/// exactly zero.
pub fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Index of the first maximum logit (greedy selection).
pub fn argmax(logits: &Array1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in logits.iter().enumerate() {
        if v > logits[best] {
            best = i;
        }
    }
    best
}

/// Draw one index from a categorical distribution by inverse-CDF walk.
///
/// Zero-probability (excluded) entries are never selected, even when the
/// draw is exactly 0.0.
pub fn sample_index<R: Rng>(probs: &Array1<f32>, rng: &mut R) -> usize {
    let draw: f32 = rng.gen();
    let mut cumulative = 0.0;
    for (i, &prob) in probs.iter().enumerate() {
        if prob <= 0.0 {
            continue;
        }
        cumulative += prob;
        if cumulative >= draw {
            return i;
        }
    }
    // Floating-point underrun: fall back to the most probable index.
    argmax(probs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_repetition_penalty_dampens_only_seen_tokens() {
        let mut logits = array![2.0f32, 4.0, 6.0, 8.0];
        let history = array![1u32, 3, 3];
        apply_repetition_penalty(&mut logits, history.view(), 2.0);
        assert_eq!(logits, array![2.0, 2.0, 6.0, 4.0]);
    }

    #[test]
    fn test_repetition_penalty_one_is_noop() {
        let mut logits = array![2.0f32, 4.0];
        let history = array![0u32, 1];
        apply_repetition_penalty(&mut logits, history.view(), 1.0);
        assert_eq!(logits, array![2.0, 4.0]);
    }

    #[test]
    fn test_repetition_penalty_ignores_out_of_range_history() {
        let mut logits = array![2.0f32, 4.0];
        let history = array![17u32];
        apply_repetition_penalty(&mut logits, history.view(), 2.0);
        assert_eq!(logits, array![2.0, 4.0]);
    }

    #[test]
    fn test_top_k_keeps_exactly_k_tokens() {
        let mut logits = array![1.0f32, 5.0, 3.0, 4.0, 2.0];
        top_k_filter(&mut logits, 2);
        let kept: Vec<usize> = logits
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn test_top_k_zero_disables_filter() {
        let mut logits = array![1.0f32, 5.0, 3.0];
        top_k_filter(&mut logits, 0);
        assert!(logits.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_top_k_clamped_to_vocab_size() {
        let mut logits = array![1.0f32, 5.0, 3.0];
        top_k_filter(&mut logits, 100);
        assert!(logits.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_top_p_keeps_first_crossing_token() {
        // probs roughly [0.64, 0.24, 0.09, 0.03]
        let mut logits = array![4.0f32, 3.0, 2.0, 1.0];
        top_p_filter(&mut logits, 0.7);
        // 0.64 < 0.7, crossed at the second token: both kept, rest removed.
        assert!(logits[0].is_finite());
        assert!(logits[1].is_finite());
        assert!(logits[2].is_infinite());
        assert!(logits[3].is_infinite());
    }

    #[test]
    fn test_top_p_always_keeps_best_token() {
        let mut logits = array![10.0f32, 1.0, 0.0];
        // Best token alone exceeds p: it must still survive.
        top_p_filter(&mut logits, 0.01);
        assert!(logits[0].is_finite());
        assert!(logits[1].is_infinite());
        assert!(logits[2].is_infinite());
    }

    #[test]
    fn test_top_p_zero_disables_filter() {
        let mut logits = array![1.0f32, 2.0, 3.0];
        top_p_filter(&mut logits, 0.0);
        assert!(logits.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_softmax_zeroes_excluded_tokens() {
        let logits = array![1.0f32, f32::NEG_INFINITY, 1.0];
        let probs = softmax(&logits);
        assert_eq!(probs[1], 0.0);
        assert!((probs.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_argmax_returns_first_maximum() {
        assert_eq!(argmax(&array![1.0f32, 3.0, 3.0, 2.0]), 1);
    }

    #[test]
    fn test_sample_index_never_picks_excluded_token() {
        let probs = softmax(&array![5.0f32, f32::NEG_INFINITY, 1.0]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_ne!(sample_index(&probs, &mut rng), 1);
        }
    }

    #[test]
    fn test_sample_index_skips_zero_probability_on_zero_draw() {
        // A constant generator yields a draw of exactly 0.0, the worst
        // case for the cumulative walk.
        let mut rng = rand::rngs::mock::StepRng::new(0, 0);
        let mut logits = array![1.0f32, 9.0, 2.0];
        top_k_filter(&mut logits, 1);
        let probs = softmax(&logits);
        assert_eq!(probs[0], 0.0);
        assert_eq!(sample_index(&probs, &mut rng), 1);
    }

    #[test]
    fn test_sample_index_is_deterministic_with_single_survivor() {
        let mut logits = array![1.0f32, 9.0, 2.0];
        top_k_filter(&mut logits, 1);
        let probs = softmax(&logits);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(sample_index(&probs, &mut rng), 1);
        }
    }
}
