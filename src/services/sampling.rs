//! Weighted random selection without replacement.
//!
//! The naive "sort by `weight * random()` and slice" trick produces a biased
//! distribution once weights differ by more than a small multiple, so this is
//! the real cumulative-walk algorithm: draw in `[0, total)`, walk the pool
//! accumulating weight, remove the hit, repeat.

use rand::Rng;

/// Draws up to `count` items from `pool` without replacement, with selection
/// probability proportional to each item's paired weight.
///
/// Items with a non-positive weight are never selected; callers that want
/// unweighted items to stay eligible substitute a small positive default
/// before calling. The generator is injected so tests can seed it while
/// production uses a fresh unseeded source per call.
pub fn weighted_sample_without_replacement<T, R: Rng>(
    rng: &mut R,
    pool: Vec<(T, f64)>,
    count: usize,
) -> Vec<T> {
    let mut pool: Vec<(T, f64)> = pool
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0 && weight.is_finite())
        .collect();

    let mut chosen = Vec::with_capacity(count.min(pool.len()));
    while chosen.len() < count && !pool.is_empty() {
        let total: f64 = pool.iter().map(|(_, weight)| weight).sum();
        let draw = rng.gen_range(0.0..total);

        let mut cumulative = 0.0;
        let mut hit = pool.len() - 1;
        for (index, (_, weight)) in pool.iter().enumerate() {
            cumulative += weight;
            if draw < cumulative {
                hit = index;
                break;
            }
        }

        // Remaining order is irrelevant to the walk, so swap_remove is fine
        let (item, _) = pool.swap_remove(hit);
        chosen.push(item);
    }
    chosen
}
