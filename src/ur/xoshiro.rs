//! Deterministic randomness shared by fountain encoders and decoders.
//!
//! Both sides must derive the same fragment mix for a given sequence number,
//! so every draw here is bit-exact: the generator is seeded from a SHA-256
//! digest and doubles are built from the raw 64-bit output.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use sha2::{Digest, Sha256};

/// Xoshiro256** seeded from the SHA-256 of arbitrary bytes.
pub(crate) struct Xoshiro256 {
    rng: Xoshiro256StarStar,
}

impl Xoshiro256 {
    pub(crate) fn from_seed_bytes(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);
        let mut state = [0u8; 32];
        // The digest holds four big-endian words; the generator reads little-endian.
        for (dst, src) in state.chunks_exact_mut(8).zip(digest.chunks_exact(8)) {
            dst.copy_from_slice(src);
            dst.reverse();
        }
        Self {
            rng: Xoshiro256StarStar::from_seed(state),
        }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform in `[0, 1)`.
    pub(crate) fn next_double(&mut self) -> f64 {
        self.next_u64() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// Uniform in `[low, high]`.
    pub(crate) fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (self.next_double() * (high - low + 1) as f64) as u64 + low
    }

    /// Draws `count` of the indexes `0..len` without replacement, in draw order.
    ///
    /// Each draw picks a uniform position in the list of indexes not yet
    /// drawn. The list is kept as a Fenwick tree so a draw costs `O(log len)`.
    pub(crate) fn sample_indexes(&mut self, len: usize, count: usize) -> Vec<usize> {
        let mut remaining = RankTree::full(len);
        let mut drawn = Vec::with_capacity(count.min(len));
        for left in (1..=len).rev().take(count) {
            let rank = (self.next_int(0, (left - 1) as u64) as usize).min(left - 1);
            drawn.push(remaining.take(rank));
        }
        drawn
    }

    /// Picks a mix degree in `1..=seq_len`, weighted towards low degrees.
    pub(crate) fn choose_degree(&mut self, seq_len: usize) -> usize {
        let weights = (1..=seq_len).map(|i| 1.0 / i as f64).collect();
        WeightedSampler::new(weights).next(self) + 1
    }
}

/// Vose's alias method over a fixed set of positive weights.
pub(crate) struct WeightedSampler {
    probs: Vec<f64>,
    aliases: Vec<usize>,
}

impl WeightedSampler {
    /// `weights` must be non-empty and positive.
    pub(crate) fn new(weights: Vec<f64>) -> Self {
        let count = weights.len();
        let total: f64 = weights.iter().sum();
        let mut scaled: Vec<f64> = weights.iter().map(|w| (w * count as f64) / total).collect();

        let mut small = Vec::with_capacity(count);
        let mut large = Vec::with_capacity(count);
        for index in (0..count).rev() {
            if scaled[index] < 1.0 {
                small.push(index);
            } else {
                large.push(index);
            }
        }

        let mut probs = vec![0.0; count];
        let mut aliases = vec![0; count];
        while !small.is_empty() && !large.is_empty() {
            let (Some(less), Some(more)) = (small.pop(), large.pop()) else {
                break;
            };
            probs[less] = scaled[less];
            aliases[less] = more;
            scaled[more] = (scaled[more] + scaled[less]) - 1.0;
            if scaled[more] < 1.0 {
                small.push(more);
            } else {
                large.push(more);
            }
        }
        for index in large.into_iter().chain(small) {
            probs[index] = 1.0;
        }

        Self { probs, aliases }
    }

    pub(crate) fn next(&self, rng: &mut Xoshiro256) -> usize {
        let r1 = rng.next_double();
        let r2 = rng.next_double();
        let count = self.probs.len();
        let index = ((count as f64 * r1) as usize).min(count - 1);
        if r2 < self.probs[index] {
            index
        } else {
            self.aliases[index]
        }
    }
}

/// Counts of the indexes still present, as a 1-based Fenwick tree.
struct RankTree {
    tree: Vec<usize>,
}

impl RankTree {
    fn full(len: usize) -> Self {
        let mut tree = vec![0; len + 1];
        for i in 1..=len {
            tree[i] += 1;
            let parent = i + lowest_bit(i);
            if parent <= len {
                tree[parent] += tree[i];
            }
        }
        Self { tree }
    }

    /// Removes and returns the index at `rank` among those remaining.
    /// `rank` must be below the number remaining.
    fn take(&mut self, rank: usize) -> usize {
        let len = self.tree.len() - 1;
        let mut step = 1;
        while step * 2 <= len {
            step *= 2;
        }

        let (mut pos, mut rest) = (0, rank);
        while step > 0 {
            let next = pos + step;
            if next <= len && self.tree[next] <= rest {
                pos = next;
                rest -= self.tree[next];
            }
            step /= 2;
        }

        let mut i = pos + 1;
        while i <= len {
            self.tree[i] -= 1;
            i += lowest_bit(i);
        }
        pos
    }
}

fn lowest_bit(i: usize) -> usize {
    i & i.wrapping_neg()
}

/// Deterministic pseudo-random test data, as used by the reference vectors.
#[cfg(test)]
pub(crate) fn make_message(seed: &str, len: usize) -> Vec<u8> {
    let mut rng = Xoshiro256::from_seed_bytes(seed.as_bytes());
    (0..len).map(|_| rng.next_int(0, 255) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproduces_reference_message() {
        let message = make_message("Wolf", 256);
        assert_eq!(
            hex::encode(&message[..29]),
            "916ec65cf77cadf55cd7f9cda1a1030026ddd42e905b77adc36e4f2d3c"
        );
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = Xoshiro256::from_seed_bytes(b"seed");
        let mut b = Xoshiro256::from_seed_bytes(b"seed");
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    /// Draws by removing from a plain list, the slow way.
    fn sample_by_removal(rng: &mut Xoshiro256, len: usize, count: usize) -> Vec<usize> {
        let mut items: Vec<usize> = (0..len).collect();
        let mut drawn = Vec::new();
        while !items.is_empty() && drawn.len() < count {
            let index = rng.next_int(0, (items.len() - 1) as u64) as usize;
            drawn.push(items.remove(index));
        }
        drawn
    }

    #[test]
    fn sampling_matches_removal_from_a_list() {
        for (len, count) in [(1, 1), (2, 2), (11, 3), (11, 11), (20, 20), (100, 37), (1000, 999)] {
            let mut fast = Xoshiro256::from_seed_bytes(b"sample");
            let mut slow = Xoshiro256::from_seed_bytes(b"sample");
            assert_eq!(
                fast.sample_indexes(len, count),
                sample_by_removal(&mut slow, len, count),
                "len {len} count {count}"
            );
        }
    }

    #[test]
    fn full_sample_is_a_permutation() {
        let mut rng = Xoshiro256::from_seed_bytes(b"shuffle");
        let mut drawn = rng.sample_indexes(20, 20);
        drawn.sort_unstable();
        assert_eq!(drawn, (0..20).collect::<Vec<_>>());
        assert_eq!(rng.sample_indexes(5, 9).len(), 5);
        assert!(rng.sample_indexes(0, 3).is_empty());
    }

    #[test]
    fn degrees_stay_in_range() {
        let mut rng = Xoshiro256::from_seed_bytes(b"degree");
        for _ in 0..200 {
            let degree = rng.choose_degree(11);
            assert!((1..=11).contains(&degree));
        }
        assert_eq!(rng.choose_degree(1), 1);
    }
}
