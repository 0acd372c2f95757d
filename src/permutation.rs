use bitvec::prelude::{bitvec, BitVec};
use rand::Rng;
use rand_core::RngCore;

/// Per-pass translation applied to every candidate pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scramble {
    pub x: usize,
    pub y: usize,
}

impl Scramble {
    pub fn sample<R: RngCore>(size: usize, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0..size),
            y: rng.gen_range(0..size),
        }
    }

    /// Toroidal translation of a flat pixel index. A bijection on `[0, size²)`.
    pub fn apply(&self, pixel: usize, size: usize) -> usize {
        let x = (pixel % size + self.x) % size;
        let y = (pixel / size + self.y) % size;
        y * size + x
    }
}

/// Fixed set of swap candidates, drawn once per optimizer.
///
/// Pair `k` is made of entries `2k` and `2k + 1`; the scramble only moves
/// the pairs around the torus, it never changes which entries are paired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidatePermutation {
    size: usize,
    entries: Vec<u32>,
}

impl CandidatePermutation {
    /// Partial Fisher-Yates over `[0, size²)`, keeping the first
    /// `size² / divisor` slots.
    pub fn generate<R: RngCore>(size: usize, divisor: usize, rng: &mut R) -> Self {
        let pixel_count = size * size;
        let len = pixel_count / divisor.max(1);

        let mut permutation: Vec<u32> = (0..pixel_count as u32).collect();
        for i in 0..len {
            let j = rng.gen_range(i..pixel_count);
            permutation.swap(i, j);
        }
        permutation.truncate(len);

        Self {
            size,
            entries: permutation,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    pub fn pair_count(&self) -> usize {
        self.entries.len() / 2
    }

    /// Physical pixels of pair `k` under `scramble`.
    pub fn pair(&self, k: usize, scramble: Scramble) -> (usize, usize) {
        let source = self.entries[2 * k] as usize;
        let partner = self.entries[2 * k + 1] as usize;
        (
            scramble.apply(source, self.size),
            scramble.apply(partner, self.size),
        )
    }

    /// True when every entry is in range and none repeats.
    pub fn is_distinct(&self) -> bool {
        let pixel_count = self.size * self.size;
        let mut seen: BitVec = bitvec![0; pixel_count];
        for &entry in &self.entries {
            let entry = entry as usize;
            if entry >= pixel_count || seen[entry] {
                return false;
            }
            seen.set(entry, true);
        }
        true
    }
}
