//! Swap evaluation kernel.
//!
//! A dispatch evaluates every candidate pair of the permutation against the
//! settled input mask and produces a complete output mask. Invocations run in
//! no particular order and share nothing but the accept counter.

use bitvec::prelude::{bitvec, BitVec};
use rayon::prelude::*;

use crate::counter::AcceptCounter;
use crate::mask::MaskBuffer;
use crate::permutation::{CandidatePermutation, Scramble};
use crate::settings::{EnergyParams, MAX_DIMENSION, MAX_MASK_SIZE};

/// Backend executing one optimization pass.
pub trait SwapKernel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Largest mask side this backend can hold.
    fn max_mask_size(&self) -> usize;

    /// Writes every cell of `output` exactly once: swapped when the swap
    /// lowers the energy, passed through otherwise. Returns once all
    /// invocations have completed and their counter increments are visible.
    fn dispatch(
        &self,
        input: &MaskBuffer,
        permutation: &CandidatePermutation,
        scramble: Scramble,
        output: &mut MaskBuffer,
        counter: &AcceptCounter,
    );
}

/// Kernel running its invocations on the rayon thread pool.
#[derive(Clone, Debug)]
pub struct CpuSwapKernel {
    energy: EnergyParams,
    max_mask_size: usize,
}

impl CpuSwapKernel {
    pub fn new(energy: EnergyParams) -> Self {
        Self {
            energy,
            max_mask_size: MAX_MASK_SIZE,
        }
    }

    pub fn with_max_mask_size(mut self, max_mask_size: usize) -> Self {
        self.max_mask_size = max_mask_size;
        self
    }

    /// True when exchanging the values of `a` and `b` lowers the local energy.
    pub fn improves(&self, mask: &MaskBuffer, a: usize, b: usize) -> bool {
        let before = self.local_energy(mask, a, a, b) + self.local_energy(mask, b, b, a);
        let after = self.local_energy(mask, a, b, b) + self.local_energy(mask, b, a, a);
        after < before
    }

    /// Energy between `center` holding the value of `value_of` and the cells
    /// of its toroidal window, skipping `exclude`.
    ///
    /// `exp(-|p - q|² / σi² - ‖vp - vq‖^(d/2) / σs²)`
    fn local_energy(
        &self,
        mask: &MaskBuffer,
        center: usize,
        value_of: usize,
        exclude: usize,
    ) -> f32 {
        let size = mask.size() as isize;
        let dimension = mask.dimension();
        let radius = self.energy.radius as isize;
        let inv_sigma_image = 1.0 / (self.energy.sigma_image * self.energy.sigma_image);
        let inv_sigma_value = 1.0 / (self.energy.sigma_value * self.energy.sigma_value);
        let value_exponent = dimension as f32 / 4.0;

        let mut value = [0.0f32; MAX_DIMENSION];
        mask.read_cell(value_of, &mut value);

        let cx = center as isize % size;
        let cy = center as isize / size;

        let mut energy = 0.0f32;
        for dy in -radius..=radius {
            let qy = (cy + dy).rem_euclid(size);
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let qx = (cx + dx).rem_euclid(size);
                let q = (qy * size + qx) as usize;
                if q == exclude {
                    continue;
                }

                let mut value_sq = 0.0f32;
                for component in 0..dimension {
                    let d = value[component] - mask.component(q, component);
                    value_sq += d * d;
                }

                let image_sq = (dx * dx + dy * dy) as f32;
                // ‖v‖^(d/2) == (‖v‖²)^(d/4)
                let value_term = value_sq.powf(value_exponent) * inv_sigma_value;
                energy += (-image_sq * inv_sigma_image - value_term).exp();
            }
        }
        energy
    }
}

impl SwapKernel for CpuSwapKernel {
    fn name(&self) -> &'static str {
        "CPU"
    }

    fn max_mask_size(&self) -> usize {
        self.max_mask_size
    }

    fn dispatch(
        &self,
        input: &MaskBuffer,
        permutation: &CandidatePermutation,
        scramble: Scramble,
        output: &mut MaskBuffer,
        counter: &AcceptCounter,
    ) {
        let decisions: Vec<(usize, usize, bool)> = (0..permutation.pair_count())
            .into_par_iter()
            .map(|k| {
                let (a, b) = permutation.pair(k, scramble);
                let accepted = self.improves(input, a, b);
                if accepted {
                    counter.increment();
                }
                (a, b, accepted)
            })
            .collect();

        let mut written: BitVec = bitvec![0; input.pixel_count()];
        for (a, b, accepted) in decisions {
            debug_assert!(!written[a] && !written[b], "overlapping candidate pairs");
            let (into_a, into_b) = if accepted { (b, a) } else { (a, b) };
            output.copy_cell_from(input, into_a, a);
            output.copy_cell_from(input, into_b, b);
            written.set(a, true);
            written.set(b, true);
        }

        for pixel in written.iter_zeros() {
            output.copy_cell_from(input, pixel, pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MaskSettings;
    use rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn setup(dimension: usize) -> (MaskBuffer, CandidatePermutation, Xoshiro256Plus) {
        let settings = MaskSettings::new(128, dimension).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(99);
        let permutation = CandidatePermutation::generate(128, 2, &mut rng);
        let mask = MaskBuffer::white_noise(&settings, &mut rng);
        (mask, permutation, rng)
    }

    #[test]
    fn dispatch_only_moves_values_around() {
        let (input, permutation, mut rng) = setup(1);
        let mut output = MaskBuffer::zeroed(&MaskSettings::new(128, 1).unwrap());
        let counter = AcceptCounter::new();
        let kernel = CpuSwapKernel::new(EnergyParams::default());

        kernel.dispatch(&input, &permutation, Scramble::sample(128, &mut rng), &mut output, &counter);

        let sorted = |mask: &MaskBuffer| {
            let mut values: Vec<f32> = (0..mask.pixel_count()).map(|p| mask.component(p, 0)).collect();
            values.sort_by(f32::total_cmp);
            values
        };
        assert_eq!(sorted(&input), sorted(&output));

        let moved = (0..input.pixel_count())
            .filter(|&p| input.component(p, 0) != output.component(p, 0))
            .count();
        assert_eq!(moved, 2 * counter.read() as usize);
        assert!(counter.read() as usize <= permutation.len());
    }

    #[test]
    fn swapping_an_accepted_pair_back_is_rejected() {
        let (mask, permutation, _) = setup(2);
        let kernel = CpuSwapKernel::new(EnergyParams::default());

        let accepted = (0..permutation.pair_count())
            .map(|k| permutation.pair(k, Scramble::default()))
            .find(|&(a, b)| kernel.improves(&mask, a, b));
        let Some((a, b)) = accepted else {
            panic!("white noise should admit at least one improving swap");
        };

        let mut swapped = mask.clone();
        swapped.copy_cell_from(&mask, b, a);
        swapped.copy_cell_from(&mask, a, b);
        assert!(!kernel.improves(&swapped, a, b));
    }

    #[test]
    fn identical_values_never_swap() {
        let settings = MaskSettings::new(128, 1).unwrap();
        let mask = MaskBuffer::zeroed(&settings);
        let kernel = CpuSwapKernel::new(EnergyParams::default());
        assert!(!kernel.improves(&mask, 0, 5000));
    }
}
