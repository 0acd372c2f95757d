use rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use tracing::{debug, info, trace};

use crate::counter::AcceptCounter;
use crate::error::{OptimizerError, Result};
use crate::kernel::{CpuSwapKernel, SwapKernel};
use crate::mask::{MaskBuffer, MaskStore};
use crate::permutation::{CandidatePermutation, Scramble};
use crate::settings::{MaskSettings, SWAP_ATTEMPTS_DIVISOR};

/// Where the driver stands within an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IterationState {
    Idle,
    Dispatching,
    Syncing,
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationReport {
    pub iteration: u64,
    pub scramble: Scramble,
    pub accepted: u32,
}

/// Owns the mask pair, the candidate permutation and the accept counter, and
/// runs strictly sequential passes of a [`SwapKernel`] over them.
pub struct Optimizer {
    settings: MaskSettings,
    kernel: Box<dyn SwapKernel>,
    store: MaskStore,
    permutation: CandidatePermutation,
    counter: AcceptCounter,
    rng: Xoshiro256Plus,
    iterations: u64,
}

impl Optimizer {
    pub fn new(settings: MaskSettings) -> Result<Self> {
        let kernel = CpuSwapKernel::new(settings.energy);
        Self::with_kernel(settings, Box::new(kernel))
    }

    pub fn with_kernel(settings: MaskSettings, kernel: Box<dyn SwapKernel>) -> Result<Self> {
        if settings.mask_size() > kernel.max_mask_size() {
            return Err(OptimizerError::UnsupportedMaskSize {
                backend: kernel.name(),
                requested: settings.mask_size(),
                max: kernel.max_mask_size(),
            });
        }

        info!(
            size = settings.mask_size(),
            dimension = settings.dimension(),
            layers = settings.layers(),
            backend = kernel.name(),
            "initializing the optimizer"
        );

        let mut rng = match settings.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };

        let permutation =
            CandidatePermutation::generate(settings.mask_size(), SWAP_ATTEMPTS_DIVISOR, &mut rng);
        debug!(candidates = permutation.len(), "generated swap candidates");

        info!("filling the mask with white noise");
        let store = MaskStore::new(MaskBuffer::white_noise(&settings, &mut rng));

        Ok(Self {
            settings,
            kernel,
            store,
            permutation,
            counter: AcceptCounter::new(),
            rng,
            iterations: 0,
        })
    }

    /// Runs one full pass and promotes its output to the current mask.
    pub fn run(&mut self) -> IterationReport {
        let scramble = Scramble::sample(self.settings.mask_size(), &mut self.rng);
        trace!(x = scramble.x, y = scramble.y, "scramble");
        if self.settings.reset_counter_each_iteration {
            self.counter.reset();
        }

        self.enter(IterationState::Dispatching);
        let (input, output) = self.store.split_for_pass();
        self.kernel
            .dispatch(input, &self.permutation, scramble, output, &self.counter);

        // dispatch() has returned: every invocation has completed.
        self.enter(IterationState::Syncing);
        self.store.commit();
        self.enter(IterationState::Committed);

        self.iterations += 1;
        let accepted = self.counter.read();
        debug!(iteration = self.iterations, accepted, "pass committed");

        self.enter(IterationState::Idle);
        IterationReport {
            iteration: self.iterations,
            scramble,
            accepted,
        }
    }

    fn enter(&self, state: IterationState) {
        trace!(iteration = self.iterations + 1, ?state, "driver state");
    }

    /// Keeps iterating until `stop` returns true. `stop` is only consulted
    /// between iterations.
    pub fn run_until<F>(&mut self, mut stop: F) -> u64
    where
        F: FnMut(&IterationReport) -> bool,
    {
        let start = self.iterations;
        loop {
            let report = self.run();
            if stop(&report) {
                return self.iterations - start;
            }
        }
    }

    /// Swaps accepted since the counter was last zeroed.
    pub fn accepted_swap_count(&self) -> u32 {
        self.counter.read()
    }

    pub fn reset_counter(&self) {
        self.counter.reset();
    }

    /// The settled mask of the last committed pass.
    pub fn mask(&self) -> &MaskBuffer {
        self.store.current()
    }

    pub fn permutation(&self) -> &CandidatePermutation {
        &self.permutation
    }

    pub fn settings(&self) -> &MaskSettings {
        &self.settings
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }
}
