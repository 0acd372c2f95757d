//! Blue-noise dither mask optimizer.
//!
//! A mask of `S x S` cells, each holding `D` values in `[0, 1]`, starts as
//! white noise and is refined by repeated parallel passes that try to swap
//! the values of candidate pixel pairs, keeping swaps that lower a
//! spatial/value energy. Neighbouring cells end up with dissimilar values.

pub mod counter;
pub mod error;
pub mod export;
pub mod kernel;
pub mod logging;
pub mod mask;
pub mod optimizer;
pub mod permutation;
pub mod preview;
pub mod settings;

pub use counter::AcceptCounter;
pub use error::{ConfigError, OptimizerError, Result};
pub use kernel::{CpuSwapKernel, SwapKernel};
pub use mask::{MaskBuffer, MaskStore, Role};
pub use optimizer::{IterationReport, Optimizer};
pub use permutation::{CandidatePermutation, Scramble};
pub use preview::PreviewFrame;
pub use settings::{EnergyParams, MaskSettings};
