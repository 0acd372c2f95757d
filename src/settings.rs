use crate::error::ConfigError;

pub const MIN_MASK_SIZE: usize = 128;
pub const MAX_MASK_SIZE: usize = 1024;
pub const MAX_DIMENSION: usize = 20;

/// Components packed into one layer of the mask.
pub const CHANNELS_PER_LAYER: usize = 4;

// Swap attempts per pass = pixel count / (2 * SWAP_ATTEMPTS_DIVISOR)
pub const SWAP_ATTEMPTS_DIVISOR: usize = 2;
pub const INVOCATIONS_PER_WORKGROUP: usize = 32;

/// Parameters of the swap energy evaluated by the kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyParams {
    /// Spatial Gaussian width, in pixels.
    pub sigma_image: f32,
    /// Value-space Gaussian width.
    pub sigma_value: f32,
    /// Half-width of the toroidal window summed around each swap member.
    pub radius: usize,
}

impl Default for EnergyParams {
    fn default() -> Self {
        Self {
            sigma_image: 2.1,
            sigma_value: 1.0,
            radius: 3,
        }
    }
}

/// Validated construction parameters of an [`Optimizer`](crate::Optimizer).
#[derive(Clone, Debug, PartialEq)]
pub struct MaskSettings {
    mask_size: usize,
    dimension: usize,
    pub seed: Option<u64>,
    pub energy: EnergyParams,
    /// When false the accept counter accumulates across iterations.
    pub reset_counter_each_iteration: bool,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            mask_size: MIN_MASK_SIZE,
            dimension: 1,
            seed: None,
            energy: EnergyParams::default(),
            reset_counter_each_iteration: true,
        }
    }
}

impl MaskSettings {
    /// Rounds `mask_size` up to the next power of two, then checks both bounds.
    pub fn new(mask_size: usize, dimension: usize) -> Result<Self, ConfigError> {
        let rounded = round_up_to_power_of_two(mask_size);
        if !(MIN_MASK_SIZE..=MAX_MASK_SIZE).contains(&rounded) {
            return Err(ConfigError::InvalidMaskSize {
                requested: mask_size,
                rounded,
            });
        }
        if !(1..=MAX_DIMENSION).contains(&dimension) {
            return Err(ConfigError::InvalidDimension(dimension));
        }

        Ok(Self {
            mask_size: rounded,
            dimension,
            ..Self::default()
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn mask_size(&self) -> usize {
        self.mask_size
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn layers(&self) -> usize {
        layers_for(self.dimension)
    }

    /// Zero-filled slots at the end of the last layer.
    pub fn padding(&self) -> usize {
        CHANNELS_PER_LAYER * self.layers() - self.dimension
    }

    pub fn pixel_count(&self) -> usize {
        self.mask_size * self.mask_size
    }

    /// Length of the candidate permutation.
    pub fn swap_attempts(&self) -> usize {
        self.pixel_count() / SWAP_ATTEMPTS_DIVISOR
    }

    pub fn work_group_count(&self) -> usize {
        self.pixel_count() / (2 * INVOCATIONS_PER_WORKGROUP * SWAP_ATTEMPTS_DIVISOR)
    }
}

pub fn layers_for(dimension: usize) -> usize {
    (dimension + CHANNELS_PER_LAYER - 1) / CHANNELS_PER_LAYER
}

/// Powers of two are returned unchanged; zero stays zero so it fails validation.
pub fn round_up_to_power_of_two(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    n.checked_next_power_of_two().unwrap_or(0)
}
