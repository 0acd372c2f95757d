use rand::Rng;
use rand_core::RngCore;

use crate::settings::{MaskSettings, CHANNELS_PER_LAYER};

/// One full mask: `layers` planes of `size * size` cells, each cell holding
/// four packed `f32` components. Layout is `[layer][y][x][channel]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskBuffer {
    size: usize,
    dimension: usize,
    layers: usize,
    data: Vec<f32>,
}

impl MaskBuffer {
    pub fn zeroed(settings: &MaskSettings) -> Self {
        let len = CHANNELS_PER_LAYER * settings.layers() * settings.pixel_count();
        Self {
            size: settings.mask_size(),
            dimension: settings.dimension(),
            layers: settings.layers(),
            data: vec![0.0; len],
        }
    }

    /// Uniform noise in `[0, 1)` on the first `dimension` components of every
    /// cell; the padding slots of the last layer stay at zero.
    pub fn white_noise<R: RngCore>(settings: &MaskSettings, rng: &mut R) -> Self {
        let mut mask = Self::zeroed(settings);
        let live_in_last = CHANNELS_PER_LAYER - settings.padding();
        let layer_len = CHANNELS_PER_LAYER * mask.pixel_count();
        let last_layer = layer_len * (mask.layers - 1);

        for value in &mut mask.data[..last_layer] {
            *value = rng.gen::<f32>();
        }

        for cell in mask.data[last_layer..].chunks_exact_mut(CHANNELS_PER_LAYER) {
            for value in &mut cell[..live_in_last] {
                *value = rng.gen::<f32>();
            }
        }

        mask
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn pixel_count(&self) -> usize {
        self.size * self.size
    }

    /// Raw packed storage, layer after layer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The four packed channels of `pixel` in `layer`.
    pub fn texel(&self, layer: usize, pixel: usize) -> &[f32] {
        let start = self.offset(layer, pixel);
        &self.data[start..start + CHANNELS_PER_LAYER]
    }

    /// Component `component` (in `0..4 * layers`) of `pixel`.
    pub fn component(&self, pixel: usize, component: usize) -> f32 {
        let layer = component / CHANNELS_PER_LAYER;
        self.data[self.offset(layer, pixel) + component % CHANNELS_PER_LAYER]
    }

    /// Copies the first `dimension` components of `pixel` into `out`.
    pub fn read_cell(&self, pixel: usize, out: &mut [f32]) {
        debug_assert!(out.len() >= self.dimension);
        for (component, value) in out.iter_mut().take(self.dimension).enumerate() {
            *value = self.component(pixel, component);
        }
    }

    /// Copies every packed slot (padding included) of `src_pixel` in `src`
    /// into `dst_pixel` of `self`.
    pub fn copy_cell_from(&mut self, src: &MaskBuffer, src_pixel: usize, dst_pixel: usize) {
        debug_assert_eq!(self.layers, src.layers);
        for layer in 0..self.layers {
            let from = src.offset(layer, src_pixel);
            let to = self.offset(layer, dst_pixel);
            self.data[to..to + CHANNELS_PER_LAYER]
                .copy_from_slice(&src.data[from..from + CHANNELS_PER_LAYER]);
        }
    }

    fn offset(&self, layer: usize, pixel: usize) -> usize {
        CHANNELS_PER_LAYER * (layer * self.pixel_count() + pixel)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    A,
    B,
}

impl Role {
    fn other(self) -> Self {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }

    fn index(self) -> usize {
        match self {
            Role::A => 0,
            Role::B => 1,
        }
    }
}

/// Ping-pong pair of masks. Only the buffer named by `current` is ever handed
/// out for reading; the other one is the write target of the next pass.
#[derive(Debug)]
pub struct MaskStore {
    buffers: [MaskBuffer; 2],
    current: Role,
}

impl MaskStore {
    pub fn new(initial: MaskBuffer) -> Self {
        Self {
            buffers: [initial.clone(), initial],
            current: Role::A,
        }
    }

    pub fn current(&self) -> &MaskBuffer {
        &self.buffers[self.current.index()]
    }

    pub fn current_role(&self) -> Role {
        self.current
    }

    /// Settled input and scratch output of the next pass.
    pub fn split_for_pass(&mut self) -> (&MaskBuffer, &mut MaskBuffer) {
        let (a, b) = self.buffers.split_at_mut(1);
        match self.current {
            Role::A => (&a[0], &mut b[0]),
            Role::B => (&b[0], &mut a[0]),
        }
    }

    /// Promotes the scratch buffer once the pass writing it has completed.
    pub fn commit(&mut self) {
        self.current = self.current.other();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn noise(size: usize, dimension: usize) -> MaskBuffer {
        let settings = MaskSettings::new(size, dimension).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        MaskBuffer::white_noise(&settings, &mut rng)
    }

    #[test]
    fn noise_leaves_padding_at_zero() {
        let mask = noise(128, 5);
        assert_eq!(mask.layers(), 2);
        for pixel in 0..mask.pixel_count() {
            let texel = mask.texel(1, pixel);
            assert!((0.0..1.0).contains(&texel[0]));
            assert_eq!(&texel[1..], &[0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn read_cell_walks_layers() {
        let mask = noise(128, 6);
        let mut cell = [0.0f32; 6];
        mask.read_cell(42, &mut cell);
        assert_eq!(cell[..4], *mask.texel(0, 42));
        assert_eq!(cell[4..], mask.texel(1, 42)[..2]);
    }

    #[test]
    fn store_flips_roles_on_commit() {
        let mut store = MaskStore::new(noise(128, 1));
        assert_eq!(store.current_role(), Role::A);

        let (input, output) = store.split_for_pass();
        let first = input.component(0, 0);
        output.copy_cell_from(input, 1, 0);
        let moved = input.component(1, 0);

        assert_eq!(store.current().component(0, 0), first);
        store.commit();
        assert_eq!(store.current_role(), Role::B);
        assert_eq!(store.current().component(0, 0), moved);
    }
}
