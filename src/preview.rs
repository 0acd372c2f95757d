use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::mask::MaskBuffer;
use crate::settings::CHANNELS_PER_LAYER;

/// RGBA8 snapshot of the first layer of a settled mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewFrame {
    pub width: u32,
    pub rgba: Vec<u8>,
}

impl PreviewFrame {
    /// Grey for one-dimensional masks; otherwise the first `min(D, 4)`
    /// components land in R, G, B, A with unused colour channels at 0 and
    /// alpha opaque.
    pub fn capture(mask: &MaskBuffer) -> Self {
        let shown = mask.dimension().min(CHANNELS_PER_LAYER);
        let mut rgba = Vec::with_capacity(4 * mask.pixel_count());

        for pixel in 0..mask.pixel_count() {
            let texel = mask.texel(0, pixel);
            let byte = |c: usize| (texel[c].clamp(0.0, 1.0) * 255.0).round() as u8;
            if shown == 1 {
                let grey = byte(0);
                rgba.extend([grey, grey, grey, 255]);
            } else {
                let mut out = [0, 0, 0, 255];
                for (c, slot) in out.iter_mut().enumerate().take(shown) {
                    *slot = byte(c);
                }
                rgba.extend(out);
            }
        }

        Self {
            width: mask.size() as u32,
            rgba,
        }
    }

    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let file_writer = BufWriter::new(file);

        let mut encoder = png::Encoder::new(file_writer, self.width, self.width);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut png_writer = encoder.write_header()?;
        png_writer.write_image_data(&self.rgba)?;
        Ok(())
    }
}
