//! Serializers for a settled mask: a binary PPM image and a C header holding
//! the mask as a `float[S][S][D]` literal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{OptimizerError, Result};
use crate::mask::MaskBuffer;

/// Decimals printed for every value of the literal array.
pub const LITERAL_PRECISION: usize = 10;

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `P6` pixmap. One-dimensional masks are replicated on all three channels,
/// otherwise the first three packed slots become red, green and blue (blue is
/// the zero padding slot when `D == 2`).
pub fn write_ppm<W: Write>(mask: &MaskBuffer, writer: &mut W) -> Result<()> {
    write!(writer, "P6\n{} {}\n255\n", mask.size(), mask.size())?;

    let mut body = Vec::with_capacity(3 * mask.pixel_count());
    for pixel in 0..mask.pixel_count() {
        if mask.dimension() == 1 {
            let grey = to_byte(mask.component(pixel, 0));
            body.extend([grey; 3]);
        } else {
            body.extend((0..3).map(|c| to_byte(mask.component(pixel, c))));
        }
    }
    writer.write_all(&body)?;
    Ok(())
}

pub fn export_ppm<P: AsRef<Path>>(mask: &MaskBuffer, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_ppm(mask, &mut writer)?;
    writer.flush()?;
    info!(path = %path.as_ref().display(), "exported mask image");
    Ok(())
}

pub fn write_literal_array<W: Write>(mask: &MaskBuffer, writer: &mut W) -> Result<()> {
    let size = mask.size();
    let dimension = mask.dimension();

    writeln!(writer, "#pragma once\n\n")?;
    writeln!(
        writer,
        "static const float mask[{size}][{size}][{dimension}] = {{"
    )?;

    for y in 0..size {
        write!(writer, "    {{")?;
        for x in 0..size {
            let pixel = y * size + x;
            write!(writer, "{{")?;
            for component in 0..dimension {
                if component > 0 {
                    write!(writer, ", ")?;
                }
                write!(
                    writer,
                    "{:.*}",
                    LITERAL_PRECISION,
                    mask.component(pixel, component)
                )?;
            }
            write!(writer, "}}")?;
            if x + 1 != size {
                write!(writer, ", ")?;
            }
        }
        write!(writer, "}}")?;
        if y + 1 != size {
            write!(writer, ",")?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "}};")?;
    Ok(())
}

pub fn export_literal_array<P: AsRef<Path>>(mask: &MaskBuffer, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_literal_array(mask, &mut writer)?;
    writer.flush()?;
    info!(path = %path.as_ref().display(), "exported mask literal");
    Ok(())
}

/// A mask read back from its literal-array form.
#[derive(Clone, Debug, PartialEq)]
pub struct LiteralMask {
    pub size: usize,
    pub dimension: usize,
    /// Row, then column, then component.
    pub values: Vec<f64>,
}

impl LiteralMask {
    pub fn get(&self, pixel: usize, component: usize) -> f64 {
        self.values[pixel * self.dimension + component]
    }
}

/// Parses the output of [`write_literal_array`].
pub fn read_literal_array(text: &str) -> Result<LiteralMask> {
    let parse_error = |msg: &str| OptimizerError::Parse(msg.to_string());

    let declaration = text
        .find("mask[")
        .ok_or_else(|| parse_error("missing mask declaration"))?;
    let rest = &text[declaration + "mask".len()..];
    let equals = rest
        .find('=')
        .ok_or_else(|| parse_error("missing initializer"))?;

    let extents = rest[..equals]
        .split(|c| c == '[' || c == ']')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| parse_error("bad array extent"))?;
    let [rows, columns, dimension] = extents[..] else {
        return Err(parse_error("expected three array extents"));
    };
    if rows != columns {
        return Err(parse_error("mask is not square"));
    }

    let values = rest[equals + 1..]
        .split(|c: char| c == '{' || c == '}' || c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| parse_error("bad value"))?;
    if values.len() != rows * columns * dimension {
        return Err(OptimizerError::Parse(format!(
            "expected {} values, found {}",
            rows * columns * dimension,
            values.len()
        )));
    }

    Ok(LiteralMask {
        size: rows,
        dimension,
        values,
    })
}
