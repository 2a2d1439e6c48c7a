//! `Band` and the tiled calibrated-read pipeline (§3, §4.6).
//!
//! Generalizes the teacher's `RasterBand<'a>` (`raster/rasterband.rs`) — a
//! thin, non-owning wrapper that borrows its parent `Dataset` — into an
//! *owning* wrapper: §5 says "the band owns its underlying-file handle", so
//! here `Band` holds the `gdal::Dataset` for its sibling image file directly
//! rather than a lifetime-bound reference.

use gdal::raster::{GdalType, GDALDataType};
use num_complex::Complex;

use crate::errors::Result;
use crate::lut::Lut;
use crate::types::ElementType;

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

/// Local stand-in for libgdal's complex pixel layout: the upstream crate
/// only implements `GdalType` for real scalar types, and the orphan rule
/// keeps this crate from implementing it directly on `num_complex::Complex`.
/// Same bit layout as `Complex<T>` (real component first), so a `RasterIO`
/// call against a complex band can read straight into it at its native type.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
struct RawComplex<T>(T, T);

impl GdalType for RawComplex<i16> {
    fn gdal_type() -> GDALDataType::Type {
        GDALDataType::GDT_CInt16
    }
    fn zero() -> Self {
        RawComplex(0, 0)
    }
}

impl GdalType for RawComplex<f32> {
    fn gdal_type() -> GDALDataType::Type {
        GDALDataType::GDT_CFloat32
    }
    fn zero() -> Self {
        RawComplex(0.0, 0.0)
    }
}

impl GdalType for RawComplex<f64> {
    fn gdal_type() -> GDALDataType::Type {
        GDALDataType::GDT_CFloat64
    }
    fn zero() -> Self {
        RawComplex(0.0, 0.0)
    }
}

impl<T> From<RawComplex<T>> for Complex<T> {
    fn from(r: RawComplex<T>) -> Self {
        Complex::new(r.0, r.1)
    }
}

/// Decided by the band-file prober (§4.3); a `Band` only ever holds the two
/// accepted outcomes — `BandError` aborts assembly before a `Band` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMapping {
    Straight,
    TwoBandComplex,
}

/// Tag distinguishing a pass-through band from one with an owned calibration
/// LUT (§9 "polymorphic bands ... tagged variant rather than a class hierarchy").
#[derive(Debug, Clone)]
pub enum BandKind {
    Raw {
        element_type: ElementType,
    },
    Calibrated {
        reported_type: ElementType,
        original_type: ElementType,
        lut: Lut,
        noise: Option<Vec<f64>>,
    },
}

/// One published polarization x calibration view (§3).
pub struct Band {
    pub(crate) polarization: String,
    pub(crate) mapping: BandMapping,
    pub(crate) source: gdal::Dataset,
    pub(crate) source_band_index: usize,
    pub(crate) is_nitf: bool,
    pub(crate) kind: BandKind,
}

/// The typed contents of one read block, pre-zeroed over its full
/// `block_w x block_h` extent and filled only over the clipped, in-raster
/// portion (§4.6 edge clipping).
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBuffer {
    Byte(Vec<u8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    CInt16(Vec<Complex<i16>>),
    CFloat32(Vec<Complex32>),
    CFloat64(Vec<Complex64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl Band {
    pub fn polarization(&self) -> &str {
        &self.polarization
    }

    pub fn mapping(&self) -> BandMapping {
        self.mapping
    }

    /// The element type reported to callers: the calibrated view's output
    /// type, or the native source type for a raw band.
    pub fn reported_element_type(&self) -> ElementType {
        match &self.kind {
            BandKind::Raw { element_type } => *element_type,
            BandKind::Calibrated { reported_type, .. } => *reported_type,
        }
    }

    pub fn kind(&self) -> &BandKind {
        &self.kind
    }

    /// Caller-driven narrowing of this band's LUT (§4.5 partial-LUT operation).
    /// A no-op on a raw band. Only touches the band's own `LUT`; callers go
    /// through [`crate::dataset::Product::narrow_band_lut`], which also
    /// refreshes the `LUT_SIZE_n`/`LUT_GAINS_n` metadata this narrows.
    pub(crate) fn narrow_lut(&mut self, offset: usize, width: usize) {
        if let BandKind::Calibrated { lut, .. } = &mut self.kind {
            *lut = lut.narrowed(offset, width);
        }
    }

    /// Read one block at `(block_x, block_y)` in block coordinates, clipped
    /// to `raster_width x raster_height` (§4.6).
    pub fn read_block(
        &self,
        block_x: usize,
        block_y: usize,
        block_w: usize,
        block_h: usize,
        raster_width: u32,
        raster_height: u32,
    ) -> Result<BlockBuffer> {
        let raster_width = raster_width as usize;
        let raster_height = raster_height as usize;
        let x0 = block_x * block_w;
        let y0 = block_y * block_h;
        let req_w = if x0 >= raster_width { 0 } else { (raster_width - x0).min(block_w) };
        let req_h = if y0 >= raster_height { 0 } else { (raster_height - y0).min(block_h) };

        match &self.kind {
            BandKind::Raw { element_type } => {
                self.read_native_window(x0, y0, req_w, req_h, block_w, block_h, *element_type)
            }
            BandKind::Calibrated { original_type, lut, noise: _, .. } => {
                let raw = self.read_native_window(x0, y0, req_w, req_h, req_w, req_h, *original_type)?;
                Ok(calibrate(&raw, lut, x0, req_w, req_h, block_w, block_h))
            }
        }
    }

    fn read_native_window(
        &self,
        x0: usize,
        y0: usize,
        req_w: usize,
        req_h: usize,
        block_w: usize,
        block_h: usize,
        native_type: ElementType,
    ) -> Result<BlockBuffer> {
        if req_w == 0 || req_h == 0 {
            return Ok(zeroed_buffer(native_type, block_w, block_h));
        }

        match self.mapping {
            BandMapping::Straight => self.read_single_band(x0, y0, req_w, req_h, block_w, block_h, native_type),
            BandMapping::TwoBandComplex if self.is_nitf => {
                self.read_single_band(x0, y0, req_w, req_h, block_w, block_h, native_type)
            }
            BandMapping::TwoBandComplex => {
                self.read_two_real_bands(x0, y0, req_w, req_h, block_w, block_h, native_type)
            }
        }
    }

    fn read_single_band(
        &self,
        x0: usize,
        y0: usize,
        req_w: usize,
        req_h: usize,
        block_w: usize,
        block_h: usize,
        native_type: ElementType,
    ) -> Result<BlockBuffer> {
        let band = self.source.rasterband(self.source_band_index as isize)?;

        Ok(match native_type {
            ElementType::Byte => {
                let raw = read_plane::<u8>(&band, x0, y0, req_w, req_h)?;
                BlockBuffer::Byte(place(&raw, req_w, req_h, block_w, block_h, 0))
            }
            ElementType::UInt16 => {
                let raw = read_plane::<u16>(&band, x0, y0, req_w, req_h)?;
                BlockBuffer::UInt16(place(&raw, req_w, req_h, block_w, block_h, 0))
            }
            ElementType::Int16 => {
                let raw = read_plane::<i16>(&band, x0, y0, req_w, req_h)?;
                BlockBuffer::Int16(place(&raw, req_w, req_h, block_w, block_h, 0))
            }
            ElementType::Float32 => {
                let raw = read_plane::<f32>(&band, x0, y0, req_w, req_h)?;
                BlockBuffer::Float32(place(&raw, req_w, req_h, block_w, block_h, 0.0))
            }
            ElementType::Float64 => {
                let raw = read_plane::<f64>(&band, x0, y0, req_w, req_h)?;
                BlockBuffer::Float64(place(&raw, req_w, req_h, block_w, block_h, 0.0))
            }
            // Read the band at its own native complex type: the source
            // window and the destination element count are both (req_w,
            // req_h), with each element carrying its own re/im pair.
            ElementType::CInt16 => {
                let raw = read_plane::<RawComplex<i16>>(&band, x0, y0, req_w, req_h)?;
                let pairs: Vec<_> = raw.into_iter().map(Complex::from).collect();
                BlockBuffer::CInt16(place(&pairs, req_w, req_h, block_w, block_h, Complex::new(0, 0)))
            }
            ElementType::CFloat32 => {
                let raw = read_plane::<RawComplex<f32>>(&band, x0, y0, req_w, req_h)?;
                let pairs: Vec<_> = raw.into_iter().map(Complex::from).collect();
                BlockBuffer::CFloat32(place(&pairs, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
            }
            ElementType::CFloat64 => {
                let raw = read_plane::<RawComplex<f64>>(&band, x0, y0, req_w, req_h)?;
                let pairs: Vec<_> = raw.into_iter().map(Complex::from).collect();
                BlockBuffer::CFloat64(place(&pairs, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
            }
            ElementType::CInt32 => unreachable!(
                "CInt32 is not produced by any identification rule this driver implements"
            ),
        })
    }

    fn read_two_real_bands(
        &self,
        x0: usize,
        y0: usize,
        req_w: usize,
        req_h: usize,
        block_w: usize,
        block_h: usize,
        native_type: ElementType,
    ) -> Result<BlockBuffer> {
        let component = native_type
            .real_half()
            .unwrap_or_else(|| unreachable!("TwoBandComplex mapping implies a matching real half"));
        let first = self.source.rasterband(self.source_band_index as isize)?;
        let second = self.source.rasterband(self.source_band_index as isize + 1)?;

        Ok(match component {
            ElementType::Int16 => {
                let re = read_plane::<i16>(&first, x0, y0, req_w, req_h)?;
                let im = read_plane::<i16>(&second, x0, y0, req_w, req_h)?;
                let pairs: Vec<_> = re.iter().zip(&im).map(|(&r, &i)| Complex::new(r, i)).collect();
                BlockBuffer::CInt16(place(&pairs, req_w, req_h, block_w, block_h, Complex::new(0, 0)))
            }
            ElementType::Float32 => {
                let re = read_plane::<f32>(&first, x0, y0, req_w, req_h)?;
                let im = read_plane::<f32>(&second, x0, y0, req_w, req_h)?;
                let pairs: Vec<_> = re.iter().zip(&im).map(|(&r, &i)| Complex::new(r, i)).collect();
                BlockBuffer::CFloat32(place(&pairs, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
            }
            ElementType::Float64 => {
                let re = read_plane::<f64>(&first, x0, y0, req_w, req_h)?;
                let im = read_plane::<f64>(&second, x0, y0, req_w, req_h)?;
                let pairs: Vec<_> = re.iter().zip(&im).map(|(&r, &i)| Complex::new(r, i)).collect();
                BlockBuffer::CFloat64(place(&pairs, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
            }
            _ => unreachable!("real_half only ever yields Int16, Float32 or Float64"),
        })
    }
}

fn read_plane<T: Copy + GdalType>(
    band: &gdal::raster::RasterBand,
    x0: usize,
    y0: usize,
    w: usize,
    h: usize,
) -> Result<Vec<T>> {
    let buffer = band.read_as::<T>((x0 as isize, y0 as isize), (w, h), (w, h), None)?;
    Ok(buffer.data)
}

fn place<T: Copy>(raw: &[T], req_w: usize, req_h: usize, block_w: usize, block_h: usize, zero: T) -> Vec<T> {
    let mut out = vec![zero; block_w * block_h];
    for row in 0..req_h {
        let src = &raw[row * req_w..row * req_w + req_w];
        let start = row * block_w;
        out[start..start + req_w].copy_from_slice(src);
    }
    out
}

fn zeroed_buffer(native_type: ElementType, block_w: usize, block_h: usize) -> BlockBuffer {
    let n = block_w * block_h;
    match native_type {
        ElementType::Byte => BlockBuffer::Byte(vec![0; n]),
        ElementType::UInt16 => BlockBuffer::UInt16(vec![0; n]),
        ElementType::Int16 => BlockBuffer::Int16(vec![0; n]),
        ElementType::CInt16 => BlockBuffer::CInt16(vec![Complex::new(0, 0); n]),
        ElementType::CInt32 => unreachable!(
            "CInt32 is not produced by any identification rule this driver implements"
        ),
        ElementType::CFloat32 => BlockBuffer::CFloat32(vec![Complex::new(0.0, 0.0); n]),
        ElementType::CFloat64 => BlockBuffer::CFloat64(vec![Complex::new(0.0, 0.0); n]),
        ElementType::Float32 => BlockBuffer::Float32(vec![0.0; n]),
        ElementType::Float64 => BlockBuffer::Float64(vec![0.0; n]),
    }
}

/// Apply the §4.6 calibration formula pixel-by-pixel over a raw scratch
/// window, producing the reported `Float32`/`CFloat32` output.
fn calibrate(
    raw: &BlockBuffer,
    lut: &Lut,
    x0: usize,
    req_w: usize,
    req_h: usize,
    block_w: usize,
    block_h: usize,
) -> BlockBuffer {
    let gain_at = |col: usize| -> f64 {
        lut.table.get(x0 + col).copied().unwrap_or(1.0)
    };

    match raw {
        BlockBuffer::CInt16(data) => {
            let out: Vec<Complex32> = complex_digital(data, req_w, req_h, x0, &gain_at);
            BlockBuffer::CFloat32(place(&out, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
        }
        BlockBuffer::CFloat32(data) => {
            let out: Vec<Complex32> = complex_digital(data, req_w, req_h, x0, &gain_at);
            BlockBuffer::CFloat32(place(&out, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
        }
        BlockBuffer::CFloat64(data) => {
            let out: Vec<Complex32> = complex_digital(data, req_w, req_h, x0, &gain_at);
            BlockBuffer::CFloat32(place(&out, req_w, req_h, block_w, block_h, Complex::new(0.0, 0.0)))
        }
        BlockBuffer::Byte(data) => {
            let out = real_digital(data.iter().map(|&d| d as f64), req_w, req_h, lut, &gain_at);
            BlockBuffer::Float32(place(&out, req_w, req_h, block_w, block_h, 0.0))
        }
        BlockBuffer::UInt16(data) => {
            let out = real_digital(data.iter().map(|&d| d as f64), req_w, req_h, lut, &gain_at);
            BlockBuffer::Float32(place(&out, req_w, req_h, block_w, block_h, 0.0))
        }
        BlockBuffer::Int16(data) => {
            let out = real_digital(data.iter().map(|&d| d as f64), req_w, req_h, lut, &gain_at);
            BlockBuffer::Float32(place(&out, req_w, req_h, block_w, block_h, 0.0))
        }
        BlockBuffer::Float32(data) => {
            let out = real_digital(data.iter().map(|&d| d as f64), req_w, req_h, lut, &gain_at);
            BlockBuffer::Float32(place(&out, req_w, req_h, block_w, block_h, 0.0))
        }
        BlockBuffer::Float64(data) => {
            let out = real_digital(data.iter().map(|&d| d as f64), req_w, req_h, lut, &gain_at);
            BlockBuffer::Float32(place(&out, req_w, req_h, block_w, block_h, 0.0))
        }
    }
}

fn complex_digital<T>(
    data: &[Complex<T>],
    req_w: usize,
    req_h: usize,
    _x0: usize,
    gain_at: &dyn Fn(usize) -> f64,
) -> Vec<Complex32>
where
    T: Copy + Into<f64>,
{
    let mut out = Vec::with_capacity(req_w * req_h);
    for row in 0..req_h {
        for col in 0..req_w {
            let sample = data[row * req_w + col];
            let re: f64 = sample.re.into();
            let im: f64 = sample.im.into();
            let digital = re * re + im * im;
            let gain = gain_at(col);
            let calibrated = digital / (gain * gain);
            out.push(Complex::new(calibrated as f32, 0.0));
        }
    }
    out
}

fn real_digital(
    data: impl Iterator<Item = f64>,
    req_w: usize,
    req_h: usize,
    lut: &Lut,
    gain_at: &dyn Fn(usize) -> f64,
) -> Vec<f32> {
    let mut out = Vec::with_capacity(req_w * req_h);
    for (idx, d) in data.enumerate() {
        let col = idx % req_w;
        let gain = gain_at(col);
        let calibrated = (d * d + lut.offset) / gain;
        out.push(calibrated as f32);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_near;

    #[test]
    fn complex_digital_matches_scenario_1() {
        // §8 scenario 1: (3,4) digital against a constant gain of 5 yields 1.0.
        let data = vec![Complex::new(3.0f32, 4.0f32)];
        let gain_at = |_: usize| 5.0f64;
        let out = complex_digital(&data, 1, 1, 0, &gain_at);
        assert_near!(out[0].re, 1.0, 1e-6);
    }

    #[test]
    fn real_digital_matches_scenario_2() {
        // §8 scenario 2: digital value 10 against gains [2,4] yields [50,25].
        let lut = Lut { offset: 0.0, table: vec![2.0, 4.0] };
        let gain_at = |col: usize| lut.table[col];
        let out = real_digital([10.0f64, 10.0f64].into_iter(), 2, 1, &lut, &gain_at);
        assert_eq!(out, vec![50.0, 25.0]);
    }

    #[test]
    fn place_zero_pads_a_clipped_block() {
        let raw = vec![1.0f32, 2.0];
        let out = place(&raw, 2, 1, 4, 2, 0.0);
        assert_eq!(out, vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
