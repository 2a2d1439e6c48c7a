//! LUT interpolator (§4.1): expand a sparse, evenly-spaced table of raw
//! values into a dense per-column array covering the raster width.

use crate::errors::{RcmError, Result};

/// A dense, column-addressed calibration look-up table (§3 "LUT").
///
/// Invariant: `table.len() >= raster_width` for the `Product` it was built
/// for — enforced at construction time by [`densify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    pub offset: f64,
    pub table: Vec<f64>,
}

impl Lut {
    /// Caller-driven narrowing of the LUT range (§4.5 partial-LUT operation).
    /// Clamps `offset >= 0` and `width` so the slice stays in bounds, and is
    /// non-destructive with respect to the table this was built from.
    pub fn narrowed(&self, offset: usize, width: usize) -> Lut {
        let bound = self.table.len().saturating_sub(1);
        let start = offset.min(bound);
        let end = (start + width).min(bound);
        Lut {
            offset: self.offset,
            table: self.table[start..end].to_vec(),
        }
    }
}

/// Expand `raw` into a dense column-addressed array.
///
/// `step` may be negative, meaning the raw values are given in reversed
/// column order. `pixel_first` is the column of the first raw value (after
/// un-reversing). `raster_width` is the minimum acceptable output length;
/// the actual output length is `|step| * raw.len()`.
pub(crate) fn densify(
    raw: &[f64],
    step: i64,
    pixel_first: i64,
    raster_width: usize,
) -> Result<Vec<f64>> {
    if raw.is_empty() {
        return Err(RcmError::BadLut("empty raw gain table".into()));
    }
    if step == 0 {
        return Err(RcmError::BadLut("zero step size".into()));
    }
    if step < 0 && pixel_first <= 0 {
        return Err(RcmError::BadLut("descending product".into()));
    }

    let abs_step = step.unsigned_abs() as usize;
    let values: Vec<f64> = if step < 0 {
        raw.iter().rev().copied().collect()
    } else {
        raw.to_vec()
    };

    let len = abs_step
        .checked_mul(values.len())
        .ok_or_else(|| RcmError::BadLut("gain table too large".into()))?;
    if len < raster_width {
        return Err(RcmError::BadLut(format!(
            "densified length {len} shorter than raster width {raster_width}"
        )));
    }

    let mut out = vec![0.0f64; len];
    let first = values[0];
    let last = *values.last().unwrap();
    let pixel_first = pixel_first.max(0) as usize;

    for slot in out.iter_mut().take(pixel_first.min(len)) {
        *slot = first;
    }

    for (k, &value) in values.iter().enumerate() {
        let pos = pixel_first + k * abs_step;
        if pos < len {
            out[pos] = value;
        }
    }

    for k in 0..values.len().saturating_sub(1) {
        let pos0 = pixel_first + k * abs_step;
        let pos1 = pixel_first + (k + 1) * abs_step;
        let (v0, v1) = (values[k], values[k + 1]);
        for (i, slot) in out.iter_mut().enumerate().take(pos1.min(len)).skip(pos0 + 1) {
            let frac = (i - pos0) as f64 / abs_step as f64;
            *slot = v0 + frac * (v1 - v0);
        }
    }

    let last_pos = pixel_first + (values.len() - 1) * abs_step;
    for slot in out.iter_mut().skip(last_pos.saturating_add(1)) {
        *slot = last;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_land_exactly_at_their_stride() {
        let out = densify(&[1.0, 2.0, 3.0], 10, 0, 1).unwrap();
        assert_eq!(out.len(), 30);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[10], 2.0);
        assert_eq!(out[20], 3.0);
    }

    #[test]
    fn interior_indices_interpolate_linearly() {
        let out = densify(&[0.0, 10.0], 4, 0, 1).unwrap();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 2.5);
        assert_eq!(out[2], 5.0);
        assert_eq!(out[3], 7.5);
        assert_eq!(out[4], 10.0);
    }

    #[test]
    fn indices_before_pixel_first_hold_first_value() {
        let out = densify(&[7.0, 8.0], 1, 3, 1).unwrap();
        assert_eq!(&out[0..3], &[7.0, 7.0, 7.0]);
    }

    #[test]
    fn indices_beyond_last_raw_position_hold_last_value() {
        let out = densify(&[1.0, 2.0], 2, 0, 1).unwrap();
        assert_eq!(out[3], 2.0);
    }

    #[test]
    fn negative_step_reverses_the_raw_list() {
        // §8 scenario 4: descending product.
        let descending = densify(&[1.0, 2.0, 3.0], -10, 100, 1).unwrap();
        let ascending = densify(&[3.0, 2.0, 1.0], 10, 100, 1).unwrap();
        assert_eq!(descending, ascending);
        assert_eq!(descending.len(), 30);
    }

    #[test]
    fn negative_step_with_non_positive_pixel_first_is_descending_product_error() {
        let err = densify(&[1.0, 2.0], -5, 0, 1).unwrap_err();
        assert!(matches!(err, RcmError::BadLut(_)));
    }

    #[test]
    fn empty_raw_table_is_rejected() {
        assert!(densify(&[], 1, 0, 1).is_err());
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(densify(&[1.0], 0, 0, 1).is_err());
    }

    #[test]
    fn shorter_than_raster_width_is_rejected() {
        assert!(densify(&[1.0, 2.0], 1, 0, 10).is_err());
    }

    #[test]
    fn narrowed_clamps_end_to_lut_size_minus_one() {
        let lut = Lut { offset: 0.0, table: vec![1.0, 2.0, 3.0, 4.0] };
        let narrowed = lut.narrowed(0, 100);
        assert_eq!(narrowed.table, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn narrowed_offset_and_width_stay_within_bounds() {
        let lut = Lut { offset: 0.0, table: vec![1.0, 2.0, 3.0, 4.0] };
        let narrowed = lut.narrowed(2, 1);
        assert_eq!(narrowed.table, vec![3.0]);
    }
}
