//! Affine geotransform (§3, §4.4), carried over from the teacher's
//! `GeoTransform`/`GeoTransformEx` (`geo_transform.rs`) unchanged: this
//! driver hands its geotransform to the same `GDALApplyGeoTransform`/
//! `GDALInvGeoTransform` machinery any other GDAL-backed dataset would, so
//! there is no reason to reinvent the affine math.

use std::mem::MaybeUninit;

use gdal::errors::GdalError;

pub use gdal::GeoTransform;

/// Extension methods on [`GeoTransform`], identical in shape to
/// `gdal::GeoTransformEx`; kept local so §4.4's corner-based construction
/// and quarter-pixel validation live next to the trait they build on.
pub trait GeoTransformEx {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);
    fn invert(&self) -> gdal::errors::Result<GeoTransform>;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        let mut geo_x = MaybeUninit::<f64>::uninit();
        let mut geo_y = MaybeUninit::<f64>::uninit();
        unsafe {
            gdal_sys::GDALApplyGeoTransform(
                self.as_ptr() as *mut f64,
                pixel,
                line,
                geo_x.as_mut_ptr(),
                geo_y.as_mut_ptr(),
            );
            (geo_x.assume_init(), geo_y.assume_init())
        }
    }

    fn invert(&self) -> gdal::errors::Result<GeoTransform> {
        let mut gt_out = MaybeUninit::<GeoTransform>::uninit();
        let rv = unsafe {
            gdal_sys::GDALInvGeoTransform(
                self.as_ptr() as *mut f64,
                (*gt_out.as_mut_ptr()).as_mut_ptr(),
            )
        };
        if rv == 0 {
            return Err(GdalError::BadArgument(
                "geo transform is uninvertible".to_string(),
            ));
        }
        Ok(unsafe { gt_out.assume_init() })
    }
}

/// A projected map coordinate, as read from `mapProjection.positioningInformation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Corner {
    pub x: f64,
    pub y: f64,
}

/// Build the affine 6-tuple from the four corner coordinates of a raster of
/// size `width x height`, per §4.4.
pub(crate) fn from_corners(ul: Corner, ur: Corner, bl: Corner, width: usize, height: usize) -> GeoTransform {
    let w = width as f64;
    let h = height as f64;
    let pixel_width = (ur.x - ul.x) / w;
    let column_rotation = (ur.y - ul.y) / w;
    let row_rotation = (bl.x - ul.x) / h;
    let pixel_height = (bl.y - ul.y) / h;
    [ul.x, pixel_width, row_rotation, ul.y, column_rotation, pixel_height]
}

/// Check the affine prediction at the bottom-right pixel against the
/// reported BR corner, within one-quarter of a pixel on either axis.
pub(crate) fn validates_against_br_corner(
    gt: &GeoTransform,
    width: usize,
    height: usize,
    br: Corner,
) -> bool {
    let (x, y) = gt.apply(width as f64, height as f64);
    let tolerance_x = gt[1].abs() / 4.0;
    let tolerance_y = gt[5].abs() / 4.0;
    (x - br.x).abs() <= tolerance_x && (y - br.y).abs() <= tolerance_y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_recovers_a_pure_scale_transform() {
        let ul = Corner { x: 0.0, y: 100.0 };
        let ur = Corner { x: 10.0, y: 100.0 };
        let bl = Corner { x: 0.0, y: 0.0 };
        let gt = from_corners(ul, ur, bl, 10, 10);
        assert_eq!(gt, [0.0, 1.0, 0.0, 100.0, 0.0, -10.0]);
    }

    #[test]
    fn exact_corner_prediction_validates() {
        let ul = Corner { x: 0.0, y: 100.0 };
        let ur = Corner { x: 10.0, y: 100.0 };
        let bl = Corner { x: 0.0, y: 0.0 };
        let gt = from_corners(ul, ur, bl, 10, 10);
        let br = Corner { x: 10.0, y: 0.0 };
        assert!(validates_against_br_corner(&gt, 10, 10, br));
    }

    #[test]
    fn corner_beyond_quarter_pixel_tolerance_fails_validation() {
        let ul = Corner { x: 0.0, y: 100.0 };
        let ur = Corner { x: 10.0, y: 100.0 };
        let bl = Corner { x: 0.0, y: 0.0 };
        let gt = from_corners(ul, ur, bl, 10, 10);
        let br = Corner { x: 11.0, y: 0.0 };
        assert!(!validates_against_br_corner(&gt, 10, 10, br));
    }

    #[test]
    fn apply_and_invert_round_trip() {
        let gt: GeoTransform = [100.0, 2.0, 0.0, 200.0, 0.0, -2.0];
        let (x, y) = gt.apply(5.0, 5.0);
        let inverse = gt.invert().unwrap();
        let (p, l) = inverse.apply(x, y);
        assert!((p - 5.0).abs() < 1e-9);
        assert!((l - 5.0).abs() < 1e-9);
    }
}
