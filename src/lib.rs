#![crate_name = "rcm"]
#![crate_type = "lib"]

//! A read-only raster driver for RADARSAT Constellation Mission (RCM)
//! products.
//!
//! RCM distributes a product as a bundle directory: a `product.xml`
//! descriptor plus sibling GeoTIFF or NITF image files, one per polarization
//! (or one NITF holding all of them), and a `calibration/` subdirectory of
//! LUT and noise-level XML tables. This crate turns that bundle into a
//! [`Product`] exposing one [`Band`] per polarization, in any of the
//! uncalibrated, Sigma Nought, Beta Nought or Gamma calibration views.
//!
//! ## Example
//!
//! ```rust, no_run
//! use rcm::driver;
//!
//! # fn main() -> rcm::errors::Result<()> {
//! let product = driver::open("RCM_CALIB:SIGMA0:/data/RCM1_OK.../product.xml")?;
//! println!("{}x{}", product.width(), product.height());
//! for band in product.bands() {
//!     println!("  {}: {:?}", band.polarization(), band.reported_element_type());
//! }
//! # Ok(())
//! # }
//! ```

mod band;
mod band_prober;
mod calibration;
mod config;
mod dataset;
mod descriptor;
pub mod driver;
pub mod errors;
mod gcp;
mod geo_transform;
mod lut;
pub mod metadata;
mod rpc;
#[cfg(test)]
mod test_utils;
mod types;
mod xml;

pub use band::{Band, BandKind, BandMapping, BlockBuffer, Complex32, Complex64};
pub use dataset::{CalibrationKind, Product, SampleFamily};
pub use driver::OpenFlags;
pub use gcp::Gcp;
pub use geo_transform::GeoTransform;
pub use metadata::{MetadataDict as Metadata, MetadataEntry};
pub use types::ElementType;
