//! Error taxonomy for the RCM driver.
//!
//! Mirrors `gdal::errors::GdalError` in shape (a flat `thiserror` enum with
//! `#[from]` conversions at the seams where an external collaborator's error
//! crosses into ours), but enumerates the RCM-specific failure modes from the
//! specification's error handling design instead of libgdal's CPL error class.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RcmError>;

#[derive(Debug, Error)]
pub enum RcmError {
    /// `path` does not satisfy the identification rules: no subdataset prefix,
    /// no `product.xml` at the root or under `metadata/`, no `product.xml` basename.
    #[error("'{0}' is not a recognized RCM product")]
    NotRecognized(PathBuf),

    /// Caller requested write access; this driver is read-only.
    #[error("RCM products can only be opened read-only")]
    ReadOnly,

    /// An XML sibling file could not be parsed, or a required node is absent.
    #[error("malformed XML in '{path}': {source}")]
    MalformedXml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// A required XML node was absent (distinct from a parse failure).
    #[error("missing required node '{node}' in '{path}'")]
    MissingNode { path: PathBuf, node: String },

    /// Raster width/height <= 1, or `sceneAttributes.numberOfEntries` != 1.
    #[error("bad geometry: {0}")]
    BadGeometry(String),

    /// Sample-type / bits-per-sample combination not in the supported table.
    #[error("unsupported product: {0}")]
    Unsupported(String),

    /// A referenced sibling file (LUT, noise, image) could not be opened.
    #[error("missing sibling file ({kind}): '{}'", path.display())]
    MissingSibling { kind: &'static str, path: PathBuf },

    /// The band-file prober rejected the mapping between source bands and the
    /// requested logical band.
    #[error("incompatible band file for polarization '{polarization}'")]
    IncompatibleBandFile { polarization: String },

    /// LUT sizes are inconsistent with the raster width, or the raw table is
    /// empty/zero-step, or the descending-product guard tripped.
    #[error("bad LUT: {0}")]
    BadLut(String),

    /// A block read from the underlying image file failed.
    #[error("I/O error reading underlying raster: {0}")]
    IoError(#[from] gdal::errors::GdalError),
}
