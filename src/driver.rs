//! Public entry points (§4.7): filename identification, the subdataset
//! grammar, and the read-only open gate.
//!
//! Plays the role the teacher's [`gdal::Dataset::open`]/`open_ex` pair plays
//! for `GDALOpenEx`, generalized to RCM's own identification rules (a bundle
//! directory, a direct `product.xml` path, or a `RCM_CALIB:<TAG>:<path>`
//! subdataset reference) instead of delegating straight to libgdal.

use std::ffi::c_uint;
use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::config;
use crate::dataset::{CalibrationKind, Product};
use crate::descriptor;
use crate::errors::{RcmError, Result};

bitflags! {
    /// Open-time flags, mirroring the shape of `gdal::options::GdalOpenFlags`
    /// without the vector/raster/gnm driver-class bits this driver has no use
    /// for: there is exactly one kind of dataset here, and it is read-only.
    #[derive(Debug)]
    pub struct OpenFlags: c_uint {
        /// Open read-only (the only mode this driver supports).
        const READONLY = 0x00;
        /// Emit a diagnostic on a failed identification instead of staying silent.
        const VERBOSE_ERROR = 0x01;
        /// Caller is requesting write access; always rejected.
        const UPDATE = 0x02;
    }
}

impl Default for OpenFlags {
    fn default() -> OpenFlags {
        OpenFlags::READONLY
    }
}

/// A parsed `RCM_CALIB:<TAG>:<path>` reference, or a plain filesystem path.
enum Reference<'a> {
    Subdataset { calibration: CalibrationKind, path: &'a str },
    Plain(&'a str),
}

fn parse_reference(name: &str) -> Reference {
    let prefix = format!("{}:", config::SUBDATASET_PREFIX);
    let Some(rest) = name.strip_prefix(&prefix) else {
        return Reference::Plain(name);
    };
    let Some((tag, path)) = rest.split_once(':') else {
        return Reference::Plain(name);
    };
    match CalibrationKind::from_subdataset_tag(tag) {
        Some(calibration) => Reference::Subdataset { calibration, path },
        None => Reference::Plain(name),
    }
}

/// Identify `name` as an RCM product, without fully opening it (mirrors the
/// cheap `Identify` step GDAL drivers run before `Open`).
pub fn identify(name: &str) -> bool {
    match parse_reference(name) {
        Reference::Subdataset { path, .. } => resolve_product_xml(Path::new(path)).is_ok(),
        Reference::Plain(path) => resolve_product_xml(Path::new(path)).is_ok(),
    }
}

/// Open `name` read-only, honoring the `RCM_CALIB:<TAG>:<path>` subdataset
/// grammar (§4.7) and defaulting to the uncalibrated view otherwise.
pub fn open(name: &str) -> Result<Product> {
    open_ex(name, OpenFlags::default())
}

pub fn open_ex(name: &str, flags: OpenFlags) -> Result<Product> {
    if flags.contains(OpenFlags::UPDATE) {
        return Err(RcmError::ReadOnly);
    }

    let (path, calibration) = match parse_reference(name) {
        Reference::Subdataset { calibration, path } => (path, calibration),
        Reference::Plain(path) => (path, CalibrationKind::None),
    };

    let xml_path = resolve_product_xml(Path::new(path))?;
    let descriptor = descriptor::parse(&xml_path)?;
    Product::assemble(descriptor, calibration)
}

/// Resolve `candidate` (a bundle directory, a direct `product.xml` path, or
/// the path segment of a subdataset reference) to the `product.xml` file it
/// names, per §4.7's identification rules.
fn resolve_product_xml(candidate: &Path) -> Result<PathBuf> {
    if candidate.is_dir() {
        let direct = candidate.join(config::PRODUCT_XML);
        if direct.is_file() {
            return Ok(direct);
        }
        let nested = candidate.join(config::METADATA_DIR).join(config::PRODUCT_XML);
        if nested.is_file() {
            return Ok(nested);
        }
        return Err(RcmError::NotRecognized(candidate.to_path_buf()));
    }

    if candidate.is_file() {
        let basename_matches = candidate
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.eq_ignore_ascii_case(config::PRODUCT_XML))
            .unwrap_or(false);
        if basename_matches {
            return Ok(candidate.to_path_buf());
        }
    }

    Err(RcmError::NotRecognized(candidate.to_path_buf()))
}
