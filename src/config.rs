//! Driver-wide constants.
//!
//! Per §9 "Global tunables": the path separator and the calibration-folder
//! name are process-wide constants, not configuration. Exposed as `pub(crate)
//! const`s rather than a runtime-configurable struct.

/// Subdirectory (relative to the directory holding `product.xml`) holding LUT,
/// noise-level and incidence-angle XML files.
pub(crate) const CALIBRATION_DIR: &str = "calibration";

/// Subdirectory that may hold `product.xml` instead of the bundle root.
pub(crate) const METADATA_DIR: &str = "metadata";

/// Canonical descriptor filename.
pub(crate) const PRODUCT_XML: &str = "product.xml";

/// Literal prefix of a subdataset reference (§4.7).
pub(crate) const SUBDATASET_PREFIX: &str = "RCM_CALIB";

/// Substring that must appear in `product.xmlns` for identification to accept
/// the document as an RCM descriptor.
pub(crate) const NAMESPACE_MARKER: &str = "rcm";

/// Normalize any path separator character to the target OS's separator, per
/// §4.4 ("Replace any path separator characters before opening").
pub(crate) fn normalize_separators(raw: &str) -> String {
    raw.replace(['\\', '/'], std::path::MAIN_SEPARATOR_STR)
}
