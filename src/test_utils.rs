//! Test-only fixture helpers, shaped after the teacher's `test_utils.rs`.

#![cfg(test)]

use std::path::{Path, PathBuf};

/// A temporary directory holding a product bundle under construction, torn
/// down on drop (mirrors the teacher's `TempFixture`).
pub(crate) struct ProductFixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl ProductFixture {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::create_dir(root.join("calibration")).unwrap();
        Self { _dir: dir, root }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.root
    }

    pub(crate) fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub(crate) fn write_product_xml(&self, contents: &str) -> PathBuf {
        self.write("product.xml", contents)
    }
}

/// Assert two floats are within `eps` of each other, printing both values on
/// failure.
macro_rules! assert_near {
    ($left:expr, $right:expr, $eps:expr) => {{
        let l = $left;
        let r = $right;
        assert!(
            (l - r).abs() <= $eps,
            "assertion failed: `(left ~= right)`\n  left: `{:?}`\n right: `{:?}`\n   eps: `{:?}`",
            l,
            r,
            $eps
        );
    }};
}

pub(crate) use assert_near;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_creates_calibration_subdirectory() {
        let fixture = ProductFixture::new();
        assert!(fixture.path().join("calibration").is_dir());
    }

    #[test]
    fn assert_near_accepts_values_within_tolerance() {
        assert_near!(1.0000001_f64, 1.0_f64, 1e-6);
    }

    #[test]
    #[should_panic]
    fn assert_near_rejects_values_outside_tolerance() {
        assert_near!(1.1_f64, 1.0_f64, 1e-6);
    }
}
