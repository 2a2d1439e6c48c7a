//! Calibration-LUT loader (§4.2): parses sibling LUT and noise-level XML
//! files under `calibration/` into the dense tables the band-assembly engine
//! and the tiled read pipeline consume.

use std::path::Path;

use crate::errors::{RcmError, Result};
use crate::lut::{self, Lut};
use crate::xml;

/// The three calibration kinds that have an on-disk LUT (`None`/`Uncalib`
/// views never read one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CalibrationType {
    Sigma0,
    Beta0,
    Gamma,
}

impl CalibrationType {
    /// The `sarCalibrationType` string used in noise-level XML documents.
    pub(crate) fn sar_calibration_type(self) -> &'static str {
        match self {
            CalibrationType::Sigma0 => "Sigma Nought",
            CalibrationType::Beta0 => "Beta Nought",
            CalibrationType::Gamma => "Gamma",
        }
    }
}

/// Load and densify a LUT XML document rooted at `lut`.
pub(crate) fn load_lut(path: &Path, raster_width: usize) -> Result<Lut> {
    let text = std::fs::read_to_string(path).map_err(|_| RcmError::MissingSibling {
        kind: "lut",
        path: path.to_path_buf(),
    })?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|source| RcmError::MalformedXml { path: path.to_path_buf(), source })?;
    let root = doc.root_element();

    let offset: f64 = xml::required_parsed(root, "offset")?;
    let pixel_first: i64 = xml::required_parsed(root, "pixelFirstLutValue")?;
    let step: i64 = xml::required_parsed(root, "stepSize")?;
    let gains_text = xml::required_text(root, "gains")?;
    let raw = parse_whitespace_separated(&gains_text, path)?;

    let table = lut::densify(&raw, step, pixel_first, raster_width)?;
    Ok(Lut { offset, table })
}

/// Load and densify the noise table matching `wanted` from a noise-level XML
/// document rooted at `noiseLevels`, or `None` if no child matches.
pub(crate) fn load_noise_table(
    path: &Path,
    wanted: CalibrationType,
    raster_width: usize,
) -> Result<Option<Vec<f64>>> {
    let text = std::fs::read_to_string(path).map_err(|_| RcmError::MissingSibling {
        kind: "noise",
        path: path.to_path_buf(),
    })?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|source| RcmError::MalformedXml { path: path.to_path_buf(), source })?;
    let root = doc.root_element();

    for entry in xml::children(root, "referenceNoiseLevel") {
        let kind = xml::required_text(entry, "sarCalibrationType")?;
        if kind != wanted.sar_calibration_type() {
            continue;
        }
        let pixel_first: i64 = xml::required_parsed(entry, "pixelFirstNoiseValue")?;
        let step: i64 = xml::required_parsed(entry, "stepSize")?;
        let values_text = xml::required_text(entry, "noiseLevelValues")?;
        let raw = parse_whitespace_separated(&values_text, path)?;
        return Ok(Some(lut::densify(&raw, step, pixel_first, raster_width)?));
    }
    Ok(None)
}

/// Load the optional, best-effort incidence-angle table (§3 "optional
/// incidence-angle table (dense per-column)"). Shares the LUT XML document
/// shape (`offset`/`pixelFirstLutValue`/`stepSize`/`gains`) since RCM's
/// calibration-folder XML documents are structurally uniform across kinds.
pub(crate) fn load_incidence_angle_table(path: &Path, raster_width: usize) -> Result<Vec<f64>> {
    let lut = load_lut(path, raster_width)?;
    Ok(lut.table)
}

fn parse_whitespace_separated(text: &str, path: &Path) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                RcmError::BadLut(format!("non-numeric gain token '{tok}' in '{}'", path.display()))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_near, ProductFixture};

    #[test]
    fn loads_and_densifies_a_lut_document() {
        let fixture = ProductFixture::new();
        let path = fixture.write(
            "calibration/sigma0.xml",
            "<lut><offset>0</offset><pixelFirstLutValue>0</pixelFirstLutValue>\
             <stepSize>2</stepSize><numberOfValues>2</numberOfValues>\
             <gains>5.0 5.0</gains></lut>",
        );
        let lut = load_lut(&path, 1).unwrap();
        assert_near!(lut.offset, 0.0, 1e-9);
        assert_eq!(lut.table, vec![5.0, 5.0]);
    }

    #[test]
    fn noise_loader_selects_matching_calibration_type() {
        let fixture = ProductFixture::new();
        let path = fixture.write(
            "calibration/noise.xml",
            "<noiseLevels>\
               <referenceNoiseLevel><sarCalibrationType>Beta Nought</sarCalibrationType>\
                 <pixelFirstNoiseValue>0</pixelFirstNoiseValue><stepSize>1</stepSize>\
                 <numberOfValues>2</numberOfValues><noiseLevelValues>1.0 2.0</noiseLevelValues>\
               </referenceNoiseLevel>\
               <referenceNoiseLevel><sarCalibrationType>Sigma Nought</sarCalibrationType>\
                 <pixelFirstNoiseValue>0</pixelFirstNoiseValue><stepSize>1</stepSize>\
                 <numberOfValues>2</numberOfValues><noiseLevelValues>9.0 9.0</noiseLevelValues>\
               </referenceNoiseLevel>\
             </noiseLevels>",
        );
        let table = load_noise_table(&path, CalibrationType::Sigma0, 1)
            .unwrap()
            .unwrap();
        assert_eq!(table, vec![9.0, 9.0]);
    }

    #[test]
    fn noise_loader_returns_none_when_no_child_matches() {
        let fixture = ProductFixture::new();
        let path = fixture.write(
            "calibration/noise.xml",
            "<noiseLevels><referenceNoiseLevel><sarCalibrationType>Gamma</sarCalibrationType>\
              <pixelFirstNoiseValue>0</pixelFirstNoiseValue><stepSize>1</stepSize>\
              <numberOfValues>1</numberOfValues><noiseLevelValues>1.0</noiseLevelValues>\
             </referenceNoiseLevel></noiseLevels>",
        );
        let table = load_noise_table(&path, CalibrationType::Beta0, 1).unwrap();
        assert!(table.is_none());
    }
}
