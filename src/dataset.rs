//! Band-assembly engine and the `Product` dataset type (§3, §4.5).
//!
//! Plays the role the teacher's `Dataset` (`dataset.rs`) plays for a
//! GDAL-backed raster — open-time validation, metadata, geotransform,
//! GCPs — but assembles its own band list from RCM-specific sibling files
//! instead of delegating everything to `GDALOpenEx`.

use log::debug;

use crate::band::{Band, BandKind, BandMapping};
use crate::band_prober::{self, ProbeOutcome};
use crate::calibration::{self, CalibrationType};
use crate::config;
use crate::descriptor::{Packaging, ProductDescriptor};
use crate::errors::{RcmError, Result};
use crate::gcp::Gcp;
use crate::geo_transform::GeoTransform;
use crate::metadata::MetadataDict;
use crate::types::ElementType;

/// The calibration view a dataset (or a single subdataset reference) exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationKind {
    None,
    Uncalib,
    Sigma0,
    Beta0,
    Gamma,
}

impl CalibrationKind {
    pub(crate) fn from_subdataset_tag(tag: &str) -> Option<CalibrationKind> {
        match tag.to_ascii_uppercase().as_str() {
            "SIGMA0" => Some(CalibrationKind::Sigma0),
            "BETA0" => Some(CalibrationKind::Beta0),
            "GAMMA" | "GAMMA0" => Some(CalibrationKind::Gamma),
            "UNCALIB" => Some(CalibrationKind::Uncalib),
            _ => None,
        }
    }

    fn loader_type(self) -> Option<CalibrationType> {
        match self {
            CalibrationKind::Sigma0 => Some(CalibrationType::Sigma0),
            CalibrationKind::Beta0 => Some(CalibrationType::Beta0),
            CalibrationKind::Gamma => Some(CalibrationType::Gamma),
            CalibrationKind::None | CalibrationKind::Uncalib => None,
        }
    }

    fn sar_calibration_type(self) -> Option<&'static str> {
        self.loader_type().map(CalibrationType::sar_calibration_type)
    }
}

/// Real-valued vs. complex sample family (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFamily {
    Complex,
    MagnitudeDetected,
}

/// One opened RCM product bundle.
pub struct Product {
    width: u32,
    height: u32,
    sample_family: SampleFamily,
    bits_per_sample: u32,
    calibration: CalibrationKind,
    polarizations: Vec<String>,
    packaging: Packaging,
    geotransform: Option<GeoTransform>,
    geotransform_valid: bool,
    gcps: Vec<Gcp>,
    rpc: Option<Vec<(String, String)>>,
    metadata: MetadataDict,
    incidence_angle: Option<Vec<f64>>,
    bands: Vec<Band>,
}

impl Product {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample_family(&self) -> SampleFamily {
        self.sample_family
    }

    pub fn bits_per_sample(&self) -> u32 {
        self.bits_per_sample
    }

    pub fn calibration(&self) -> CalibrationKind {
        self.calibration
    }

    pub fn polarizations(&self) -> &[String] {
        &self.polarizations
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn bands_mut(&mut self) -> &mut [Band] {
        &mut self.bands
    }

    /// `Some(gt)` and `true` iff the geotransform was both computable and
    /// validated against the reported BR corner (§4.4, §8 scenario 6).
    pub fn geo_transform(&self) -> Option<&GeoTransform> {
        self.geotransform_valid.then_some(self.geotransform.as_ref()).flatten()
    }

    pub fn gcps(&self) -> &[Gcp] {
        &self.gcps
    }

    pub fn metadata(&self) -> &MetadataDict {
        &self.metadata
    }

    /// The dense per-column incidence-angle table, if `calibration/<incidenceAngleFileName>.xml`
    /// was present and parsed successfully (§3, §6 — best-effort, never a reason to fail `Open`).
    pub fn incidence_angle(&self) -> Option<&[f64]> {
        self.incidence_angle.as_deref()
    }

    /// Narrow band `band_number`'s LUT to `[offset, offset + width)` (§4.5
    /// partial-LUT operation), re-publishing `LUT_SIZE_{band_number}` /
    /// `LUT_GAINS_{band_number}` so they stay consistent with the narrowed
    /// table (§8: `metadata["LUT_SIZE_" ++ b] == length(LUT(b))`). A no-op on
    /// a raw band. `band_number` is 1-based, matching the metadata keys
    /// published at assembly time.
    pub fn narrow_band_lut(&mut self, band_number: usize, offset: usize, width: usize) -> Result<()> {
        let index = band_number
            .checked_sub(1)
            .ok_or_else(|| RcmError::Unsupported("band numbers start at 1".into()))?;
        let band = self
            .bands
            .get_mut(index)
            .ok_or_else(|| RcmError::Unsupported(format!("no band numbered {band_number}")))?;
        band.narrow_lut(offset, width);
        publish_band_metadata(&mut self.metadata, band_number, band.kind());
        Ok(())
    }

    /// Band-assembly engine entry point (§4.5), invoked by [`crate::driver`]
    /// once the descriptor has been parsed.
    pub(crate) fn assemble(descriptor: ProductDescriptor, calibration: CalibrationKind) -> Result<Product> {
        if calibration != CalibrationKind::None
            && calibration != CalibrationKind::Uncalib
            && !descriptor.calibration_available
        {
            return Err(RcmError::Unsupported(
                "calibration is not available for this product type".into(),
            ));
        }

        let mut bands = Vec::with_capacity(descriptor.polarizations.len());
        let mut metadata = descriptor.metadata.clone();

        for polarization in &descriptor.polarizations {
            let image_path = match locate_image_file(&descriptor, polarization) {
                Some(path) => path,
                None => {
                    return Err(RcmError::MissingSibling {
                        kind: "image",
                        path: descriptor.product_dir.join(format!("<{polarization}>")),
                    })
                }
            };

            let source = gdal::Dataset::open(&image_path)?;
            let raster_count = source.raster_count();
            if raster_count == 0 {
                debug!("'{}': zero bands, skipping polarization {polarization}", image_path.display());
                continue;
            }

            let is_nitf = image_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("ntf"))
                .unwrap_or(false);

            let mut band_types = Vec::with_capacity(raster_count as usize);
            for i in 1..=raster_count {
                let native = source.rasterband(i as isize)?.band_type();
                match ElementType::from_gdal_type(native) {
                    Some(elem) => band_types.push(elem),
                    None => {
                        return Err(RcmError::IncompatibleBandFile { polarization: polarization.clone() })
                    }
                }
            }

            let outcome = band_prober::probe(descriptor.element_type, &band_types, is_nitf);
            let mapping = match outcome {
                ProbeOutcome::BandError => {
                    return Err(RcmError::IncompatibleBandFile { polarization: polarization.clone() })
                }
                other => other.into_mapping().expect("BandError already handled above"),
            };

            let band_number = bands.len() + 1;

            let kind = if matches!(calibration, CalibrationKind::None | CalibrationKind::Uncalib) {
                BandKind::Raw { element_type: descriptor.element_type }
            } else {
                build_calibrated_kind(&descriptor, polarization, calibration, descriptor.width as usize)?
            };

            publish_band_metadata(&mut metadata, band_number, &kind);

            bands.push(Band {
                polarization: polarization.clone(),
                mapping,
                source,
                source_band_index: 1,
                is_nitf: is_nitf && matches!(mapping, BandMapping::TwoBandComplex),
                kind,
            });
        }

        if calibration == CalibrationKind::None {
            publish_subdataset_list(&mut metadata, &descriptor);
        }

        metadata.set("LUT_APPLIED", if calibration == CalibrationKind::None || calibration == CalibrationKind::Uncalib { "FALSE" } else { "TRUE" });
        metadata.set("PER_POLARIZATION_SCALING", "TRUE");

        if let Some(rpc) = &descriptor.rpc {
            for (key, value) in rpc {
                metadata.set_in("RPC", key, value);
            }
        }

        let incidence_angle = descriptor.incidence_angle_file.as_ref().and_then(|path| {
            match calibration::load_incidence_angle_table(path, descriptor.width as usize) {
                Ok(table) => Some(table),
                Err(err) => {
                    debug!("'{}': incidence-angle table not usable: {err}", path.display());
                    None
                }
            }
        });

        Ok(Product {
            width: descriptor.width,
            height: descriptor.height,
            sample_family: if descriptor.element_type.is_complex() { SampleFamily::Complex } else { SampleFamily::MagnitudeDetected },
            bits_per_sample: bits_per_sample_of(descriptor.element_type),
            calibration,
            polarizations: descriptor.polarizations,
            packaging: descriptor.packaging,
            geotransform: descriptor.geotransform,
            geotransform_valid: descriptor.geotransform_valid,
            gcps: descriptor.gcps,
            rpc: descriptor.rpc,
            metadata,
            incidence_angle,
            bands,
        })
    }
}

fn bits_per_sample_of(element_type: ElementType) -> u32 {
    match element_type {
        ElementType::CFloat32 => 32,
        ElementType::CInt16 => 16,
        ElementType::Float32 => 32,
        ElementType::UInt16 => 16,
        _ => 0,
    }
}

fn locate_image_file(descriptor: &ProductDescriptor, polarization: &str) -> Option<std::path::PathBuf> {
    match descriptor.packaging {
        Packaging::SingleNitf => descriptor.ipdf_entries.first().map(|e| e.path.clone()),
        Packaging::OnePerPolarization => descriptor
            .ipdf_entries
            .iter()
            .find(|e| e.pole.as_deref() == Some(polarization))
            .map(|e| e.path.clone()),
    }
}

fn build_calibrated_kind(
    descriptor: &ProductDescriptor,
    polarization: &str,
    calibration: CalibrationKind,
    raster_width: usize,
) -> Result<BandKind> {
    let sar_type = calibration
        .sar_calibration_type()
        .expect("build_calibrated_kind is only called for Sigma0/Beta0/Gamma");

    let lut_ref = descriptor
        .lut_files
        .iter()
        .find(|r| r.pole == polarization && r.sar_calibration_type == sar_type)
        .ok_or_else(|| RcmError::MissingSibling {
            kind: "lut",
            path: descriptor.product_dir.join(config::CALIBRATION_DIR),
        })?;
    let lut = calibration::load_lut(&lut_ref.path, raster_width)?;

    let noise = descriptor
        .noise_files
        .iter()
        .find(|r| r.pole == polarization)
        .and_then(|r| calibration::load_noise_table(&r.path, calibration.loader_type().unwrap(), raster_width).ok())
        .flatten();

    let reported_type = if descriptor.element_type.is_complex() { ElementType::CFloat32 } else { ElementType::Float32 };

    Ok(BandKind::Calibrated { reported_type, original_type: descriptor.element_type, lut, noise })
}

fn publish_band_metadata(metadata: &mut MetadataDict, band_number: usize, kind: &BandKind) {
    if let BandKind::Calibrated { lut, .. } = kind {
        metadata.set(format!("LUT_TYPE_{band_number}"), "GAIN");
        metadata.set(format!("LUT_SIZE_{band_number}"), lut.table.len().to_string());
        metadata.set(format!("LUT_OFFSET_{band_number}"), lut.offset.to_string());
        metadata.set(
            format!("LUT_GAINS_{band_number}"),
            lut.table.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(" "),
        );
    }
}

fn publish_subdataset_list(metadata: &mut MetadataDict, descriptor: &ProductDescriptor) {
    let views = [
        (1, "UNCALIB", CalibrationKind::Uncalib),
        (2, "SIGMA0", CalibrationKind::Sigma0),
        (3, "BETA0", CalibrationKind::Beta0),
        (4, "GAMMA", CalibrationKind::Gamma),
    ];
    for (k, tag, _) in views {
        let name = format!(
            "{}:{}:{}",
            config::SUBDATASET_PREFIX,
            tag,
            descriptor.product_dir.join(config::PRODUCT_XML).display()
        );
        metadata.set_in("SUBDATASETS", format!("SUBDATASET_{k}_NAME"), name);
        metadata.set_in("SUBDATASETS", format!("SUBDATASET_{k}_DESC"), format!("RCM {tag} calibration view"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdataset_tags_parse_case_insensitively_and_alias_gamma0() {
        assert_eq!(CalibrationKind::from_subdataset_tag("sigma0"), Some(CalibrationKind::Sigma0));
        assert_eq!(CalibrationKind::from_subdataset_tag("GAMMA0"), Some(CalibrationKind::Gamma));
        assert_eq!(CalibrationKind::from_subdataset_tag("bogus"), None);
    }
}
