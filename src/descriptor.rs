//! Product descriptor parser (§4.4): turns `product.xml` into the
//! geometry, sample typing, polarization/packaging layout, geotransform,
//! GCPs, RPC coefficients and best-effort metadata a [`crate::dataset::Product`]
//! is assembled from.

use std::path::{Path, PathBuf};

use log::warn;

use crate::config;
use crate::errors::{RcmError, Result};
use crate::gcp::{self, Gcp};
use crate::geo_transform::{self, Corner, GeoTransform};
use crate::metadata::MetadataDict;
use crate::rpc;
use crate::types::ElementType;
use crate::xml;

/// How polarizations map onto underlying image files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Packaging {
    OnePerPolarization,
    SingleNitf,
}

/// One `ipdf` entry: an image file name, and the polarization it serves
/// (absent for a single-NITF bundle, where every polarization shares one file).
#[derive(Debug, Clone)]
pub(crate) struct IpdfEntry {
    pub path: PathBuf,
    pub pole: Option<String>,
}

/// A `lookupTableFileName` reference: which polarization and calibration
/// kind it serves, and the resolved path under `calibration/`.
#[derive(Debug, Clone)]
pub(crate) struct LutFileRef {
    pub pole: String,
    pub sar_calibration_type: String,
    pub path: PathBuf,
}

/// A `noiseLevelFileName` reference for one polarization.
#[derive(Debug, Clone)]
pub(crate) struct NoiseFileRef {
    pub pole: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub(crate) struct ProductDescriptor {
    pub width: u32,
    pub height: u32,
    pub element_type: ElementType,
    pub calibration_available: bool,
    pub polarizations: Vec<String>,
    pub packaging: Packaging,
    pub ipdf_entries: Vec<IpdfEntry>,
    pub lut_files: Vec<LutFileRef>,
    pub noise_files: Vec<NoiseFileRef>,
    pub product_dir: PathBuf,
    pub geotransform: Option<GeoTransform>,
    pub geotransform_valid: bool,
    pub gcps: Vec<Gcp>,
    pub rpc: Option<Vec<(String, String)>>,
    pub incidence_angle_file: Option<PathBuf>,
    pub metadata: MetadataDict,
}

/// Parse `xml_path` (the resolved path to `product.xml`) into a [`ProductDescriptor`].
pub(crate) fn parse(xml_path: &Path) -> Result<ProductDescriptor> {
    let text = std::fs::read_to_string(xml_path)
        .map_err(|_| RcmError::NotRecognized(xml_path.to_path_buf()))?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|source| RcmError::MalformedXml { path: xml_path.to_path_buf(), source })?;
    let root = doc.root_element();

    if !has_rcm_namespace(root) {
        return Err(RcmError::NotRecognized(xml_path.to_path_buf()));
    }

    let product_dir = xml_path
        .parent()
        .and_then(|p| if p.ends_with(config::METADATA_DIR) { p.parent() } else { Some(p) })
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let scene = xml::path(root, "sceneAttributes").ok_or_else(|| RcmError::MissingNode {
        path: xml_path.to_path_buf(),
        node: "sceneAttributes".into(),
    })?;
    let image_attributes = xml::child(scene, "imageAttributes").ok_or_else(|| RcmError::MissingNode {
        path: xml_path.to_path_buf(),
        node: "sceneAttributes.imageAttributes".into(),
    })?;

    let number_of_entries: u32 = xml::required_parsed(scene, "numberOfEntries")?;
    if number_of_entries != 1 {
        return Err(RcmError::Unsupported(format!(
            "only single scene-entry acquisitions are supported, found {number_of_entries}"
        )));
    }

    let width: u32 = xml::required_parsed(image_attributes, "samplesPerLine")?;
    let height: u32 = xml::required_parsed(image_attributes, "numLines")?;
    if width <= 1 || height <= 1 {
        return Err(RcmError::BadGeometry(format!("raster size {width}x{height} too small")));
    }

    let sample_type = xml::required_text(image_attributes, "sampleType")?;
    let bits_per_sample: u32 = xml::required_parsed(image_attributes, "bitsPerSample")?;
    let element_type = match (sample_type.as_str(), bits_per_sample) {
        ("Complex", 32) => ElementType::CFloat32,
        ("Complex", 16) => ElementType::CInt16,
        ("Magnitude Detected", 32) => ElementType::Float32,
        ("Magnitude Detected", 16) => ElementType::UInt16,
        _ => {
            return Err(RcmError::Unsupported(format!(
                "unsupported sampleType/bitsPerSample combination: '{sample_type}'/{bits_per_sample}"
            )))
        }
    };

    let product_type = xml::optional_descendant_text(root, "productType").unwrap_or_default();
    let calibration_available = {
        let prefix: String = product_type.chars().take(3).collect();
        !matches!(prefix.as_str(), "UNK" | "GCD" | "GCC")
    };

    let polarizations: Vec<String> = xml::optional_descendant_text(root, "polarizations")
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let (packaging, ipdf_entries) = parse_ipdf_entries(image_attributes, &product_dir);

    let mut metadata = MetadataDict::new();
    metadata.set("PRODUCT_TYPE", &product_type);
    metadata.set("POLARIZATIONS", polarizations.join(" "));
    metadata.set("SAMPLE_TYPE", &sample_type);
    metadata.set("BITS_PER_SAMPLE", bits_per_sample.to_string());
    metadata.set(
        "DATA_TYPE",
        match element_type {
            ElementType::CFloat32 => "CFloat32",
            ElementType::CInt16 => "CInt16",
            ElementType::Float32 => "Float32",
            ElementType::UInt16 => "UInt16",
            _ => "Unknown",
        },
    );

    if let Some(v) = xml::optional_descendant_text(root, "productId") {
        metadata.set("PRODUCT_ID", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "satellite") {
        metadata.set("SATELLITE_IDENTIFIER", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "sensorId") {
        metadata.set("SENSOR_IDENTIFIER", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "rawDataStartTime") {
        metadata.set("ACQUISITION_START_TIME", normalize_timestamp(&v));
    }
    if let Some(v) = xml::optional_descendant_text(root, "beamMode") {
        metadata.set("BEAM_MODE", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "orbitDirection") {
        metadata.set("ORBIT_DIRECTION", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "sampledPixelSpacing") {
        metadata.set("PIXEL_SPACING", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "sampledLineSpacing") {
        metadata.set("LINE_SPACING", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "incidenceAngleNearRange") {
        metadata.set("NEAR_RANGE_INCIDENCE_ANGLE", v);
    }
    if let Some(v) = xml::optional_descendant_text(root, "incidenceAngleFarRange") {
        metadata.set("FAR_RANGE_INCIDENCE_ANGLE", v);
    }

    let ellipsoid_name = xml::optional_descendant_text(root, "ellipsoidName");
    let semi_major = xml::optional_descendant_text(root, "semiMajorAxis");
    let semi_minor = xml::optional_descendant_text(root, "semiMinorAxis");
    match (&ellipsoid_name, &semi_major, &semi_minor) {
        (Some(name), Some(major), Some(minor)) => {
            metadata.set("ELLIPSOID_NAME", name);
            metadata.set("ELLIPSOID_SEMI_MAJOR", major);
            metadata.set("ELLIPSOID_SEMI_MINOR", minor);
        }
        (None, None, None) => {
            warn!("'{}': no ellipsoid information, falling back to WGS84", xml_path.display());
            metadata.set("ELLIPSOID_NAME", "WGS84");
            metadata.set("ELLIPSOID_SEMI_MAJOR", "6378137.0");
            metadata.set("ELLIPSOID_SEMI_MINOR", "6356752.314245");
        }
        _ => {
            warn!("'{}': incomplete ellipsoid information, falling back to WGS84", xml_path.display());
            metadata.set("ELLIPSOID_NAME", "WGS84");
            metadata.set("ELLIPSOID_SEMI_MAJOR", "6378137.0");
            metadata.set("ELLIPSOID_SEMI_MINOR", "6356752.314245");
        }
    }

    if let Some(v) = xml::optional_descendant_text(root, "mapProjDescriptor") {
        metadata.set("MAP_PROJECTION_DESCRIPTOR", v);
    }

    let (geotransform, geotransform_valid) = parse_geotransform(root, width, height, xml_path);

    let gcps = xml::descendant(root, "geolocationGrid")
        .map(gcp::parse_geolocation_grid)
        .unwrap_or_default();

    let rpc = xml::descendant(root, "rationalFunctions").and_then(rpc::parse_rational_functions);

    let incidence_angle_file = xml::optional_descendant_text(root, "incidenceAngleFileName")
        .map(|name| product_dir.join(config::CALIBRATION_DIR).join(config::normalize_separators(&name)));

    let lut_files = root
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name("lookupTableFileName"))
        .filter_map(|n| {
            let pole = n.attribute("pole")?.to_string();
            let sar_type = n.attribute("sarCalibrationType")?.to_string();
            let filename = xml::text(n);
            Some(LutFileRef { pole, sar_calibration_type: sar_type, path: product_dir.join(config::CALIBRATION_DIR).join(config::normalize_separators(&filename)) })
        })
        .collect();

    let noise_files = root
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name("noiseLevelFileName"))
        .filter_map(|n| {
            let pole = n.attribute("pole")?.to_string();
            let filename = xml::text(n);
            Some(NoiseFileRef { pole, path: product_dir.join(config::CALIBRATION_DIR).join(config::normalize_separators(&filename)) })
        })
        .collect();

    Ok(ProductDescriptor {
        width,
        height,
        element_type,
        calibration_available,
        polarizations,
        packaging,
        ipdf_entries,
        lut_files,
        noise_files,
        product_dir,
        geotransform,
        geotransform_valid,
        gcps,
        rpc,
        incidence_angle_file,
        metadata,
    })
}

/// Re-render `raw` as RFC 3339 if it parses as one, passing it through
/// unchanged otherwise — RCM's `rawDataStartTime` is already RFC 3339 in
/// practice, but callers should see a stable format rather than whatever the
/// producing ground station happened to emit.
fn normalize_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
        .unwrap_or_else(|_| raw.to_string())
}

fn has_rcm_namespace(root: roxmltree::Node) -> bool {
    if root.tag_name().name() != "product" {
        return false;
    }
    root.tag_name()
        .namespace()
        .map(|ns| ns.to_lowercase().contains(config::NAMESPACE_MARKER))
        .unwrap_or(false)
}

fn parse_ipdf_entries(image_attributes: roxmltree::Node, product_dir: &Path) -> (Packaging, Vec<IpdfEntry>) {
    let entries: Vec<IpdfEntry> = xml::children(image_attributes, "ipdf")
        .map(|node| {
            let filename = xml::text(node);
            let pole = node.attribute("pole").map(str::to_string);
            IpdfEntry {
                path: product_dir.join(config::normalize_separators(&filename)),
                pole,
            }
        })
        .collect();

    let packaging = if entries.iter().any(|e| {
        e.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("ntf"))
            .unwrap_or(false)
    }) {
        Packaging::SingleNitf
    } else {
        Packaging::OnePerPolarization
    };

    (packaging, entries)
}

fn parse_geotransform(
    root: roxmltree::Node,
    width: u32,
    height: u32,
    xml_path: &Path,
) -> (Option<GeoTransform>, bool) {
    let Some(positioning) = xml::descendant(root, "positioningInformation") else {
        return (None, false);
    };

    let corner = |name: &str| -> Option<Corner> {
        let node = xml::child(positioning, name)?;
        Some(Corner {
            x: xml::optional_text(node, "longitude").or_else(|| xml::optional_text(node, "easting"))?.parse().ok()?,
            y: xml::optional_text(node, "latitude").or_else(|| xml::optional_text(node, "northing"))?.parse().ok()?,
        })
    };

    let (Some(ul), Some(ur), Some(bl), Some(br)) =
        (corner("upperLeft"), corner("upperRight"), corner("lowerLeft"), corner("lowerRight"))
    else {
        return (None, false);
    };

    let gt = geo_transform::from_corners(ul, ur, bl, width as usize, height as usize);
    if geo_transform::validates_against_br_corner(&gt, width as usize, height as usize, br) {
        (Some(gt), true)
    } else {
        warn!(
            "'{}': geotransform prediction diverges from reported BR corner by more than a quarter pixel",
            xml_path.display()
        );
        (Some(gt), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_product_xml(extra: &str) -> String {
        format!(
            "<product xmlns=\"http://www.example.com/rcm/1.0\">\
               <sceneAttributes>\
                 <numberOfEntries>1</numberOfEntries>\
                 <imageAttributes>\
                   <samplesPerLine>4</samplesPerLine>\
                   <numLines>1</numLines>\
                   <sampleType>Complex</sampleType>\
                   <bitsPerSample>32</bitsPerSample>\
                   <ipdf pole=\"HH\">image_HH.tif</ipdf>\
                 </imageAttributes>\
               </sceneAttributes>\
               <polarizations>HH</polarizations>\
               {extra}\
             </product>"
        )
    }

    fn write_and_parse(dir: &tempfile::TempDir, xml: &str) -> Result<ProductDescriptor> {
        let path = dir.path().join("product.xml");
        std::fs::write(&path, xml).unwrap();
        parse(&path)
    }

    #[test]
    fn parses_geometry_and_sample_type() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = write_and_parse(&dir, &minimal_product_xml("")).unwrap();
        assert_eq!(descriptor.width, 4);
        assert_eq!(descriptor.height, 1);
        assert_eq!(descriptor.element_type, ElementType::CFloat32);
        assert_eq!(descriptor.polarizations, vec!["HH"]);
        assert_eq!(descriptor.packaging, Packaging::OnePerPolarization);
    }

    #[test]
    fn rejects_namespace_missing_rcm_marker() {
        let dir = tempfile::tempdir().unwrap();
        let xml = "<product xmlns=\"http://www.example.com/other\">\
                     <sceneAttributes><numberOfEntries>1</numberOfEntries>\
                     <imageAttributes><samplesPerLine>4</samplesPerLine><numLines>4</numLines>\
                     <sampleType>Complex</sampleType><bitsPerSample>32</bitsPerSample>\
                     </imageAttributes></sceneAttributes></product>";
        let err = write_and_parse(&dir, xml).unwrap_err();
        assert!(matches!(err, RcmError::NotRecognized(_)));
    }

    #[test]
    fn rejects_multi_scene_entry_acquisitions() {
        let dir = tempfile::tempdir().unwrap();
        let xml = minimal_product_xml("").replace("<numberOfEntries>1</numberOfEntries>", "<numberOfEntries>2</numberOfEntries>");
        let err = write_and_parse(&dir, &xml).unwrap_err();
        assert!(matches!(err, RcmError::Unsupported(_)));
    }

    #[test]
    fn single_ntf_ipdf_is_single_nitf_packaging() {
        let dir = tempfile::tempdir().unwrap();
        let xml = minimal_product_xml("").replace("image_HH.tif", "image.NTF");
        let descriptor = write_and_parse(&dir, &xml).unwrap();
        assert_eq!(descriptor.packaging, Packaging::SingleNitf);
    }

    #[test]
    fn calibration_unavailable_for_unk_product_type() {
        let dir = tempfile::tempdir().unwrap();
        let xml = minimal_product_xml("<productType>UNK</productType>");
        let descriptor = write_and_parse(&dir, &xml).unwrap();
        assert!(!descriptor.calibration_available);
    }

    #[test]
    fn acquisition_timestamp_is_normalized_to_rfc3339() {
        let dir = tempfile::tempdir().unwrap();
        let xml = minimal_product_xml("<rawDataStartTime>2024-03-01T12:00:00.000000Z</rawDataStartTime>");
        let descriptor = write_and_parse(&dir, &xml).unwrap();
        assert_eq!(
            descriptor.metadata.item("ACQUISITION_START_TIME", ""),
            Some("2024-03-01T12:00:00.000000Z")
        );
    }

    #[test]
    fn unparseable_timestamp_passes_through_unchanged() {
        assert_eq!(normalize_timestamp("not-a-timestamp"), "not-a-timestamp");
    }

    #[test]
    fn missing_ellipsoid_falls_back_to_wgs84_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = write_and_parse(&dir, &minimal_product_xml("")).unwrap();
        assert_eq!(descriptor.metadata.item("ELLIPSOID_NAME", ""), Some("WGS84"));
    }
}
