//! Ground control points (§4.4, `geographicInformation.geolocationGrid`).
//!
//! A thin data-only counterpart to the teacher's `Dataset::gcp_spatial_ref`
//! (`gcp.rs`): RCM ships its own inline GCP grid in `product.xml` rather than
//! delegating to `GDALGetGCPs`, so this module is a parser, not an FFI call.

use roxmltree::Node;

use crate::xml;

/// A single ground control point: pixel/line raster position mapped to a
/// geodetic (lon, lat, height) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gcp {
    pub pixel: f64,
    pub line: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

/// Parse every `geolocationGridPoint` under `geolocationGrid`, skipping any
/// point missing a required field rather than failing the whole open — GCPs
/// are a best-effort extra per §4.4.
pub(crate) fn parse_geolocation_grid(geolocation_grid: Node) -> Vec<Gcp> {
    xml::children(geolocation_grid, "geolocationGridPoint")
        .filter_map(parse_point)
        .collect()
}

fn parse_point(point: Node) -> Option<Gcp> {
    let image_coordinate = xml::child(point, "imageCoordinate")?;
    let geodetic_coordinate = xml::child(point, "geodeticCoordinate")?;

    Some(Gcp {
        pixel: xml::optional_text(image_coordinate, "pixel")?.parse().ok()?,
        line: xml::optional_text(image_coordinate, "line")?.parse().ok()?,
        longitude: xml::optional_text(geodetic_coordinate, "longitude")?.parse().ok()?,
        latitude: xml::optional_text(geodetic_coordinate, "latitude")?.parse().ok()?,
        height: xml::optional_text(geodetic_coordinate, "height")?.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_grid_points() {
        let doc = roxmltree::Document::parse(
            "<geolocationGrid>\
               <geolocationGridPoint>\
                 <imageCoordinate><pixel>0</pixel><line>0</line></imageCoordinate>\
                 <geodeticCoordinate><latitude>45.0</latitude><longitude>-75.0</longitude><height>12.0</height></geodeticCoordinate>\
               </geolocationGridPoint>\
               <geolocationGridPoint>\
                 <imageCoordinate><pixel>100</pixel><line>0</line></imageCoordinate>\
                 <geodeticCoordinate><latitude>45.1</latitude><longitude>-75.1</longitude><height>10.0</height></geodeticCoordinate>\
               </geolocationGridPoint>\
             </geolocationGrid>",
        )
        .unwrap();
        let points = parse_geolocation_grid(doc.root_element());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 45.0);
        assert_eq!(points[1].pixel, 100.0);
    }

    #[test]
    fn skips_points_missing_required_fields() {
        let doc = roxmltree::Document::parse(
            "<geolocationGrid>\
               <geolocationGridPoint>\
                 <imageCoordinate><pixel>0</pixel><line>0</line></imageCoordinate>\
               </geolocationGridPoint>\
             </geolocationGrid>",
        )
        .unwrap();
        assert!(parse_geolocation_grid(doc.root_element()).is_empty());
    }
}
