//! Rational polynomial coefficients (§4.4, §6 `RPC` metadata domain).
//!
//! Best-effort: extraction failures here never abort `Open` (§7 propagation
//! policy), they simply mean the `RPC` domain stays empty.

use roxmltree::Node;

use crate::xml;

/// The sixteen RPC fields published in the `RPC` metadata domain, in the
/// order GDAL's own RPC metadata convention lists them.
const SCALAR_FIELDS: [(&str, &str); 10] = [
    ("lineOffset", "LINE_OFF"),
    ("sampOffset", "SAMP_OFF"),
    ("latOffset", "LAT_OFF"),
    ("longOffset", "LONG_OFF"),
    ("heightOffset", "HEIGHT_OFF"),
    ("lineScale", "LINE_SCALE"),
    ("sampScale", "SAMP_SCALE"),
    ("latScale", "LAT_SCALE"),
    ("longScale", "LONG_SCALE"),
    ("heightScale", "HEIGHT_SCALE"),
];

const COEFFICIENT_FIELDS: [(&str, &str); 4] = [
    ("lineNumCoef", "LINE_NUM_COEFF"),
    ("lineDenCoef", "LINE_DEN_COEFF"),
    ("sampNumCoef", "SAMP_NUM_COEFF"),
    ("sampDenCoef", "SAMP_DEN_COEFF"),
];

const BOUNDS_FIELDS: [(&str, &str); 2] = [("minLong", "MIN_LONG"), ("maxLong", "MAX_LONG")];

/// Parse `rationalFunctions` into the 16 `(RPC key, value)` pairs, or `None`
/// if any required scalar field is absent.
pub(crate) fn parse_rational_functions(node: Node) -> Option<Vec<(String, String)>> {
    let mut entries = Vec::with_capacity(16);

    for (xml_name, rpc_key) in SCALAR_FIELDS {
        entries.push((rpc_key.to_string(), xml::optional_text(node, xml_name)?));
    }
    for (xml_name, rpc_key) in COEFFICIENT_FIELDS {
        let coef_node = xml::child(node, xml_name)?;
        let values: Vec<String> = xml::children(coef_node, "coef").map(xml::text).collect();
        if values.is_empty() {
            return None;
        }
        entries.push((rpc_key.to_string(), values.join(" ")));
    }
    for (xml_name, rpc_key) in BOUNDS_FIELDS {
        if let Some(value) = xml::optional_text(node, xml_name) {
            entries.push((rpc_key.to_string(), value));
        }
    }

    Some(entries)
}
