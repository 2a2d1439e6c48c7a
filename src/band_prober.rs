//! Band-file prober (§4.3): classifies the mapping between an underlying
//! image file's native bands and the logical RCM band the caller asked for.

use crate::band::BandMapping;
use crate::types::ElementType;

/// Outcome of probing one image file against a requested element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeOutcome {
    Straight,
    TwoBandComplex,
    BandError,
}

impl ProbeOutcome {
    /// `None` on `BandError`; the band-assembly engine turns that into
    /// `IncompatibleBandFile` (§4.5 step 3).
    pub(crate) fn into_mapping(self) -> Option<BandMapping> {
        match self {
            ProbeOutcome::Straight => Some(BandMapping::Straight),
            ProbeOutcome::TwoBandComplex => Some(BandMapping::TwoBandComplex),
            ProbeOutcome::BandError => None,
        }
    }
}

/// Classify `band_types` (the native element type of each band the
/// underlying file exposes, in order) against `requested`.
///
/// `is_nitf` grants the escape hatch of §4.3: an NITF container that matches
/// no other rule is still accepted as `Straight`.
pub(crate) fn probe(
    requested: ElementType,
    band_types: &[ElementType],
    is_nitf: bool,
) -> ProbeOutcome {
    if matches!(band_types.len(), 1 | 4) && band_types[0] == requested {
        return ProbeOutcome::Straight;
    }

    if band_types.len() == 2 && band_types[0] == band_types[1] {
        let pair = band_types[0];
        if Some(pair) == requested.real_half() {
            return ProbeOutcome::TwoBandComplex;
        }
        // Documented quirk: some NITF packings hold two already-complex
        // bands at the requested complex precision instead of two reals.
        if requested.is_complex() && pair == requested {
            return ProbeOutcome::TwoBandComplex;
        }
    }

    if is_nitf {
        return ProbeOutcome::Straight;
    }

    ProbeOutcome::BandError
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_matching_band_is_straight() {
        let outcome = probe(ElementType::CFloat32, &[ElementType::CFloat32], false);
        assert_eq!(outcome, ProbeOutcome::Straight);
    }

    #[test]
    fn quad_band_file_is_straight_when_first_band_matches() {
        let outcome = probe(
            ElementType::UInt16,
            &[ElementType::UInt16; 4],
            false,
        );
        assert_eq!(outcome, ProbeOutcome::Straight);
    }

    #[test]
    fn two_real_bands_pair_as_complex() {
        let outcome = probe(
            ElementType::CFloat32,
            &[ElementType::Float32, ElementType::Float32],
            false,
        );
        assert_eq!(outcome, ProbeOutcome::TwoBandComplex);
    }

    #[test]
    fn two_complex_bands_at_matching_precision_pair_as_complex() {
        let outcome = probe(
            ElementType::CFloat32,
            &[ElementType::CFloat32, ElementType::CFloat32],
            false,
        );
        assert_eq!(outcome, ProbeOutcome::TwoBandComplex);
    }

    #[test]
    fn nitf_escape_hatch_accepts_otherwise_unmatched_files() {
        let outcome = probe(ElementType::CFloat32, &[ElementType::Byte], true);
        assert_eq!(outcome, ProbeOutcome::Straight);
    }

    #[test]
    fn non_nitf_mismatch_is_band_error() {
        let outcome = probe(ElementType::CFloat32, &[ElementType::Byte], false);
        assert_eq!(outcome, ProbeOutcome::BandError);
    }
}
