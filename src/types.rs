//! Reported and native element types (§3, §4.3).
//!
//! Generalizes the teacher's `GdalType`/`GDALDataType::Type` pairing
//! (`raster/types.rs`) from "one Rust numeric type maps to one GDAL
//! constant" to the nine element types this driver's descriptor and band
//! prober reason about, including the four complex variants GDAL itself
//! supports (`GDT_CInt16`, `GDT_CInt32`, `GDT_CFloat32`, `GDT_CFloat64`).

use gdal_sys::GDALDataType;

/// An element type as reported to callers or found in an underlying file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Byte,
    UInt16,
    Int16,
    CInt16,
    CInt32,
    CFloat32,
    CFloat64,
    Float32,
    Float64,
}

impl ElementType {
    /// GDAL's native data-type constant for this element type.
    pub(crate) fn gdal_type(self) -> GDALDataType::Type {
        match self {
            ElementType::Byte => GDALDataType::GDT_Byte,
            ElementType::UInt16 => GDALDataType::GDT_UInt16,
            ElementType::Int16 => GDALDataType::GDT_Int16,
            ElementType::CInt16 => GDALDataType::GDT_CInt16,
            ElementType::CInt32 => GDALDataType::GDT_CInt32,
            ElementType::CFloat32 => GDALDataType::GDT_CFloat32,
            ElementType::CFloat64 => GDALDataType::GDT_CFloat64,
            ElementType::Float32 => GDALDataType::GDT_Float32,
            ElementType::Float64 => GDALDataType::GDT_Float64,
        }
    }

    pub(crate) fn from_gdal_type(value: GDALDataType::Type) -> Option<ElementType> {
        match value {
            x if x == GDALDataType::GDT_Byte => Some(ElementType::Byte),
            x if x == GDALDataType::GDT_UInt16 => Some(ElementType::UInt16),
            x if x == GDALDataType::GDT_Int16 => Some(ElementType::Int16),
            x if x == GDALDataType::GDT_CInt16 => Some(ElementType::CInt16),
            x if x == GDALDataType::GDT_CInt32 => Some(ElementType::CInt32),
            x if x == GDALDataType::GDT_CFloat32 => Some(ElementType::CFloat32),
            x if x == GDALDataType::GDT_CFloat64 => Some(ElementType::CFloat64),
            x if x == GDALDataType::GDT_Float32 => Some(ElementType::Float32),
            x if x == GDALDataType::GDT_Float64 => Some(ElementType::Float64),
            _ => None,
        }
    }

    pub fn is_complex(self) -> bool {
        matches!(
            self,
            ElementType::CInt16 | ElementType::CInt32 | ElementType::CFloat32 | ElementType::CFloat64
        )
    }

    /// The real element type of each half of a complex pair, per §4.3's
    /// `Int16+Int16 ↔ CInt16` / `Float32+Float32 ↔ CFloat32` table.
    pub(crate) fn real_half(self) -> Option<ElementType> {
        match self {
            ElementType::CInt16 => Some(ElementType::Int16),
            ElementType::CFloat32 => Some(ElementType::Float32),
            ElementType::CFloat64 => Some(ElementType::Float64),
            // CInt32 has no matching real element type in this driver's table
            // of reported types (no plain Int32 variant is ever reported).
            ElementType::CInt32 => None,
            _ => None,
        }
    }
}
