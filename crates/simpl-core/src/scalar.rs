//! Scalar element types
//!
//! The closed set of primitive element types an attribute array can hold,
//! together with the type-name table used to persist a chosen type in
//! pipeline files. Tag values and names must stay bit-exact with existing
//! pipelines.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SimplError;

/// Element type of a typed attribute array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum ScalarType {
    Int8 = 0,
    UInt8 = 1,
    Int16 = 2,
    UInt16 = 3,
    Int32 = 4,
    UInt32 = 5,
    Int64 = 6,
    UInt64 = 7,
    Float = 8,
    Double = 9,
    Bool = 10,
    SizeT = 11,
}

impl ScalarType {
    /// All scalar types in tag order
    pub const ALL: [ScalarType; 12] = [
        ScalarType::Int8,
        ScalarType::UInt8,
        ScalarType::Int16,
        ScalarType::UInt16,
        ScalarType::Int32,
        ScalarType::UInt32,
        ScalarType::Int64,
        ScalarType::UInt64,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Bool,
        ScalarType::SizeT,
    ];

    /// Order in which dispatch resolves an array's element type.
    ///
    /// Floating point first, signed before unsigned at each width, bool and
    /// size-width last.
    pub const PROBE_ORDER: [ScalarType; 12] = [
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Int8,
        ScalarType::UInt8,
        ScalarType::Int16,
        ScalarType::UInt16,
        ScalarType::Int32,
        ScalarType::UInt32,
        ScalarType::Int64,
        ScalarType::UInt64,
        ScalarType::Bool,
        ScalarType::SizeT,
    ];

    /// Tag persisted for "no known type"; never accepted by [`ScalarType::from_tag`]
    pub const UNKNOWN_TAG: i32 = 12;

    /// Integer tag as stored in pipeline files
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Look up a scalar type by its integer tag
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }

    /// Type name as used in pipeline files (`int8_t`, `float`, ...)
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Int8 => "int8_t",
            ScalarType::UInt8 => "uint8_t",
            ScalarType::Int16 => "int16_t",
            ScalarType::UInt16 => "uint16_t",
            ScalarType::Int32 => "int32_t",
            ScalarType::UInt32 => "uint32_t",
            ScalarType::Int64 => "int64_t",
            ScalarType::UInt64 => "uint64_t",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Bool => "bool",
            ScalarType::SizeT => "size_t",
        }
    }

    /// Human-readable name shown when picking a numeric output type
    pub fn numeric_name(self) -> &'static str {
        match self {
            ScalarType::Int8 => "signed int 8 bit",
            ScalarType::UInt8 => "unsigned int 8 bit",
            ScalarType::Int16 => "signed int 16 bit",
            ScalarType::UInt16 => "unsigned int 16 bit",
            ScalarType::Int32 => "signed int 32 bit",
            ScalarType::UInt32 => "unsigned int 32 bit",
            ScalarType::Int64 => "signed int 64 bit",
            ScalarType::UInt64 => "unsigned int 64 bit",
            ScalarType::Float => "Float 32 bit",
            ScalarType::Double => "Double 64 bit",
            ScalarType::Bool => "Bool",
            ScalarType::SizeT => "size_t",
        }
    }

    /// Look up a scalar type by its type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Look up a scalar type by its numeric display name
    pub fn from_numeric_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.numeric_name() == name)
    }

    /// Size in bytes of a single element
    pub fn element_size(self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::UInt8 | ScalarType::Bool => 1,
            ScalarType::Int16 | ScalarType::UInt16 => 2,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float => 4,
            ScalarType::Int64 | ScalarType::UInt64 | ScalarType::Double => 8,
            ScalarType::SizeT => std::mem::size_of::<usize>(),
        }
    }

    /// Check if this is an integer type (bool excluded)
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            ScalarType::Float | ScalarType::Double | ScalarType::Bool
        )
    }

    /// Check if this is a floating point type
    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Double)
    }

    /// Check if this is a signed type
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarType::Int8
                | ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float
                | ScalarType::Double
        )
    }

    /// Comma separated list of supported type names, for error messages
    pub fn supported_type_list() -> String {
        let order = [
            ScalarType::Bool,
            ScalarType::Int8,
            ScalarType::UInt8,
            ScalarType::Int16,
            ScalarType::UInt16,
            ScalarType::Int32,
            ScalarType::UInt32,
            ScalarType::Int64,
            ScalarType::UInt64,
            ScalarType::Float,
            ScalarType::Double,
            ScalarType::SizeT,
        ];
        order.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = SimplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .or_else(|| Self::from_numeric_name(s))
            .ok_or_else(|| SimplError::UnknownTypeName(s.to_string()))
    }
}

impl TryFrom<i32> for ScalarType {
    type Error = SimplError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or(SimplError::UnknownTypeTag(tag))
    }
}

impl Serialize for ScalarType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ScalarType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarTypeVisitor)
    }
}

/// Accepts either the type name or the integer tag
struct ScalarTypeVisitor;

impl<'de> Visitor<'de> for ScalarTypeVisitor {
    type Value = ScalarType;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a scalar type name or an integer tag in 0..=11")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        i32::try_from(v)
            .ok()
            .and_then(ScalarType::from_tag)
            .ok_or_else(|| E::custom(format!("unknown scalar type tag {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i32::try_from(v)
            .ok()
            .and_then(ScalarType::from_tag)
            .ok_or_else(|| E::custom(format!("unknown scalar type tag {}", v)))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A primitive type that can be stored in a [`DataArray`](crate::DataArray).
///
/// Implemented for exactly the closed set of [`ScalarType`]s and sealed so
/// the set cannot grow outside this crate.
pub trait Element:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static + sealed::Sealed
{
    /// Tag for this element type
    const SCALAR_TYPE: ScalarType;

    /// Lowest representable value, as f64
    const LOWEST: f64;

    /// Highest representable value, as f64
    const HIGHEST: f64;

    /// Smallest positive value (normal minimum for floats, 1 otherwise)
    const SMALLEST_POSITIVE: f64;

    /// Convert from f64 with `as`-cast semantics (saturating for integers,
    /// any non-zero value is `true` for bool)
    fn from_f64(value: f64) -> Self;

    /// Widen to f64
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric_element {
    ($ty:ty, $variant:ident, $smallest:expr) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;
            const LOWEST: f64 = <$ty>::MIN as f64;
            const HIGHEST: f64 = <$ty>::MAX as f64;
            const SMALLEST_POSITIVE: f64 = $smallest;

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_numeric_element!(f32, Float, f32::MIN_POSITIVE as f64);
impl_numeric_element!(f64, Double, f64::MIN_POSITIVE);
impl_numeric_element!(i8, Int8, 1.0);
impl_numeric_element!(u8, UInt8, 1.0);
impl_numeric_element!(i16, Int16, 1.0);
impl_numeric_element!(u16, UInt16, 1.0);
impl_numeric_element!(i32, Int32, 1.0);
impl_numeric_element!(u32, UInt32, 1.0);
impl_numeric_element!(i64, Int64, 1.0);
impl_numeric_element!(u64, UInt64, 1.0);
impl_numeric_element!(usize, SizeT, 1.0);

impl sealed::Sealed for bool {}

impl Element for bool {
    const SCALAR_TYPE: ScalarType = ScalarType::Bool;
    const LOWEST: f64 = 0.0;
    const HIGHEST: f64 = 1.0;
    const SMALLEST_POSITIVE: f64 = 1.0;

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}
