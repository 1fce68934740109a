//! Component types - the scalar storage types of accessor data.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Error;

/// Scalar storage type of one accessor component.
///
/// Values are the WebGL enumerants used in the JSON document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum ComponentType {
    /// Signed 8-bit integer
    Byte = 5120,
    /// Unsigned 8-bit integer
    UnsignedByte = 5121,
    /// Signed 16-bit integer
    Short = 5122,
    /// Unsigned 16-bit integer
    UnsignedShort = 5123,
    /// Unsigned 32-bit integer
    UnsignedInt = 5125,
    /// 32-bit IEEE 754 float
    Float = 5126,
}

impl ComponentType {
    /// All component types in enumerant order.
    pub const ALL: [Self; 6] = [
        Self::Byte,
        Self::UnsignedByte,
        Self::Short,
        Self::UnsignedShort,
        Self::UnsignedInt,
        Self::Float,
    ];

    /// Size in bytes of a single component.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }

    /// Name as used in the glTF documentation.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::UnsignedByte => "UNSIGNED_BYTE",
            Self::Short => "SHORT",
            Self::UnsignedShort => "UNSIGNED_SHORT",
            Self::UnsignedInt => "UNSIGNED_INT",
            Self::Float => "FLOAT",
        }
    }

    /// Convert from the JSON enumerant.
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }

    /// Returns true for the integer types.
    #[inline]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float)
    }

    /// Returns true for the unsigned integer types (the only ones valid for indices).
    #[inline]
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(self, Self::UnsignedByte | Self::UnsignedShort | Self::UnsignedInt)
    }

    /// Largest representable magnitude, used as the normalization divisor.
    #[inline]
    pub const fn max_magnitude(self) -> f64 {
        match self {
            Self::Byte => i8::MAX as f64,
            Self::UnsignedByte => u8::MAX as f64,
            Self::Short => i16::MAX as f64,
            Self::UnsignedShort => u16::MAX as f64,
            Self::UnsignedInt => u32::MAX as f64,
            Self::Float => 1.0,
        }
    }

    /// Smallest unsigned type able to hold `max_value`.
    pub const fn smallest_index_type(max_value: u32) -> Self {
        if max_value <= u8::MAX as u32 {
            Self::UnsignedByte
        } else if max_value <= u16::MAX as u32 {
            Self::UnsignedShort
        } else {
            Self::UnsignedInt
        }
    }
}

impl TryFrom<u32> for ComponentType {
    type Error = Error;

    fn try_from(v: u32) -> Result<Self, Error> {
        Self::from_u32(v).ok_or(Error::InvalidComponentType { value: v, context: "componentType" })
    }
}

impl From<ComponentType> for u32 {
    fn from(c: ComponentType) -> Self {
        c as u32
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_sizes() {
        assert_eq!(ComponentType::Byte.num_bytes(), 1);
        assert_eq!(ComponentType::UnsignedByte.num_bytes(), 1);
        assert_eq!(ComponentType::Short.num_bytes(), 2);
        assert_eq!(ComponentType::UnsignedShort.num_bytes(), 2);
        assert_eq!(ComponentType::UnsignedInt.num_bytes(), 4);
        assert_eq!(ComponentType::Float.num_bytes(), 4);
    }

    #[test]
    fn test_component_enumerants() {
        for c in ComponentType::ALL {
            assert_eq!(ComponentType::from_u32(c as u32), Some(c));
        }
        // 5124 (INT) is not a valid glTF component type
        assert_eq!(ComponentType::from_u32(5124), None);
        assert!(ComponentType::try_from(5124).is_err());
    }

    #[test]
    fn test_component_json() {
        let c: ComponentType = serde_json::from_str("5123").unwrap();
        assert_eq!(c, ComponentType::UnsignedShort);
        assert_eq!(serde_json::to_string(&ComponentType::Float).unwrap(), "5126");
        assert!(serde_json::from_str::<ComponentType>("1").is_err());
    }

    #[test]
    fn test_smallest_index_type() {
        assert_eq!(ComponentType::smallest_index_type(0), ComponentType::UnsignedByte);
        assert_eq!(ComponentType::smallest_index_type(255), ComponentType::UnsignedByte);
        assert_eq!(ComponentType::smallest_index_type(256), ComponentType::UnsignedShort);
        assert_eq!(ComponentType::smallest_index_type(65535), ComponentType::UnsignedShort);
        assert_eq!(ComponentType::smallest_index_type(65536), ComponentType::UnsignedInt);
    }
}
