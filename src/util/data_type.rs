//! AccessorType (tensor shape) and DataType (component type + shape).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ComponentType;

/// Tensor shape of one accessor element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessorType {
    #[serde(rename = "SCALAR")]
    Scalar,
    #[serde(rename = "VEC2")]
    Vec2,
    #[serde(rename = "VEC3")]
    Vec3,
    #[serde(rename = "VEC4")]
    Vec4,
    #[serde(rename = "MAT2")]
    Mat2,
    #[serde(rename = "MAT3")]
    Mat3,
    #[serde(rename = "MAT4")]
    Mat4,
}

impl AccessorType {
    /// Number of components in one element.
    #[inline]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Name as written in JSON.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Vector shape holding `n` components, if one exists.
    pub const fn vector(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Scalar),
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }
}

impl fmt::Display for AccessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// DataType describes how an accessor element is stored.
///
/// It combines a [`ComponentType`] with an [`AccessorType`].
/// For example, a position is `Float` with shape `Vec3`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// Scalar storage type
    pub component: ComponentType,
    /// Tensor shape
    pub shape: AccessorType,
}

impl DataType {
    /// Create a new DataType.
    #[inline]
    pub const fn new(component: ComponentType, shape: AccessorType) -> Self {
        Self { component, shape }
    }

    /// Number of components per element.
    #[inline]
    pub const fn num_components(&self) -> usize {
        self.shape.num_components()
    }

    /// Returns the total size in bytes for one element.
    #[inline]
    pub const fn num_bytes(&self) -> usize {
        self.component.num_bytes() * self.shape.num_components()
    }

    pub const FLOAT: Self = Self::new(ComponentType::Float, AccessorType::Scalar);
    pub const VEC2F: Self = Self::new(ComponentType::Float, AccessorType::Vec2);
    pub const VEC3F: Self = Self::new(ComponentType::Float, AccessorType::Vec3);
    pub const VEC4F: Self = Self::new(ComponentType::Float, AccessorType::Vec4);
    pub const MAT4F: Self = Self::new(ComponentType::Float, AccessorType::Mat4);
    pub const UINT8: Self = Self::new(ComponentType::UnsignedByte, AccessorType::Scalar);
    pub const UINT16: Self = Self::new(ComponentType::UnsignedShort, AccessorType::Scalar);
    pub const UINT32: Self = Self::new(ComponentType::UnsignedInt, AccessorType::Scalar);
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shape == AccessorType::Scalar {
            write!(f, "{}", self.component.name())
        } else {
            write!(f, "{}[{}]", self.component.name(), self.shape.name())
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::FLOAT.num_bytes(), 4);
        assert_eq!(DataType::VEC3F.num_bytes(), 12);
        assert_eq!(DataType::MAT4F.num_bytes(), 64);
        assert_eq!(DataType::UINT16.num_bytes(), 2);
        let mat3b = DataType::new(ComponentType::Byte, AccessorType::Mat3);
        assert_eq!(mat3b.num_bytes(), 9);
    }

    #[test]
    fn test_data_type_display() {
        assert_eq!(format!("{}", DataType::FLOAT), "FLOAT");
        assert_eq!(format!("{}", DataType::VEC3F), "FLOAT[VEC3]");
    }

    #[test]
    fn test_accessor_type_json() {
        let t: AccessorType = serde_json::from_str("\"MAT3\"").unwrap();
        assert_eq!(t, AccessorType::Mat3);
        assert_eq!(t.num_components(), 9);
        assert_eq!(serde_json::to_string(&AccessorType::Vec2).unwrap(), "\"VEC2\"");
        assert!(serde_json::from_str::<AccessorType>("\"VEC5\"").is_err());
    }

    #[test]
    fn test_vector_shapes() {
        assert_eq!(AccessorType::vector(3), Some(AccessorType::Vec3));
        assert_eq!(AccessorType::vector(16), None);
    }
}
