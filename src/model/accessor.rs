//! Accessor schema: typed views into buffer views.

use serde::{Deserialize, Serialize};

use super::{is_default, Extensible};
use crate::util::{AccessorType, ComponentType, DataType};

/// A typed view into a buffer view.
///
/// An accessor without `buffer_view` is all zeros, unless `sparse` overrides
/// some of its elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    /// Offset relative to the start of the buffer view.
    #[serde(default, skip_serializing_if = "is_default")]
    pub byte_offset: usize,
    pub component_type: ComponentType,
    /// Integer data is mapped to [0, 1] (unsigned) or [-1, 1] (signed).
    #[serde(default, skip_serializing_if = "is_default")]
    pub normalized: bool,
    /// Number of elements.
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: AccessorType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub min: Vec<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse: Option<Sparse>,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl Accessor {
    /// Create a dense accessor over a buffer view.
    pub fn new(
        buffer_view: usize,
        component_type: ComponentType,
        accessor_type: AccessorType,
        count: usize,
    ) -> Self {
        Self {
            name: None,
            buffer_view: Some(buffer_view),
            byte_offset: 0,
            component_type,
            normalized: false,
            count,
            accessor_type,
            min: Vec::new(),
            max: Vec::new(),
            sparse: None,
            ext: Extensible::default(),
        }
    }

    /// Component type and shape of one element.
    #[inline]
    pub fn data_type(&self) -> DataType {
        DataType::new(self.component_type, self.accessor_type)
    }

    /// Number of components per element.
    #[inline]
    pub fn num_components(&self) -> usize {
        self.accessor_type.num_components()
    }

    /// Size in bytes of one tightly packed element.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.data_type().num_bytes()
    }
}

/// Sparse storage of elements that deviate from the base values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sparse {
    /// Number of displaced elements.
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Indices of the displaced elements.
///
/// Only unsigned integer component types are valid here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseIndices {
    pub buffer_view: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub byte_offset: usize,
    pub component_type: ComponentType,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Replacement values, `count` elements of the base accessor's type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseValues {
    pub buffer_view: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub byte_offset: usize,
    #[serde(flatten)]
    pub ext: Extensible,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_json() {
        let json = r#"{
            "bufferView": 1,
            "byteOffset": 8,
            "componentType": 5126,
            "count": 24,
            "type": "VEC3",
            "min": [-1, -1, -1],
            "max": [1, 1, 1]
        }"#;
        let a: Accessor = serde_json::from_str(json).unwrap();
        assert_eq!(a.buffer_view, Some(1));
        assert_eq!(a.byte_offset, 8);
        assert_eq!(a.component_type, ComponentType::Float);
        assert_eq!(a.accessor_type, AccessorType::Vec3);
        assert_eq!(a.element_size(), 12);
        assert!(!a.normalized);
        assert_eq!(a.max, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_accessor_requires_count() {
        let json = r#"{"componentType": 5126, "type": "SCALAR"}"#;
        let err = serde_json::from_str::<Accessor>(json).unwrap_err();
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn test_sparse_json() {
        let json = r#"{
            "componentType": 5126, "count": 4, "type": "SCALAR",
            "sparse": {
                "count": 2,
                "indices": {"bufferView": 0, "componentType": 5121},
                "values": {"bufferView": 1, "byteOffset": 4}
            }
        }"#;
        let a: Accessor = serde_json::from_str(json).unwrap();
        assert_eq!(a.buffer_view, None);
        let s = a.sparse.as_ref().unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.indices.component_type, ComponentType::UnsignedByte);
        assert_eq!(s.values.byte_offset, 4);
    }

    #[test]
    fn test_accessor_defaults_not_written() {
        let a = Accessor::new(0, ComponentType::UnsignedShort, AccessorType::Scalar, 3);
        let v = serde_json::to_value(&a).unwrap();
        assert!(v.get("byteOffset").is_none());
        assert!(v.get("normalized").is_none());
        assert_eq!(v["componentType"], 5123);
        assert_eq!(v["type"], "SCALAR");
    }
}
