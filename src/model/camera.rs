//! Camera schema.

use serde::{Deserialize, Serialize};

use super::Extensible;

/// Projection kind, named by the `type` key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraType {
    #[default]
    Perspective,
    Orthographic,
}

/// Perspective projection parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perspective {
    /// Width over height; the viewport's when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
    /// Vertical field of view in radians.
    pub yfov: f32,
    /// Infinite projection when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zfar: Option<f32>,
    pub znear: f32,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Orthographic projection parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orthographic {
    /// Horizontal magnification.
    pub xmag: f32,
    /// Vertical magnification.
    pub ymag: f32,
    pub zfar: f32,
    pub znear: f32,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Projection attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub camera_type: CameraType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthographic: Option<Orthographic>,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl Camera {
    /// Perspective camera.
    pub fn perspective(yfov: f32, aspect_ratio: Option<f32>, znear: f32, zfar: Option<f32>) -> Self {
        Self {
            camera_type: CameraType::Perspective,
            perspective: Some(Perspective { aspect_ratio, yfov, zfar, znear, ext: Extensible::default() }),
            ..Default::default()
        }
    }

    /// Orthographic camera.
    pub fn orthographic(xmag: f32, ymag: f32, znear: f32, zfar: f32) -> Self {
        Self {
            camera_type: CameraType::Orthographic,
            orthographic: Some(Orthographic { xmag, ymag, zfar, znear, ext: Extensible::default() }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_json() {
        let json = r#"{"type":"perspective","perspective":{"yfov":0.7,"znear":0.01,"aspectRatio":1.5}}"#;
        let c: Camera = serde_json::from_str(json).unwrap();
        assert_eq!(c.camera_type, CameraType::Perspective);
        let p = c.perspective.as_ref().unwrap();
        assert_eq!(p.aspect_ratio, Some(1.5));
        assert_eq!(p.zfar, None);
    }

    #[test]
    fn test_orthographic_roundtrip() {
        let c = Camera::orthographic(2.0, 1.0, 0.1, 100.0);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["type"], "orthographic");
        let back: Camera = serde_json::from_value(v).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_camera_type_required() {
        assert!(serde_json::from_str::<Camera>(r#"{"perspective":{"yfov":1,"znear":1}}"#).is_err());
    }
}
