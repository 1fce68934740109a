//! Texture, image and sampler schemas.

use serde::{Deserialize, Serialize};

use super::Extensible;

gl_enum! {
    /// Magnification filter.
    MagFilter ("sampler.magFilter") {
        Nearest = 9728,
        Linear = 9729,
    }
}

gl_enum! {
    /// Minification filter.
    MinFilter ("sampler.minFilter") {
        Nearest = 9728,
        Linear = 9729,
        NearestMipmapNearest = 9984,
        LinearMipmapNearest = 9985,
        NearestMipmapLinear = 9986,
        LinearMipmapLinear = 9987,
    }
}

gl_enum! {
    /// Texture coordinate wrapping mode.
    WrapMode ("sampler.wrap") {
        ClampToEdge = 33071,
        MirroredRepeat = 33648,
        Repeat = 10497,
    }
}

impl Default for WrapMode {
    fn default() -> Self {
        Self::Repeat
    }
}

fn is_repeat(w: &WrapMode) -> bool {
    *w == WrapMode::Repeat
}

/// Filtering and wrapping state of a texture.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sampler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<MagFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<MinFilter>,
    #[serde(default, skip_serializing_if = "is_repeat")]
    pub wrap_s: WrapMode,
    #[serde(default, skip_serializing_if = "is_repeat")]
    pub wrap_t: WrapMode,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// An image together with the sampler used to read it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    /// Image index. Extensions may supply the image instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Decoded pixels of an image.
///
/// Exactly one of `datab` (8 bits per channel) and `dataf` (float, from
/// HDR sources) is filled once the image has been loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Channels per pixel.
    pub ncomp: u32,
    pub datab: Vec<u8>,
    pub dataf: Vec<f32>,
}

impl ImageData {
    /// True when no pixels are present.
    pub fn is_empty(&self) -> bool {
        self.datab.is_empty() && self.dataf.is_empty()
    }

    /// True for float pixel data.
    pub fn is_hdr(&self) -> bool {
        !self.dataf.is_empty()
    }
}

/// Image referenced by a URI or by a buffer view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relative path or `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Required together with `buffer_view`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(flatten)]
    pub ext: Extensible,
    #[serde(skip)]
    pub data: ImageData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_json() {
        let json = r#"{"magFilter":9729,"minFilter":9987,"wrapS":33071}"#;
        let s: Sampler = serde_json::from_str(json).unwrap();
        assert_eq!(s.mag_filter, Some(MagFilter::Linear));
        assert_eq!(s.min_filter, Some(MinFilter::LinearMipmapLinear));
        assert_eq!(s.wrap_s, WrapMode::ClampToEdge);
        assert_eq!(s.wrap_t, WrapMode::Repeat);
        assert_eq!(serde_json::to_string(&s).unwrap(), json);
    }

    #[test]
    fn test_sampler_rejects_unknown_filter() {
        assert!(serde_json::from_str::<Sampler>(r#"{"magFilter":9984}"#).is_err());
    }

    #[test]
    fn test_image_pixels_not_serialized() {
        let mut img = Image { uri: Some("a.png".into()), ..Default::default() };
        img.data = ImageData { width: 1, height: 1, ncomp: 4, datab: vec![255; 4], dataf: vec![] };
        assert!(!img.data.is_empty());
        assert!(!img.data.is_hdr());
        let v = serde_json::to_value(&img).unwrap();
        assert_eq!(v, serde_json::json!({"uri": "a.png"}));
    }
}
