//! Load and save switches.

use serde::{Deserialize, Serialize};

/// What [`load`](super::load) resolves besides the JSON document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Read buffer payloads.
    pub load_buffers: bool,
    /// Decode image pixels. Images stored in buffer views need `load_buffers`.
    pub load_images: bool,
    /// Leave unresolvable buffers and images empty instead of failing.
    pub skip_missing: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { load_buffers: true, load_images: true, skip_missing: false }
    }
}

impl LoadOptions {
    /// JSON only; buffers and images stay empty.
    pub fn topology_only() -> Self {
        Self { load_buffers: false, load_images: false, skip_missing: false }
    }

    pub fn with_buffers(mut self, on: bool) -> Self {
        self.load_buffers = on;
        self
    }

    pub fn with_images(mut self, on: bool) -> Self {
        self.load_images = on;
        self
    }

    pub fn with_skip_missing(mut self, on: bool) -> Self {
        self.skip_missing = on;
        self
    }
}

/// What [`save`](super::save) writes besides the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Write external buffer files and embed URI-less buffers.
    pub save_buffers: bool,
    /// Encode loaded pixels to each image's external path.
    pub save_images: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { save_buffers: true, save_images: true }
    }
}

impl SaveOptions {
    pub fn with_buffers(mut self, on: bool) -> Self {
        self.save_buffers = on;
        self
    }

    pub fn with_images(mut self, on: bool) -> Self {
        self.save_images = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let l = LoadOptions::default();
        assert!(l.load_buffers && l.load_images && !l.skip_missing);
        let s = SaveOptions::default();
        assert!(s.save_buffers && s.save_images);
    }

    #[test]
    fn test_builder_and_serde() {
        let l = LoadOptions::default().with_images(false).with_skip_missing(true);
        assert_eq!(l, LoadOptions { load_buffers: true, load_images: false, skip_missing: true });

        let parsed: LoadOptions = serde_json::from_str(r#"{"skip_missing": true}"#).unwrap();
        assert!(parsed.load_buffers && parsed.skip_missing);
        assert_eq!(LoadOptions::topology_only().with_buffers(true).load_buffers, true);
    }
}
