//! Image resolution and pixel coding.

use std::path::Path;

use image::{ColorType, DynamicImage, ImageBuffer, LumaA};
use tracing::{debug, warn};

use super::uri::{read_uri, uri_path};
use crate::model::{Asset, ImageData};
use crate::util::{Error, Result};

/// Decode an encoded image (PNG, JPEG, HDR, EXR) into pixels.
///
/// Float sources keep float pixels; everything else becomes 8-bit with
/// 1 to 4 channels.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    let mut data = ImageData { width, height, ..Default::default() };
    match img.color() {
        ColorType::Rgb32F => {
            data.ncomp = 3;
            data.dataf = img.into_rgb32f().into_raw();
        }
        ColorType::Rgba32F => {
            data.ncomp = 4;
            data.dataf = img.into_rgba32f().into_raw();
        }
        ColorType::L8 | ColorType::L16 => {
            data.ncomp = 1;
            data.datab = img.into_luma8().into_raw();
        }
        ColorType::La8 | ColorType::La16 => {
            data.ncomp = 2;
            data.datab = img.into_luma_alpha8().into_raw();
        }
        ColorType::Rgb8 | ColorType::Rgb16 => {
            data.ncomp = 3;
            data.datab = img.into_rgb8().into_raw();
        }
        _ => {
            data.ncomp = 4;
            data.datab = img.into_rgba8().into_raw();
        }
    }
    Ok(data)
}

fn shape_error(data: &ImageData) -> Error {
    Error::Image(format!(
        "pixel buffer does not match {}x{}x{}",
        data.width, data.height, data.ncomp
    ))
}

/// Pixels as a `DynamicImage`, ready for encoding.
pub fn to_dynamic(data: &ImageData) -> Result<DynamicImage> {
    let (w, h) = (data.width, data.height);
    let img = if data.is_hdr() {
        let px = data.dataf.clone();
        match data.ncomp {
            3 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgb32F),
            4 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgba32F),
            _ => None,
        }
    } else {
        let px = data.datab.clone();
        match data.ncomp {
            1 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, px).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgba8),
            _ => None,
        }
    };
    img.ok_or_else(|| shape_error(data))
}

/// Encode pixels to `path`; the format follows the file extension.
pub fn encode_image(data: &ImageData, path: &Path) -> Result<()> {
    to_dynamic(data)?.save(path)?;
    Ok(())
}

/// Decode the pixels of every image.
///
/// Sources are tried in order: `data:` URI, buffer view, relative path.
/// With `skip_missing`, images that cannot be resolved or decoded are left
/// empty.
pub fn load_images(asset: &mut Asset, skip_missing: bool) -> Result<()> {
    for i in 0..asset.images.len() {
        match resolve_image(asset, i) {
            Ok(data) => {
                debug!(image = i, width = data.width, height = data.height, "loaded image");
                asset.images[i].data = data;
            }
            Err(e) if skip_missing && e.is_recoverable() => {
                warn!(image = i, error = %e, "skipping unresolved image");
                asset.images[i].data = ImageData::default();
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn resolve_image(asset: &Asset, index: usize) -> Result<ImageData> {
    let image = &asset.images[index];
    let bytes = match (&image.uri, image.buffer_view) {
        (Some(uri), _) => read_uri(uri, asset.base_dir.as_deref())?,
        (None, Some(view)) => asset.view_bytes(view)?.to_vec(),
        (None, None) => return Err(Error::schema(format!("image {index} has neither uri nor bufferView"))),
    };
    decode_image(&bytes)
}

/// Re-encode loaded pixels of images with an external path under `base_dir`.
///
/// Images without pixels, embedded images and buffer-view images are
/// skipped.
pub fn save_images(asset: &Asset, base_dir: Option<&Path>) -> Result<()> {
    for (i, image) in asset.images.iter().enumerate() {
        if image.data.is_empty() {
            continue;
        }
        let Some(uri) = &image.uri else { continue };
        let Some(path) = uri_path(uri, base_dir)? else { continue };
        encode_image(&image.data, &path)?;
        debug!(image = i, path = %path.display(), "wrote image");
    }
    Ok(())
}
