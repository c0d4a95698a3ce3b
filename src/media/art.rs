use std::path::Path;

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use lofty::file::TaggedFileExt;
use lofty::picture::PictureType;
use tracing::debug;

use crate::error::MediaError;

/// Background colour used when a track has no usable cover.
pub const PLACEHOLDER_RGB: [u8; 3] = [18, 24, 28];

pub fn placeholder(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width.max(1), height.max(1), Rgb(PLACEHOLDER_RGB))
}

/// Raw bytes of the embedded cover: the front cover if tagged as such,
/// otherwise the first picture found.
pub fn embedded_picture(path: &Path) -> Result<Option<Vec<u8>>, MediaError> {
    let tagged = lofty::read_from_path(path)?;
    let mut first: Option<&[u8]> = None;
    for tag in tagged.tags() {
        for pic in tag.pictures() {
            if pic.pic_type() == PictureType::CoverFront {
                return Ok(Some(pic.data().to_vec()));
            }
            if first.is_none() {
                first = Some(pic.data());
            }
        }
    }
    Ok(first.map(<[u8]>::to_vec))
}

/// Album art scaled to exactly `width × height`, or the placeholder.
pub fn load_album_art(path: &Path, width: u32, height: u32) -> RgbImage {
    match try_load_album_art(path, width, height) {
        Ok(Some(img)) => img,
        Ok(None) => placeholder(width, height),
        Err(e) => {
            debug!(path = %path.display(), "album art unavailable: {e}");
            placeholder(width, height)
        }
    }
}

fn try_load_album_art(path: &Path, width: u32, height: u32) -> Result<Option<RgbImage>, MediaError> {
    let Some(bytes) = embedded_picture(path)? else {
        return Ok(None);
    };
    scale_image(&bytes, width, height).map(Some)
}

/// Decode encoded image bytes and scale them to exactly `width × height`.
pub fn scale_image(raw: &[u8], width: u32, height: u32) -> Result<RgbImage, MediaError> {
    let img = image::load_from_memory(raw)?;
    Ok(img
        .resize_exact(width.max(1), height.max(1), FilterType::Lanczos3)
        .to_rgb8())
}
