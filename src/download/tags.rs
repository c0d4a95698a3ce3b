use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use tracing::debug;

use super::fetch::VideoInfo;
use crate::config::DownloadSettings;
use crate::error::MediaError;

const THUMB_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// The thumbnail `yt-dlp` wrote next to `base`, if any.
pub fn find_thumbnail(base: &Path) -> Option<PathBuf> {
    THUMB_EXTENSIONS.iter().find_map(|ext| {
        let mut s = base.as_os_str().to_owned();
        s.push(".");
        s.push(ext);
        let p = PathBuf::from(s);
        p.is_file().then_some(p)
    })
}

/// Re-encode image bytes as JPEG, shrunk to fit `max_size × max_size`.
pub fn prepare_cover_jpeg(raw: &[u8], max_size: u32, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut img = image::load_from_memory(raw)?;
    if img.width() > max_size || img.height() > max_size {
        img = img.resize(max_size, max_size, FilterType::Lanczos3);
    }
    let rgb = img.to_rgb8();

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder.encode_image(&rgb)?;
    Ok(buf)
}

fn year_of(upload_date: &str) -> Option<&str> {
    let year = upload_date.get(..4)?;
    year.chars().all(|c| c.is_ascii_digit()).then_some(year)
}

/// Tag a downloaded file with what is known about its source video.
pub fn write_download_tags(
    path: &Path,
    info: &VideoInfo,
    cover: Option<&[u8]>,
    settings: &DownloadSettings,
) -> Result<(), MediaError> {
    let mut tagged = Probe::open(path)?.read()?;

    let tag_type = tagged.primary_tag_type();
    if tagged.tag(tag_type).is_none() {
        tagged.insert_tag(Tag::new(tag_type));
    }
    let Some(tag) = tagged.tag_mut(tag_type) else {
        return Err(MediaError::Decode("file has no writable tag".to_string()));
    };

    if let Some(title) = &info.title {
        tag.set_title(title.clone());
    }
    if let Some(uploader) = &info.uploader {
        tag.set_artist(uploader.clone());
        tag.insert_text(ItemKey::AlbumArtist, uploader.clone());
    }
    tag.set_album(settings.album_label.clone());
    if let Some(year) = info.upload_date.as_deref().and_then(year_of) {
        tag.insert_text(ItemKey::RecordingDate, year.to_string());
    }
    if let Some(url) = &info.webpage_url {
        tag.set_comment(url.clone());
    }

    if let Some(raw) = cover {
        match prepare_cover_jpeg(raw, settings.cover_max_size, settings.cover_quality) {
            Ok(jpeg) => {
                let mut pic = Picture::from_reader(&mut Cursor::new(jpeg))?;
                pic.set_pic_type(PictureType::CoverFront);
                pic.set_description(Some("Cover".to_string()));
                tag.remove_picture_type(PictureType::CoverFront);
                tag.push_picture(pic);
            }
            Err(e) => debug!(path = %path.display(), "skipping cover: {e}"),
        }
    }

    tag.save_to_path(path, WriteOptions::default())?;
    debug!(path = %path.display(), "tags written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_needs_four_digits() {
        assert_eq!(year_of("20210314"), Some("2021"));
        assert_eq!(year_of("20"), None);
        assert_eq!(year_of("NA-01"), None);
    }
}
