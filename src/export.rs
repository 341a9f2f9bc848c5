// Export: panel pixels -> PNG/JPEG bytes -> data URL, and back into Blob/File values.
// Encoding is deterministic for a given frame and image type.

use crate::config::ImgType;
use crate::error::{Error, Result};
use crate::types::FrameBuffer;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::{Path, PathBuf};

/// Encoded image bytes plus their MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBlob {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A blob with a file name attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub blob: ImageBlob,
}

/// What `get_img_blob_or_file` should hand back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportKind {
    #[default]
    Blob,
    /// `None` picks a generated name.
    File(Option<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageOutput {
    Blob(ImageBlob),
    File(ImageFile),
}

/// Encode the frame. PNG keeps alpha; JPEG has none, so pixels are composited over black.
pub fn encode_image(frame: &FrameBuffer, img_type: ImgType) -> Result<Vec<u8>> {
    let (w, h) = (frame.width as u32, frame.height as u32);
    let mut out = Vec::new();
    match img_type {
        ImgType::Png => {
            let mut raw = Vec::with_capacity(frame.pixels.len() * 4);
            for &px in &frame.pixels {
                // 0xAARRGGBB -> R, G, B, A
                let [a, r, g, b] = px.to_be_bytes();
                raw.extend_from_slice(&[r, g, b, a]);
            }
            PngEncoder::new(&mut out)
                .write_image(&raw, w, h, ExtendedColorType::Rgba8)
                .map_err(|e| Error::Export(format!("PNG encode: {e}")))?;
        }
        ImgType::Jpg | ImgType::Jpeg => {
            let mut raw = Vec::with_capacity(frame.pixels.len() * 3);
            for &px in &frame.pixels {
                let a = (px >> 24) & 0xFF;
                let over_black = |c: u32| ((c & 0xFF) * a / 255) as u8;
                raw.extend_from_slice(&[over_black(px >> 16), over_black(px >> 8), over_black(px)]);
            }
            JpegEncoder::new_with_quality(&mut out, 100)
                .write_image(&raw, w, h, ExtendedColorType::Rgb8)
                .map_err(|e| Error::Export(format!("JPEG encode: {e}")))?;
        }
    }
    Ok(out)
}

/// `data:<mime>;base64,<payload>`
pub fn to_data_url(frame: &FrameBuffer, img_type: ImgType) -> Result<String> {
    let bytes = encode_image(frame, img_type)?;
    Ok(format!("data:{};base64,{}", img_type.mime_type(), STANDARD.encode(bytes)))
}

/// Parse a base64 data URL back into a blob. Any malformed piece is an export error.
pub fn decode_data_url(url: &str) -> Result<ImageBlob> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| Error::Export("data URL has no ',' separator".into()))?;
    let mime_type = header
        .split_once(':')
        .and_then(|(_, rest)| rest.split_once(';'))
        .map(|(mime, _)| mime)
        .filter(|mime| !mime.is_empty())
        .ok_or_else(|| Error::Export(format!("data URL header '{header}' has no MIME type")))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| Error::Export(format!("base64 decode: {e}")))?;
    Ok(ImageBlob { mime_type: mime_type.to_string(), bytes })
}

/// `IMG_<YYYYMMddHHmmss>_<6 digits>`, e.g. `IMG_20220723142036_445638`.
pub fn random_file_name() -> String {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let digits: u32 = rand::random_range(0..1_000_000);
    format!("IMG_{stamp}_{digits:06}")
}

/// Write `<dir>/<name>.<ext>` and return the path.
pub fn write_image(dir: &Path, name: &str, img_type: ImgType, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{}", img_type.extension()));
    std::fs::write(&path, bytes)
        .map_err(|e| Error::Export(format!("write {}: {e}", path.display())))?;
    Ok(path)
}
