//! Header probing for files handed to the editor.
//!
//! Only the headers are read: pixel decoding belongs to the processing
//! service. RAW files are recognised here and routed to the RAW preview
//! service instead.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;

use super::types::{DecodeError, ImageInfo, Orientation};
use crate::geometry::Dimensions;

/// TIFF magic bytes (little-endian): "II*\0"
const TIFF_MAGIC_LE: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];
/// TIFF magic bytes (big-endian): "MM\0*"
const TIFF_MAGIC_BE: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];

/// Camera RAW extensions, lowercase.
const RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "cr3", "nef", "nrw", "dng", "orf", "raf", "rw2", "pef", "srw",
];

/// Check if bytes look like a TIFF-based RAW container.
pub fn is_raw_file(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    let header = &bytes[..4];
    header == TIFF_MAGIC_LE || header == TIFF_MAGIC_BE
}

/// Check a filename against the known RAW extensions.
pub fn is_raw_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| RAW_EXTENSIONS.contains(&ext.as_str()))
}

/// A file needs the RAW preview service when either its name or its
/// header says so.
pub fn needs_raw_preview(bytes: &[u8], filename: &str) -> bool {
    is_raw_filename(filename) || is_raw_file(bytes)
}

/// Read dimensions and EXIF orientation from an encoded JPEG/PNG.
///
/// # Errors
///
/// `InvalidFormat` when the format cannot be guessed, `CorruptedFile` when
/// the header is unreadable or reports a zero-sized image.
pub fn probe_image(bytes: &[u8]) -> Result<ImageInfo, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    let (width, height) = reader.into_dimensions().map_err(|e| match e {
        image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let stored_dimensions = Dimensions::new(width, height);
    if !stored_dimensions.is_valid() {
        return Err(DecodeError::CorruptedFile(format!(
            "image reports size {stored_dimensions}"
        )));
    }

    Ok(ImageInfo {
        stored_dimensions,
        orientation: read_orientation(bytes),
    })
}

/// EXIF orientation of the file, `Normal` when absent or unreadable.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let Ok(exif) = Reader::new().read_from_container(&mut Cursor::new(bytes)) else {
        return Orientation::Normal;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::new(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_is_raw_file_tiff_le() {
        let bytes = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert!(is_raw_file(&bytes));
    }

    #[test]
    fn test_is_raw_file_tiff_be() {
        let bytes = [0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
        assert!(is_raw_file(&bytes));
    }

    #[test]
    fn test_is_raw_file_rejects_jpeg_and_short_input() {
        assert!(!is_raw_file(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_raw_file(&[0x49, 0x49]));
        assert!(!is_raw_file(&[]));
    }

    #[test]
    fn test_is_raw_filename() {
        assert!(is_raw_filename("DSC01234.ARW"));
        assert!(is_raw_filename("holiday.nef"));
        assert!(is_raw_filename("a.b.dng"));
        assert!(!is_raw_filename("photo.jpg"));
        assert!(!is_raw_filename("arw"));
    }

    #[test]
    fn test_needs_raw_preview() {
        let png = encode(2, 2, ImageFormat::Png);
        assert!(!needs_raw_preview(&png, "photo.png"));
        assert!(needs_raw_preview(&png, "photo.cr2"));
        assert!(needs_raw_preview(&[0x49, 0x49, 0x2A, 0x00], "upload.bin"));
    }

    #[test]
    fn test_probe_png() {
        let info = probe_image(&encode(6, 4, ImageFormat::Png)).unwrap();
        assert_eq!(info.stored_dimensions, Dimensions::new(6, 4));
        assert_eq!(info.orientation, Orientation::Normal);
        assert_eq!(info.oriented_dimensions(), Dimensions::new(6, 4));
    }

    #[test]
    fn test_probe_jpeg() {
        let info = probe_image(&encode(8, 3, ImageFormat::Jpeg)).unwrap();
        assert_eq!(info.stored_dimensions, Dimensions::new(8, 3));
    }

    #[test]
    fn test_probe_garbage_is_invalid_format() {
        let result = probe_image(&[0x00, 0x01, 0x02, 0x03]);
        assert_eq!(result, Err(DecodeError::InvalidFormat));
    }

    #[test]
    fn test_probe_truncated_png_is_corrupted() {
        let png = encode(6, 4, ImageFormat::Png);
        let result = probe_image(&png[..12]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_defaults_without_exif() {
        assert_eq!(read_orientation(&[0x00, 0x01]), Orientation::Normal);
        let png = encode(2, 2, ImageFormat::Png);
        assert_eq!(read_orientation(&png), Orientation::Normal);
    }
}
