//! QR matrix encoding.
//!
//! The URL is encoded by the `qrcode` crate at error correction level High and
//! rendered to a grayscale image with one pixel per module and no quiet zone.
//! [`QrMatrix`] turns that image into a square grid of dark/light modules.

use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};

use crate::error::{Error, Result};

/// Pixels darker than this are dark modules.
const DARK_THRESHOLD: u8 = 128;

/// Encodes `url` into a one-pixel-per-module grayscale image.
///
/// # Errors
///
/// Returns [`Error::Encode`] when the data does not fit into a version 40 symbol.
///
/// # Example
///
/// ```rust
/// use qrlogo::matrix::encode_url;
///
/// let image = encode_url("https://github.com/").unwrap();
/// assert_eq!(image.width(), image.height());
/// ```
pub fn encode_url(url: &str) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)
        .map_err(|err| Error::Encode(err.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(1, 1)
        .build();
    Ok(image)
}

/// A square grid of QR modules (`true` = dark).
///
/// Instances are immutable after creation and always square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    side: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Builds a matrix from a one-pixel-per-module image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputShape`] when the image is not square.
    pub fn from_image(image: &GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(Error::InputShape { width, height });
        }
        let side = width as usize;
        let mut modules = vec![false; side * side];
        for (x, y, Luma([value])) in image.enumerate_pixels() {
            modules[y as usize * side + x as usize] = *value < DARK_THRESHOLD;
        }
        Ok(QrMatrix { side, modules })
    }

    /// Builds a matrix from rows of modules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputShape`] when any row length differs from the row count.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let height = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != height) {
            return Err(Error::InputShape {
                width: row.len() as u32,
                height: height as u32,
            });
        }
        Ok(QrMatrix {
            side: height,
            modules: rows.concat(),
        })
    }

    /// Encodes `url` and validates the resulting matrix.
    pub fn encode(url: &str) -> Result<Self> {
        Self::from_image(&encode_url(url)?)
    }

    /// Width and height of the matrix, in modules.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns whether the module at column `x`, row `y` is dark.
    /// Out-of-range coordinates are light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.side && y < self.side && self.modules[y * self.side + x]
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&dark| dark).count()
    }

    /// Side of the rendered canvas in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the canvas does not fit in a `u32`.
    pub fn canvas_size(&self, module_size: u32) -> Result<u32> {
        u32::try_from(self.side)
            .ok()
            .and_then(|side| side.checked_mul(module_size))
            .ok_or_else(|| {
                Error::Config(format!(
                    "a {0}x{0} QR code with {module_size}px modules is too large",
                    self.side
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_url_is_square() {
        let image = encode_url("https://github.com/").unwrap();
        assert_eq!(image.width(), image.height());
        // Versions 1 to 40 span 21 to 177 modules.
        assert!((21..=177).contains(&image.width()));
        assert_eq!((image.width() - 17) % 4, 0);
    }

    #[test]
    fn test_encode_longer_url_grows() {
        let short = QrMatrix::encode("https://a.io").unwrap();
        let long = QrMatrix::encode(&format!("https://example.com/{}", "x".repeat(200))).unwrap();
        assert!(long.side() > short.side());
    }

    #[test]
    fn test_encode_too_long() {
        let huge = "x".repeat(4000);
        assert!(matches!(QrMatrix::encode(&huge), Err(Error::Encode(_))));
    }

    #[test]
    fn test_from_image_finder_pattern() {
        let matrix = QrMatrix::encode("https://github.com/").unwrap();
        // Top-left finder pattern: dark outer ring, light separator ring, dark core.
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(6, 6));
        assert!(!matrix.is_dark(1, 1));
        assert!(matrix.is_dark(3, 3));
        assert!(!matrix.is_dark(7, 7));
    }

    #[test]
    fn test_from_image_not_square() {
        let image = GrayImage::new(3, 4);
        match QrMatrix::from_image(&image) {
            Err(Error::InputShape { width, height }) => assert_eq!((width, height), (3, 4)),
            other => panic!("expected InputShape, got {other:?}"),
        }
    }

    #[test]
    fn test_from_rows() {
        let matrix = QrMatrix::from_rows(&[vec![true, false], vec![false, true]]).unwrap();
        assert_eq!(matrix.side(), 2);
        assert_eq!(matrix.dark_count(), 2);
        assert!(matrix.is_dark(1, 1));
        assert!(!matrix.is_dark(1, 0));
        assert!(!matrix.is_dark(5, 5));
        assert_eq!(matrix.canvas_size(10).unwrap(), 20);
    }

    #[test]
    fn test_canvas_size_overflow() {
        let matrix = QrMatrix::from_image(&GrayImage::new(177, 177)).unwrap();
        assert_eq!(matrix.canvas_size(24_000_000).unwrap(), 4_248_000_000);
        assert!(matches!(matrix.canvas_size(2_000_000_000), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_rows_ragged() {
        let result = QrMatrix::from_rows(&[vec![true, false], vec![false]]);
        assert!(matches!(result, Err(Error::InputShape { width: 1, height: 2 })));
    }
}
