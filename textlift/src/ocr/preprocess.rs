//! Optional image preprocessing before recognition.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

/// Pixels at or above this luminance become white, the rest black.
/// A fixed global threshold, not adaptive (Otsu) thresholding; callers
/// should not expect good results on unevenly illuminated images.
pub const BINARIZE_THRESHOLD: u8 = 128;

/// Applies grayscale conversion and/or binarization to the image at
/// `image_path`.
///
/// With neither flag set the input path is returned unchanged and no
/// file is created. Binarization always forces grayscale first. Any
/// processing writes a new temporary PNG; the caller owns the lifecycle
/// of both files when the returned path differs from the input.
///
/// Preprocessing is a soft stage: if the image cannot be decoded or the
/// result cannot be written, the failure is logged and the original path
/// returned so recognition still runs on the unprocessed image.
pub fn preprocess_image(image_path: &Path, grayscale: bool, binarize: bool) -> PathBuf {
    if !grayscale && !binarize {
        return image_path.to_path_buf();
    }
    match apply(image_path, binarize) {
        Ok(processed) => processed,
        Err(e) => {
            warn!(
                "preprocessing skipped for {} ({e}); recognition will use the unprocessed image",
                image_path.display()
            );
            image_path.to_path_buf()
        }
    }
}

fn apply(image_path: &Path, binarize: bool) -> Result<PathBuf> {
    let image = image::open(image_path)?;
    // Both flags reduce to single-channel luminance first.
    let mut gray = image.to_luma8();

    if binarize {
        for pixel in gray.pixels_mut() {
            pixel[0] = if pixel[0] >= BINARIZE_THRESHOLD { 255 } else { 0 };
        }
    }

    let dest = super::temp_image_path("textlift-pre-")?;
    if let Err(e) = gray.save(&dest) {
        // Do not leak the reserved temp file on a failed encode.
        let _ = std::fs::remove_file(&dest);
        return Err(e.into());
    }
    debug!(
        source = %image_path.display(),
        dest = %dest.display(),
        binarize,
        "image preprocessed"
    );
    Ok(dest)
}
