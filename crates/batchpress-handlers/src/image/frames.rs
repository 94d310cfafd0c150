// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame counting for raster images.
//
// TIFF files may hold several pages and are walked directory by directory
// with the `tiff` decoder. Every other format prints as one page once its
// header decodes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use batchpress_core::error::{UnitError, UnitOutcome};
use image::{ImageError, ImageFormat, ImageReader};
use tiff::TiffError;
use tracing::debug;

/// Printable frames in the image at `path`.
pub fn frame_count(path: &Path) -> UnitOutcome<u32> {
    let reader = ImageReader::open(path)
        .map_err(|e| UnitError::from_io(path, &e))?
        .with_guessed_format()
        .map_err(|e| UnitError::from_io(path, &e))?;

    if reader.format() == Some(ImageFormat::Tiff) {
        return tiff_frames(path);
    }

    let (width, height) = reader.into_dimensions().map_err(|e| image_error(path, e))?;
    debug!(width, height, "image header decoded");
    Ok(1)
}

fn tiff_frames(path: &Path) -> UnitOutcome<u32> {
    let file = File::open(path).map_err(|e| UnitError::from_io(path, &e))?;
    let mut decoder =
        tiff::decoder::Decoder::new(BufReader::new(file)).map_err(|e| tiff_error(path, e))?;

    let mut frames = 1u32;
    while decoder.more_images() {
        decoder.next_image().map_err(|e| tiff_error(path, e))?;
        frames += 1;
    }
    debug!(frames, "TIFF directories walked");
    Ok(frames)
}

fn image_error(path: &Path, err: ImageError) -> UnitError {
    match err {
        ImageError::IoError(e) => UnitError::from_io(path, &e),
        ImageError::Unsupported(e) => {
            UnitError::UnsupportedSubformat(format!("{}: {e}", path.display()))
        }
        ImageError::Limits(e) => UnitError::UnsupportedSubformat(format!("{}: {e}", path.display())),
        other => UnitError::Corrupt(format!("{}: {other}", path.display())),
    }
}

fn tiff_error(path: &Path, err: TiffError) -> UnitError {
    match err {
        TiffError::IoError(e) => UnitError::from_io(path, &e),
        TiffError::UnsupportedError(e) => {
            UnitError::UnsupportedSubformat(format!("{}: {e}", path.display()))
        }
        other => UnitError::Corrupt(format!("{}: {other}", path.display())),
    }
}
