// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — frame counting and helper printing for raster images.

pub mod frames;

use std::path::Path;
use std::sync::Arc;

use batchpress_bridge::HelperPrinter;
use batchpress_core::error::UnitOutcome;
use batchpress_core::types::{DocumentFamily, PrintChannel, PrintJobDescriptor};
use tracing::instrument;

use crate::handler::DocumentHandler;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "tga", "bmp", "dib",
];

pub struct ImageHandler {
    helper: Arc<HelperPrinter>,
}

impl ImageHandler {
    pub fn new(helper: Arc<HelperPrinter>) -> Self {
        Self { helper }
    }
}

impl DocumentHandler for ImageHandler {
    fn name(&self) -> &str {
        "image"
    }

    fn family(&self) -> DocumentFamily {
        DocumentFamily::Image
    }

    fn extensions(&self) -> &[&'static str] {
        IMAGE_EXTENSIONS
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn count(&self, path: &Path) -> UnitOutcome<u32> {
        frames::frame_count(path)
    }

    #[instrument(skip(self, job), fields(path = %path.display()))]
    fn print(&self, path: &Path, job: &PrintJobDescriptor) -> UnitOutcome<()> {
        self.helper.submit(&self.helper.document_command(path, job))
    }

    fn print_channel(&self) -> PrintChannel {
        PrintChannel::ImageHelper
    }
}
