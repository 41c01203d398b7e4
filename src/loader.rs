//! Background image loader.
//!
//! One worker thread reads requests from a crossbeam channel, decodes the
//! file to RGBA and sends the outcome back tagged with the request's
//! [`LoadTicket`]. The UI thread polls outcomes once per frame and hands them
//! to the session, which drops any whose ticket is stale.
//!
//! Only the newest queued request is decoded: each request supersedes the
//! ones before it, so rapid navigation does not decode images nobody will
//! see.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use image::imageops::FilterType;
use tracing::debug;

use crate::error::LoadError;
use crate::geometry::ImageSize;
use crate::session::LoadTicket;

/// Largest texture side uploaded when the caller does not specify one.
pub const DEFAULT_MAX_TEXTURE_SIDE: u32 = 8192;

/// Decoded pixels ready for upload.
#[derive(Clone)]
pub struct DecodedImage {
    /// Size of the source image. Pan bounds use this.
    pub natural: ImageSize,
    /// Size of `pixels`; smaller than `natural` when downscaled for the GPU.
    pub texture_size: [usize; 2],
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("natural", &self.natural)
            .field("texture_size", &self.texture_size)
            .finish_non_exhaustive()
    }
}

impl DecodedImage {
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(self.texture_size, &self.pixels)
    }
}

/// Request sent to the worker.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub max_texture_side: u32,
}

/// Result sent back by the worker.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub result: Result<DecodedImage, LoadError>,
}

/// Handle to the loader worker. Dropping it stops the worker.
pub struct ImageLoader {
    request_tx: Sender<LoadRequest>,
    result_rx: Receiver<LoadOutcome>,
    max_texture_side: u32,
}

impl ImageLoader {
    /// Start the worker. `repaint` is poked whenever an outcome is ready.
    pub fn spawn(repaint: Option<egui::Context>) -> Result<Self, LoadError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<LoadOutcome>();

        std::thread::Builder::new()
            .name("lightbox-loader".into())
            .spawn(move || worker_loop(request_rx, result_tx, repaint))
            .map_err(LoadError::Spawn)?;

        Ok(Self {
            request_tx,
            result_rx,
            max_texture_side: DEFAULT_MAX_TEXTURE_SIDE,
        })
    }

    /// Cap the uploaded texture size, usually to the renderer's limit.
    pub fn set_max_texture_side(&mut self, side: usize) {
        self.max_texture_side = u32::try_from(side).unwrap_or(u32::MAX).max(1);
    }

    /// Queue a load for `path`.
    pub fn request(&self, ticket: LoadTicket, path: impl Into<PathBuf>) -> Result<(), LoadError> {
        let request = LoadRequest {
            ticket,
            path: path.into(),
            max_texture_side: self.max_texture_side,
        };
        debug!(index = ticket.index, path = %request.path.display(), "requesting image");
        self.request_tx.send(request).map_err(|_| LoadError::WorkerGone)
    }

    /// Outcomes that arrived since the last poll.
    pub fn poll(&self) -> Vec<LoadOutcome> {
        self.result_rx.try_iter().collect()
    }

    /// Block until the next outcome or `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<LoadOutcome> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}

fn worker_loop(request_rx: Receiver<LoadRequest>, result_tx: Sender<LoadOutcome>, repaint: Option<egui::Context>) {
    loop {
        let mut request = match request_rx.recv_timeout(Duration::from_millis(250)) {
            Ok(req) => req,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // Coalesce: skip to the newest request.
        let mut skipped = 0usize;
        while let Ok(newer) = request_rx.try_recv() {
            request = newer;
            skipped += 1;
        }
        if skipped > 0 {
            debug!(skipped, "superseded load requests dropped");
        }

        let result = load_image(&request.path, request.max_texture_side);
        let outcome = LoadOutcome {
            ticket: request.ticket,
            path: request.path,
            result,
        };

        if result_tx.send(outcome).is_err() {
            break;
        }
        if let Some(ctx) = &repaint {
            ctx.request_repaint();
        }
    }
    debug!("image loader worker stopped");
}

/// Decode `path` to RGBA, downscaling to `max_texture_side` if needed.
pub fn load_image(path: &Path, max_texture_side: u32) -> Result<DecodedImage, LoadError> {
    let img = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => LoadError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let natural = ImageSize::new(width, height);

    let (tex_w, tex_h, pixels) = downscale_rgba_if_needed(width, height, rgba.as_raw(), max_texture_side, FilterType::Triangle);

    Ok(DecodedImage {
        natural,
        texture_size: [tex_w as usize, tex_h as usize],
        pixels: pixels.into_owned(),
    })
}

/// Downscale RGBA pixel data if it exceeds the maximum texture size.
fn downscale_rgba_if_needed<'a>(
    width: u32,
    height: u32,
    pixels: &'a [u8],
    max_texture_side: u32,
    filter: FilterType,
) -> (u32, u32, Cow<'a, [u8]>) {
    if max_texture_side == 0 || (width <= max_texture_side && height <= max_texture_side) {
        return (width, height, Cow::Borrowed(pixels));
    }

    // Preserve aspect ratio; at least 1x1.
    let scale = (max_texture_side as f64 / width as f64).min(max_texture_side as f64 / height as f64);
    let new_w = ((width as f64) * scale).round().max(1.0) as u32;
    let new_h = ((height as f64) * scale).round().max(1.0) as u32;

    let Some(img) = image::RgbaImage::from_raw(width, height, pixels.to_vec()) else {
        return (width, height, Cow::Borrowed(pixels));
    };

    let resized = image::imageops::resize(&img, new_w, new_h, filter);
    (new_w, new_h, Cow::Owned(resized.into_raw()))
}
