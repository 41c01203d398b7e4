//! Gallery side of the lightbox: the image records it shows and the
//! selection that drives it.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ScanError;
use crate::lightbox::NavRequest;

/// Supported image extensions
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "ico", "tiff", "tif"];

/// One image in the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: String,
    /// Grid / fallback source.
    pub src: String,
    /// Full-size source for the lightbox, when different from `src`.
    pub lightbox_src: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// e.g. "32,768 x 24,576 pixels"
    pub dimensions: Option<String>,
    /// e.g. "805.3 MP"
    pub megapixels: Option<String>,
    pub year: Option<u16>,
}

impl ImageRecord {
    pub fn new(id: impl Into<String>, src: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            lightbox_src: None,
            title: title.into(),
            description: None,
            dimensions: None,
            megapixels: None,
            year: None,
        }
    }

    pub fn with_lightbox_src(mut self, src: impl Into<String>) -> Self {
        self.lightbox_src = Some(src.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Fill `dimensions` and `megapixels` from a pixel size.
    pub fn with_pixel_size(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(format_dimensions(width, height));
        self.megapixels = Some(format_megapixels(width, height));
        self
    }

    /// Source the lightbox should load.
    pub fn display_src(&self) -> &str {
        self.lightbox_src.as_deref().unwrap_or(&self.src)
    }
}

/// "32,768 x 24,576 pixels"
pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{} x {} pixels", group_thousands(width), group_thousands(height))
}

/// "805.3 MP"
pub fn format_megapixels(width: u32, height: u32) -> String {
    let mp = width as f64 * height as f64 / 1_000_000.0;
    format!("{:.1} MP", mp)
}

fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Check if a file is a supported image
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Images in `dir`, in natural sort order, titled after their file stem.
///
/// Dimensions come from the file header; files whose header cannot be read
/// are still listed, without dimensions.
pub fn scan_directory(dir: &Path) -> Result<Vec<ImageRecord>, ScanError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ScanError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_supported_image(p))
        .collect();

    paths.sort_by(|a, b| {
        natord::compare(
            a.file_name().unwrap_or_default().to_str().unwrap_or(""),
            b.file_name().unwrap_or_default().to_str().unwrap_or(""),
        )
    });

    let records = paths
        .iter()
        .map(|path| {
            let src = path.to_string_lossy().into_owned();
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| src.clone());
            let record = ImageRecord::new(src.clone(), src, title);
            match imagesize::size(path) {
                Ok(size) => record.with_pixel_size(size.width as u32, size.height as u32),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "could not read image header");
                    record
                }
            }
        })
        .collect::<Vec<_>>();

    info!(dir = %dir.display(), count = records.len(), "scanned gallery");
    Ok(records)
}

/// Which record, if any, is open in the lightbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    open: Option<usize>,
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_at(&mut self, index: usize) {
        self.open = Some(index);
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Advance with wrap-around over `len` records.
    pub fn next(&mut self, len: usize) {
        if let Some(i) = self.open {
            if len > 0 {
                self.open = Some((i + 1) % len);
            }
        }
    }

    /// Step back with wrap-around over `len` records.
    pub fn previous(&mut self, len: usize) {
        if let Some(i) = self.open {
            if len > 0 {
                self.open = Some((i % len + len - 1) % len);
            }
        }
    }

    pub fn apply(&mut self, request: NavRequest, len: usize) {
        match request {
            NavRequest::Close => self.close(),
            NavRequest::Next => self.next(len),
            NavRequest::Previous => self.previous(len),
        }
    }
}
