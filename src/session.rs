//! Viewer session: the transform state machine behind an open lightbox.
//!
//! A session starts `Pending` for the selected index and moves to a loaded
//! state once the image's natural size is known (or the load failed).
//! Zoom, pan and rotation change independently of that, and every operation
//! that can move the image re-clamps pan against the bounds for the current
//! zoom, so an out-of-bounds pan is never observable.

use egui::Vec2;

use crate::geometry::{clamp_zoom, ImageSize, PanBounds, FIT_ZOOM};

/// Wheel pan distance is `points * wheel_pan_speed / WHEEL_PAN_DIVISOR / zoom`.
pub const WHEEL_PAN_DIVISOR: f32 = 10.0;

/// Load status of the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Waiting for the image to resolve.
    #[default]
    Pending,
    /// Natural size known.
    Ready(ImageSize),
    /// The load failed. The session behaves as loaded with an unknown size,
    /// which disables panning but keeps navigation and close working.
    Failed,
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }

    /// Natural size, only trusted once loaded. [`ImageSize::ZERO`] otherwise.
    pub fn natural_size(&self) -> ImageSize {
        match self {
            LoadState::Ready(size) => *size,
            LoadState::Pending | LoadState::Failed => ImageSize::ZERO,
        }
    }
}

/// Tag attached to every load request.
///
/// A result is only applied when its ticket still matches the session: same
/// index and no index change since the request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub index: usize,
    generation: u64,
}

/// Mutable state of one open lightbox.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    current_index: usize,
    zoom: f32,
    pan: Vec2,
    rotation: i32,
    dragging: bool,
    load: LoadState,
    viewport: Vec2,
    generation: u64,
}

impl ViewerSession {
    /// Start a fresh session on `index` with an image area of `viewport` pixels.
    pub fn new(index: usize, viewport: Vec2) -> Self {
        Self::with_generation(index, viewport, 0)
    }

    /// Like [`ViewerSession::new`], with tickets starting at `generation`.
    ///
    /// A host that opens several sessions over the same loader seeds each one
    /// past the last generation of the previous, so outcomes still queued
    /// from a closed session never match.
    pub fn with_generation(index: usize, viewport: Vec2, generation: u64) -> Self {
        Self {
            current_index: index,
            zoom: FIT_ZOOM,
            pan: Vec2::ZERO,
            rotation: 0,
            dragging: false,
            load: LoadState::Pending,
            viewport: sanitize_viewport(viewport),
            generation,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Accumulated rotation in degrees. Not normalized.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_loaded(&self) -> bool {
        self.load.is_loaded()
    }

    pub fn natural_size(&self) -> ImageSize {
        self.load.natural_size()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Generation of the current ticket. Grows by one per index change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket for a load of the current index.
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket {
            index: self.current_index,
            generation: self.generation,
        }
    }

    /// Pan bounds at the current zoom. Rotation is not taken into account.
    pub fn bounds(&self) -> PanBounds {
        PanBounds::compute(self.natural_size(), self.zoom, self.viewport)
    }

    /// Multiply the zoom by `factor` (divide by passing its reciprocal).
    pub fn scale_zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.set_zoom(self.zoom * factor);
    }

    /// One discrete zoom-in step.
    pub fn zoom_in(&mut self, step: f32) {
        self.scale_zoom(step);
    }

    /// One discrete zoom-out step.
    pub fn zoom_out(&mut self, step: f32) {
        if step > 0.0 {
            self.scale_zoom(1.0 / step);
        }
    }

    /// Set an absolute zoom, clamped into range.
    pub fn set_zoom(&mut self, value: f32) {
        self.zoom = clamp_zoom(value);
        self.reclamp();
    }

    /// Move the image by `delta` pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.pan += delta;
        self.reclamp();
    }

    /// Pan from a wheel delta in points. The distance shrinks as zoom grows so
    /// a wheel notch covers a similar part of the picture at any magnification.
    pub fn pan_by_wheel(&mut self, delta: Vec2, pan_speed: f32) {
        self.pan_by(delta * (pan_speed / WHEEL_PAN_DIVISOR) / self.zoom);
    }

    /// Rotate clockwise by a quarter turn.
    pub fn rotate(&mut self) {
        self.rotation = self.rotation.wrapping_add(90);
    }

    /// Back to fit zoom, centred, unrotated.
    pub fn reset(&mut self) {
        self.zoom = FIT_ZOOM;
        self.pan = Vec2::ZERO;
        self.rotation = 0;
    }

    /// Switch to `index`: reset the transform and forget the previous image.
    ///
    /// Returns the ticket the caller must use for the new load request. Any
    /// ticket issued before this call is stale from now on.
    pub fn reset_on_index_change(&mut self, index: usize) -> LoadTicket {
        self.reset();
        self.dragging = false;
        self.current_index = index;
        self.load = LoadState::Pending;
        self.generation = self.generation.wrapping_add(1);
        self.ticket()
    }

    /// Track the size of the image area.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        let viewport = sanitize_viewport(viewport);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.reclamp();
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Apply a load result. `None` means the load failed.
    ///
    /// Returns `false` and leaves the session untouched when the ticket is
    /// stale.
    pub fn apply_load(&mut self, ticket: LoadTicket, size: Option<ImageSize>) -> bool {
        if ticket != self.ticket() {
            return false;
        }
        self.load = match size {
            Some(size) => LoadState::Ready(size),
            None => LoadState::Failed,
        };
        self.reclamp();
        true
    }

    fn reclamp(&mut self) {
        self.pan = self.bounds().clamp(self.pan);
    }
}

fn sanitize_viewport(viewport: Vec2) -> Vec2 {
    if viewport.is_finite() {
        viewport.max(Vec2::ZERO)
    } else {
        Vec2::ZERO
    }
}
