//! Pan bounds and zoom limits.
//!
//! The image is drawn at `natural size * zoom`, centred in the image area and
//! displaced by the pan offset. Panning is only possible along an axis where
//! the scaled image is larger than the image area, and never far enough to
//! expose empty space past the image edge.

use egui::Vec2;

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f32 = 5.0;
/// Fit zoom. Reset and index changes return here.
pub const FIT_ZOOM: f32 = 1.0;

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`.
///
/// Infinities saturate at the limits; NaN maps to [`FIT_ZOOM`].
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        FIT_ZOOM
    } else {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Intrinsic pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Unknown size: used before a load resolves and after a failed load.
    pub const ZERO: Self = Self { width: 0, height: 0 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are non-zero.
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Size of the image on screen at the given zoom.
    pub fn scaled(self, zoom: f32) -> Vec2 {
        self.to_vec2() * zoom
    }
}

/// Maximum pan magnitude along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBounds {
    pub max_x: f32,
    pub max_y: f32,
}

impl PanBounds {
    /// No panning allowed on either axis.
    pub const NONE: Self = Self { max_x: 0.0, max_y: 0.0 };

    /// Bounds for an image of `natural` size shown at `zoom` inside a
    /// `viewport`-sized area.
    ///
    /// Returns [`PanBounds::NONE`] while the natural size is unknown.
    pub fn compute(natural: ImageSize, zoom: f32, viewport: Vec2) -> Self {
        if !natural.is_known() {
            return Self::NONE;
        }
        let scaled = natural.scaled(zoom);
        Self {
            max_x: ((scaled.x - viewport.x) / 2.0).max(0.0),
            max_y: ((scaled.y - viewport.y) / 2.0).max(0.0),
        }
    }

    /// Clamp a candidate pan offset into these bounds, per axis.
    pub fn clamp(&self, candidate: Vec2) -> Vec2 {
        Vec2::new(
            clamp_axis(candidate.x, self.max_x),
            clamp_axis(candidate.y, self.max_y),
        )
    }

    pub fn contains(&self, pan: Vec2) -> bool {
        pan.x.abs() <= self.max_x && pan.y.abs() <= self.max_y
    }
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-max, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_size_forbids_panning() {
        let bounds = PanBounds::compute(ImageSize::ZERO, 3.0, Vec2::new(800.0, 600.0));
        assert_eq!(bounds, PanBounds::NONE);

        let half_known = PanBounds::compute(ImageSize::new(4000, 0), 3.0, Vec2::new(800.0, 600.0));
        assert_eq!(half_known, PanBounds::NONE);
    }

    #[test]
    fn bounds_follow_scaled_overflow() {
        let bounds = PanBounds::compute(
            ImageSize::new(2000, 1000),
            2.0,
            Vec2::new(1000.0, 800.0),
        );
        assert_eq!(bounds.max_x, 1500.0);
        assert_eq!(bounds.max_y, 600.0);
        assert_eq!(bounds.clamp(Vec2::new(9999.0, 9999.0)), Vec2::new(1500.0, 600.0));
        assert_eq!(bounds.clamp(Vec2::new(-9999.0, -9999.0)), Vec2::new(-1500.0, -600.0));
    }

    #[test]
    fn axis_smaller_than_viewport_is_locked() {
        // Wide panorama: overflows horizontally only.
        let bounds = PanBounds::compute(ImageSize::new(3000, 400), 1.0, Vec2::new(1000.0, 800.0));
        assert_eq!(bounds.max_x, 1000.0);
        assert_eq!(bounds.max_y, 0.0);
        assert_eq!(bounds.clamp(Vec2::new(250.0, 250.0)), Vec2::new(250.0, 0.0));
    }

    #[test]
    fn nan_candidate_clamps_to_centre() {
        let bounds = PanBounds { max_x: 10.0, max_y: 10.0 };
        assert_eq!(bounds.clamp(Vec2::new(f32::NAN, 4.0)), Vec2::new(0.0, 4.0));
    }

    #[test]
    fn zoom_clamp_limits() {
        assert_eq!(clamp_zoom(0.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(-3.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(100.0), MAX_ZOOM);
        assert_eq!(clamp_zoom(2.5), 2.5);
        assert_eq!(clamp_zoom(f32::INFINITY), MAX_ZOOM);
        assert_eq!(clamp_zoom(f32::NEG_INFINITY), MIN_ZOOM);
        assert_eq!(clamp_zoom(f32::NAN), FIT_ZOOM);
    }
}
