//! Lightbox overlay: backdrop, image, controls and HUD.
//!
//! Layout is computed by small pure functions so hit testing can reuse it on
//! the next frame; [`draw`] paints one frame and reports the control clicks
//! as [`Command`]s.

use egui::{Align2, Color32, CursorIcon, FontId, Pos2, Rect, Sense, Vec2};

use crate::config::Config;
use crate::gallery::ImageRecord;
use crate::input::Command;
use crate::session::{LoadState, ViewerSession};

const BUTTON_SIZE: Vec2 = Vec2::new(40.0, 40.0);
const BUTTON_GAP: f32 = 8.0;
const EDGE_MARGIN: f32 = 16.0;
const ARROW_SIZE: Vec2 = Vec2::new(48.0, 64.0);

/// Area the image is laid out in: the screen inset by `padding`.
pub fn image_area(screen: Rect, padding: f32) -> Rect {
    let padding = padding.max(0.0);
    let size = (screen.size() - Vec2::splat(padding * 2.0)).max(Vec2::ZERO);
    Rect::from_center_size(screen.center(), size)
}

/// On-screen rectangle of the unrotated image.
pub fn image_rect(area: Rect, session: &ViewerSession) -> Rect {
    let size = session.natural_size().scaled(session.zoom());
    Rect::from_center_size(area.center() + session.pan(), size)
}

/// Bounding box of the image as drawn, taking quarter turns into account.
pub fn rotated_bounds(rect: Rect, rotation: i32) -> Rect {
    if rotation.rem_euclid(180) == 90 {
        Rect::from_center_size(rect.center(), Vec2::new(rect.height(), rect.width()))
    } else {
        rect
    }
}

/// "150%", or `None` at fit zoom.
pub fn zoom_label(zoom: f32) -> Option<String> {
    if zoom == 1.0 {
        None
    } else {
        Some(format!("{}%", (zoom * 100.0).round() as i32))
    }
}

/// "3 / 12", or `None` for a single image.
pub fn counter_label(index: usize, len: usize) -> Option<String> {
    (len > 1).then(|| format!("{} / {}", index + 1, len))
}

/// Positions of the clickable controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeLayout {
    pub zoom_out: Rect,
    pub zoom_in: Rect,
    pub rotate: Rect,
    pub close: Rect,
    pub previous: Option<Rect>,
    pub next: Option<Rect>,
}

impl ChromeLayout {
    pub fn compute(screen: Rect, show_arrows: bool) -> Self {
        let top = screen.top() + EDGE_MARGIN;
        let button = |slot: f32| {
            let right = screen.right() - EDGE_MARGIN - slot * (BUTTON_SIZE.x + BUTTON_GAP);
            Rect::from_min_size(Pos2::new(right - BUTTON_SIZE.x, top), BUTTON_SIZE)
        };
        let arrow = |x: f32| Rect::from_center_size(Pos2::new(x, screen.center().y), ARROW_SIZE);

        Self {
            close: button(0.0),
            rotate: button(1.0),
            zoom_in: button(2.0),
            zoom_out: button(3.0),
            previous: show_arrows.then(|| arrow(screen.left() + EDGE_MARGIN + ARROW_SIZE.x / 2.0)),
            next: show_arrows.then(|| arrow(screen.right() - EDGE_MARGIN - ARROW_SIZE.x / 2.0)),
        }
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        [self.zoom_out, self.zoom_in, self.rotate, self.close]
            .into_iter()
            .chain(self.previous)
            .chain(self.next)
            .any(|r| r.contains(pos))
    }
}

/// What the frame's drawing produced.
#[derive(Debug)]
pub struct FrameOutput {
    /// Commands from clicked controls.
    pub commands: Vec<Command>,
    /// Where the image was drawn, for drag hit testing next frame.
    pub image_bounds: Rect,
    pub chrome: ChromeLayout,
}

/// Everything needed to paint one frame.
pub struct FrameView<'a> {
    pub config: &'a Config,
    pub record: &'a ImageRecord,
    pub session: &'a ViewerSession,
    pub texture: Option<&'a egui::TextureHandle>,
    pub len: usize,
}

/// Paint the lightbox over everything else.
pub fn draw(ctx: &egui::Context, view: FrameView<'_>) -> FrameOutput {
    let screen = ctx.screen_rect();
    let area = image_area(screen, view.config.viewport_padding);
    let chrome = ChromeLayout::compute(screen, view.len > 1);
    let image_bounds = if view.session.natural_size().is_known() {
        rotated_bounds(image_rect(area, view.session), view.session.rotation())
    } else {
        area
    };
    let mut commands = Vec::new();

    egui::Area::new(egui::Id::new("lightbox_overlay"))
        .order(egui::Order::Foreground)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            ui.set_clip_rect(screen);
            // Swallow clicks so nothing behind the backdrop reacts.
            let _backdrop = ui.allocate_rect(screen, Sense::click_and_drag());
            let painter = ui.painter_at(screen);
            painter.rect_filled(screen, 0.0, view.config.background_color32(view.config.backdrop_opacity));

            match (view.session.load_state(), view.texture) {
                (LoadState::Ready(_), Some(texture)) => {
                    let angle = (view.session.rotation().rem_euclid(360) as f32).to_radians();
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                        .rotate(angle, Vec2::splat(0.5))
                        .paint_at(ui, image_rect(area, view.session));
                }
                (LoadState::Failed, _) => {
                    painter.text(
                        area.center(),
                        Align2::CENTER_CENTER,
                        "Image could not be loaded",
                        FontId::proportional(18.0),
                        Color32::from_gray(160),
                    );
                }
                _ => {
                    ui.put(
                        Rect::from_center_size(area.center(), Vec2::splat(48.0)),
                        egui::Spinner::new().size(48.0),
                    );
                }
            }

            if view.config.show_info_panel {
                paint_info(&painter, screen, view.record);
            }
            if let Some(counter) = counter_label(view.session.current_index(), view.len) {
                painter.text(
                    Pos2::new(screen.left() + EDGE_MARGIN, screen.top() + EDGE_MARGIN),
                    Align2::LEFT_TOP,
                    counter,
                    FontId::proportional(16.0),
                    Color32::from_gray(220),
                );
            }
            if let Some(zoom) = zoom_label(view.session.zoom()) {
                painter.text(
                    Pos2::new(screen.right() - EDGE_MARGIN, screen.bottom() - EDGE_MARGIN),
                    Align2::RIGHT_BOTTOM,
                    zoom,
                    FontId::monospace(14.0),
                    Color32::from_gray(220),
                );
            }

            let buttons = [
                (chrome.zoom_out, "➖", "Zoom out", Command::ZoomOut),
                (chrome.zoom_in, "➕", "Zoom in", Command::ZoomIn),
                (chrome.rotate, "⟳", "Rotate", Command::Rotate),
                (chrome.close, "❌", "Close", Command::Close),
            ];
            for (rect, icon, hint, command) in buttons {
                if ui.put(rect, egui::Button::new(icon)).on_hover_text(hint).clicked() {
                    commands.push(command);
                }
            }
            if let Some(rect) = chrome.previous {
                if ui.put(rect, egui::Button::new("⏴")).on_hover_text("Previous").clicked() {
                    commands.push(Command::Previous);
                }
            }
            if let Some(rect) = chrome.next {
                if ui.put(rect, egui::Button::new("⏵")).on_hover_text("Next").clicked() {
                    commands.push(Command::Next);
                }
            }
        });

    let hover = ctx.input(|i| i.pointer.hover_pos());
    if view.session.is_dragging() {
        ctx.set_cursor_icon(CursorIcon::Grabbing);
    } else if hover.is_some_and(|pos| image_bounds.contains(pos) && !chrome.contains(pos)) {
        ctx.set_cursor_icon(CursorIcon::Grab);
    }

    FrameOutput {
        commands,
        image_bounds,
        chrome,
    }
}

fn paint_info(painter: &egui::Painter, screen: Rect, record: &ImageRecord) {
    let mut lines: Vec<(String, FontId, Color32)> = Vec::new();
    lines.push((record.title.clone(), FontId::proportional(20.0), Color32::WHITE));

    let details: Vec<String> = [
        record.dimensions.clone(),
        record.megapixels.clone(),
        record.year.map(|y| y.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !details.is_empty() {
        lines.push((details.join("  ·  "), FontId::proportional(13.0), Color32::from_gray(170)));
    }
    if let Some(description) = &record.description {
        lines.push((description.clone(), FontId::proportional(14.0), Color32::from_gray(200)));
    }

    // Bottom-up so the title sits above the details.
    let mut y = screen.bottom() - EDGE_MARGIN;
    for (text, font, color) in lines.into_iter().rev() {
        let rect = painter.text(Pos2::new(screen.left() + EDGE_MARGIN, y), Align2::LEFT_BOTTOM, text, font, color);
        y = rect.top() - 4.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ImageSize;

    fn screen() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(1128.0, 928.0))
    }

    #[test]
    fn image_area_is_inset_and_never_negative() {
        let area = image_area(screen(), 64.0);
        assert_eq!(area.size(), Vec2::new(1000.0, 800.0));
        assert_eq!(area.center(), screen().center());

        let tiny = image_area(Rect::from_min_size(Pos2::ZERO, Vec2::new(50.0, 50.0)), 64.0);
        assert_eq!(tiny.size(), Vec2::ZERO);
    }

    #[test]
    fn image_rect_follows_zoom_and_pan() {
        let area = image_area(screen(), 64.0);
        let mut session = ViewerSession::new(0, area.size());
        let ticket = session.ticket();
        session.apply_load(ticket, Some(ImageSize::new(2000, 1000)));
        session.set_zoom(2.0);
        session.pan_by(Vec2::new(100.0, -50.0));

        let rect = image_rect(area, &session);
        assert_eq!(rect.size(), Vec2::new(4000.0, 2000.0));
        assert_eq!(rect.center(), area.center() + Vec2::new(100.0, -50.0));
    }

    #[test]
    fn quarter_turns_swap_bounds() {
        let rect = Rect::from_center_size(Pos2::new(10.0, 10.0), Vec2::new(40.0, 20.0));
        assert_eq!(rotated_bounds(rect, 90).size(), Vec2::new(20.0, 40.0));
        assert_eq!(rotated_bounds(rect, 180).size(), Vec2::new(40.0, 20.0));
        assert_eq!(rotated_bounds(rect, 450).size(), Vec2::new(20.0, 40.0));
        assert_eq!(rotated_bounds(rect, -90).size(), Vec2::new(20.0, 40.0));
    }

    #[test]
    fn hud_labels() {
        assert_eq!(zoom_label(1.0), None);
        assert_eq!(zoom_label(1.2), Some("120%".to_owned()));
        assert_eq!(zoom_label(0.1), Some("10%".to_owned()));
        assert_eq!(counter_label(0, 1), None);
        assert_eq!(counter_label(2, 12), Some("3 / 12".to_owned()));
    }

    #[test]
    fn arrows_only_for_several_images() {
        let single = ChromeLayout::compute(screen(), false);
        assert!(single.previous.is_none() && single.next.is_none());

        let many = ChromeLayout::compute(screen(), true);
        let next = many.next.unwrap();
        assert!(many.contains(next.center()));
        assert!(many.contains(many.close.center()));
        assert!(!many.contains(screen().center()));
        assert!(many.close.right() <= screen().right());
        assert!(many.zoom_out.left() < many.zoom_in.left());
    }
}
