//! Input adapters.
//!
//! Turns raw egui events into viewer [`Command`]s:
//! - Keyboard shortcuts through the configured bindings
//! - Mouse wheel panning, Ctrl/Cmd + wheel zoom, pinch zoom
//! - Pointer drag to pan
//!
//! Keyboard and wheel events that map to a command are claimed: they are
//! not handed back to the caller, so nothing behind the lightbox sees them.
//! Pointer events are only observed.

use egui::{Event, Key, Modifiers, MouseWheelUnit, Pos2, Vec2};

use crate::config::{Action, Config, InputBinding};

/// Points per wheel line. Matches egui's own scroll conversion.
const POINTS_PER_LINE: f32 = 40.0;

/// A single viewer operation produced by input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Close,
    Next,
    Previous,
    /// One discrete step in.
    ZoomIn,
    /// One discrete step out.
    ZoomOut,
    /// Continuous zoom by a multiplicative factor.
    ZoomBy(f32),
    ResetZoom,
    Rotate,
    /// Pan by pixels.
    PanBy(Vec2),
    /// Pan by wheel points, scaled by pan speed and zoom when applied.
    WheelPan(Vec2),
    BeginDrag,
    EndDrag,
}

/// Map a key press to a command.
pub fn key_command(key: Key, modifiers: Modifiers, config: &Config) -> Option<Command> {
    let action = config.action_for(&InputBinding::from_key(key, modifiers))?;
    let step = config.key_pan_step;
    Some(match action {
        Action::Close => Command::Close,
        Action::NextImage => Command::Next,
        Action::PreviousImage => Command::Previous,
        Action::ZoomIn => Command::ZoomIn,
        Action::ZoomOut => Command::ZoomOut,
        Action::ResetZoom => Command::ResetZoom,
        Action::Rotate => Command::Rotate,
        Action::PanLeft => Command::PanBy(Vec2::new(-step, 0.0)),
        Action::PanRight => Command::PanBy(Vec2::new(step, 0.0)),
        Action::PanUp => Command::PanBy(Vec2::new(0.0, -step)),
        Action::PanDown => Command::PanBy(Vec2::new(0.0, step)),
    })
}

/// Map a wheel event to a command.
///
/// `page_height` converts page-unit deltas into points. Positive `delta.y`
/// means the wheel was rolled away from the user.
pub fn wheel_command(
    unit: MouseWheelUnit,
    delta: Vec2,
    modifiers: Modifiers,
    page_height: f32,
    config: &Config,
) -> Option<Command> {
    let points = match unit {
        MouseWheelUnit::Point => delta,
        MouseWheelUnit::Line => delta * POINTS_PER_LINE,
        MouseWheelUnit::Page => delta * page_height,
    };
    if !points.is_finite() {
        return None;
    }

    if modifiers.ctrl || modifiers.command {
        if points.y > 0.0 {
            return Some(Command::ZoomBy(config.wheel_zoom_in));
        } else if points.y < 0.0 {
            return Some(Command::ZoomBy(config.wheel_zoom_out));
        }
        return None;
    }

    if points == Vec2::ZERO {
        return None;
    }

    if modifiers.shift {
        // Redirect the vertical wheel to horizontal pan.
        Some(Command::WheelPan(Vec2::new(points.x + points.y, 0.0)))
    } else {
        Some(Command::WheelPan(points))
    }
}

/// Result of processing one frame of events.
#[derive(Debug, Default)]
pub struct Processed {
    pub commands: Vec<Command>,
    /// Events that were not claimed, in their original order.
    pub passthrough: Vec<Event>,
}

/// Pointer-drag tracking across frames.
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Last pointer position seen (for drag delta)
    last_pointer: Option<Pos2>,
    /// Whether a drag gesture is active
    dragging: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Forget any gesture in progress.
    pub fn reset(&mut self) {
        self.dragging = false;
        self.last_pointer = None;
    }

    /// Process a frame of events.
    ///
    /// `on_image` says whether a pointer position lies on the draggable image
    /// (and not on a control drawn above it).
    pub fn process(
        &mut self,
        events: Vec<Event>,
        config: &Config,
        page_height: f32,
        on_image: impl Fn(Pos2) -> bool,
    ) -> Processed {
        let mut out = Processed::default();

        for event in events {
            match &event {
                Event::Key {
                    key,
                    pressed,
                    modifiers,
                    ..
                } => {
                    if let Some(command) = key_command(*key, *modifiers, config) {
                        // Claim both press and release of a bound key.
                        if *pressed {
                            out.commands.push(command);
                        }
                        continue;
                    }
                }
                Event::MouseWheel {
                    unit,
                    delta,
                    modifiers,
                } => {
                    if let Some(command) = wheel_command(*unit, *delta, *modifiers, page_height, config) {
                        out.commands.push(command);
                    }
                    // No wheel event reaches the page while the viewer is open.
                    continue;
                }
                Event::Zoom(factor) => {
                    if factor.is_finite() && *factor > 0.0 && *factor != 1.0 {
                        out.commands.push(Command::ZoomBy(*factor));
                    }
                    continue;
                }
                Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if on_image(*pos) && !self.dragging {
                            self.dragging = true;
                            out.commands.push(Command::BeginDrag);
                        }
                    } else if self.dragging {
                        self.dragging = false;
                        out.commands.push(Command::EndDrag);
                    }
                    self.last_pointer = Some(*pos);
                }
                Event::PointerMoved(pos) => {
                    if self.dragging {
                        if let Some(last) = self.last_pointer {
                            let delta = *pos - last;
                            if delta != Vec2::ZERO {
                                out.commands.push(Command::PanBy(delta));
                            }
                        }
                    }
                    self.last_pointer = Some(*pos);
                }
                Event::PointerGone => {
                    if self.dragging {
                        self.dragging = false;
                        out.commands.push(Command::EndDrag);
                    }
                    self.last_pointer = None;
                }
                _ => {}
            }
            out.passthrough.push(event);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, modifiers: Modifiers) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    fn wheel(delta: Vec2, modifiers: Modifiers) -> Event {
        Event::MouseWheel {
            unit: MouseWheelUnit::Point,
            delta,
            modifiers,
        }
    }

    fn press(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn everywhere(_: Pos2) -> bool {
        true
    }

    #[test]
    fn keyboard_surface() {
        let config = Config::default();
        let none = Modifiers::NONE;
        let shift = Modifiers::SHIFT;
        assert_eq!(key_command(Key::Escape, none, &config), Some(Command::Close));
        assert_eq!(key_command(Key::ArrowLeft, none, &config), Some(Command::Previous));
        assert_eq!(key_command(Key::ArrowRight, none, &config), Some(Command::Next));
        assert_eq!(key_command(Key::Plus, none, &config), Some(Command::ZoomIn));
        assert_eq!(key_command(Key::Equals, shift, &config), Some(Command::ZoomIn));
        assert_eq!(key_command(Key::Minus, none, &config), Some(Command::ZoomOut));
        assert_eq!(key_command(Key::Num0, none, &config), Some(Command::ResetZoom));
        assert_eq!(key_command(Key::R, shift, &config), Some(Command::Rotate));
        assert_eq!(key_command(Key::Q, none, &config), None);
    }

    #[test]
    fn shift_arrows_pan_instead_of_navigating() {
        let config = Config::default();
        let shift = Modifiers::SHIFT;
        assert_eq!(key_command(Key::ArrowLeft, shift, &config), Some(Command::PanBy(Vec2::new(-30.0, 0.0))));
        assert_eq!(key_command(Key::ArrowRight, shift, &config), Some(Command::PanBy(Vec2::new(30.0, 0.0))));
        assert_eq!(key_command(Key::ArrowUp, shift, &config), Some(Command::PanBy(Vec2::new(0.0, -30.0))));
        assert_eq!(key_command(Key::ArrowDown, shift, &config), Some(Command::PanBy(Vec2::new(0.0, 30.0))));
    }

    #[test]
    fn wheel_modes() {
        let config = Config::default();
        let ctrl = Modifiers::CTRL;
        let up = Vec2::new(0.0, 50.0);
        let down = Vec2::new(0.0, -50.0);

        assert_eq!(wheel_command(MouseWheelUnit::Point, up, ctrl, 600.0, &config), Some(Command::ZoomBy(1.1)));
        assert_eq!(wheel_command(MouseWheelUnit::Point, down, ctrl, 600.0, &config), Some(Command::ZoomBy(0.9)));
        assert_eq!(wheel_command(MouseWheelUnit::Point, Vec2::ZERO, ctrl, 600.0, &config), None);

        assert_eq!(
            wheel_command(MouseWheelUnit::Point, down, Modifiers::NONE, 600.0, &config),
            Some(Command::WheelPan(down))
        );
        assert_eq!(
            wheel_command(MouseWheelUnit::Point, down, Modifiers::SHIFT, 600.0, &config),
            Some(Command::WheelPan(Vec2::new(-50.0, 0.0)))
        );
        assert_eq!(
            wheel_command(MouseWheelUnit::Line, Vec2::new(0.0, -1.0), Modifiers::NONE, 600.0, &config),
            Some(Command::WheelPan(Vec2::new(0.0, -40.0)))
        );
        assert_eq!(
            wheel_command(MouseWheelUnit::Page, Vec2::new(0.0, 1.0), Modifiers::NONE, 600.0, &config),
            Some(Command::WheelPan(Vec2::new(0.0, 600.0)))
        );
    }

    #[test]
    fn claimed_events_are_removed() {
        let config = Config::default();
        let mut handler = InputHandler::new();
        let events = vec![
            key(Key::Escape, Modifiers::NONE),
            key(Key::Q, Modifiers::NONE),
            wheel(Vec2::new(0.0, 10.0), Modifiers::NONE),
            Event::Text("q".to_owned()),
        ];
        let processed = handler.process(events, &config, 600.0, everywhere);
        assert_eq!(
            processed.commands,
            vec![Command::Close, Command::WheelPan(Vec2::new(0.0, 10.0))]
        );
        assert_eq!(processed.passthrough.len(), 2);
        assert!(matches!(processed.passthrough[0], Event::Key { key: Key::Q, .. }));
        assert!(matches!(processed.passthrough[1], Event::Text(_)));
    }

    #[test]
    fn key_release_is_claimed_without_command() {
        let config = Config::default();
        let mut handler = InputHandler::new();
        let release = Event::Key {
            key: Key::Escape,
            physical_key: None,
            pressed: false,
            repeat: false,
            modifiers: Modifiers::NONE,
        };
        let processed = handler.process(vec![release], &config, 600.0, everywhere);
        assert!(processed.commands.is_empty());
        assert!(processed.passthrough.is_empty());
    }

    #[test]
    fn drag_gesture() {
        let config = Config::default();
        let mut handler = InputHandler::new();
        let events = vec![
            Event::PointerMoved(Pos2::new(100.0, 100.0)),
            press(Pos2::new(100.0, 100.0), true),
            Event::PointerMoved(Pos2::new(110.0, 95.0)),
            Event::PointerMoved(Pos2::new(130.0, 95.0)),
            press(Pos2::new(130.0, 95.0), false),
            Event::PointerMoved(Pos2::new(200.0, 200.0)),
        ];
        let processed = handler.process(events, &config, 600.0, everywhere);
        assert_eq!(
            processed.commands,
            vec![
                Command::BeginDrag,
                Command::PanBy(Vec2::new(10.0, -5.0)),
                Command::PanBy(Vec2::new(20.0, 0.0)),
                Command::EndDrag,
            ]
        );
        // Pointer events stay visible to widgets.
        assert_eq!(processed.passthrough.len(), 6);
        assert!(!handler.is_dragging());
    }

    #[test]
    fn drag_continues_across_frames_and_ends_on_leave() {
        let config = Config::default();
        let mut handler = InputHandler::new();
        handler.process(vec![press(Pos2::new(5.0, 5.0), true)], &config, 600.0, everywhere);
        assert!(handler.is_dragging());

        let processed = handler.process(
            vec![Event::PointerMoved(Pos2::new(8.0, 9.0)), Event::PointerGone],
            &config,
            600.0,
            everywhere,
        );
        assert_eq!(
            processed.commands,
            vec![Command::PanBy(Vec2::new(3.0, 4.0)), Command::EndDrag]
        );
        assert!(!handler.is_dragging());
    }

    #[test]
    fn press_off_image_does_not_drag() {
        let config = Config::default();
        let mut handler = InputHandler::new();
        let processed = handler.process(
            vec![press(Pos2::new(5.0, 5.0), true), Event::PointerMoved(Pos2::new(50.0, 50.0))],
            &config,
            600.0,
            |_| false,
        );
        assert!(processed.commands.is_empty());
    }

    #[test]
    fn pinch_zoom() {
        let config = Config::default();
        let mut handler = InputHandler::new();
        let processed = handler.process(
            vec![Event::Zoom(1.25), Event::Zoom(1.0), Event::Zoom(f32::NAN)],
            &config,
            600.0,
            everywhere,
        );
        assert_eq!(processed.commands, vec![Command::ZoomBy(1.25)]);
        assert!(processed.passthrough.is_empty());
    }
}
