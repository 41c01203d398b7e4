//! Configuration: lightbox tuning values and keyboard shortcuts.
//!
//! Stored as an INI file in the platform config directory. A missing file is
//! created from the embedded template, unknown keys are ignored and values
//! outside their range are clamped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info, warn};

use crate::error::ConfigError;

const DEFAULT_CONFIG_INI: &str = include_str!("../config.ini");

/// A keyboard shortcut, optionally with one modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    Key(egui::Key),
    KeyWithCtrl(egui::Key),
    KeyWithShift(egui::Key),
    KeyWithAlt(egui::Key),
}

impl InputBinding {
    /// Binding for a key pressed with the given modifiers.
    ///
    /// Ctrl (or Cmd) wins over Shift, which wins over Alt.
    pub fn from_key(key: egui::Key, modifiers: egui::Modifiers) -> Self {
        if modifiers.ctrl || modifiers.command {
            InputBinding::KeyWithCtrl(key)
        } else if modifiers.shift {
            InputBinding::KeyWithShift(key)
        } else if modifiers.alt {
            InputBinding::KeyWithAlt(key)
        } else {
            InputBinding::Key(key)
        }
    }
}

/// Everything a shortcut can trigger while the lightbox is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Close,
    NextImage,
    PreviousImage,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Rotate,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::Close,
        Action::NextImage,
        Action::PreviousImage,
        Action::ZoomIn,
        Action::ZoomOut,
        Action::ResetZoom,
        Action::Rotate,
        Action::PanLeft,
        Action::PanRight,
        Action::PanUp,
        Action::PanDown,
    ];

    pub fn from_str(s: &str) -> Option<Action> {
        match s.trim().to_lowercase().as_str() {
            "close" | "exit" => Some(Action::Close),
            "next_image" | "next" => Some(Action::NextImage),
            "previous_image" | "previous" | "prev" => Some(Action::PreviousImage),
            "zoom_in" => Some(Action::ZoomIn),
            "zoom_out" => Some(Action::ZoomOut),
            "reset_zoom" | "reset" => Some(Action::ResetZoom),
            "rotate" | "rotate_clockwise" | "rotate_cw" => Some(Action::Rotate),
            "pan_left" => Some(Action::PanLeft),
            "pan_right" => Some(Action::PanRight),
            "pan_up" => Some(Action::PanUp),
            "pan_down" => Some(Action::PanDown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Close => "close",
            Action::NextImage => "next_image",
            Action::PreviousImage => "previous_image",
            Action::ZoomIn => "zoom_in",
            Action::ZoomOut => "zoom_out",
            Action::ResetZoom => "reset_zoom",
            Action::Rotate => "rotate",
            Action::PanLeft => "pan_left",
            Action::PanRight => "pan_right",
            Action::PanUp => "pan_up",
            Action::PanDown => "pan_down",
        }
    }
}

/// Parse a binding such as `escape`, `shift+arrowleft` or `ctrl+0`.
pub fn parse_input_binding(s: &str) -> Option<InputBinding> {
    let s = s.trim().to_lowercase();

    if let Some(key_str) = s.strip_prefix("ctrl+").or_else(|| s.strip_prefix("cmd+")) {
        return parse_key(key_str).map(InputBinding::KeyWithCtrl);
    }
    if let Some(key_str) = s.strip_prefix("shift+") {
        return parse_key(key_str).map(InputBinding::KeyWithShift);
    }
    if let Some(key_str) = s.strip_prefix("alt+") {
        return parse_key(key_str).map(InputBinding::KeyWithAlt);
    }

    parse_key(&s).map(InputBinding::Key)
}

fn parse_key(s: &str) -> Option<egui::Key> {
    use egui::Key;

    let key = match s.trim() {
        "escape" | "esc" => Key::Escape,
        "enter" | "return" => Key::Enter,
        "space" | "spacebar" => Key::Space,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "page_up" => Key::PageUp,
        "pagedown" | "page_down" => Key::PageDown,
        "left" | "arrow_left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrow_right" | "arrowright" => Key::ArrowRight,
        "up" | "arrow_up" | "arrowup" => Key::ArrowUp,
        "down" | "arrow_down" | "arrowdown" => Key::ArrowDown,
        "plus" | "+" => Key::Plus,
        "equals" | "=" => Key::Equals,
        "minus" | "-" => Key::Minus,
        "0" | "num0" => Key::Num0,
        "1" | "num1" => Key::Num1,
        "2" | "num2" => Key::Num2,
        "3" | "num3" => Key::Num3,
        "4" | "num4" => Key::Num4,
        "5" | "num5" => Key::Num5,
        "6" | "num6" => Key::Num6,
        "7" | "num7" => Key::Num7,
        "8" | "num8" => Key::Num8,
        "9" | "num9" => Key::Num9,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        other => return parse_letter(other),
    };
    Some(key)
}

fn parse_letter(s: &str) -> Option<egui::Key> {
    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() || !c.is_ascii_alphabetic() {
        return None;
    }
    egui::Key::from_name(&c.to_ascii_uppercase().to_string())
}

/// Lightbox configuration loaded from INI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Map from input binding to action
    pub bindings: HashMap<InputBinding, Action>,
    /// Reverse map for looking up bindings for an action
    pub action_bindings: HashMap<Action, Vec<InputBinding>>,
    /// Multiplier for one discrete zoom step (1.2 = 20%)
    pub zoom_step: f32,
    /// Ctrl/Cmd + wheel zoom factor when scrolling up
    pub wheel_zoom_in: f32,
    /// Ctrl/Cmd + wheel zoom factor when scrolling down
    pub wheel_zoom_out: f32,
    /// Plain wheel pan speed, see [`crate::session::WHEEL_PAN_DIVISOR`]
    pub wheel_pan_speed: f32,
    /// Shift + arrow pan distance in pixels
    pub key_pan_step: f32,
    /// Inset of the image area from the window edges
    pub viewport_padding: f32,
    /// Backdrop colour as RGB (0-255)
    pub background_rgb: [u8; 3],
    /// Backdrop alpha (0.0 to 1.0)
    pub backdrop_opacity: f32,
    /// Draw the title / dimensions / description panel
    pub show_info_panel: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self::without_bindings();
        config.set_defaults();
        config
    }
}

impl Config {
    fn without_bindings() -> Self {
        Config {
            bindings: HashMap::new(),
            action_bindings: HashMap::new(),
            zoom_step: 1.2,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            wheel_pan_speed: 8.0,
            key_pan_step: 30.0,
            viewport_padding: 64.0,
            background_rgb: [0, 0, 0],
            backdrop_opacity: 0.95,
            show_info_panel: true,
        }
    }

    fn set_defaults(&mut self) {
        use egui::Key;

        self.add_binding(InputBinding::Key(Key::Escape), Action::Close);

        self.add_binding(InputBinding::Key(Key::ArrowRight), Action::NextImage);
        self.add_binding(InputBinding::Key(Key::ArrowLeft), Action::PreviousImage);

        // '+' usually arrives as Shift+'=' or Shift+'+', depending on layout.
        for key in [Key::Plus, Key::Equals] {
            self.add_binding(InputBinding::Key(key), Action::ZoomIn);
            self.add_binding(InputBinding::KeyWithShift(key), Action::ZoomIn);
        }
        self.add_binding(InputBinding::Key(Key::Minus), Action::ZoomOut);
        self.add_binding(InputBinding::Key(Key::Num0), Action::ResetZoom);

        self.add_binding(InputBinding::Key(Key::R), Action::Rotate);
        self.add_binding(InputBinding::KeyWithShift(Key::R), Action::Rotate);

        self.add_binding(InputBinding::KeyWithShift(Key::ArrowLeft), Action::PanLeft);
        self.add_binding(InputBinding::KeyWithShift(Key::ArrowRight), Action::PanRight);
        self.add_binding(InputBinding::KeyWithShift(Key::ArrowUp), Action::PanUp);
        self.add_binding(InputBinding::KeyWithShift(Key::ArrowDown), Action::PanDown);
    }

    fn add_binding(&mut self, input: InputBinding, action: Action) {
        // A binding maps to one action; rebinding moves it.
        if let Some(previous) = self.bindings.insert(input, action) {
            if let Some(list) = self.action_bindings.get_mut(&previous) {
                list.retain(|b| *b != input);
            }
        }
        let list = self.action_bindings.entry(action).or_default();
        if !list.contains(&input) {
            list.push(input);
        }
    }

    /// Action bound to `input`, if any.
    pub fn action_for(&self, input: &InputBinding) -> Option<Action> {
        self.bindings.get(input).copied()
    }

    /// All bindings for an action.
    pub fn bindings_for(&self, action: Action) -> &[InputBinding] {
        self.action_bindings
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Default location of the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "lightbox-viewer", "lightbox-viewer").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.ini"))
    }

    /// Load from the default location, creating it from the template when missing.
    ///
    /// Never fails: problems are logged and defaults are used.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "using default configuration");
                return Self::parse_ini(DEFAULT_CONFIG_INI);
            }
        };

        match Self::load_or_create(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default configuration");
                Self::parse_ini(DEFAULT_CONFIG_INI)
            }
        }
    }

    /// Load `path`, writing the template there first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(path, DEFAULT_CONFIG_INI).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "created configuration from template");
        }
        Self::load_from(path)
    }

    /// Load and parse an existing INI file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_ini(&content))
    }

    /// Parse INI content. Anything missing falls back to defaults.
    pub fn parse_ini(content: &str) -> Self {
        let mut config = Self::without_bindings();

        #[derive(PartialEq)]
        enum Section {
            None,
            Settings,
            Shortcuts,
        }
        let mut section = Section::None;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                section = if name.eq_ignore_ascii_case("settings") {
                    Section::Settings
                } else if name.eq_ignore_ascii_case("shortcuts") {
                    Section::Shortcuts
                } else {
                    Section::None
                };
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                warn!(line = line_no + 1, "ignoring config line without '='");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match section {
                Section::Settings => config.apply_setting(&key.to_lowercase(), value),
                Section::Shortcuts => {
                    let Some(action) = Action::from_str(key) else {
                        warn!(action = key, "unknown shortcut action");
                        continue;
                    };
                    for binding_str in value.split(',') {
                        match parse_input_binding(binding_str) {
                            Some(binding) => config.add_binding(binding, action),
                            None => warn!(binding = binding_str.trim(), "unrecognised key binding"),
                        }
                    }
                }
                Section::None => {}
            }
        }

        // Fill in defaults for any action the file does not mention.
        let defaults = Config::default();
        for action in Action::ALL {
            if config.bindings_for(action).is_empty() {
                for binding in defaults.bindings_for(action) {
                    if !config.bindings.contains_key(binding) {
                        config.add_binding(*binding, action);
                    }
                }
            }
        }

        config
    }

    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "zoom_step" => {
                if let Some(v) = parse_number(key, value) {
                    self.zoom_step = v.clamp(1.01, 3.0);
                }
            }
            "wheel_zoom_in" => {
                if let Some(v) = parse_number(key, value) {
                    self.wheel_zoom_in = v.clamp(1.001, 2.0);
                }
            }
            "wheel_zoom_out" => {
                if let Some(v) = parse_number(key, value) {
                    self.wheel_zoom_out = v.clamp(0.5, 0.999);
                }
            }
            "wheel_pan_speed" | "pan_speed" => {
                if let Some(v) = parse_number(key, value) {
                    self.wheel_pan_speed = v.clamp(0.1, 100.0);
                }
            }
            "key_pan_step" | "keyboard_pan_step" => {
                if let Some(v) = parse_number(key, value) {
                    self.key_pan_step = v.clamp(1.0, 1000.0);
                }
            }
            "viewport_padding" => {
                if let Some(v) = parse_number(key, value) {
                    self.viewport_padding = v.clamp(0.0, 512.0);
                }
            }
            "background_rgb" => {
                if let Some(rgb) = parse_rgb_triplet(value) {
                    self.background_rgb = rgb;
                }
            }
            "backdrop_opacity" => {
                if let Some(v) = parse_number(key, value) {
                    self.backdrop_opacity = v.clamp(0.0, 1.0);
                }
            }
            "show_info_panel" => {
                if let Some(v) = parse_bool(value) {
                    self.show_info_panel = v;
                }
            }
            other => debug!(key = other, "ignoring unknown setting"),
        }
    }

    /// Serialize to INI.
    pub fn to_ini(&self) -> String {
        let mut content = String::new();

        content.push_str("; Lightbox Viewer Configuration\n\n");
        content.push_str("[Settings]\n");
        content.push_str(&format!("zoom_step = {}\n", self.zoom_step));
        content.push_str(&format!("wheel_zoom_in = {}\n", self.wheel_zoom_in));
        content.push_str(&format!("wheel_zoom_out = {}\n", self.wheel_zoom_out));
        content.push_str(&format!("wheel_pan_speed = {}\n", self.wheel_pan_speed));
        content.push_str(&format!("key_pan_step = {}\n", self.key_pan_step));
        content.push_str(&format!("viewport_padding = {}\n", self.viewport_padding));
        let [r, g, b] = self.background_rgb;
        content.push_str(&format!("background_rgb = {}, {}, {}\n", r, g, b));
        content.push_str(&format!("backdrop_opacity = {}\n", self.backdrop_opacity));
        content.push_str(&format!("show_info_panel = {}\n\n", self.show_info_panel));

        content.push_str("[Shortcuts]\n");
        for action in Action::ALL {
            let bindings: Vec<String> = self.bindings_for(action).iter().map(binding_to_string).collect();
            if !bindings.is_empty() {
                content.push_str(&format!("{} = {}\n", action.as_str(), bindings.join(", ")));
            }
        }

        content
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_ini()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn background_color32(&self, alpha: f32) -> egui::Color32 {
        let [r, g, b] = self.background_rgb;
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

fn binding_to_string(binding: &InputBinding) -> String {
    match binding {
        InputBinding::Key(key) => key_to_string(key),
        InputBinding::KeyWithCtrl(key) => format!("ctrl+{}", key_to_string(key)),
        InputBinding::KeyWithShift(key) => format!("shift+{}", key_to_string(key)),
        InputBinding::KeyWithAlt(key) => format!("alt+{}", key_to_string(key)),
    }
}

fn key_to_string(key: &egui::Key) -> String {
    format!("{:?}", key).to_lowercase()
}

/// Parse a finite `f32`, warning otherwise.
fn parse_number(key: &str, value: &str) -> Option<f32> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warn!(key, value, "ignoring invalid number");
            None
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_rgb_triplet(value: &str) -> Option<[u8; 3]> {
    let parts: Vec<&str> = value
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some([r, g, b])
}
