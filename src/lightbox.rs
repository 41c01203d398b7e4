//! The lightbox component.
//!
//! The caller owns the records and the selected index and calls
//! [`Lightbox::show`] every frame. While open, the lightbox holds the page
//! scroll lock, claims keyboard and wheel input, loads the current image in
//! the background and reports navigation back through [`LightboxResponse`].

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::LoadError;
use crate::gallery::ImageRecord;
use crate::input::{Command, InputHandler, Processed};
use crate::loader::ImageLoader;
use crate::logging::ErrorSink;
use crate::scroll_lock::{ScrollLockGuard, SharedScrollLock};
use crate::session::ViewerSession;
use crate::ui::{self, ChromeLayout, FrameView};

/// Navigation the caller is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    Close,
    Next,
    Previous,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LightboxResponse {
    pub nav: Option<NavRequest>,
}

/// State that only exists while the lightbox is open.
struct OpenState {
    session: ViewerSession,
    input: InputHandler,
    texture: Option<egui::TextureHandle>,
    /// Hit areas from the previous frame.
    image_bounds: Option<egui::Rect>,
    chrome: Option<ChromeLayout>,
    keyboard_zoom_was: bool,
    _scroll: ScrollLockGuard,
}

/// The background loader, started on first open.
enum LoaderSlot {
    Unstarted,
    Running(ImageLoader),
    /// Start failed; not retried until the next session.
    Failed,
}

impl LoaderSlot {
    /// Try to start the loader if no attempt was made yet.
    fn start_with(&mut self, sink: &dyn ErrorSink, spawn: impl FnOnce() -> Result<ImageLoader, LoadError>) {
        if !matches!(self, LoaderSlot::Unstarted) {
            return;
        }
        *self = match spawn() {
            Ok(loader) => LoaderSlot::Running(loader),
            Err(e) => {
                sink.report("starting image loader", &e);
                LoaderSlot::Failed
            }
        };
    }

    /// Allow one more start attempt.
    fn retry(&mut self) {
        if matches!(self, LoaderSlot::Failed) {
            *self = LoaderSlot::Unstarted;
        }
    }

    fn get(&self) -> Option<&ImageLoader> {
        match self {
            LoaderSlot::Running(loader) => Some(loader),
            LoaderSlot::Unstarted | LoaderSlot::Failed => None,
        }
    }
}

pub struct Lightbox {
    config: Config,
    scroll_lock: SharedScrollLock,
    sink: Arc<dyn ErrorSink>,
    loader: LoaderSlot,
    open: Option<OpenState>,
    /// First ticket generation for the next session.
    next_generation: u64,
}

impl Lightbox {
    pub fn new(config: Config, scroll_lock: SharedScrollLock, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            config,
            scroll_lock,
            sink,
            loader: LoaderSlot::Unstarted,
            open: None,
            next_generation: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&ViewerSession> {
        self.open.as_ref().map(|state| &state.session)
    }

    /// Show `records[index]`. Renders nothing when closed or when `index` is
    /// out of range.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        records: &[ImageRecord],
        index: usize,
        is_open: bool,
    ) -> LightboxResponse {
        if !is_open || index >= records.len() {
            if is_open {
                debug!(index, len = records.len(), "nothing to show");
            }
            self.close(ctx);
            return LightboxResponse::default();
        }

        if self.open.is_none() {
            self.loader.retry();
        }
        self.ensure_loader(ctx);
        let area = ui::image_area(ctx.screen_rect(), self.config.viewport_padding);
        let record = &records[index];

        let Self {
            config,
            scroll_lock,
            sink,
            loader,
            open,
            next_generation,
        } = self;

        if let Some(state) = open.as_mut() {
            if state.session.current_index() != index {
                debug!(from = state.session.current_index(), to = index, "lightbox index changed");
                state.session.reset_on_index_change(index);
                state.input.reset();
                state.texture = None;
                state.image_bounds = None;
                request_load(loader.get(), &**sink, &mut state.session, record);
            }
        } else {
            debug!(index, "lightbox opened");
            let keyboard_zoom_was = ctx.options(|o| o.zoom_with_keyboard);
            ctx.options_mut(|o| o.zoom_with_keyboard = false);
            let mut session = ViewerSession::with_generation(index, area.size(), *next_generation);
            request_load(loader.get(), &**sink, &mut session, record);
            *open = Some(OpenState {
                session,
                input: InputHandler::new(),
                texture: None,
                image_bounds: None,
                chrome: None,
                keyboard_zoom_was,
                _scroll: ScrollLockGuard::acquire(scroll_lock.clone()),
            });
        }
        let Some(state) = open.as_mut() else {
            return LightboxResponse::default();
        };

        state.session.set_viewport(area.size());

        if let Some(loader) = loader.get() {
            for outcome in loader.poll() {
                let applied = match &outcome.result {
                    Ok(decoded) => state.session.apply_load(outcome.ticket, Some(decoded.natural)),
                    Err(_) => state.session.apply_load(outcome.ticket, None),
                };
                if !applied {
                    debug!(index = outcome.ticket.index, "discarding stale image load");
                    continue;
                }
                match outcome.result {
                    Ok(decoded) => {
                        state.texture = Some(ctx.load_texture(
                            format!("lightbox-{}", record.id),
                            decoded.to_color_image(),
                            egui::TextureOptions::LINEAR,
                        ));
                    }
                    Err(e) => sink.report("loading lightbox image", &e),
                }
            }
        }

        // Claim keyboard and wheel input.
        let page_height = ctx.screen_rect().height();
        let image_bounds = state.image_bounds.unwrap_or(area);
        let chrome = state.chrome;
        let on_image = |pos: egui::Pos2| image_bounds.contains(pos) && !chrome.is_some_and(|c| c.contains(pos));
        let commands = ctx.input_mut(|i| {
            let events = std::mem::take(&mut i.events);
            let Processed { commands, passthrough } = state.input.process(events, config, page_height, on_image);
            i.events = passthrough;
            i.raw_scroll_delta = egui::Vec2::ZERO;
            i.smooth_scroll_delta = egui::Vec2::ZERO;
            commands
        });

        let mut nav = None;
        for command in commands {
            if let Some(request) = apply_command(&mut state.session, command, config) {
                nav = Some(request);
            }
        }

        let frame = ui::draw(
            ctx,
            FrameView {
                config,
                record,
                session: &state.session,
                texture: state.texture.as_ref(),
                len: records.len(),
            },
        );
        for command in frame.commands {
            if let Some(request) = apply_command(&mut state.session, command, config) {
                nav = Some(request);
            }
        }
        state.image_bounds = Some(frame.image_bounds);
        state.chrome = Some(frame.chrome);

        if let Some(request) = nav {
            debug!(?request, "lightbox navigation");
        }
        LightboxResponse { nav }
    }

    /// Tear down the open session, restoring page scroll.
    pub fn close(&mut self, ctx: &egui::Context) {
        if let Some(state) = self.open.take() {
            ctx.options_mut(|o| o.zoom_with_keyboard = state.keyboard_zoom_was);
            self.next_generation = state.session.generation().wrapping_add(1);
            // Outcomes still in flight carry this session's generations and
            // will be rejected by the next one; drop the ones already here.
            let dropped = self.loader.get().map_or(0, |loader| loader.poll().len());
            debug!(index = state.session.current_index(), dropped, "lightbox closed");
        }
    }

    fn ensure_loader(&mut self, ctx: &egui::Context) {
        self.loader.start_with(&*self.sink, || {
            let mut loader = ImageLoader::spawn(Some(ctx.clone()))?;
            loader.set_max_texture_side(ctx.input(|i| i.max_texture_side));
            Ok(loader)
        });
    }
}

/// Queue a load of `record` for the session's current ticket. Without a
/// working loader the session goes straight to the degraded state.
fn request_load(loader: Option<&ImageLoader>, sink: &dyn ErrorSink, session: &mut ViewerSession, record: &ImageRecord) {
    let ticket = session.ticket();
    let result = match loader {
        Some(loader) => loader.request(ticket, record.display_src()),
        None => Err(LoadError::WorkerGone),
    };
    if let Err(e) = result {
        sink.report("requesting lightbox image", &e);
        session.apply_load(ticket, None);
    }
}

/// Apply one command to the session. Navigation is returned for the caller.
pub fn apply_command(session: &mut ViewerSession, command: Command, config: &Config) -> Option<NavRequest> {
    match command {
        Command::Close => return Some(NavRequest::Close),
        Command::Next => return Some(NavRequest::Next),
        Command::Previous => return Some(NavRequest::Previous),
        Command::ZoomIn => session.zoom_in(config.zoom_step),
        Command::ZoomOut => session.zoom_out(config.zoom_step),
        Command::ZoomBy(factor) => session.scale_zoom(factor),
        Command::ResetZoom => session.reset(),
        Command::Rotate => session.rotate(),
        Command::PanBy(delta) => session.pan_by(delta),
        Command::WheelPan(delta) => session.pan_by_wheel(delta, config.wheel_pan_speed),
        Command::BeginDrag => session.begin_drag(),
        Command::EndDrag => session.end_drag(),
    }
    None
}
