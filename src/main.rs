//! Portfolio gallery viewer.
//! Built with Rust + egui (eframe)

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;
use tracing::error;

use lightbox_viewer::gallery::{scan_directory, ImageRecord, Selection};
use lightbox_viewer::lightbox::Lightbox;
use lightbox_viewer::logging;
use lightbox_viewer::scroll_lock::PageScroll;
use lightbox_viewer::Config;

#[cfg(feature = "mimalloc-allocator")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const CARD_SIZE: egui::Vec2 = egui::vec2(220.0, 90.0);

/// Application state
struct PortfolioApp {
    /// Images of the scanned directory
    records: Vec<ImageRecord>,
    /// Which record is open in the lightbox
    selection: Selection,
    lightbox: Lightbox,
    page_scroll: Arc<PageScroll>,
    /// Shown instead of the grid when the directory could not be read
    error_message: Option<String>,
    dir: PathBuf,
}

impl PortfolioApp {
    fn new(dir: PathBuf) -> Self {
        let config = Config::load();
        let page_scroll = PageScroll::new();
        let lightbox = Lightbox::new(config, page_scroll.clone(), logging::default_sink());

        let (records, error_message) = match scan_directory(&dir) {
            Ok(records) => (records, None),
            Err(e) => {
                error!(error = %e, "cannot open gallery");
                (Vec::new(), Some(e.to_string()))
            }
        };

        Self {
            records,
            selection: Selection::default(),
            lightbox,
            page_scroll,
            error_message,
            dir,
        }
    }

    fn draw_gallery(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("gallery_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Gallery");
                ui.label(egui::RichText::new(self.dir.display().to_string()).weak());
                ui.label(format!("{} images", self.records.len()));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref error) = self.error_message {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new(error).color(egui::Color32::RED).size(18.0));
                });
                return;
            }
            if self.records.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("No images in this folder").color(egui::Color32::GRAY).size(16.0));
                });
                return;
            }

            egui::ScrollArea::vertical()
                .enable_scrolling(!self.page_scroll.is_locked())
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for (index, record) in self.records.iter().enumerate() {
                            if gallery_card(ui, record).clicked() {
                                self.selection.open_at(index);
                            }
                        }
                    });
                });
        });
    }
}

fn gallery_card(ui: &mut egui::Ui, record: &ImageRecord) -> egui::Response {
    let mut text = record.title.clone();
    if let Some(dimensions) = &record.dimensions {
        text.push('\n');
        text.push_str(dimensions);
    }
    if let Some(megapixels) = &record.megapixels {
        text.push('\n');
        text.push_str(megapixels);
    }
    ui.add_sized(CARD_SIZE, egui::Button::new(text).wrap())
}

impl eframe::App for PortfolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The lightbox goes first so it can claim input before the page sees it.
        let response = self.lightbox.show(
            ctx,
            &self.records,
            self.selection.index().unwrap_or(0),
            self.selection.is_open(),
        );
        if let Some(request) = response.nav {
            self.selection.apply(request, self.records.len());
        }

        self.draw_gallery(ctx);
    }
}

fn main() -> eframe::Result<()> {
    logging::init();

    // Gallery directory: first argument, else the working directory
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_min_inner_size([400.0, 300.0])
            .with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gallery",
        options,
        Box::new(move |_cc| Ok(Box::new(PortfolioApp::new(dir)))),
    )
}
