//! Portfolio gallery with a pan / zoom / rotate image lightbox.
//!
//! Layering, leaves first: [`geometry`] bounds math, the [`session`] state
//! machine, [`input`] adapters, then [`ui`] painting. [`lightbox`] ties them
//! to the egui frame loop together with the background [`loader`] and the
//! page [`scroll_lock`].

pub mod config;
pub mod error;
pub mod gallery;
pub mod geometry;
pub mod input;
pub mod lightbox;
pub mod loader;
pub mod logging;
pub mod scroll_lock;
pub mod session;
pub mod ui;

pub use config::Config;
pub use gallery::{ImageRecord, Selection};
pub use lightbox::{Lightbox, LightboxResponse, NavRequest};
pub use session::ViewerSession;
