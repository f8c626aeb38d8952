//! Locshot — screenshot region selection and localization image gallery.
//!
//! This is the core a host UI drives. It wires together:
//! - Region selection overlay (capture/)
//! - Drop-target image gallery bound to a localization record (gallery/)
//! - Image decode/encode boundary (codec.rs)
//! - Runtime settings (config.rs)

pub mod capture;
pub mod codec;
pub mod config;
pub mod gallery;

pub use capture::{DragEvent, RegionSelector, SelectionRect};
pub use config::{SelectionPolicy, Settings};
pub use gallery::{DropReport, ImageGallery, LocalizationItem};

/// Installs the `env_logger` backend. Defaults to `info`; `RUST_LOG`
/// overrides. Safe to call more than once.
pub fn init_logging() {
    let initialized = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_ok();

    if initialized {
        log::info!("Locshot logging initialized");
    }
}
