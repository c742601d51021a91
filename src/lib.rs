pub mod app;
pub mod background;
pub mod perf;
pub mod settings;
pub mod theme;
pub mod ui;
#[cfg(windows)]
pub mod window;

pub use app::App;
pub use background::{
    BackgroundConfig,
    BackgroundPosition,
    binding::{BackgroundController, BackgroundHost, FilePicker, SharedBackground},
    cache::RenderCache,
    compositor::Surface,
    source::{DecodeError, ImageAsset, ImageSource},
};
pub use settings::{SettingsError, SettingsStore};
