use std::{path::PathBuf, sync::Arc};

use parking_lot::Mutex;

use super::{
    BackgroundConfig,
    BackgroundPosition,
    cache::{RenderCache, RenderCacheStats},
    compositor::Surface,
    opacity_percent_to_byte,
    source::{DecodeError, ImageSource},
};
use crate::ui::{Rect, dialog::OpacityDialogOutcome};

/// Window-side collaborator the controller talks back to after a change.
pub trait BackgroundHost {
    /// Schedules a repaint; `None` means the whole editor surface.
    fn request_repaint(&mut self, region: Option<Rect>);

    /// Leaves exactly one checked item in the "Position" submenu.
    fn sync_position_menu(&mut self, menu_index: u32);
}

pub trait FilePicker {
    /// Returns an existing image path, or `None` when the user cancelled.
    fn pick_image(&mut self) -> Option<PathBuf>;
}

pub type SharedBackground<H> = Arc<Mutex<BackgroundController<H>>>;

/// Owns the background configuration together with the decoded image and the
/// rendered surface, and keeps the three consistent across user actions.
pub struct BackgroundController<H: BackgroundHost> {
    config: BackgroundConfig,
    source: ImageSource,
    cache: RenderCache,
    host: H,
}

impl<H: BackgroundHost> BackgroundController<H> {
    pub fn new(host: H) -> Self {
        Self {
            config: BackgroundConfig::default(),
            source: ImageSource::new(),
            cache: RenderCache::new(),
            host,
        }
    }

    /// Installs a persisted configuration. An enabled config with a path has
    /// its image decoded again; if that fails the background comes up
    /// disabled.
    pub fn restore(&mut self, config: BackgroundConfig) {
        self.config = config;
        self.source.clear();
        self.cache.invalidate();

        match self.config.image_path.clone() {
            Some(path) if self.config.enabled => {
                if let Err(err) = self.load(path) {
                    tracing::warn!(error = %err, "stored background image could not be restored");
                }
            }
            _ => self.config.enabled = false,
        }

        self.host.sync_position_menu(self.config.position.menu_index());
        self.host.request_repaint(None);
    }

    pub fn select_image(&mut self, path: impl Into<PathBuf>) -> Result<(), DecodeError> {
        let result = self.load(path.into());
        self.cache.invalidate();
        self.host.request_repaint(None);
        result
    }

    /// Runs the picker and loads its choice. Cancelling changes nothing.
    pub fn select_image_with(&mut self, picker: &mut impl FilePicker) -> Result<bool, DecodeError> {
        let Some(path) = picker.pick_image() else {
            return Ok(false);
        };
        self.select_image(path).map(|()| true)
    }

    pub fn clear_image(&mut self) {
        self.source.clear();
        self.cache.invalidate();
        self.config.enabled = false;
        self.config.image_path = None;
        self.host.request_repaint(None);
    }

    pub fn set_position(&mut self, position: BackgroundPosition) {
        self.config.position = position;
        self.host.sync_position_menu(position.menu_index());
        self.cache.invalidate();
        self.host.request_repaint(None);
    }

    /// Takes a percentage, clamps it to [0, 100] and stores `percent * 255 / 100`.
    pub fn set_opacity(&mut self, percent: i32) {
        self.config.opacity = opacity_percent_to_byte(percent);
        self.cache.invalidate();
        self.host.request_repaint(None);
    }

    pub fn apply_opacity_dialog(&mut self, outcome: OpacityDialogOutcome) {
        match outcome {
            OpacityDialogOutcome::Accepted(percent) => self.set_opacity(i32::from(percent)),
            OpacityDialogOutcome::Cancelled => {
                self.cache.invalidate();
                self.host.request_repaint(None);
            }
        }
    }

    /// Paint-handler entry point. `None` means paint the plain window color.
    pub fn paint(&mut self, width: i32, height: i32, fallback: [u8; 4]) -> Option<&Surface> {
        self.cache
            .get_or_render(width, height, fallback, &self.config, &self.source)
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    pub fn is_image_loaded(&self) -> bool {
        self.source.is_loaded()
    }

    pub fn cache_stats(&self) -> RenderCacheStats {
        self.cache.stats()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_shared(self) -> SharedBackground<H> {
        Arc::new(Mutex::new(self))
    }

    fn load(&mut self, path: PathBuf) -> Result<(), DecodeError> {
        match self.source.load(&path) {
            Ok(_) => {
                self.config.image_path = Some(path);
                self.config.enabled = true;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "background image rejected");
                self.config.image_path = None;
                self.config.enabled = false;
                self.cache.invalidate();
                Err(err)
            }
        }
    }
}
