use crate::{
    background::{
        BackgroundPosition,
        binding::{BackgroundController, BackgroundHost, FilePicker},
        compositor::Surface,
        source::DecodeError,
    },
    settings::{
        SettingsStore,
        placement::{MonitorLayout, validate_placement},
        schema::{FontSettings, Settings, WindowSettings},
    },
    theme::Theme,
    ui::{
        InputEvent,
        dialog::{OpacityDialog, OpacityDialogOutcome},
    },
};

/// Wires the persisted preferences to the background controller. Every
/// background change is mirrored into the store, which writes it out on
/// `tick` (debounced) or at `shutdown`.
pub struct App<H: BackgroundHost> {
    store: SettingsStore,
    background: BackgroundController<H>,
    theme: Theme,
    opacity_dialog: OpacityDialog,
}

impl<H: BackgroundHost> App<H> {
    pub fn start(mut store: SettingsStore, host: H, monitors: &impl MonitorLayout, theme: Theme) -> Self {
        crate::profile_scope!("app.start");

        let mut window = store.settings().window;
        if validate_placement(&mut window, monitors) {
            store.settings_mut().window = window;
        }

        let mut background = BackgroundController::new(host);
        background.restore(store.settings().background.clone());

        let mut app = Self {
            store,
            background,
            theme,
            opacity_dialog: OpacityDialog::new(),
        };
        if app.store.settings().background != *app.background.config() {
            app.record_background();
        }
        app
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn background(&self) -> &BackgroundController<H> {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut BackgroundController<H> {
        &mut self.background
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme.is_dark != theme.is_dark {
            self.background.invalidate();
        }
        self.theme = theme;
    }

    pub fn select_background(&mut self, path: impl Into<std::path::PathBuf>) -> Result<(), DecodeError> {
        let result = self.background.select_image(path);
        self.record_background();
        result
    }

    pub fn select_background_with(&mut self, picker: &mut impl FilePicker) -> Result<bool, DecodeError> {
        let result = self.background.select_image_with(picker);
        if !matches!(result, Ok(false)) {
            self.record_background();
        }
        result
    }

    pub fn clear_background(&mut self) {
        self.background.clear_image();
        self.record_background();
    }

    pub fn set_background_position(&mut self, position: BackgroundPosition) {
        self.background.set_position(position);
        self.record_background();
    }

    pub fn set_background_opacity(&mut self, percent: i32) {
        self.background.set_opacity(percent);
        self.record_background();
    }

    /// Runs the opacity prompt over `events` and applies its outcome.
    pub fn edit_background_opacity<I>(&mut self, events: I) -> OpacityDialogOutcome
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let outcome = self
            .opacity_dialog
            .run(self.background.config().opacity, events);
        self.background.apply_opacity_dialog(outcome);
        if matches!(outcome, OpacityDialogOutcome::Accepted(_)) {
            self.record_background();
        }
        outcome
    }

    pub fn set_font(&mut self, font: FontSettings) {
        if !FontSettings::is_valid_size(font.size) {
            tracing::debug!(size = font.size, "ignoring out-of-range font size");
            return;
        }
        self.store.update(|s| s.font = font);
    }

    pub fn set_always_on_top(&mut self, on_top: bool) {
        self.store.update(|s| s.always_on_top = on_top);
    }

    pub fn set_window_rect(&mut self, window: WindowSettings) {
        self.store.update(|s| s.window = window);
    }

    /// Paint-handler hook: the cached background for the editor client size.
    pub fn paint(&mut self, width: i32, height: i32) -> Option<&Surface> {
        let fallback = self.theme.editor_background().to_rgba8();
        self.background.paint(width, height, fallback)
    }

    pub fn tick(&mut self) -> bool {
        self.store.flush_if_due()
    }

    pub fn shutdown(mut self) -> bool {
        self.store.force_flush()
    }

    fn record_background(&mut self) {
        let config = self.background.config().clone();
        self.store.update(|s| s.background = config);
    }
}
