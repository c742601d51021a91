pub mod placement;
#[cfg(windows)]
pub mod registry;
pub mod schema;

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use thiserror::Error;

use schema::Settings;

const SAVE_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("registry error: {0}")]
    Registry(String),
}

/// Where preferences live between runs. Loading starts from defaults and
/// overlays whatever the store holds; a missing store is not an error.
pub trait SettingsBackend {
    fn load(&self) -> Result<Settings, SettingsError>;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(settings_path())
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> Result<Settings, SettingsError> {
        load_settings_from(self.path.as_path())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        save_settings_to(self.path.as_path(), settings)
    }
}

/// Registry on Windows, `settings.json` in the config dir everywhere else.
pub fn default_backend() -> Box<dyn SettingsBackend> {
    #[cfg(windows)]
    {
        if portable_root().is_none() {
            return Box::new(registry::RegistryBackend::default());
        }
    }
    Box::new(JsonFileBackend::default_location())
}

pub struct SettingsStore {
    backend: Box<dyn SettingsBackend>,
    settings: Settings,
    pending_write: bool,
    last_change_at: Option<Instant>,
    debounce: Duration,
}

impl SettingsStore {
    /// Reads settings once. Any failure is logged and replaced by defaults.
    pub fn open(backend: Box<dyn SettingsBackend>) -> Self {
        let settings = match backend.load() {
            Ok(settings) => settings.migrate().sanitize(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load settings, using defaults");
                Settings::default()
            }
        };
        Self {
            backend,
            settings,
            pending_write: false,
            last_change_at: None,
            debounce: Duration::from_millis(SAVE_DEBOUNCE_MS),
        }
    }

    pub fn load() -> Self {
        Self::open(default_backend())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::open(Box::new(JsonFileBackend::new(path)))
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        self.pending_write = true;
        self.last_change_at = Some(Instant::now());
        &mut self.settings
    }

    pub fn update<F>(&mut self, mutator: F)
    where
        F: FnOnce(&mut Settings),
    {
        mutator(&mut self.settings);
        self.pending_write = true;
        self.last_change_at = Some(Instant::now());
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write
    }

    pub fn flush_if_due(&mut self) -> bool {
        let Some(last_change) = self.last_change_at else {
            return false;
        };
        if !self.pending_write || last_change.elapsed() < self.debounce {
            return false;
        }

        self.write()
    }

    pub fn force_flush(&mut self) -> bool {
        if self.pending_write {
            return self.write();
        }
        false
    }

    // Persistence is best-effort: a failed write is logged and retried on
    // the next flush.
    fn write(&mut self) -> bool {
        match self.backend.save(&self.settings) {
            Ok(()) => {
                self.pending_write = false;
                self.last_change_at = None;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to save settings");
                false
            }
        }
    }
}

pub fn settings_path() -> PathBuf {
    if let Some(root) = portable_root() {
        return root.join("settings.json");
    }

    if let Some(base) = dirs::config_dir() {
        base.join("LegacyNotepad").join("settings.json")
    } else {
        PathBuf::from("settings.json")
    }
}

pub fn portable_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.to_path_buf();
    let marker = dir.join("legacy-notepad.ini");
    if marker.exists() {
        Some(dir)
    } else {
        None
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let settings = serde_json::from_str::<Settings>(&data)?;
    Ok(settings.migrate())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let data = serde_json::to_string_pretty(&settings.clone().migrate())?;
    fs::write(path, data).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}
