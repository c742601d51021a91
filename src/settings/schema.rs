use serde::{Deserialize, Serialize};

use crate::background::BackgroundConfig;

pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 72;
pub const FW_NORMAL: u32 = 400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schema_version: u32,
    pub font: FontSettings,
    pub window: WindowSettings,
    pub always_on_top: bool,
    pub background: BackgroundConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            font: FontSettings::default(),
            window: WindowSettings::default(),
            always_on_top: false,
            background: BackgroundConfig::default(),
        }
    }
}

impl Settings {
    pub fn migrate(mut self) -> Self {
        if self.schema_version > SETTINGS_SCHEMA_VERSION {
            return self;
        }

        self.schema_version = SETTINGS_SCHEMA_VERSION;
        self
    }

    /// Puts out-of-range values back to their defaults, mirroring the
    /// checks applied when reading individual registry values.
    pub fn sanitize(mut self) -> Self {
        if !FontSettings::is_valid_size(self.font.size) {
            self.font.size = FontSettings::default().size;
        }
        let defaults = WindowSettings::default();
        if self.window.width <= 0 {
            self.window.width = defaults.width;
        }
        if self.window.height <= 0 {
            self.window.height = defaults.height;
        }
        if self.background.image_path.is_none() {
            self.background.enabled = false;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    pub name: String,
    pub size: u32,
    pub weight: u32,
    pub italic: bool,
    pub underline: bool,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            name: "Consolas".to_string(),
            size: 11,
            weight: FW_NORMAL,
            italic: false,
            underline: false,
        }
    }
}

impl FontSettings {
    pub fn is_valid_size(size: u32) -> bool {
        (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size)
    }
}

/// Outer window rectangle in screen coordinates. A `None` coordinate lets
/// the OS pick the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            width: 800,
            height: 600,
        }
    }
}

impl WindowSettings {
    pub fn has_position(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    pub fn reset_position(&mut self) {
        self.x = None;
        self.y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "font": { "size": 14 }, "always_on_top": true }"#)
                .expect("parse");
        assert_eq!(settings.font.size, 14);
        assert_eq!(settings.font.name, "Consolas");
        assert!(settings.always_on_top);
        assert_eq!(settings.window, WindowSettings::default());
        assert!(!settings.background.enabled);
    }

    #[test]
    fn sanitize_rejects_out_of_range_values() {
        let mut settings = Settings::default();
        settings.font.size = 200;
        settings.window.width = 0;
        settings.window.height = -10;
        settings.background.enabled = true;

        let settings = settings.sanitize();
        assert_eq!(settings.font.size, 11);
        assert_eq!(settings.window.width, 800);
        assert_eq!(settings.window.height, 600);
        assert!(!settings.background.enabled);
    }

    #[test]
    fn font_size_bounds_are_inclusive() {
        assert!(FontSettings::is_valid_size(8));
        assert!(FontSettings::is_valid_size(72));
        assert!(!FontSettings::is_valid_size(7));
        assert!(!FontSettings::is_valid_size(73));
    }

    #[test]
    fn migrate_keeps_newer_versions() {
        let mut settings = Settings::default();
        settings.schema_version = 0;
        assert_eq!(settings.migrate().schema_version, SETTINGS_SCHEMA_VERSION);

        let mut future = Settings::default();
        future.schema_version = SETTINGS_SCHEMA_VERSION + 5;
        assert_eq!(future.migrate().schema_version, SETTINGS_SCHEMA_VERSION + 5);
    }
}
