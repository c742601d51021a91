use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod binding;
pub mod cache;
pub mod compositor;
pub mod source;

/// Number of entries in the "Position" submenu, separators included.
pub const POSITION_MENU_ITEMS: u32 = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BackgroundPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Tile,
    Stretch,
    Fit,
    Fill,
}

impl BackgroundPosition {
    pub const fn all() -> [Self; 13] {
        [
            Self::TopLeft,
            Self::TopCenter,
            Self::TopRight,
            Self::CenterLeft,
            Self::Center,
            Self::CenterRight,
            Self::BottomLeft,
            Self::BottomCenter,
            Self::BottomRight,
            Self::Tile,
            Self::Stretch,
            Self::Fit,
            Self::Fill,
        ]
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::TopLeft => "Top Left",
            Self::TopCenter => "Top Center",
            Self::TopRight => "Top Right",
            Self::CenterLeft => "Center Left",
            Self::Center => "Center",
            Self::CenterRight => "Center Right",
            Self::BottomLeft => "Bottom Left",
            Self::BottomCenter => "Bottom Center",
            Self::BottomRight => "Bottom Right",
            Self::Tile => "Tile",
            Self::Stretch => "Stretch",
            Self::Fit => "Fit",
            Self::Fill => "Fill",
        }
    }

    /// Item position inside the host's "Position" submenu. The anchor rows
    /// and the scaling group are separated, so indices 3, 7 and 11 are gaps.
    pub const fn menu_index(self) -> u32 {
        match self {
            Self::TopLeft => 0,
            Self::TopCenter => 1,
            Self::TopRight => 2,
            Self::CenterLeft => 4,
            Self::Center => 5,
            Self::CenterRight => 6,
            Self::BottomLeft => 8,
            Self::BottomCenter => 9,
            Self::BottomRight => 10,
            Self::Tile => 12,
            Self::Stretch => 13,
            Self::Fit => 14,
            Self::Fill => 15,
        }
    }

    pub fn from_menu_index(index: u32) -> Option<Self> {
        Self::all().into_iter().find(|mode| mode.menu_index() == index)
    }

    /// Stable numeric code used by the registry backend.
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::all().get(code as usize).copied()
    }

    pub const fn is_anchor(self) -> bool {
        !matches!(self, Self::Tile | Self::Stretch | Self::Fit | Self::Fill)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub image_path: Option<PathBuf>,
    pub enabled: bool,
    pub position: BackgroundPosition,
    pub opacity: u8,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            enabled: false,
            position: BackgroundPosition::Center,
            opacity: 255,
        }
    }
}

impl BackgroundConfig {
    pub fn opacity_percent(&self) -> u8 {
        opacity_byte_to_percent(self.opacity)
    }
}

/// Clamps to [0, 100] and truncates, so 50% maps to 127.
pub fn opacity_percent_to_byte(percent: i32) -> u8 {
    let percent = percent.clamp(0, 100);
    (percent * 255 / 100) as u8
}

/// Truncating inverse of [`opacity_percent_to_byte`]. The round trip is lossy
/// (127 reads back as 49%) and callers rely on that exact value.
pub fn opacity_byte_to_percent(byte: u8) -> u8 {
    (u32::from(byte) * 100 / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_conversion_truncates() {
        assert_eq!(opacity_percent_to_byte(50), 127);
        assert_eq!(opacity_byte_to_percent(127), 49);
        assert_eq!(opacity_percent_to_byte(100), 255);
        assert_eq!(opacity_byte_to_percent(255), 100);
        assert_eq!(opacity_percent_to_byte(0), 0);
    }

    #[test]
    fn opacity_percent_is_clamped() {
        assert_eq!(opacity_percent_to_byte(-20), 0);
        assert_eq!(opacity_percent_to_byte(250), 255);
    }

    #[test]
    fn menu_indices_skip_separators_and_round_trip() {
        let indices = BackgroundPosition::all()
            .into_iter()
            .map(BackgroundPosition::menu_index)
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![0, 1, 2, 4, 5, 6, 8, 9, 10, 12, 13, 14, 15]);
        assert!(indices.iter().all(|i| *i < POSITION_MENU_ITEMS));

        for mode in BackgroundPosition::all() {
            assert_eq!(BackgroundPosition::from_menu_index(mode.menu_index()), Some(mode));
            assert_eq!(BackgroundPosition::from_code(mode.code()), Some(mode));
        }
        assert_eq!(BackgroundPosition::from_menu_index(3), None);
        assert_eq!(BackgroundPosition::from_code(13), None);
    }

    #[test]
    fn default_config_is_disabled_and_opaque() {
        let config = BackgroundConfig::default();
        assert!(!config.enabled);
        assert!(config.image_path.is_none());
        assert_eq!(config.position, BackgroundPosition::Center);
        assert_eq!(config.opacity, 255);
        assert_eq!(config.opacity_percent(), 100);
    }
}
