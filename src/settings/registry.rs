use std::path::PathBuf;

use windows::{
    Win32::{
        Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR},
        System::Registry::{
            HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_DWORD, REG_OPTION_NON_VOLATILE,
            REG_SZ, REG_VALUE_TYPE, RegCloseKey, RegCreateKeyExW, RegOpenKeyExW, RegQueryValueExW,
            RegSetValueExW,
        },
    },
    core::{PCWSTR, w},
};

use super::{
    SettingsBackend,
    SettingsError,
    schema::{FontSettings, Settings},
};
use crate::background::BackgroundPosition;

const SETTINGS_KEY: PCWSTR = w!("Software\\LegacyNotepad");
const FONT_NAME_VALUE: &str = "FontName";
const FONT_SIZE_VALUE: &str = "FontSize";
const FONT_WEIGHT_VALUE: &str = "FontWeight";
const FONT_ITALIC_VALUE: &str = "FontItalic";
const FONT_UNDERLINE_VALUE: &str = "FontUnderline";
const ALWAYS_ON_TOP_VALUE: &str = "AlwaysOnTop";
const WINDOW_X_VALUE: &str = "WindowX";
const WINDOW_Y_VALUE: &str = "WindowY";
const WINDOW_WIDTH_VALUE: &str = "WindowWidth";
const WINDOW_HEIGHT_VALUE: &str = "WindowHeight";
const BG_IMAGE_VALUE: &str = "BackgroundImage";
const BG_ENABLED_VALUE: &str = "BackgroundEnabled";
const BG_POSITION_VALUE: &str = "BackgroundPosition";
const BG_OPACITY_VALUE: &str = "BackgroundOpacity";

/// `CW_USEDEFAULT`, stored when the OS should choose the window position.
const CW_USEDEFAULT: i32 = i32::MIN;
const MAX_STRING_CHARS: usize = 1024;

/// Preferences under `HKCU\Software\LegacyNotepad`, one value per field.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryBackend;

struct RegKey(HKEY);

impl Drop for RegKey {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

impl RegKey {
    fn open_read() -> Result<Option<Self>, SettingsError> {
        let mut hkey = HKEY::default();
        let status = unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, SETTINGS_KEY, Some(0), KEY_READ, &mut hkey) };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        check(status, "open settings key")?;
        Ok(Some(Self(hkey)))
    }

    fn create_write() -> Result<Self, SettingsError> {
        let mut hkey = HKEY::default();
        let status = unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                SETTINGS_KEY,
                Some(0),
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_WRITE,
                None,
                &mut hkey,
                None,
            )
        };
        check(status, "create settings key")?;
        Ok(Self(hkey))
    }

    fn read_dword(&self, name: &str) -> Option<u32> {
        let name = wide(name);
        let mut value = 0u32;
        let mut size = std::mem::size_of::<u32>() as u32;
        let mut kind = REG_VALUE_TYPE::default();
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                PCWSTR(name.as_ptr()),
                None,
                Some(&mut kind),
                Some(&mut value as *mut u32 as *mut u8),
                Some(&mut size),
            )
        };
        (status == ERROR_SUCCESS && kind == REG_DWORD).then_some(value)
    }

    fn read_string(&self, name: &str) -> Option<String> {
        let name = wide(name);
        let mut buffer = vec![0u16; MAX_STRING_CHARS];
        let mut size = (buffer.len() * std::mem::size_of::<u16>()) as u32;
        let mut kind = REG_VALUE_TYPE::default();
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                PCWSTR(name.as_ptr()),
                None,
                Some(&mut kind),
                Some(buffer.as_mut_ptr() as *mut u8),
                Some(&mut size),
            )
        };
        if status != ERROR_SUCCESS || kind != REG_SZ {
            return None;
        }
        let chars = (size as usize / std::mem::size_of::<u16>()).min(buffer.len());
        let len = buffer[..chars]
            .iter()
            .position(|c| *c == 0)
            .unwrap_or(chars);
        Some(String::from_utf16_lossy(&buffer[..len]))
    }

    fn write_dword(&self, name: &str, value: u32) -> Result<(), SettingsError> {
        let name = wide(name);
        let status = unsafe {
            RegSetValueExW(
                self.0,
                PCWSTR(name.as_ptr()),
                None,
                REG_DWORD,
                Some(&value.to_le_bytes()),
            )
        };
        check(status, "write dword value")
    }

    fn write_string(&self, name: &str, value: &str) -> Result<(), SettingsError> {
        let name = wide(name);
        let bytes = wide(value)
            .into_iter()
            .flat_map(u16::to_le_bytes)
            .collect::<Vec<u8>>();
        let status = unsafe {
            RegSetValueExW(self.0, PCWSTR(name.as_ptr()), None, REG_SZ, Some(bytes.as_slice()))
        };
        check(status, "write string value")
    }
}

impl SettingsBackend for RegistryBackend {
    fn load(&self) -> Result<Settings, SettingsError> {
        let mut settings = Settings::default();
        let Some(key) = RegKey::open_read()? else {
            return Ok(settings);
        };

        if let Some(name) = key.read_string(FONT_NAME_VALUE) {
            settings.font.name = name;
        }
        if let Some(size) = key.read_dword(FONT_SIZE_VALUE).filter(|s| FontSettings::is_valid_size(*s)) {
            settings.font.size = size;
        }
        if let Some(weight) = key.read_dword(FONT_WEIGHT_VALUE) {
            settings.font.weight = weight;
        }
        if let Some(italic) = key.read_dword(FONT_ITALIC_VALUE) {
            settings.font.italic = italic != 0;
        }
        if let Some(underline) = key.read_dword(FONT_UNDERLINE_VALUE) {
            settings.font.underline = underline != 0;
        }
        if let Some(top) = key.read_dword(ALWAYS_ON_TOP_VALUE) {
            settings.always_on_top = top != 0;
        }

        // Coordinates are DWORD bit patterns of signed values.
        if let Some(x) = key.read_dword(WINDOW_X_VALUE) {
            settings.window.x = coordinate_from_dword(x);
        }
        if let Some(y) = key.read_dword(WINDOW_Y_VALUE) {
            settings.window.y = coordinate_from_dword(y);
        }
        if let Some(width) = key.read_dword(WINDOW_WIDTH_VALUE).map(|v| v as i32).filter(|v| *v > 0) {
            settings.window.width = width;
        }
        if let Some(height) = key.read_dword(WINDOW_HEIGHT_VALUE).map(|v| v as i32).filter(|v| *v > 0) {
            settings.window.height = height;
        }

        if let Some(path) = key.read_string(BG_IMAGE_VALUE).filter(|p| !p.is_empty()) {
            settings.background.image_path = Some(PathBuf::from(path));
        }
        if let Some(enabled) = key.read_dword(BG_ENABLED_VALUE) {
            settings.background.enabled = enabled != 0;
        }
        if let Some(position) = key.read_dword(BG_POSITION_VALUE).and_then(BackgroundPosition::from_code) {
            settings.background.position = position;
        }
        if let Some(opacity) = key.read_dword(BG_OPACITY_VALUE) {
            settings.background.opacity = opacity.min(255) as u8;
        }

        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let key = RegKey::create_write()?;

        key.write_string(FONT_NAME_VALUE, settings.font.name.as_str())?;
        key.write_dword(FONT_SIZE_VALUE, settings.font.size)?;
        key.write_dword(FONT_WEIGHT_VALUE, settings.font.weight)?;
        key.write_dword(FONT_ITALIC_VALUE, u32::from(settings.font.italic))?;
        key.write_dword(FONT_UNDERLINE_VALUE, u32::from(settings.font.underline))?;
        key.write_dword(ALWAYS_ON_TOP_VALUE, u32::from(settings.always_on_top))?;

        key.write_dword(WINDOW_X_VALUE, coordinate_to_dword(settings.window.x))?;
        key.write_dword(WINDOW_Y_VALUE, coordinate_to_dword(settings.window.y))?;
        key.write_dword(WINDOW_WIDTH_VALUE, settings.window.width as u32)?;
        key.write_dword(WINDOW_HEIGHT_VALUE, settings.window.height as u32)?;

        let image = settings
            .background
            .image_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        key.write_string(BG_IMAGE_VALUE, image.as_str())?;
        key.write_dword(BG_ENABLED_VALUE, u32::from(settings.background.enabled))?;
        key.write_dword(BG_POSITION_VALUE, settings.background.position.code())?;
        key.write_dword(BG_OPACITY_VALUE, u32::from(settings.background.opacity))?;
        Ok(())
    }
}

fn coordinate_from_dword(value: u32) -> Option<i32> {
    let value = value as i32;
    (value != CW_USEDEFAULT).then_some(value)
}

fn coordinate_to_dword(value: Option<i32>) -> u32 {
    value.unwrap_or(CW_USEDEFAULT) as u32
}

fn wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

fn check(status: WIN32_ERROR, action: &str) -> Result<(), SettingsError> {
    if status == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(SettingsError::Registry(format!("{action} failed with code {}", status.0)))
    }
}
