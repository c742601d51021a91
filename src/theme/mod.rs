use crate::ui::Color;

/// Editor background used in dark mode, RGB(30, 30, 30).
pub const DARK_EDITOR_BG: u32 = 0x1E1E1E;

/// Light or dark editor chrome. Only the mode matters to the background,
/// which paints the matching editor color under the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub is_dark: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub const fn light() -> Self {
        Self { is_dark: false }
    }

    pub const fn dark() -> Self {
        Self { is_dark: true }
    }

    /// Color painted under the background image so that uncovered pixels
    /// match the editor.
    pub fn editor_background(&self) -> Color {
        editor_background(self.is_dark)
    }
}

pub fn editor_background(is_dark: bool) -> Color {
    if is_dark {
        c(DARK_EDITOR_BG)
    } else {
        system_window_color()
    }
}

fn c(hex: u32) -> Color {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Color::from_rgb8(r, g, b)
}

/// Converts a GDI `COLORREF` (0x00BBGGRR).
pub fn from_colorref(colorref: u32) -> Color {
    let r = (colorref & 0xFF) as u8;
    let g = ((colorref >> 8) & 0xFF) as u8;
    let b = ((colorref >> 16) & 0xFF) as u8;
    Color::from_rgb8(r, g, b)
}

#[cfg(windows)]
pub fn system_window_color() -> Color {
    use windows::Win32::Graphics::Gdi::{COLOR_WINDOW, GetSysColor};

    from_colorref(unsafe { GetSysColor(COLOR_WINDOW) })
}

#[cfg(not(windows))]
pub fn system_window_color() -> Color {
    Color::rgb(1.0, 1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_mode_uses_fixed_gray() {
        assert_eq!(Theme::dark().editor_background().to_rgba8(), [30, 30, 30, 255]);
    }

    #[test]
    fn colorref_is_bgr() {
        assert_eq!(from_colorref(0x00FF8000).to_rgba8(), [0, 128, 255, 255]);
    }

    #[cfg(not(windows))]
    #[test]
    fn light_mode_falls_back_to_white_off_windows() {
        assert_eq!(editor_background(false).to_rgba8(), [255, 255, 255, 255]);
    }
}
