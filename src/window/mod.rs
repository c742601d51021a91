use std::ffi::c_void;

use windows::Win32::{
    Foundation::{HWND, RECT},
    Graphics::Gdi::{
        BI_RGB, BITMAPINFO, BITMAPINFOHEADER, DIB_RGB_COLORS, HDC, InvalidateRect,
        SetDIBitsToDevice,
    },
    UI::WindowsAndMessaging::{
        CheckMenuItem, GetMenu, GetSubMenu, HMENU, MF_BYPOSITION, MF_CHECKED, MF_UNCHECKED,
    },
};

use crate::{
    background::{POSITION_MENU_ITEMS, binding::BackgroundHost, compositor::Surface},
    ui::Rect,
};

pub mod integration;

// View > Background > Position in the main menu bar.
const VIEW_MENU_POS: i32 = 3;
const BACKGROUND_MENU_POS: i32 = 6;
const POSITION_MENU_POS: i32 = 4;

/// Routes controller callbacks to the main window and the editor child.
pub struct HwndHost {
    main: HWND,
    editor: HWND,
}

impl HwndHost {
    pub fn new(main: HWND, editor: HWND) -> Self {
        Self { main, editor }
    }

    fn position_menu(&self) -> Option<HMENU> {
        let bar = unsafe { GetMenu(self.main) };
        if bar.is_invalid() {
            return None;
        }
        let view = unsafe { GetSubMenu(bar, VIEW_MENU_POS) };
        let background = unsafe { GetSubMenu(view, BACKGROUND_MENU_POS) };
        let position = unsafe { GetSubMenu(background, POSITION_MENU_POS) };
        (!position.is_invalid()).then_some(position)
    }
}

impl BackgroundHost for HwndHost {
    fn request_repaint(&mut self, region: Option<Rect>) {
        let rect = region.map(|r| RECT {
            left: r.x.floor() as i32,
            top: r.y.floor() as i32,
            right: (r.x + r.width).ceil() as i32,
            bottom: (r.y + r.height).ceil() as i32,
        });
        unsafe {
            let _ = InvalidateRect(
                Some(self.editor),
                rect.as_ref().map(|r| r as *const RECT),
                true,
            );
        }
    }

    fn sync_position_menu(&mut self, menu_index: u32) {
        let Some(menu) = self.position_menu() else {
            return;
        };
        unsafe {
            for index in 0..POSITION_MENU_ITEMS {
                CheckMenuItem(menu, index, (MF_BYPOSITION | MF_UNCHECKED).0);
            }
            CheckMenuItem(menu, menu_index, (MF_BYPOSITION | MF_CHECKED).0);
        }
    }
}

/// Blits a composited surface to `hdc` at the origin.
pub fn present_surface(hdc: HDC, surface: &Surface) {
    let bgra = surface
        .rgba
        .chunks_exact(4)
        .flat_map(|px| [px[2], px[1], px[0], px[3]])
        .collect::<Vec<u8>>();

    let info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: surface.width as i32,
            // Negative height selects a top-down DIB.
            biHeight: -(surface.height as i32),
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    unsafe {
        SetDIBitsToDevice(
            hdc,
            0,
            0,
            surface.width,
            surface.height,
            0,
            0,
            0,
            surface.height,
            bgra.as_ptr() as *const c_void,
            &info,
            DIB_RGB_COLORS,
        );
    }
}
