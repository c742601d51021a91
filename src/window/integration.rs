use std::{
    ffi::OsString,
    os::windows::ffi::OsStringExt,
    path::PathBuf,
};

use windows::{
    Win32::{
        Foundation::{HWND, MAX_PATH},
        UI::Controls::Dialogs::{
            GetOpenFileNameW,
            OFN_EXPLORER,
            OFN_FILEMUSTEXIST,
            OFN_HIDEREADONLY,
            OFN_PATHMUSTEXIST,
            OPENFILENAMEW,
        },
    },
    core::{PCWSTR, PWSTR, w},
};

use crate::background::{binding::FilePicker, source::picker_filter_pattern};

/// "Select Background" open-file dialog.
pub struct Win32FilePicker {
    owner: HWND,
}

impl Win32FilePicker {
    pub fn new(owner: HWND) -> Self {
        Self { owner }
    }
}

impl FilePicker for Win32FilePicker {
    fn pick_image(&mut self) -> Option<PathBuf> {
        pick_image_file(self.owner)
    }
}

/// Double-NUL terminated `lpstrFilter` pairs: the supported image types,
/// then everything.
fn background_filter() -> Vec<u16> {
    let pattern = picker_filter_pattern();
    format!("Image Files ({pattern})\0{pattern}\0All Files (*.*)\0*.*\0\0")
        .encode_utf16()
        .collect()
}

/// Shows the "Select Background Image" dialog owned by `owner`. Cancel or an
/// empty selection yields `None`.
pub fn pick_image_file(owner: HWND) -> Option<PathBuf> {
    let filter = background_filter();
    let mut selected = [0u16; MAX_PATH as usize];

    let mut request = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: owner,
        lpstrFilter: PCWSTR::from_raw(filter.as_ptr()),
        lpstrFile: PWSTR(selected.as_mut_ptr()),
        nMaxFile: selected.len() as u32,
        lpstrTitle: w!("Select Background Image"),
        Flags: OFN_EXPLORER | OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY,
        ..Default::default()
    };

    if !unsafe { GetOpenFileNameW(&mut request) }.as_bool() {
        return None;
    }

    let len = selected.iter().position(|c| *c == 0).unwrap_or(selected.len());
    (len > 0).then(|| PathBuf::from(OsString::from_wide(&selected[..len])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_pairs_are_double_nul_terminated() {
        let filter = String::from_utf16_lossy(&background_filter());
        let parts: Vec<&str> = filter.split('\0').collect();
        assert_eq!(parts[0], "Image Files (*.png;*.jpg;*.jpeg;*.bmp;*.gif)");
        assert_eq!(parts[1], "*.png;*.jpg;*.jpeg;*.bmp;*.gif");
        assert_eq!(parts[3], "*.*");
        assert!(filter.ends_with("\0\0"));
    }
}
