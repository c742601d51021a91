use super::schema::WindowSettings;

/// Screen rectangle with exclusive right/bottom edges, like a Win32 `RECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

pub trait MonitorLayout {
    /// True when any attached monitor overlaps `rect`.
    fn intersects(&self, rect: &ScreenRect) -> bool;
}

/// Fixed monitor list, used off Windows and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticMonitors {
    pub monitors: Vec<ScreenRect>,
}

impl StaticMonitors {
    pub fn new(monitors: Vec<ScreenRect>) -> Self {
        Self { monitors }
    }
}

impl MonitorLayout for StaticMonitors {
    fn intersects(&self, rect: &ScreenRect) -> bool {
        self.monitors.iter().any(|m| m.intersects(rect))
    }
}

#[cfg(windows)]
pub struct Win32Monitors;

#[cfg(windows)]
impl MonitorLayout for Win32Monitors {
    fn intersects(&self, rect: &ScreenRect) -> bool {
        use windows::Win32::{
            Foundation::RECT,
            Graphics::Gdi::{MONITOR_DEFAULTTONULL, MonitorFromRect},
        };

        let rc = RECT {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        };
        let monitor = unsafe { MonitorFromRect(&rc, MONITOR_DEFAULTTONULL) };
        !monitor.is_invalid()
    }
}

/// Drops a stored position that would put the window entirely off-screen.
/// Returns `true` when the position was reset.
pub fn validate_placement(window: &mut WindowSettings, monitors: &impl MonitorLayout) -> bool {
    let (Some(x), Some(y)) = (window.x, window.y) else {
        return false;
    };

    let rect = ScreenRect::new(
        x,
        y,
        x.saturating_add(window.width),
        y.saturating_add(window.height),
    );
    if monitors.intersects(&rect) {
        return false;
    }

    tracing::info!(x, y, "stored window position is off-screen, using system default");
    window.reset_position();
    true
}
