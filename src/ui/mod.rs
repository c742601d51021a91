use serde::{Deserialize, Serialize};

pub mod dialog;

pub const VK_BACK: u32 = 0x08;
pub const VK_RETURN: u32 = 0x0D;
pub const VK_ESCAPE: u32 = 0x1B;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    MouseDown(Point),
    KeyDown(u32),
    Char(char),
}

pub trait UIComponent {
    fn layout(&mut self, bounds: Rect, dpi: f32);
    fn handle_input(&mut self, event: &InputEvent) -> bool;
    fn hit_test(&self, point: Point) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn bounds(&self) -> Rect;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_quantizes_to_bytes() {
        assert_eq!(Color::from_rgb8(30, 30, 30).to_rgba8(), [30, 30, 30, 255]);
        assert_eq!(Color::rgba(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect {
            x: 10.0,
            y: 10.0,
            width: 5.0,
            height: 5.0,
        };
        assert!(rect.contains(Point { x: 10.0, y: 15.0 }));
        assert!(!rect.contains(Point { x: 9.9, y: 12.0 }));
    }
}
