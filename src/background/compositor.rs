use image::{RgbaImage, imageops::FilterType};

use super::{
    BackgroundPosition,
    source::{ImageAsset, rgba_offset},
};

/// Off-screen RGBA8 pixel buffer the background is composited into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Surface {
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = rgba_offset(self.width, x, y);
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }

    fn blend_pixel(&mut self, x: u32, y: u32, src: [u8; 4], opacity: u8) {
        let idx = rgba_offset(self.width, x, y);
        let dst = [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ];
        let out = over(dst, src, opacity);
        self.rgba[idx..idx + 4].copy_from_slice(&out);
    }
}

/// Destination rectangle for one draw of the image. Coordinates are relative
/// to the target and may lie partly or fully outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Placement {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Computes where the image lands for `mode`. Anchors keep the native size,
/// Fit/Fill scale uniformly, Tile returns one rect per grid cell.
pub fn placements(
    mode: BackgroundPosition,
    img_w: i32,
    img_h: i32,
    win_w: i32,
    win_h: i32,
) -> Vec<Placement> {
    if img_w <= 0 || img_h <= 0 {
        return Vec::new();
    }

    let centered_x = (win_w - img_w) / 2;
    let centered_y = (win_h - img_h) / 2;
    let right = win_w - img_w;
    let bottom = win_h - img_h;

    let single = |x: i32, y: i32| vec![Placement::new(x, y, img_w, img_h)];

    match mode {
        BackgroundPosition::TopLeft => single(0, 0),
        BackgroundPosition::TopCenter => single(centered_x, 0),
        BackgroundPosition::TopRight => single(right, 0),
        BackgroundPosition::CenterLeft => single(0, centered_y),
        BackgroundPosition::Center => single(centered_x, centered_y),
        BackgroundPosition::CenterRight => single(right, centered_y),
        BackgroundPosition::BottomLeft => single(0, bottom),
        BackgroundPosition::BottomCenter => single(centered_x, bottom),
        BackgroundPosition::BottomRight => single(right, bottom),
        BackgroundPosition::Tile => {
            let mut out = Vec::new();
            let mut y = 0;
            while y < win_h {
                let mut x = 0;
                while x < win_w {
                    out.push(Placement::new(x, y, img_w, img_h));
                    x += img_w;
                }
                y += img_h;
            }
            out
        }
        BackgroundPosition::Stretch => vec![Placement::new(0, 0, win_w, win_h)],
        BackgroundPosition::Fit | BackgroundPosition::Fill => {
            let sx = win_w as f32 / img_w as f32;
            let sy = win_h as f32 / img_h as f32;
            let scale = if mode == BackgroundPosition::Fit {
                sx.min(sy)
            } else {
                sx.max(sy)
            };
            let new_w = (img_w as f32 * scale) as i32;
            let new_h = (img_h as f32 * scale) as i32;
            vec![Placement::new(
                (win_w - new_w) / 2,
                (win_h - new_h) / 2,
                new_w,
                new_h,
            )]
        }
    }
}

/// Catmull-Rom support radius in source pixels at 1:1. Downscaling widens it
/// by the inverse scale.
const KERNEL_RADIUS: f64 = 2.0;

/// The part of a scaled placement that lands on the surface: a source
/// window and the destination rect it is resampled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledRegion {
    pub src_x: u32,
    pub src_y: u32,
    pub src_width: u32,
    pub src_height: u32,
    pub dest: Placement,
}

/// Clips `rect` to a `surface_w` x `surface_h` target and maps the visible
/// span back into image space. `None` when nothing is visible.
pub fn visible_region(
    img_w: u32,
    img_h: u32,
    rect: Placement,
    surface_w: u32,
    surface_h: u32,
) -> Option<ScaledRegion> {
    if img_w == 0 || img_h == 0 || rect.width <= 0 || rect.height <= 0 {
        return None;
    }
    let (src_x, src_width, dest_x, dest_width) = visible_span(img_w, rect.x, rect.width, surface_w)?;
    let (src_y, src_height, dest_y, dest_height) = visible_span(img_h, rect.y, rect.height, surface_h)?;
    Some(ScaledRegion {
        src_x,
        src_y,
        src_width,
        src_height,
        dest: Placement::new(dest_x, dest_y, dest_width, dest_height),
    })
}

fn visible_span(img: u32, pos: i32, len: i32, target: u32) -> Option<(u32, u32, i32, i32)> {
    let pos = i64::from(pos);
    let len = i64::from(len);
    let v0 = pos.max(0);
    let v1 = (pos + len).min(i64::from(target));
    if v0 >= v1 {
        return None;
    }

    let scale = len as f64 / f64::from(img);
    let pad = (KERNEL_RADIUS / scale.min(1.0)).ceil() as i64;
    let s0 = (((v0 - pos) as f64 / scale).floor() as i64 - pad).max(0);
    let s1 = (((v1 - pos) as f64 / scale).ceil() as i64 + pad).min(i64::from(img));
    if s0 >= s1 {
        return None;
    }
    let d0 = pos + (s0 as f64 * scale).round() as i64;
    let d1 = pos + (s1 as f64 * scale).round() as i64;
    let dest_len = (d1 - d0).max(1);

    Some((
        u32::try_from(s0).ok()?,
        u32::try_from(s1 - s0).ok()?,
        i32::try_from(d0).ok()?,
        i32::try_from(dest_len).ok()?,
    ))
}

/// Draws `asset` onto `surface` per `mode` with a uniform opacity.
///
/// A missing asset or a zero opacity draws nothing. Native-size placements
/// are clipped pixel by pixel; scaled ones are clipped first and only the
/// visible source window is resampled.
pub fn composite(
    surface: &mut Surface,
    asset: Option<&ImageAsset>,
    mode: BackgroundPosition,
    opacity: u8,
) {
    let Some(asset) = asset else {
        return;
    };
    if opacity == 0 || asset.width == 0 || asset.height == 0 {
        return;
    }

    let rects = placements(
        mode,
        asset.width as i32,
        asset.height as i32,
        surface.width as i32,
        surface.height as i32,
    );

    for rect in rects {
        if rect.width <= 0 || rect.height <= 0 {
            continue;
        }
        if rect.width as u32 == asset.width && rect.height as u32 == asset.height {
            draw_clipped(surface, &asset.rgba, rect, opacity);
            continue;
        }

        let Some(region) = visible_region(asset.width, asset.height, rect, surface.width, surface.height) else {
            continue;
        };
        if let Some(scaled) = scale_region(asset, &region) {
            draw_clipped(surface, scaled.as_raw(), region.dest, opacity);
        }
    }
}

fn scale_region(asset: &ImageAsset, region: &ScaledRegion) -> Option<RgbaImage> {
    let row_bytes = region.src_width as usize * 4;
    let mut window = Vec::with_capacity(row_bytes * region.src_height as usize);
    for y in region.src_y..region.src_y + region.src_height {
        let start = rgba_offset(asset.width, region.src_x, y);
        window.extend_from_slice(asset.rgba.get(start..start + row_bytes)?);
    }
    let window = RgbaImage::from_raw(region.src_width, region.src_height, window)?;
    Some(image::imageops::resize(
        &window,
        region.dest.width as u32,
        region.dest.height as u32,
        FilterType::CatmullRom,
    ))
}

fn draw_clipped(surface: &mut Surface, pixels: &[u8], rect: Placement, opacity: u8) {
    let x0 = i64::from(rect.x).max(0);
    let y0 = i64::from(rect.y).max(0);
    let x1 = (i64::from(rect.x) + i64::from(rect.width)).min(i64::from(surface.width));
    let y1 = (i64::from(rect.y) + i64::from(rect.height)).min(i64::from(surface.height));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let stride = rect.width as usize * 4;
    for dy in y0..y1 {
        let sy = (dy - i64::from(rect.y)) as usize;
        for dx in x0..x1 {
            let sx = (dx - i64::from(rect.x)) as usize;
            let idx = sy * stride + sx * 4;
            let src = [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]];
            surface.blend_pixel(dx as u32, dy as u32, src, opacity);
        }
    }
}

/// Straight-alpha source-over. The source alpha is scaled by `opacity`;
/// source color channels are used as-is.
pub fn over(dst: [u8; 4], src: [u8; 4], opacity: u8) -> [u8; 4] {
    let sa = mul_div255(u32::from(src[3]), u32::from(opacity));
    if sa == 0 {
        return dst;
    }

    let da = mul_div255(u32::from(dst[3]), 255 - sa);
    let out_a = sa + da;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (u32::from(src[i]) * sa + u32::from(dst[i]) * da + out_a / 2) / out_a;
        out[i] = c.min(255) as u8;
    }
    out[3] = out_a.min(255) as u8;
    out
}

fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgba, RgbaImage};

    use super::*;

    fn solid_asset(width: u32, height: u32, color: [u8; 4]) -> ImageAsset {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        ImageAsset::from_image("solid.png", DynamicImage::ImageRgba8(img))
    }

    #[test]
    fn anchors_place_native_size_with_integer_centering() {
        let cases = [
            (BackgroundPosition::TopLeft, (0, 0)),
            (BackgroundPosition::TopCenter, (150, 0)),
            (BackgroundPosition::TopRight, (300, 0)),
            (BackgroundPosition::CenterLeft, (0, 125)),
            (BackgroundPosition::Center, (150, 125)),
            (BackgroundPosition::CenterRight, (300, 125)),
            (BackgroundPosition::BottomLeft, (0, 250)),
            (BackgroundPosition::BottomCenter, (150, 250)),
            (BackgroundPosition::BottomRight, (300, 250)),
        ];
        for (mode, (x, y)) in cases {
            assert!(mode.is_anchor());
            assert_eq!(
                placements(mode, 100, 50, 400, 300),
                vec![Placement::new(x, y, 100, 50)],
                "{mode:?}"
            );
        }
    }

    #[test]
    fn oversized_anchor_goes_negative_and_truncates_toward_zero() {
        let center = placements(BackgroundPosition::Center, 101, 51, 50, 20);
        // (50 - 101) / 2 = -25 and (20 - 51) / 2 = -15 with C-style truncation.
        assert_eq!(center, vec![Placement::new(-25, -15, 101, 51)]);
        let bottom_right = placements(BackgroundPosition::BottomRight, 101, 51, 50, 20);
        assert_eq!(bottom_right, vec![Placement::new(-51, -31, 101, 51)]);
    }

    #[test]
    fn fit_scales_by_smaller_ratio_and_centers() {
        let fit = placements(BackgroundPosition::Fit, 200, 100, 300, 300);
        assert_eq!(fit, vec![Placement::new(0, 75, 300, 150)]);
    }

    #[test]
    fn fill_scales_by_larger_ratio_and_overflows() {
        let fill = placements(BackgroundPosition::Fill, 200, 100, 300, 300);
        assert_eq!(fill, vec![Placement::new(-150, 0, 600, 300)]);
    }

    #[test]
    fn stretch_covers_target_exactly() {
        let stretch = placements(BackgroundPosition::Stretch, 17, 9, 640, 480);
        assert_eq!(stretch, vec![Placement::new(0, 0, 640, 480)]);
    }

    #[test]
    fn tile_covers_target_with_partial_edge_tiles() {
        let tiles = placements(BackgroundPosition::Tile, 100, 50, 250, 120);
        assert_eq!(tiles.len(), 3 * 3);
        assert_eq!(tiles[0], Placement::new(0, 0, 100, 50));
        assert_eq!(tiles[2], Placement::new(200, 0, 100, 50));
        assert_eq!(tiles[8], Placement::new(200, 100, 100, 50));
    }

    #[test]
    fn zero_sized_image_has_no_placements() {
        assert!(placements(BackgroundPosition::Tile, 0, 10, 100, 100).is_empty());
        assert!(placements(BackgroundPosition::Fit, 10, 0, 100, 100).is_empty());
    }

    #[test]
    fn composite_without_asset_is_noop() {
        let mut surface = Surface::filled(4, 4, [1, 2, 3, 255]);
        let before = surface.clone();
        composite(&mut surface, None, BackgroundPosition::Stretch, 255);
        assert_eq!(surface, before);
    }

    #[test]
    fn opaque_anchor_draws_and_clips() {
        let asset = solid_asset(2, 2, [255, 0, 0, 255]);
        let mut surface = Surface::filled(3, 3, [255, 255, 255, 255]);
        composite(&mut surface, Some(&asset), BackgroundPosition::BottomRight, 255);

        assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(2, 2), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(0, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn tile_fills_every_pixel() {
        let asset = solid_asset(2, 2, [0, 0, 255, 255]);
        let mut surface = Surface::filled(5, 3, [0, 0, 0, 255]);
        composite(&mut surface, Some(&asset), BackgroundPosition::Tile, 255);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(surface.pixel(x, y), [0, 0, 255, 255]);
            }
        }
    }

    #[test]
    fn opacity_scales_source_alpha() {
        let asset = solid_asset(1, 1, [255, 255, 255, 255]);
        let mut surface = Surface::filled(1, 1, [0, 0, 0, 255]);
        composite(&mut surface, Some(&asset), BackgroundPosition::TopLeft, 127);
        assert_eq!(surface.pixel(0, 0), [127, 127, 127, 255]);

        let mut untouched = Surface::filled(1, 1, [9, 9, 9, 255]);
        composite(&mut untouched, Some(&asset), BackgroundPosition::TopLeft, 0);
        assert_eq!(untouched.pixel(0, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn fill_with_very_wide_image_resamples_only_the_visible_window() {
        let rects = placements(BackgroundPosition::Fill, 20_000, 10, 800, 600);
        assert_eq!(rects, vec![Placement::new(-599_600, 0, 1_200_000, 600)]);

        let region = visible_region(20_000, 10, rects[0], 800, 600).expect("visible");
        assert!(region.src_width < 32, "{region:?}");
        assert_eq!((region.src_y, region.src_height), (0, 10));
        assert!(region.dest.x <= 0, "{region:?}");
        assert!(region.dest.x + region.dest.width >= 800, "{region:?}");
        assert!(region.dest.width <= 2 * 800, "{region:?}");
        assert_eq!(region.dest.height, 600);

        let img = RgbaImage::from_fn(20_000, 10, |x, _| {
            if x < 10_000 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let asset = ImageAsset::from_image("banner.png", DynamicImage::ImageRgba8(img));
        let mut surface = Surface::filled(800, 600, [0, 0, 0, 255]);
        composite(&mut surface, Some(&asset), BackgroundPosition::Fill, 255);

        assert_eq!(surface.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(100, 300), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(700, 300), [0, 0, 255, 255]);
        assert_eq!(surface.pixel(799, 599), [0, 0, 255, 255]);
    }

    #[test]
    fn fill_with_very_tall_image_is_clipped_vertically() {
        let rects = placements(BackgroundPosition::Fill, 10, 20_000, 800, 600);
        let region = visible_region(10, 20_000, rects[0], 800, 600).expect("visible");
        assert_eq!((region.src_x, region.src_width), (0, 10));
        assert_eq!(region.dest.width, 800);
        assert!(region.src_height < 32, "{region:?}");
        assert!(region.dest.y <= 0, "{region:?}");
        assert!(region.dest.y + region.dest.height >= 600, "{region:?}");
        assert!(region.dest.height <= 2 * 600, "{region:?}");
    }

    #[test]
    fn downscaled_window_pads_for_the_wider_kernel() {
        // Fill 4000x1000 into 800x600 scales by 0.6: x = -800, width 2400.
        let rect = Placement::new(-800, 0, 2400, 600);
        let region = visible_region(4000, 1000, rect, 800, 600).expect("visible");
        assert_eq!(region.src_x, 1329);
        assert_eq!(region.src_width, 2671 - 1329);
        assert!(region.dest.x <= 0 && region.dest.x + region.dest.width >= 800);
    }

    #[test]
    fn off_surface_placement_has_no_region() {
        let rect = Placement::new(900, 0, 100, 100);
        assert_eq!(visible_region(10, 10, rect, 800, 600), None);
        assert_eq!(visible_region(10, 10, Placement::new(0, 0, 0, 10), 800, 600), None);
    }

    #[test]
    fn over_keeps_destination_for_transparent_source() {
        assert_eq!(over([4, 5, 6, 255], [200, 200, 200, 0], 255), [4, 5, 6, 255]);
        assert_eq!(over([4, 5, 6, 255], [200, 100, 50, 255], 255), [200, 100, 50, 255]);
        assert_eq!(over([0, 0, 0, 0], [200, 100, 50, 255], 255), [200, 100, 50, 255]);
    }
}
