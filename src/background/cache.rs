use super::{
    BackgroundConfig,
    compositor::{Surface, composite},
    source::ImageSource,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub skipped_degenerate: u64,
}

impl RenderCacheStats {
    pub fn hit_rate(self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Holds the single composited background surface for the editor client
/// area. The surface is keyed by its size; everything else that affects its
/// content must go through [`RenderCache::invalidate`].
#[derive(Debug, Default)]
pub struct RenderCache {
    surface: Option<Surface>,
    stats: RenderCacheStats,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached surface for `width` x `height`, compositing a new
    /// one when the cache is empty or was built for another size.
    ///
    /// Non-positive sizes leave the cache untouched and hand back whatever
    /// was there before. A disabled background (or one with nothing loaded)
    /// yields `None` and releases the surface.
    pub fn get_or_render(
        &mut self,
        width: i32,
        height: i32,
        fallback: [u8; 4],
        config: &BackgroundConfig,
        source: &ImageSource,
    ) -> Option<&Surface> {
        if !config.enabled || !source.is_loaded() {
            self.surface = None;
            return None;
        }

        if width <= 0 || height <= 0 {
            self.stats.skipped_degenerate += 1;
            return self.surface.as_ref();
        }

        let (width, height) = (width as u32, height as u32);
        let reusable = self
            .surface
            .as_ref()
            .is_some_and(|s| s.width == width && s.height == height);
        if reusable {
            self.stats.hits += 1;
            return self.surface.as_ref();
        }

        self.stats.misses += 1;
        self.surface = None;

        crate::profile_scope!("background.render");
        let mut surface = Surface::filled(width, height, fallback);
        composite(&mut surface, source.asset(), config.position, config.opacity);
        tracing::debug!(
            width,
            height,
            position = ?config.position,
            opacity = config.opacity,
            "background surface rendered"
        );

        Some(&*self.surface.insert(surface))
    }

    pub fn invalidate(&mut self) {
        if self.surface.take().is_some() {
            self.stats.invalidations += 1;
        }
    }

    pub fn cached(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn is_valid_for(&self, width: i32, height: i32) -> bool {
        self.surface
            .as_ref()
            .is_some_and(|s| s.width as i32 == width && s.height as i32 == height)
    }

    pub fn stats(&self) -> RenderCacheStats {
        self.stats
    }
}
