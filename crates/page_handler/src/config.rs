//! Configuration settings for the site interactions.
//!
//! Every tunable constant the interactions read lives here. The defaults are
//! the values the live site uses; configuration can also be loaded from
//! environment variables or constructed programmatically.

use core::time::Duration;
use std::env;

/// Tunable constants for the site interactions.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    /// Viewports at most this wide use the mobile navigation behavior
    pub narrow_breakpoint: f64,
    /// Gap left above an anchor target for the fixed header
    pub anchor_offset: f64,
    /// Scroll offset above which the header shows the strong shadow
    pub shadow_threshold: f64,
    /// A section becomes current once scrolled within this distance of its top
    pub section_offset: f64,
    /// Distance above the viewport bottom an element must reach to be revealed
    pub reveal_point: f64,
    /// Fraction of an element that must be visible for the intersection reveal
    pub reveal_threshold: f64,
    /// Bottom margin applied to the viewport for the intersection reveal
    pub reveal_bottom_margin: f64,
    /// How long a banner stays on screen, in milliseconds
    pub banner_display_ms: u64,
    /// Length of the banner exit animation, in milliseconds
    pub banner_exit_ms: u64,
    /// Delay before the body fades in after load, in milliseconds
    pub load_fade_delay_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(768.0, 80.0, 50.0, 150.0)
    }
}

impl SiteConfig {
    /// Construct a configuration with explicit layout thresholds and the
    /// default reveal and timing values.
    ///
    /// # Arguments
    ///
    /// * `narrow_breakpoint` - Widest viewport treated as mobile
    /// * `anchor_offset` - Space kept above anchor scroll targets
    /// * `shadow_threshold` - Scroll offset that switches the header shadow
    /// * `section_offset` - Lead distance for the active section
    #[inline]
    #[must_use]
    pub const fn new(
        narrow_breakpoint: f64,
        anchor_offset: f64,
        shadow_threshold: f64,
        section_offset: f64,
    ) -> Self {
        Self {
            narrow_breakpoint,
            anchor_offset,
            shadow_threshold,
            section_offset,
            reveal_point: 100.0,
            reveal_threshold: 0.1,
            reveal_bottom_margin: -100.0,
            banner_display_ms: 5000,
            banner_exit_ms: 300,
            load_fade_delay_ms: 100,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables, falling back to the
    /// defaults when unset or unparsable:
    /// - `FARM_SITE_NARROW_BREAKPOINT`
    /// - `FARM_SITE_ANCHOR_OFFSET`
    /// - `FARM_SITE_SHADOW_THRESHOLD`
    /// - `FARM_SITE_SECTION_OFFSET`
    /// - `FARM_SITE_REVEAL_POINT`
    /// - `FARM_SITE_REVEAL_THRESHOLD` (clamped to 0..=1)
    /// - `FARM_SITE_REVEAL_BOTTOM_MARGIN`
    /// - `FARM_SITE_BANNER_MS`
    /// - `FARM_SITE_BANNER_EXIT_MS`
    /// - `FARM_SITE_LOAD_FADE_MS`
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            narrow_breakpoint: env_f64("FARM_SITE_NARROW_BREAKPOINT")
                .unwrap_or(defaults.narrow_breakpoint),
            anchor_offset: env_f64("FARM_SITE_ANCHOR_OFFSET").unwrap_or(defaults.anchor_offset),
            shadow_threshold: env_f64("FARM_SITE_SHADOW_THRESHOLD")
                .unwrap_or(defaults.shadow_threshold),
            section_offset: env_f64("FARM_SITE_SECTION_OFFSET").unwrap_or(defaults.section_offset),
            reveal_point: env_f64("FARM_SITE_REVEAL_POINT").unwrap_or(defaults.reveal_point),
            reveal_threshold: env_f64("FARM_SITE_REVEAL_THRESHOLD")
                .map_or(defaults.reveal_threshold, |val| val.clamp(0.0, 1.0)),
            reveal_bottom_margin: env_f64("FARM_SITE_REVEAL_BOTTOM_MARGIN")
                .unwrap_or(defaults.reveal_bottom_margin),
            banner_display_ms: env_u64("FARM_SITE_BANNER_MS").unwrap_or(defaults.banner_display_ms),
            banner_exit_ms: env_u64("FARM_SITE_BANNER_EXIT_MS").unwrap_or(defaults.banner_exit_ms),
            load_fade_delay_ms: env_u64("FARM_SITE_LOAD_FADE_MS")
                .unwrap_or(defaults.load_fade_delay_ms),
        }
    }

    /// Whether a viewport of this width gets the mobile navigation.
    #[inline]
    #[must_use]
    pub fn is_narrow(&self, viewport_width: f64) -> bool {
        viewport_width <= self.narrow_breakpoint
    }

    #[inline]
    #[must_use]
    pub const fn banner_display(&self) -> Duration {
        Duration::from_millis(self.banner_display_ms)
    }

    #[inline]
    #[must_use]
    pub const fn banner_exit(&self) -> Duration {
        Duration::from_millis(self.banner_exit_ms)
    }

    #[inline]
    #[must_use]
    pub const fn load_fade_delay(&self) -> Duration {
        Duration::from_millis(self.load_fade_delay_ms)
    }
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name)
        .ok()
        .and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|val| val.is_finite())
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|val| val.trim().parse::<u64>().ok())
}
