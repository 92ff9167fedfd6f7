/// Path prefix the site is served under. Must match `public_url` in Trunk.toml.
pub const DEFAULT_BASE_PATH: &str = "/datacoffee-page/";

/// Vertical offset (px) past which the page counts as scrolled.
pub const SCROLL_THRESHOLD: f64 = 50.0;

/// Fraction of a section's area that has to be on screen to reveal it.
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

/// Attribute marking the elements the viewport tracker observes.
pub const SECTION_ATTRIBUTE: &str = "data-section";

pub fn get_base_path() -> &'static str {
    option_env!("DATACOFFEE_BASE_PATH").unwrap_or(DEFAULT_BASE_PATH)
}

#[cfg(debug_assertions)]
pub fn get_log_level() -> log::Level {
    log::Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn get_log_level() -> log::Level {
    log::Level::Info
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    pub scroll_threshold: f64,
    pub visibility_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: SCROLL_THRESHOLD,
            visibility_threshold: VISIBILITY_THRESHOLD,
        }
    }
}
