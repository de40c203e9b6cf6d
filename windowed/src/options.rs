use crate::{ConfigError, Easing};

/// Upper bound accepted for [`EngineOptions::buffer_size`].
pub const MAX_BUFFER_SIZE: usize = 1024;

/// Configuration for [`crate::WindowedList`].
///
/// Plain data: cheap to clone, and with `feature = "serde"` it can be loaded from the host's own
/// configuration files. Use [`EngineOptions::validate`] (called by the builder) to reject bad
/// values before an engine exists.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Fixed height for every item. When set, the engine runs in fixed mode even if
    /// `enable_dynamic_height` is also set.
    pub item_height: Option<u32>,

    /// Estimate used for unmeasured items until the first measurement arrives, and the fixed
    /// constant when neither `item_height` nor dynamic heights are configured.
    pub estimated_item_height: u32,

    /// Extra items kept attached on each side of the visible range.
    pub buffer_size: usize,

    /// Minimum spacing between two processed scroll events.
    pub scroll_throttle_ms: u64,

    /// Quiet period a resize burst must observe before it is applied.
    pub resize_debounce_ms: u64,

    /// Scroll updates closer than this to the last processed offset are folded into it.
    pub scroll_coalesce_px: u64,

    pub enable_dynamic_height: bool,

    /// Relative deviation between a measurement and the previous height that schedules a
    /// re-layout pass (`0.1` = 10%).
    pub relayout_threshold: f32,

    /// Slack applied to the "reached end" check.
    pub reach_epsilon: u64,

    /// Forwarded to the renderer through [`crate::ItemContext`]; not interpreted.
    pub preload_images: bool,

    /// Keep detached handles in an idle pool instead of destroying them.
    pub recycle_views: bool,

    pub smooth_scroll_ms: u64,
    pub easing: Easing,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            item_height: None,
            estimated_item_height: 50,
            buffer_size: 3,
            scroll_throttle_ms: 16,
            resize_debounce_ms: 200,
            scroll_coalesce_px: 1,
            enable_dynamic_height: false,
            relayout_threshold: 0.1,
            reach_epsilon: 1,
            preload_images: false,
            recycle_views: true,
            smooth_scroll_ms: 240,
            easing: Easing::SmoothStep,
        }
    }
}

impl EngineOptions {
    /// Options for a fixed-height list.
    pub fn fixed(item_height: u32) -> Self {
        Self {
            item_height: Some(item_height),
            ..Self::default()
        }
    }

    /// Options for a measured list, starting from `estimated_item_height`.
    pub fn dynamic(estimated_item_height: u32) -> Self {
        Self {
            estimated_item_height,
            enable_dynamic_height: true,
            ..Self::default()
        }
    }

    pub fn with_item_height(mut self, item_height: Option<u32>) -> Self {
        self.item_height = item_height;
        self
    }

    pub fn with_estimated_item_height(mut self, height: u32) -> Self {
        self.estimated_item_height = height;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_scroll_throttle_ms(mut self, ms: u64) -> Self {
        self.scroll_throttle_ms = ms;
        self
    }

    pub fn with_resize_debounce_ms(mut self, ms: u64) -> Self {
        self.resize_debounce_ms = ms;
        self
    }

    pub fn with_scroll_coalesce_px(mut self, px: u64) -> Self {
        self.scroll_coalesce_px = px;
        self
    }

    pub fn with_dynamic_height(mut self, enabled: bool) -> Self {
        self.enable_dynamic_height = enabled;
        self
    }

    pub fn with_relayout_threshold(mut self, threshold: f32) -> Self {
        self.relayout_threshold = threshold;
        self
    }

    pub fn with_reach_epsilon(mut self, epsilon: u64) -> Self {
        self.reach_epsilon = epsilon;
        self
    }

    pub fn with_preload_images(mut self, preload: bool) -> Self {
        self.preload_images = preload;
        self
    }

    pub fn with_recycle_views(mut self, recycle: bool) -> Self {
        self.recycle_views = recycle;
        self
    }

    pub fn with_smooth_scroll(mut self, duration_ms: u64, easing: Easing) -> Self {
        self.smooth_scroll_ms = duration_ms;
        self.easing = easing;
        self
    }

    /// Whether heights are measured per index.
    pub fn is_dynamic(&self) -> bool {
        self.item_height.is_none() && self.enable_dynamic_height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_height == Some(0) {
            return Err(ConfigError::ZeroItemHeight);
        }
        if self.estimated_item_height == 0 {
            return Err(ConfigError::ZeroEstimatedHeight);
        }
        if self.buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::InvalidBufferSize {
                value: self.buffer_size,
                max: MAX_BUFFER_SIZE,
            });
        }
        if !self.relayout_threshold.is_finite() || self.relayout_threshold < 0.0 {
            return Err(ConfigError::InvalidRelayoutThreshold);
        }
        Ok(())
    }
}
