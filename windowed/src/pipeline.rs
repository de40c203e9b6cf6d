//! Scroll/resize event conditioning.
//!
//! Raw surface events arrive at whatever rate the host produces them. The pipeline turns them
//! into at most one scroll sample per frame (leading + trailing), folds near-duplicate offsets
//! together, tracks scroll direction and debounces resize bursts. It holds no timers: the host
//! reports time with every event and calls [`EventPipeline::on_frame`] at each frame boundary.

use core::cmp::Ordering;

use crate::ScrollDirection;

/// A raw notification from the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceEvent {
    Scroll { offset: u64 },
    Resize { extent: u32 },
}

/// A scroll offset that survived throttling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollSample {
    pub offset: u64,
    pub direction: Option<ScrollDirection>,
}

/// Leading + trailing scroll throttle.
///
/// The first event of a frame is emitted immediately (if `interval_ms` has passed since the
/// previous emission). Later events in the same frame overwrite a single pending slot, which is
/// flushed at the next frame boundary once the interval allows it.
#[derive(Clone, Debug)]
pub struct ScrollThrottle {
    interval_ms: u64,
    coalesce_px: u64,
    last_emit_ms: Option<u64>,
    emitted_in_frame: bool,
    pending: Option<u64>,
    last_offset: Option<u64>,
    direction: Option<ScrollDirection>,
}

impl ScrollThrottle {
    pub fn new(interval_ms: u64, coalesce_px: u64) -> Self {
        Self {
            interval_ms,
            coalesce_px,
            last_emit_ms: None,
            emitted_in_frame: false,
            pending: None,
            last_offset: None,
            direction: None,
        }
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn push(&mut self, offset: u64, now_ms: u64) -> Option<ScrollSample> {
        if let Some(pending) = self.pending {
            if offset.abs_diff(pending) < self.coalesce_px {
                // Fold into the pending flush, keeping the newest value.
                self.pending = Some(offset);
                return None;
            }
        } else if let Some(last) = self.last_offset {
            if offset.abs_diff(last) < self.coalesce_px {
                // Too small to emit now, but the next frame still lands on the resting offset.
                if offset != last {
                    self.pending = Some(offset);
                }
                return None;
            }
        }

        if !self.emitted_in_frame && self.window_open(now_ms) {
            return Some(self.emit(offset, now_ms));
        }
        self.pending = Some(offset);
        None
    }

    /// Frame boundary: flushes the trailing event if the interval has elapsed.
    pub fn flush(&mut self, now_ms: u64) -> Option<ScrollSample> {
        self.emitted_in_frame = false;
        if self.pending.is_none() || !self.window_open(now_ms) {
            return None;
        }
        let offset = self.pending.take()?;
        Some(self.emit(offset, now_ms))
    }

    /// Records an offset the engine applied itself (programmatic scrolls), so the echo coming
    /// back from the surface is folded away and direction stays correct.
    pub fn sync(&mut self, offset: u64) {
        self.pending = None;
        self.update_direction(offset);
        self.last_offset = Some(offset);
    }

    /// Caps a queued offset at `max` (the content got shorter under it).
    pub fn clamp_pending(&mut self, max: u64) {
        if let Some(pending) = self.pending.as_mut() {
            *pending = (*pending).min(max);
        }
    }

    /// Forgets all history (used when a new item sequence is attached).
    pub fn reset(&mut self, offset: u64) {
        self.pending = None;
        self.direction = None;
        self.last_offset = Some(offset);
    }

    fn window_open(&self, now_ms: u64) -> bool {
        self.last_emit_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.interval_ms)
    }

    fn emit(&mut self, offset: u64, now_ms: u64) -> ScrollSample {
        self.update_direction(offset);
        self.last_offset = Some(offset);
        self.last_emit_ms = Some(now_ms);
        self.emitted_in_frame = true;
        self.pending = None;
        ScrollSample {
            offset,
            direction: self.direction,
        }
    }

    fn update_direction(&mut self, offset: u64) {
        if let Some(prev) = self.last_offset {
            match offset.cmp(&prev) {
                Ordering::Greater => self.direction = Some(ScrollDirection::Forward),
                Ordering::Less => self.direction = Some(ScrollDirection::Backward),
                Ordering::Equal => {}
            }
        }
    }
}

/// Trailing-edge debounce for resize bursts.
#[derive(Clone, Debug)]
pub struct ResizeDebounce {
    quiet_ms: u64,
    pending: Option<u32>,
    last_event_ms: u64,
}

impl ResizeDebounce {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
            last_event_ms: 0,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn push(&mut self, extent: u32, now_ms: u64) {
        self.pending = Some(extent);
        self.last_event_ms = now_ms;
    }

    pub fn flush(&mut self, now_ms: u64) -> Option<u32> {
        self.pending?;
        if now_ms.saturating_sub(self.last_event_ms) < self.quiet_ms {
            return None;
        }
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Everything the pipeline released at a frame boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutput {
    pub scroll: Option<ScrollSample>,
    pub resize: Option<u32>,
}

impl FrameOutput {
    pub fn is_empty(&self) -> bool {
        self.scroll.is_none() && self.resize.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct EventPipeline {
    scroll: ScrollThrottle,
    resize: ResizeDebounce,
}

impl EventPipeline {
    pub fn new(scroll_throttle_ms: u64, scroll_coalesce_px: u64, resize_debounce_ms: u64) -> Self {
        Self {
            scroll: ScrollThrottle::new(scroll_throttle_ms, scroll_coalesce_px),
            resize: ResizeDebounce::new(resize_debounce_ms),
        }
    }

    pub fn scroll(&self) -> &ScrollThrottle {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollThrottle {
        &mut self.scroll
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.scroll.direction()
    }

    pub fn has_pending_resize(&self) -> bool {
        self.resize.has_pending()
    }

    /// Feeds one raw event. Returns a scroll sample when it passes the throttle immediately;
    /// resizes are never processed inline.
    pub fn push(&mut self, event: SurfaceEvent, now_ms: u64) -> Option<ScrollSample> {
        match event {
            SurfaceEvent::Scroll { offset } => self.scroll.push(offset, now_ms),
            SurfaceEvent::Resize { extent } => {
                self.resize.push(extent, now_ms);
                None
            }
        }
    }

    pub fn on_frame(&mut self, now_ms: u64) -> FrameOutput {
        FrameOutput {
            scroll: self.scroll.flush(now_ms),
            resize: self.resize.flush(now_ms),
        }
    }

    pub fn cancel(&mut self) {
        self.scroll.pending = None;
        self.resize.cancel();
    }
}
