use alloc::sync::Arc;

use windowed::{
    Align, ItemKey, ItemRenderer, LifecycleError, ScrollBehavior, Surface, SurfaceEvent,
    ViewportSnapshot, WindowedList,
};

use crate::{HeadlessSurface, ScrollAnchor, apply_anchor, capture_first_visible_anchor};

/// A framework-neutral controller that wraps a [`WindowedList`] and provides common host
/// workflows (anchored replacement, tail-following for streaming feeds).
///
/// This type does not hold any UI objects. Hosts drive it by calling:
/// - `on_scroll` / `on_resize` when UI events occur
/// - `tick(now_ms)` at every frame boundary
#[derive(Debug)]
pub struct Controller<T, R, S = HeadlessSurface>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    list: WindowedList<T, R, S>,
    follow_tail: bool,
}

impl<T, R, S> Controller<T, R, S>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    pub fn new(list: WindowedList<T, R, S>) -> Self {
        Self {
            list,
            follow_tail: false,
        }
    }

    pub fn list(&self) -> &WindowedList<T, R, S> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut WindowedList<T, R, S> {
        &mut self.list
    }

    pub fn into_list(self) -> WindowedList<T, R, S> {
        self.list
    }

    pub fn snapshot(&self) -> &ViewportSnapshot {
        self.list.snapshot()
    }

    /// When on, the viewport stays pinned to the bottom while it is already there: appended
    /// items and late measurements scroll the list instead of growing below the fold.
    pub fn set_follow_tail(&mut self, follow: bool) {
        self.follow_tail = follow;
    }

    pub fn follows_tail(&self) -> bool {
        self.follow_tail
    }

    pub fn attach(&mut self, items: impl Into<Arc<[T]>>) -> Result<(), LifecycleError> {
        self.list.attach(items)?;
        if self.follow_tail {
            self.list.scroll_to_bottom();
        }
        Ok(())
    }

    /// Whether the bottom edge of the viewport touches the end of the content.
    pub fn is_at_end(&self) -> bool {
        let end = self
            .list
            .scroll_offset()
            .saturating_add(self.list.surface_extent() as u64)
            .saturating_add(self.list.options().reach_epsilon);
        end >= self.list.registry().total_height()
    }

    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) {
        self.list.on_event(SurfaceEvent::Scroll { offset }, now_ms);
    }

    pub fn on_resize(&mut self, extent: u32, now_ms: u64) {
        self.list.on_event(SurfaceEvent::Resize { extent }, now_ms);
    }

    /// Frame boundary. Returns the new scroll offset when the frame moved it (smooth scroll or
    /// tail-following), so hosts with a real scroll container can mirror it.
    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        let before = self.list.scroll_offset();
        let pinned = self.follow_tail && self.is_at_end();
        self.list.on_frame(now_ms);
        if pinned && !self.list.is_animating() && !self.is_at_end() {
            self.list.scroll_to_bottom();
        }
        let after = self.list.scroll_offset();
        (after != before).then_some(after)
    }

    pub fn scroll_to_index(&mut self, index: usize, behavior: ScrollBehavior, align: Align) -> u64 {
        self.list.scroll_to_index(index, behavior, align)
    }

    pub fn capture_first_visible_anchor(&self) -> Option<ScrollAnchor> {
        capture_first_visible_anchor(&self.list)
    }

    pub fn apply_anchor(
        &mut self,
        anchor: &ScrollAnchor,
        key_to_index: impl FnMut(&ItemKey) -> Option<usize>,
    ) -> bool {
        apply_anchor(&mut self.list, anchor, key_to_index)
    }

    /// Replaces the item sequence without moving the reader.
    ///
    /// With tail-following on and the viewport at the end, the list sticks to the new bottom.
    /// Otherwise the first visible item is anchored before the swap and restored afterwards via
    /// `key_to_index`, which must describe the *new* sequence.
    pub fn replace_items(
        &mut self,
        items: impl Into<Arc<[T]>>,
        key_to_index: impl FnMut(&ItemKey) -> Option<usize>,
    ) -> Result<(), LifecycleError> {
        let stick = self.follow_tail && self.is_at_end();
        let anchor = self.capture_first_visible_anchor();
        self.list.update_items(items)?;

        if stick {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "windowed::adapter", "replace_items: following tail");
            self.list.scroll_to_bottom();
        } else if let Some(anchor) = anchor {
            let applied = self.apply_anchor(&anchor, key_to_index);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "windowed::adapter",
                key = anchor.key,
                applied,
                "replace_items: anchor"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = applied;
        }
        Ok(())
    }
}
