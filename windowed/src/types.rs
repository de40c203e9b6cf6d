use alloc::vec::Vec;
use core::ops::Range;

use crate::HandleId;

/// Identity forwarded to the renderer alongside each item.
pub type ItemKey = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Where a `scroll_to_index` target lands inside the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    /// Leave the offset alone when the item is already fully visible, otherwise scroll the
    /// minimum distance.
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollBehavior {
    #[default]
    Immediate,
    /// Animated over `EngineOptions::smooth_scroll_ms`, advanced on frame boundaries.
    Smooth,
}

/// A buffered index window over the item sequence.
///
/// `end_index` is inclusive. An empty sequence is represented by `total_items == 0`, in which
/// case both indexes are 0 and [`WindowRange::len`] is 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize,
    pub total_items: usize,
}

impl WindowRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
        total_items: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end_index - self.start_index + 1
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        !self.is_empty() && index >= self.start_index && index <= self.end_index
    }

    /// The covered indexes as a half-open range.
    pub fn indices(&self) -> Range<usize> {
        if self.is_empty() {
            0..0
        } else {
            self.start_index..self.end_index + 1
        }
    }
}

/// One positioned entry of a [`ViewportSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleItem {
    pub index: usize,
    pub key: ItemKey,
    /// Offset of the item's top edge from the start of the content.
    pub offset: u64,
    pub height: u32,
    pub handle: HandleId,
}

impl VisibleItem {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.height as u64)
    }
}

/// The result of one recompute pass. Replaced wholesale every pass, never patched.
///
/// `visible_items` covers `start_index..=end_index` (buffer included) in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportSnapshot {
    pub scroll_offset: u64,
    pub surface_extent: u32,
    pub start_index: usize,
    pub end_index: usize,
    pub visible_items: Vec<VisibleItem>,
    pub total_items: usize,
    pub total_height: u64,
    pub direction: Option<ScrollDirection>,
}

impl ViewportSnapshot {
    pub fn range(&self) -> WindowRange {
        WindowRange {
            start_index: self.start_index,
            end_index: self.end_index,
            total_items: self.total_items,
        }
    }

    pub fn item(&self, index: usize) -> Option<&VisibleItem> {
        let pos = index.checked_sub(self.start_index)?;
        self.visible_items.get(pos).filter(|it| it.index == index)
    }
}
