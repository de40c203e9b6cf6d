use windowed::{
    EngineState, ItemKey, ItemRenderer, ScrollBehavior, Surface, WindowedList,
};

/// A position expressed relative to an item identity rather than an absolute offset.
///
/// Typical use cases:
/// - chat/timeline "prepend" (older messages loaded above) without content jumping
/// - reorders or filtered replacements where the reader should stay on the same item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    pub key: ItemKey,
    /// Distance from the anchor item's top edge to the scroll offset.
    pub offset_in_item: u64,
}

/// Captures an anchor for the item under the top edge of the viewport (buffer excluded).
///
/// Returns `None` when the list is not attached or holds no items.
pub fn capture_first_visible_anchor<T, R, S>(list: &WindowedList<T, R, S>) -> Option<ScrollAnchor>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    if list.state() != EngineState::Steady {
        return None;
    }
    let offset = list.scroll_offset();
    let index = list.registry().index_at_offset(offset)?;
    let item = list.snapshot().item(index)?;
    Some(ScrollAnchor {
        key: item.key,
        offset_in_item: offset.saturating_sub(item.offset),
    })
}

/// Scrolls so the anchored item sits where it was captured.
///
/// `key_to_index` maps keys to indexes of the *current* item sequence. Returns `false` when the
/// key is gone or the list is not attached.
pub fn apply_anchor<T, R, S>(
    list: &mut WindowedList<T, R, S>,
    anchor: &ScrollAnchor,
    mut key_to_index: impl FnMut(&ItemKey) -> Option<usize>,
) -> bool
where
    R: ItemRenderer<T>,
    S: Surface,
{
    if list.state() != EngineState::Steady {
        return false;
    }
    let Some(index) = key_to_index(&anchor.key) else {
        return false;
    };
    if index >= list.registry().len() {
        return false;
    }
    let target = list
        .registry()
        .offset(index)
        .saturating_add(anchor.offset_in_item);
    list.scroll_to_offset(target, ScrollBehavior::Immediate);
    true
}
