use crate::{HeightMode, HeightRegistry, WindowRange};

/// Computes the buffered index window for a scroll position.
///
/// The raw range runs from the item containing `scroll_offset` to the item containing the last
/// visible pixel (`scroll_offset + surface_extent - 1`). It is then widened by `buffer_size` on
/// both sides and clamped to `[0, len - 1]`. Offsets past the end clamp to the last item.
pub fn compute_range(
    registry: &HeightRegistry,
    scroll_offset: u64,
    surface_extent: u32,
    buffer_size: usize,
) -> WindowRange {
    let count = registry.len();
    if count == 0 {
        return WindowRange::EMPTY;
    }
    let last = count - 1;
    let view_end = scroll_offset.saturating_add(surface_extent as u64);

    let (start, end) = match registry.mode() {
        HeightMode::Fixed(h) => {
            let h = h as u64;
            let start = scroll_offset / h;
            let end = view_end.div_ceil(h).saturating_sub(1);
            (to_index(start), to_index(end))
        }
        HeightMode::Dynamic => {
            let start = registry.index_at_offset(scroll_offset).unwrap_or(0);
            let end = registry
                .index_at_offset(view_end.saturating_sub(1))
                .unwrap_or(start);
            (start, end)
        }
    };

    let start = start.min(last);
    let end = end.clamp(start, last);

    WindowRange {
        start_index: start.saturating_sub(buffer_size),
        end_index: end.saturating_add(buffer_size).min(last),
        total_items: count,
    }
}

fn to_index(v: u64) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}
