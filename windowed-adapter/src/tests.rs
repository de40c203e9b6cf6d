use crate::*;

use alloc::vec::Vec;
use std::collections::HashMap;

use windowed::{
    Align, EngineOptions, ItemContext, ItemKey, ItemRenderer, ScrollBehavior, Surface,
    WindowedList,
};

/// Binds the item key into the target; measures every bound cell at `height` when set.
#[derive(Debug, Default)]
struct Cells {
    height: Option<u32>,
}

impl ItemRenderer<u64> for Cells {
    type Target = Option<ItemKey>;

    fn create(&mut self) -> Option<ItemKey> {
        None
    }

    fn bind(&mut self, target: &mut Option<ItemKey>, ctx: &ItemContext<'_, u64>) {
        *target = Some(ctx.key);
    }

    fn place(&mut self, _target: &mut Option<ItemKey>, _offset: u64) {}

    fn detach(&mut self, target: &mut Option<ItemKey>) {
        *target = None;
    }

    fn measure(&mut self, target: &Option<ItemKey>) -> Option<u32> {
        target.and(self.height)
    }
}

type List = WindowedList<u64, Cells, HeadlessSurface>;

fn list(options: EngineOptions, cells: Cells, extent: u32) -> List {
    WindowedList::builder(options)
        .renderer(cells)
        .surface(HeadlessSurface::new(extent))
        .identity(|_, key: &u64| *key)
        .build()
        .unwrap()
}

fn keys(range: core::ops::Range<u64>) -> Vec<u64> {
    range.collect()
}

fn index_map(items: &[u64]) -> HashMap<ItemKey, usize> {
    items.iter().enumerate().map(|(i, &k)| (k, i)).collect()
}

#[test]
fn anchor_survives_prepend() {
    let mut l = list(EngineOptions::fixed(10), Cells::default(), 100);
    l.attach(keys(1000..1100)).unwrap();
    l.scroll_to_offset(505, ScrollBehavior::Immediate);

    let anchor = capture_first_visible_anchor(&l).unwrap();
    assert_eq!(anchor.key, 1050);
    assert_eq!(anchor.offset_in_item, 5);

    // Ten older items arrive above; existing items shift down by ten indexes.
    let mut next = keys(2000..2010);
    next.extend(1000..1100);
    let map = index_map(&next);
    l.update_items(next).unwrap();

    assert!(apply_anchor(&mut l, &anchor, |k| map.get(k).copied()));
    assert_eq!(l.scroll_offset(), 605);
    assert_eq!(capture_first_visible_anchor(&l), Some(anchor));
}

#[test]
fn anchor_for_missing_key_is_rejected() {
    let mut l = list(EngineOptions::fixed(10), Cells::default(), 100);
    assert_eq!(capture_first_visible_anchor(&l), None);
    l.attach(keys(0..10)).unwrap();
    let anchor = ScrollAnchor {
        key: 77,
        offset_in_item: 0,
    };
    assert!(!apply_anchor(&mut l, &anchor, |_| None));
    assert!(!apply_anchor(&mut l, &anchor, |_| Some(500)));
}

#[test]
fn empty_list_has_no_anchor() {
    let mut l = list(EngineOptions::fixed(10), Cells::default(), 100);
    l.attach(Vec::<u64>::new()).unwrap();
    assert_eq!(capture_first_visible_anchor(&l), None);
}

#[test]
fn controller_replace_keeps_reader_in_place() {
    let mut c = Controller::new(list(EngineOptions::fixed(10), Cells::default(), 100));
    c.attach(keys(0..100)).unwrap();
    c.scroll_to_index(40, ScrollBehavior::Immediate, Align::Start);
    assert_eq!(c.list().scroll_offset(), 400);

    let mut next = keys(500..520);
    next.extend(0..100);
    let map = index_map(&next);
    c.replace_items(next, |k| map.get(k).copied()).unwrap();
    assert_eq!(c.list().scroll_offset(), 600);
    assert_eq!(c.snapshot().item(60).map(|it| it.key), Some(40));
}

#[test]
fn controller_follows_tail_only_from_the_bottom() {
    let mut c = Controller::new(list(EngineOptions::fixed(10), Cells::default(), 100));
    c.set_follow_tail(true);
    c.attach(keys(0..50)).unwrap();
    assert_eq!(c.list().scroll_offset(), 400);
    assert!(c.is_at_end());

    let items = keys(0..60);
    let map = index_map(&items);
    c.replace_items(items, |k| map.get(k).copied()).unwrap();
    assert_eq!(c.list().scroll_offset(), 500);

    // Reader scrolled away: appends no longer drag the viewport.
    c.on_scroll(100, 16);
    assert!(!c.is_at_end());
    let items = keys(0..70);
    let map = index_map(&items);
    c.replace_items(items, |k| map.get(k).copied()).unwrap();
    assert_eq!(c.list().scroll_offset(), 100);
}

#[test]
fn tick_keeps_tail_pinned_while_heights_grow() {
    let cells = Cells { height: Some(30) };
    let mut c = Controller::new(list(EngineOptions::dynamic(10), cells, 100));
    c.set_follow_tail(true);
    c.attach(keys(0..50)).unwrap();
    assert_eq!(c.list().scroll_offset(), 400);

    let moved = c.tick(0);
    assert_eq!(c.list().registry().total_height(), 1500);
    assert_eq!(moved, Some(1400));
    assert!(c.is_at_end());

    c.tick(16);
    assert!(c.is_at_end());
}

#[test]
fn tick_reports_smooth_scroll_progress() {
    let mut c = Controller::new(list(EngineOptions::fixed(10), Cells::default(), 100));
    c.attach(keys(0..1000)).unwrap();
    let to = c.scroll_to_index(500, ScrollBehavior::Smooth, Align::Start);
    assert_eq!(to, 5000);

    let mut last = 0;
    for now in [40u64, 80, 120, 200, 240] {
        if let Some(off) = c.tick(now) {
            assert!(off >= last);
            last = off;
        }
    }
    assert_eq!(last, 5000);
    assert_eq!(c.tick(260), None);
}

#[test]
fn headless_surface_tracks_engine_writes() {
    let mut l = list(EngineOptions::fixed(10), Cells::default(), 100);
    l.attach(keys(0..30)).unwrap();
    assert_eq!(l.surface().scroll_height(), 300);
    l.scroll_to_bottom();
    assert_eq!(l.surface().scroll_top(), 200);

    l.surface_mut().set_client_height(50);
    assert_eq!(l.surface().client_height(), 50);
    assert!(!l.surface().is_detached());
    l.destroy();
    assert!(l.surface().is_detached());
}
