use std::collections::HashMap;

use windowed::{EngineOptions, ItemContext, ItemRenderer, WindowedList};
use windowed_adapter::{Controller, HeadlessSurface};

struct Messages;

impl ItemRenderer<u64> for Messages {
    type Target = u64;

    fn create(&mut self) -> u64 {
        0
    }

    fn bind(&mut self, target: &mut u64, ctx: &ItemContext<'_, u64>) {
        *target = ctx.key;
    }

    fn place(&mut self, _target: &mut u64, _offset: u64) {}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: a chat feed. New messages stream in at the bottom (tail-following), and older
    // history is prepended above without moving what the reader is looking at.
    //
    // Item values double as stable message ids, which the identity function turns into keys.
    let list = WindowedList::builder(EngineOptions::fixed(2))
        .renderer(Messages)
        .surface(HeadlessSurface::new(20))
        .identity(|_, id: &u64| *id)
        .build()?;
    let mut c = Controller::new(list);
    c.set_follow_tail(true);

    let mut feed: Vec<u64> = (1000..1050).collect();
    c.attach(feed.clone())?;
    println!("attached: off={} at_end={}", c.list().scroll_offset(), c.is_at_end());

    // New messages arrive while the reader sits at the bottom.
    feed.extend(1050..1060);
    let index: HashMap<u64, usize> = feed.iter().enumerate().map(|(i, &k)| (k, i)).collect();
    c.replace_items(feed.clone(), |k| index.get(k).copied())?;
    println!("appended: off={} at_end={}", c.list().scroll_offset(), c.is_at_end());

    // The reader scrolls up; older history is loaded above.
    c.on_scroll(40, 16);
    c.tick(16);
    let anchor = c.capture_first_visible_anchor();
    println!("reading: off={} anchor={anchor:?}", c.list().scroll_offset());

    let mut older: Vec<u64> = (900..1000).collect();
    older.extend(feed);
    let index: HashMap<u64, usize> = older.iter().enumerate().map(|(i, &k)| (k, i)).collect();
    c.replace_items(older, |k| index.get(k).copied())?;
    println!(
        "prepended: off={} anchor={:?}",
        c.list().scroll_offset(),
        c.capture_first_visible_anchor()
    );
    Ok(())
}
