// Example: a million fixed-height rows, a few scroll events and a jump to the end.
use windowed::{
    Align, EngineOptions, ItemContext, ItemRenderer, ScrollBehavior, Surface, SurfaceEvent,
    WindowedList,
};

/// Renders rows into strings.
struct Rows;

impl ItemRenderer<u32> for Rows {
    type Target = String;

    fn create(&mut self) -> String {
        String::new()
    }

    fn bind(&mut self, target: &mut String, ctx: &ItemContext<'_, u32>) {
        target.clear();
        target.push_str(&format!("row #{}", ctx.item));
    }

    fn place(&mut self, _target: &mut String, _offset: u64) {}
}

#[derive(Default)]
struct Terminal {
    top: u64,
    content: u64,
}

impl Surface for Terminal {
    fn scroll_top(&self) -> u64 {
        self.top
    }

    fn client_height(&self) -> u32 {
        24
    }

    fn set_scroll_top(&mut self, offset: u64) {
        self.top = offset;
    }

    fn set_scroll_height(&mut self, height: u64) {
        self.content = height;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut list = WindowedList::builder(EngineOptions::fixed(1).with_buffer_size(2))
        .renderer(Rows)
        .surface(Terminal::default())
        .build()?;

    let items: Vec<u32> = (0..1_000_000).collect();
    let snap = list.attach(items)?;
    println!(
        "attached: range={:?} total_height={}",
        snap.range(),
        snap.total_height
    );

    for (i, offset) in [10u64, 25, 400, 123_456].into_iter().enumerate() {
        let now = i as u64 * 16;
        list.on_event(SurfaceEvent::Scroll { offset }, now);
        list.on_frame(now);
        let snap = list.snapshot();
        println!(
            "scroll {offset}: range={:?} direction={:?}",
            snap.range(),
            snap.direction
        );
    }

    let to = list.scroll_to_index(999_999, ScrollBehavior::Immediate, Align::End);
    println!(
        "scroll_to_index(999_999): offset={to} last_row={:?}",
        list.snapshot()
            .visible_items
            .last()
            .and_then(|it| list.handle_target(it.handle))
    );
    println!("pool={:?}", list.pool_stats());
    Ok(())
}
