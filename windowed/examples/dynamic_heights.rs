// Example: measured heights, relayout on large deviations, and late measurements.
use windowed::{
    EngineOptions, ItemContext, ItemRenderer, Signal, Surface, SurfaceEvent, WindowedList,
};

/// A paragraph that wraps at 40 columns; its height is its line count.
struct Paragraphs {
    /// Pretend images have not loaded yet: items with an image report their height late.
    images_pending: bool,
}

struct Block {
    lines: u32,
    has_image: bool,
}

impl ItemRenderer<String> for Paragraphs {
    type Target = Block;

    fn create(&mut self) -> Block {
        Block {
            lines: 0,
            has_image: false,
        }
    }

    fn bind(&mut self, target: &mut Block, ctx: &ItemContext<'_, String>) {
        target.lines = (ctx.item.len() as u32).div_ceil(40).max(1);
        target.has_image = ctx.item.contains("[img]");
    }

    fn place(&mut self, _target: &mut Block, _offset: u64) {}

    fn measure(&mut self, target: &Block) -> Option<u32> {
        if target.has_image && self.images_pending {
            return None;
        }
        Some(target.lines + if target.has_image { 10 } else { 0 })
    }
}

#[derive(Default)]
struct Pane {
    top: u64,
}

impl Surface for Pane {
    fn scroll_top(&self) -> u64 {
        self.top
    }

    fn client_height(&self) -> u32 {
        30
    }

    fn set_scroll_top(&mut self, offset: u64) {
        self.top = offset;
    }

    fn set_scroll_height(&mut self, _height: u64) {}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut list = WindowedList::builder(EngineOptions::dynamic(2))
        .renderer(Paragraphs {
            images_pending: true,
        })
        .surface(Pane::default())
        .build()?;

    list.subscribe(|signal| {
        if let Signal::ViewportChanged(snap) = signal {
            println!(
                "  pass: range={:?} total_height={}",
                snap.range(),
                snap.total_height
            );
        }
    });

    let items: Vec<String> = (0..500)
        .map(|i| {
            let body = "lorem ipsum ".repeat(i % 17);
            if i % 7 == 0 {
                format!("{i}: [img] {body}")
            } else {
                format!("{i}: {body}")
            }
        })
        .collect();
    list.attach(items)?;

    println!("frame 0 (measure committed rows):");
    list.on_frame(0);
    println!(
        "average={} measured={} pending={}",
        list.registry().average(),
        list.registry().measured_count(),
        list.pending_measurements().len()
    );

    // Images finish loading; the host reports those heights itself.
    for ticket in list.pending_measurements().to_vec() {
        list.resolve_measurement(ticket, 12);
    }
    println!("frame 16 (late measurements):");
    list.on_frame(16);

    list.on_event(SurfaceEvent::Scroll { offset: 200 }, 32);
    println!("frame 48:");
    list.on_frame(48);
    println!("recompute passes: {}", list.recompute_count());
    Ok(())
}
