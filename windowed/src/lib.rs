//! A headless windowing engine for very long scrollable lists.
//!
//! Only the items intersecting the viewport (plus a small buffer on each side) are ever attached
//! to the surface. Everything else exists as a height in a prefix-sum registry, so scrolling
//! through a million rows costs the same as scrolling through a hundred.
//!
//! The engine is UI-agnostic. The host provides:
//! - a [`Surface`]: scroll position, visible extent, and a place to size the scrollable content
//! - an [`ItemRenderer`]: creates, binds, places and (optionally) measures reusable targets
//! - raw scroll/resize events via [`WindowedList::on_event`] and frame boundaries via
//!   [`WindowedList::on_frame`]
//!
//! For anchoring and tail-following on top of the engine, see the `windowed-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod engine;
mod error;
mod fenwick;
mod options;
mod pipeline;
mod pool;
mod registry;
mod renderer;
mod tween;
mod types;
mod viewport;


pub use engine::{
    EngineState, MeasureTicket, Signal, SubscriptionId, WindowedList, WindowedListBuilder,
};
pub use error::{ConfigError, LifecycleError};
pub use options::{EngineOptions, MAX_BUFFER_SIZE};
pub use pipeline::{
    EventPipeline, FrameOutput, ResizeDebounce, ScrollSample, ScrollThrottle, SurfaceEvent,
};
pub use pool::{ActiveMap, BindSource, HandleId, PoolStats, Reconciled, ViewPool};
pub use registry::{HeightMode, HeightRegistry, MeasureOutcome};
pub use renderer::{IdentityFn, ItemContext, ItemRenderer, Surface};
pub use tween::{Easing, Tween};
pub use types::{
    Align, ItemKey, ScrollBehavior, ScrollDirection, ViewportSnapshot, VisibleItem, WindowRange,
};
pub use viewport::compute_range;
