use alloc::sync::Arc;

use crate::ItemKey;

/// Caller-supplied identity for an item, forwarded to the renderer as [`ItemContext::key`].
///
/// Without one, the key is the index.
pub type IdentityFn<T> = Arc<dyn Fn(usize, &T) -> ItemKey + Send + Sync>;

/// Everything a renderer needs to fill a handle for one item.
#[derive(Debug)]
pub struct ItemContext<'a, T> {
    pub index: usize,
    pub key: ItemKey,
    pub item: &'a T,
    pub preload_images: bool,
}

/// Produces and fills reusable render targets.
///
/// The engine never draws anything itself. It asks the renderer to create targets, bind
/// items into them, place them at an offset and, in dynamic-height mode, measure them once their
/// content has been committed.
pub trait ItemRenderer<T> {
    type Target;

    /// Creates a fresh, unbound target.
    fn create(&mut self) -> Self::Target;

    /// Binds `ctx.item` into a target that was just acquired for `ctx.index`.
    fn bind(&mut self, target: &mut Self::Target, ctx: &ItemContext<'_, T>);

    /// Refreshes a target that stays bound to the same index across a pass.
    fn update(&mut self, target: &mut Self::Target, ctx: &ItemContext<'_, T>) {
        self.bind(target, ctx);
    }

    /// Moves a target to `offset` along the scroll axis.
    fn place(&mut self, target: &mut Self::Target, offset: u64);

    /// Detaches a target from the surface before it goes idle or is destroyed.
    fn detach(&mut self, _target: &mut Self::Target) {}

    fn destroy(&mut self, target: Self::Target) {
        drop(target);
    }

    /// Reads a committed target's rendered height.
    ///
    /// Called on the frame boundary after binding. Return `None` when the height is only
    /// available asynchronously and report it later through
    /// [`crate::WindowedList::resolve_measurement`].
    fn measure(&mut self, _target: &Self::Target) -> Option<u32> {
        None
    }
}

/// The scrollable region the list is mounted in.
///
/// Scroll and resize notifications are not pulled from here; the host forwards them through
/// [`crate::WindowedList::on_event`].
pub trait Surface {
    fn scroll_top(&self) -> u64;

    fn client_height(&self) -> u32;

    fn set_scroll_top(&mut self, offset: u64);

    /// Sizes the scrollable content (the spacer behind the attached handles).
    fn set_scroll_height(&mut self, height: u64);

    /// Cancels the host's event subscriptions. Called once on teardown.
    fn unsubscribe(&mut self) {}
}
