use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use crate::pipeline::EventPipeline;
use crate::pool::{ActiveMap, BindSource, ViewPool};
use crate::{
    Align, ConfigError, EngineOptions, HandleId, HeightRegistry, IdentityFn, ItemKey,
    ItemRenderer, LifecycleError, MeasureOutcome, PoolStats, ScrollBehavior, ScrollDirection,
    Surface, SurfaceEvent, Tween, ViewportSnapshot, VisibleItem, WindowRange, compute_range,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineState {
    /// Built, not attached to any items yet.
    Idle,
    /// Attaching or replacing the item sequence; the next pass rebuilds everything.
    Initializing,
    Steady,
    /// Inside a recompute pass. Never observable from outside a pass.
    Recomputing,
    /// Torn down. Terminal.
    Destroyed,
}

/// Notifications delivered to subscribers after each pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal<'a> {
    ViewportChanged(&'a ViewportSnapshot),
    ReachedStart,
    ReachedEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A request to measure the item bound to `handle` once its content has been committed.
///
/// Tickets go stale when the handle is released, rebound, or the item sequence is replaced;
/// resolving a stale ticket is silently ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasureTicket {
    pub index: usize,
    pub handle: HandleId,
    epoch: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PassReason {
    Attach,
    Scroll,
    Resize,
    Programmatic,
    Relayout,
    Refresh,
    ItemsReplaced,
}

impl PassReason {
    fn rebinds_kept(self) -> bool {
        matches!(self, Self::Refresh | Self::ItemsReplaced)
    }

    fn remeasures_kept(self) -> bool {
        matches!(self, Self::ItemsReplaced)
    }
}

type Observer = Box<dyn FnMut(&Signal<'_>)>;

/// Assembles a [`WindowedList`]. The renderer and surface are mandatory.
pub struct WindowedListBuilder<T, R, S> {
    options: EngineOptions,
    renderer: Option<R>,
    surface: Option<S>,
    identity: Option<IdentityFn<T>>,
}

impl<T, R, S> WindowedListBuilder<T, R, S>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            renderer: None,
            surface: None,
            identity: None,
        }
    }

    pub fn renderer(mut self, renderer: R) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn identity(mut self, f: impl Fn(usize, &T) -> ItemKey + Send + Sync + 'static) -> Self {
        self.identity = Some(Arc::new(f));
        self
    }

    /// Validates the configuration and builds an idle engine.
    pub fn build(self) -> Result<WindowedList<T, R, S>, ConfigError> {
        self.options.validate()?;
        let renderer = self.renderer.ok_or(ConfigError::MissingRenderer)?;
        let surface = self.surface.ok_or(ConfigError::MissingSurface)?;
        Ok(WindowedList::from_parts(
            self.options,
            renderer,
            surface,
            self.identity,
        ))
    }
}

/// The render orchestrator.
///
/// Drives one cycle per processed event: event pipeline → viewport range → height registry
/// offsets → view pool reconciliation → snapshot → signals. Everything runs synchronously on the
/// caller's thread; the host forwards surface events through [`Self::on_event`] and calls
/// [`Self::on_frame`] at every display frame boundary.
pub struct WindowedList<T, R, S>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    options: EngineOptions,
    state: EngineState,
    items: Arc<[T]>,
    identity: Option<IdentityFn<T>>,
    renderer: R,
    surface: S,
    registry: HeightRegistry,
    pool: ViewPool<R::Target>,
    active: ActiveMap,
    pipeline: EventPipeline,

    scroll_offset: u64,
    extent: u32,
    clock_ms: u64,
    tween: Option<Tween>,
    snapshot: ViewportSnapshot,

    awaiting_commit: Vec<MeasureTicket>,
    outstanding: Vec<MeasureTicket>,
    epoch: u32,
    relayout_pending: bool,

    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    passes: u64,
}

impl<T, R, S> WindowedList<T, R, S>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    pub fn builder(options: EngineOptions) -> WindowedListBuilder<T, R, S> {
        WindowedListBuilder::new(options)
    }

    fn from_parts(
        options: EngineOptions,
        renderer: R,
        surface: S,
        identity: Option<IdentityFn<T>>,
    ) -> Self {
        if options.item_height.is_some() && options.enable_dynamic_height {
            wwarn!("item_height is set; enable_dynamic_height is ignored");
        }
        let registry = match options.item_height {
            Some(h) => HeightRegistry::fixed(0, h),
            None if options.enable_dynamic_height => HeightRegistry::dynamic(
                0,
                options.estimated_item_height,
                options.relayout_threshold,
            ),
            None => HeightRegistry::fixed(0, options.estimated_item_height),
        };
        wdebug!(
            dynamic = options.is_dynamic(),
            buffer_size = options.buffer_size,
            recycle = options.recycle_views,
            "WindowedList::new"
        );
        Self {
            pool: ViewPool::new(options.recycle_views),
            pipeline: EventPipeline::new(
                options.scroll_throttle_ms,
                options.scroll_coalesce_px,
                options.resize_debounce_ms,
            ),
            state: EngineState::Idle,
            items: Vec::new().into(),
            identity,
            renderer,
            surface,
            registry,
            active: ActiveMap::new(),
            scroll_offset: 0,
            extent: 0,
            clock_ms: 0,
            tween: None,
            snapshot: ViewportSnapshot::default(),
            awaiting_commit: Vec::new(),
            outstanding: Vec::new(),
            epoch: 0,
            relayout_pending: false,
            observers: Vec::new(),
            next_subscription: 0,
            passes: 0,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn registry(&self) -> &HeightRegistry {
        &self.registry
    }

    /// The snapshot emitted by the last pass.
    pub fn snapshot(&self) -> &ViewportSnapshot {
        &self.snapshot
    }

    pub fn visible_range(&self) -> WindowRange {
        self.snapshot.range()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn handle_target(&self, handle: HandleId) -> Option<&R::Target> {
        self.pool.target(handle)
    }

    /// The handle attached to `index`, if it is inside the current window.
    pub fn handle_for(&self, index: usize) -> Option<HandleId> {
        self.active.get(&index).copied()
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn surface_extent(&self) -> u32 {
        self.extent
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.pipeline.direction()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Number of recompute passes run so far.
    pub fn recompute_count(&self) -> u64 {
        self.passes
    }

    /// Measurement tickets the renderer could not satisfy at the frame boundary.
    pub fn pending_measurements(&self) -> &[MeasureTicket] {
        &self.outstanding
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.registry
            .total_height()
            .saturating_sub(self.extent as u64)
    }

    pub fn subscribe(&mut self, f: impl FnMut(&Signal<'_>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        if self.state != EngineState::Destroyed {
            self.observers.push((id, Box::new(f)));
        }
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Binds the engine to `items` and runs the first pass at offset 0.
    pub fn attach(
        &mut self,
        items: impl Into<Arc<[T]>>,
    ) -> Result<&ViewportSnapshot, LifecycleError> {
        match self.state {
            EngineState::Idle => {}
            EngineState::Destroyed => return Err(LifecycleError::Destroyed),
            state => return Err(LifecycleError::AlreadyAttached(state)),
        }
        self.state = EngineState::Initializing;
        self.items = items.into();
        self.registry.reset(self.items.len());
        self.extent = self.surface.client_height();
        self.scroll_offset = 0;
        self.surface.set_scroll_top(0);
        self.pipeline.scroll_mut().reset(0);
        wdebug!(
            items = self.items.len(),
            extent = self.extent,
            "WindowedList::attach"
        );
        self.run_pass(PassReason::Attach);
        Ok(&self.snapshot)
    }

    /// Replaces the item sequence.
    ///
    /// All height measurements are dropped and pending measurements invalidated. The pool is
    /// kept: handles still inside the window are rebound in place, the rest are released.
    /// A throttled scroll or debounced resize still waiting for a frame survives the swap.
    pub fn update_items(&mut self, items: impl Into<Arc<[T]>>) -> Result<(), LifecycleError> {
        match self.state {
            EngineState::Steady => {}
            EngineState::Destroyed => return Err(LifecycleError::Destroyed),
            _ => return Err(LifecycleError::NotAttached),
        }
        self.state = EngineState::Initializing;
        self.items = items.into();
        self.epoch = self.epoch.wrapping_add(1);
        self.awaiting_commit.clear();
        self.outstanding.clear();
        self.relayout_pending = false;
        self.tween = None;
        self.registry.reset(self.items.len());

        // Throttled scrolls and debounced resizes stay queued for the next frame.
        let max = self.max_scroll_offset();
        self.pipeline.scroll_mut().clamp_pending(max);
        let clamped = self.scroll_offset.min(max);
        if clamped != self.scroll_offset {
            if self.pipeline.scroll().has_pending() {
                self.scroll_offset = clamped;
            } else {
                self.set_offset(clamped);
            }
        }
        wdebug!(
            items = self.items.len(),
            pending_scroll = self.pipeline.scroll().has_pending(),
            pending_resize = self.pipeline.has_pending_resize(),
            "update_items"
        );
        self.run_pass(PassReason::ItemsReplaced);
        Ok(())
    }

    /// Forces a full pass, rebinding every attached handle.
    pub fn refresh(&mut self) {
        if self.state != EngineState::Steady {
            return;
        }
        self.run_pass(PassReason::Refresh);
    }

    /// Feeds one raw surface event, stamped with the host's clock.
    ///
    /// A scroll that passes the throttle is processed inline; everything else waits for
    /// [`Self::on_frame`]. Events are ignored unless the engine is attached and alive.
    pub fn on_event(&mut self, event: SurfaceEvent, now_ms: u64) {
        if self.state != EngineState::Steady {
            wtrace!(state = ?self.state, "event ignored");
            return;
        }
        self.clock_ms = self.clock_ms.max(now_ms);

        if let SurfaceEvent::Scroll { offset } = event {
            if offset == self.scroll_offset && !self.pipeline.scroll().has_pending() {
                // Echo of an offset the engine applied itself.
                return;
            }
            self.tween = None;
        }

        if let Some(sample) = self.pipeline.push(event, now_ms) {
            self.scroll_offset = sample.offset;
            self.run_pass(PassReason::Scroll);
        }
    }

    /// Frame boundary.
    ///
    /// Measures content committed since the last frame, advances a smooth scroll, flushes the
    /// throttled scroll and debounced resize, then runs at most one pass covering all of it,
    /// including a re-layout requested by a deviating measurement.
    pub fn on_frame(&mut self, now_ms: u64) {
        if self.state != EngineState::Steady {
            return;
        }
        self.clock_ms = self.clock_ms.max(now_ms);
        self.measure_committed();

        let mut reason = None;

        if let Some(tween) = self.tween {
            let offset = tween.offset_at(now_ms);
            if tween.is_done(now_ms) {
                self.tween = None;
            }
            if offset != self.scroll_offset {
                self.set_offset(offset);
                reason = Some(PassReason::Programmatic);
            }
        }

        let out = self.pipeline.on_frame(now_ms);
        if let Some(sample) = out.scroll {
            self.scroll_offset = sample.offset;
            reason = Some(PassReason::Scroll);
        }
        if let Some(extent) = out.resize {
            if extent != self.extent {
                self.extent = extent;
                reason = Some(PassReason::Resize);
            }
        }

        if mem::take(&mut self.relayout_pending) {
            reason.get_or_insert(PassReason::Relayout);
        }

        if let Some(reason) = reason {
            self.run_pass(reason);
        }
    }

    /// Reports a height measured outside the renderer.
    ///
    /// Returns `false` when the ticket is stale (handle released or rebound, items replaced,
    /// engine torn down); the measurement is dropped in that case.
    pub fn resolve_measurement(&mut self, ticket: MeasureTicket, height: u32) -> bool {
        self.outstanding.retain(|t| *t != ticket);
        if self.state != EngineState::Steady || !self.ticket_is_live(&ticket) {
            wtrace!(index = ticket.index, "stale measurement discarded");
            return false;
        }
        self.apply_measurement(ticket.index, height);
        true
    }

    /// Scrolls so `index` lands at `align`. Out-of-range indexes are clamped.
    ///
    /// Returns the target offset (already clamped to the scrollable range).
    pub fn scroll_to_index(&mut self, index: usize, behavior: ScrollBehavior, align: Align) -> u64 {
        if self.state != EngineState::Steady {
            return self.scroll_offset;
        }
        let count = self.registry.len();
        if count == 0 {
            return self.scroll_to_offset(0, behavior);
        }
        let target = self.offset_for_index(index.min(count - 1), align);
        self.scroll_to_offset(target, behavior)
    }

    /// Returns the clamped target offset.
    pub fn scroll_to_offset(&mut self, offset: u64, behavior: ScrollBehavior) -> u64 {
        if self.state != EngineState::Steady {
            return self.scroll_offset;
        }
        let target = offset.min(self.max_scroll_offset());
        match behavior {
            ScrollBehavior::Immediate => {
                self.tween = None;
                if target != self.scroll_offset {
                    self.set_offset(target);
                    self.run_pass(PassReason::Programmatic);
                }
            }
            ScrollBehavior::Smooth => {
                let duration = self.options.smooth_scroll_ms;
                match &mut self.tween {
                    Some(tween) => tween.retarget(self.clock_ms, target, duration),
                    None => {
                        self.tween = Some(Tween::new(
                            self.scroll_offset,
                            target,
                            self.clock_ms,
                            duration,
                            self.options.easing,
                        ));
                    }
                }
            }
        }
        target
    }

    pub fn scroll_to_top(&mut self) -> u64 {
        self.scroll_to_offset(0, ScrollBehavior::Immediate)
    }

    pub fn scroll_to_bottom(&mut self) -> u64 {
        let bottom = self.max_scroll_offset();
        self.scroll_to_offset(bottom, ScrollBehavior::Immediate)
    }

    /// Offset that puts `index` at `align`, clamped to the scrollable range.
    pub fn offset_for_index(&self, index: usize, align: Align) -> u64 {
        if self.registry.is_empty() {
            return 0;
        }
        let index = index.min(self.registry.len() - 1);
        let start = self.registry.offset(index);
        let size = self.registry.height(index) as u64;
        let end = start.saturating_add(size);
        let view = self.extent as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_offset;
                if start >= cur && end <= cur.saturating_add(view) {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };
        target.min(self.max_scroll_offset())
    }

    /// Releases every handle, cancels subscriptions and enters the terminal state.
    ///
    /// Runs on drop as well; calling it first is optional.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        wdebug!(passes = self.passes, "WindowedList::destroy");
        self.pool.clear::<T, R>(&mut self.renderer);
        self.active.clear();
        self.awaiting_commit.clear();
        self.outstanding.clear();
        self.tween = None;
        self.pipeline.cancel();
        self.observers.clear();
        self.surface.unsubscribe();
        self.snapshot = ViewportSnapshot::default();
        self.state = EngineState::Destroyed;
    }

    fn set_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
        self.surface.set_scroll_top(offset);
        self.pipeline.scroll_mut().sync(offset);
    }

    fn ticket_is_live(&self, ticket: &MeasureTicket) -> bool {
        ticket.epoch == self.epoch && self.active.get(&ticket.index) == Some(&ticket.handle)
    }

    fn apply_measurement(&mut self, index: usize, height: u32) {
        if self.registry.record_measurement(index, height) == MeasureOutcome::Relayout {
            wdebug!(index, height, "measurement deviated; re-layout scheduled");
            self.relayout_pending = true;
        }
    }

    fn measure_committed(&mut self) {
        if self.awaiting_commit.is_empty() {
            return;
        }
        for ticket in mem::take(&mut self.awaiting_commit) {
            if !self.ticket_is_live(&ticket) {
                wtrace!(index = ticket.index, "measurement for released handle dropped");
                continue;
            }
            let Some(target) = self.pool.target(ticket.handle) else {
                continue;
            };
            match self.renderer.measure(target) {
                Some(height) => self.apply_measurement(ticket.index, height),
                None => self.outstanding.push(ticket),
            }
        }
    }

    fn run_pass(&mut self, reason: PassReason) {
        debug_assert!(
            matches!(
                self.state,
                EngineState::Steady | EngineState::Initializing
            ),
            "pass started from {:?}",
            self.state
        );
        self.state = match self.state {
            EngineState::Initializing => EngineState::Initializing,
            _ => EngineState::Recomputing,
        };

        let range = compute_range(
            &self.registry,
            self.scroll_offset,
            self.extent,
            self.options.buffer_size,
        );
        let source = BindSource {
            items: &self.items,
            identity: self.identity.as_ref(),
            registry: &self.registry,
            preload_images: self.options.preload_images,
        };
        let reconciled = self.pool.reconcile(
            range,
            &mut self.active,
            &source,
            &mut self.renderer,
            reason.rebinds_kept(),
        );

        if self.registry.mode() == crate::HeightMode::Dynamic {
            let epoch = self.epoch;
            if reason.remeasures_kept() {
                self.awaiting_commit.extend(
                    self.active
                        .iter()
                        .map(|(&index, &handle)| MeasureTicket { index, handle, epoch }),
                );
            } else {
                self.awaiting_commit.extend(
                    reconciled
                        .bound
                        .iter()
                        .map(|&(index, handle)| MeasureTicket { index, handle, epoch }),
                );
            }
            if reconciled.released > 0 {
                let active = &self.active;
                self.outstanding
                    .retain(|t| active.get(&t.index) == Some(&t.handle));
            }
        }

        let total_height = self.registry.total_height();
        self.surface.set_scroll_height(total_height);

        let mut visible_items = Vec::with_capacity(range.len());
        let mut offset = if range.is_empty() {
            0
        } else {
            self.registry.offset(range.start_index)
        };
        for index in range.indices() {
            let height = self.registry.height(index);
            let Some(&handle) = self.active.get(&index) else {
                unreachable!("index {index} in range but not attached after reconcile");
            };
            visible_items.push(VisibleItem {
                index,
                key: source.key_for(index),
                offset,
                height,
                handle,
            });
            offset = offset.saturating_add(height as u64);
        }

        self.snapshot = ViewportSnapshot {
            scroll_offset: self.scroll_offset,
            surface_extent: self.extent,
            start_index: range.start_index,
            end_index: range.end_index,
            visible_items,
            total_items: range.total_items,
            total_height,
            direction: self.pipeline.direction(),
        };
        self.passes += 1;
        self.state = EngineState::Steady;

        wtrace!(
            reason = ?reason,
            start = range.start_index,
            end = range.end_index,
            bound = reconciled.bound.len(),
            released = reconciled.released,
            "pass"
        );

        let view_end = self
            .scroll_offset
            .saturating_add(self.extent as u64)
            .saturating_add(self.options.reach_epsilon);
        let reached_start = self.scroll_offset == 0;
        let reached_end = view_end >= total_height;

        notify(
            &mut self.observers,
            &Signal::ViewportChanged(&self.snapshot),
        );
        if reached_start {
            notify(&mut self.observers, &Signal::ReachedStart);
        }
        if reached_end {
            notify(&mut self.observers, &Signal::ReachedEnd);
        }
    }
}

fn notify(observers: &mut [(SubscriptionId, Observer)], signal: &Signal<'_>) {
    for (_, f) in observers.iter_mut() {
        f(signal);
    }
}

impl<T, R, S> Drop for WindowedList<T, R, S>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T, R, S> fmt::Debug for WindowedList<T, R, S>
where
    R: ItemRenderer<T>,
    S: Surface,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowedList")
            .field("state", &self.state)
            .field("items", &self.items.len())
            .field("scroll_offset", &self.scroll_offset)
            .field("extent", &self.extent)
            .field("range", &self.snapshot.range())
            .field("pool", &self.pool.stats())
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}
