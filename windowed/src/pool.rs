use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::{HeightRegistry, IdentityFn, ItemContext, ItemKey, ItemRenderer, WindowRange};

/// Index → handle record of what is currently attached.
pub type ActiveMap = BTreeMap<usize, HandleId>;

/// A handle into a [`ViewPool`] slot.
///
/// The generation is bumped every time a slot is released, so an id captured before a release
/// never resolves to whatever the slot is bound to afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandleId {
    slot: u32,
    generation: u32,
}

impl HandleId {
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Lifetime counters plus the current occupancy of a [`ViewPool`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub created: u64,
    pub reused: u64,
    pub released: u64,
    pub destroyed: u64,
    pub active: usize,
    pub idle: usize,
}

impl PoolStats {
    /// Targets that currently exist, bound or idle.
    pub fn live(&self) -> usize {
        self.active + self.idle
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Vacant,
    Idle,
    Active { index: usize },
}

#[derive(Debug)]
struct Slot<H> {
    target: Option<H>,
    generation: u32,
    state: SlotState,
}

/// Arena of reusable render targets with a free list of idle slots.
#[derive(Debug)]
pub struct ViewPool<H> {
    slots: Vec<Slot<H>>,
    idle: Vec<u32>,
    vacant: Vec<u32>,
    recycle: bool,
    stats: PoolStats,
}

/// Read-only inputs for binding items into handles during a reconcile pass.
pub struct BindSource<'a, T> {
    pub items: &'a [T],
    pub identity: Option<&'a IdentityFn<T>>,
    pub registry: &'a HeightRegistry,
    pub preload_images: bool,
}

impl<'a, T> BindSource<'a, T> {
    pub fn new(items: &'a [T], registry: &'a HeightRegistry) -> Self {
        Self {
            items,
            identity: None,
            registry,
            preload_images: false,
        }
    }

    pub fn key_for(&self, index: usize) -> ItemKey {
        match self.identity {
            Some(f) => f(index, &self.items[index]),
            None => index as ItemKey,
        }
    }

    fn context(&self, index: usize) -> ItemContext<'a, T> {
        ItemContext {
            index,
            key: self.key_for(index),
            item: &self.items[index],
            preload_images: self.preload_images,
        }
    }
}

/// What a reconcile pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Indexes that received a freshly acquired handle, ascending.
    pub bound: Vec<(usize, HandleId)>,
    pub kept: usize,
    pub released: usize,
}

impl<H> ViewPool<H> {
    pub fn new(recycle: bool) -> Self {
        Self {
            slots: Vec::new(),
            idle: Vec::new(),
            vacant: Vec::new(),
            recycle,
            stats: PoolStats::default(),
        }
    }

    pub fn is_recycling(&self) -> bool {
        self.recycle
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn target(&self, id: HandleId) -> Option<&H> {
        let slot = self.live_slot(id)?;
        slot.target.as_ref()
    }

    pub fn target_mut(&mut self, id: HandleId) -> Option<&mut H> {
        self.live_slot(id)?;
        self.slots[id.slot()].target.as_mut()
    }

    /// The index `id` is bound to, or `None` once it has been released.
    pub fn bound_index(&self, id: HandleId) -> Option<usize> {
        match self.live_slot(id)?.state {
            SlotState::Active { index } => Some(index),
            _ => None,
        }
    }

    fn live_slot(&self, id: HandleId) -> Option<&Slot<H>> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation && slot.target.is_some())
    }

    /// Hands out an idle target when one exists, otherwise creates a new one.
    ///
    /// The returned handle is active but not yet bound to an index; the caller binds it.
    pub fn acquire<T, R>(&mut self, renderer: &mut R) -> HandleId
    where
        R: ItemRenderer<T, Target = H>,
    {
        if let Some(slot) = self.idle.pop() {
            self.stats.reused += 1;
            self.stats.idle -= 1;
            self.stats.active += 1;
            let s = &mut self.slots[slot as usize];
            s.state = SlotState::Active { index: usize::MAX };
            return HandleId {
                slot,
                generation: s.generation,
            };
        }

        let target = renderer.create();
        self.stats.created += 1;
        self.stats.active += 1;
        let state = SlotState::Active { index: usize::MAX };
        if let Some(slot) = self.vacant.pop() {
            let s = &mut self.slots[slot as usize];
            s.target = Some(target);
            s.state = state;
            return HandleId {
                slot,
                generation: s.generation,
            };
        }

        assert!(
            self.slots.len() < u32::MAX as usize,
            "view pool exceeded u32::MAX slots"
        );
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            target: Some(target),
            generation: 0,
            state,
        });
        HandleId {
            slot,
            generation: 0,
        }
    }

    /// Detaches an active handle and parks it in the idle pool, or destroys it when recycling
    /// is off. Releasing a stale id is a no-op.
    pub fn release<T, R>(&mut self, id: HandleId, renderer: &mut R)
    where
        R: ItemRenderer<T, Target = H>,
    {
        let Some(slot) = self.slots.get_mut(id.slot()) else {
            return;
        };
        if slot.generation != id.generation || !matches!(slot.state, SlotState::Active { .. }) {
            wwarn!(slot = id.slot, "release of a handle that is not active");
            return;
        }
        let Some(target) = slot.target.as_mut() else {
            return;
        };

        renderer.detach(target);
        slot.generation = slot.generation.wrapping_add(1);
        self.stats.released += 1;
        self.stats.active -= 1;

        if self.recycle {
            slot.state = SlotState::Idle;
            self.idle.push(id.slot);
            self.stats.idle += 1;
        } else {
            slot.state = SlotState::Vacant;
            if let Some(target) = slot.target.take() {
                renderer.destroy(target);
            }
            self.vacant.push(id.slot);
            self.stats.destroyed += 1;
        }
    }

    /// Brings `active` in line with `desired`.
    ///
    /// Handles outside the range are released first so their targets can be reused by the
    /// indexes entering the range in the same pass. Indexes that stay in range keep their handle;
    /// they are only refreshed (when `refresh_kept` is set) and re-placed, since earlier
    /// measurements may have moved their offset.
    pub fn reconcile<T, R>(
        &mut self,
        desired: WindowRange,
        active: &mut ActiveMap,
        source: &BindSource<'_, T>,
        renderer: &mut R,
        refresh_kept: bool,
    ) -> Reconciled
    where
        R: ItemRenderer<T, Target = H>,
    {
        let mut out = Reconciled::default();

        active.retain(|&index, id| {
            let keep = desired.contains(index);
            if !keep {
                self.release::<T, R>(*id, renderer);
                out.released += 1;
            }
            keep
        });

        for index in desired.indices() {
            let offset = source.registry.offset(index);
            if let Some(&id) = active.get(&index) {
                let Some(target) = self.target_mut(id) else {
                    unreachable!("active map points at a dead handle (index={index})");
                };
                if refresh_kept {
                    renderer.update(target, &source.context(index));
                }
                renderer.place(target, offset);
                out.kept += 1;
                continue;
            }

            let id = self.acquire::<T, R>(renderer);
            let slot = &mut self.slots[id.slot()];
            slot.state = SlotState::Active { index };
            let Some(target) = slot.target.as_mut() else {
                unreachable!("acquired handle has no target");
            };
            renderer.bind(target, &source.context(index));
            renderer.place(target, offset);
            active.insert(index, id);
            out.bound.push((index, id));
        }

        wtrace!(
            bound = out.bound.len(),
            kept = out.kept,
            released = out.released,
            "reconcile"
        );
        out
    }

    /// Drops idle targets beyond `keep`.
    pub fn shrink_idle<T, R>(&mut self, keep: usize, renderer: &mut R)
    where
        R: ItemRenderer<T, Target = H>,
    {
        while self.idle.len() > keep {
            let Some(slot) = self.idle.pop() else {
                break;
            };
            let s = &mut self.slots[slot as usize];
            s.state = SlotState::Vacant;
            if let Some(target) = s.target.take() {
                renderer.destroy(target);
            }
            self.vacant.push(slot);
            self.stats.idle -= 1;
            self.stats.destroyed += 1;
        }
    }

    /// Detaches and destroys every target, active or idle.
    pub fn clear<T, R>(&mut self, renderer: &mut R)
    where
        R: ItemRenderer<T, Target = H>,
    {
        for slot in &mut self.slots {
            let Some(mut target) = slot.target.take() else {
                continue;
            };
            if let SlotState::Active { .. } = slot.state {
                renderer.detach(&mut target);
                self.stats.released += 1;
            }
            renderer.destroy(target);
            slot.generation = slot.generation.wrapping_add(1);
            slot.state = SlotState::Vacant;
            self.stats.destroyed += 1;
        }
        self.slots.clear();
        self.idle.clear();
        self.vacant.clear();
        self.stats.active = 0;
        self.stats.idle = 0;
    }
}
