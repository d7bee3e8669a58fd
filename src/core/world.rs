// Copyright 2016-2018 Matthew D. Michelotti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::core::broad::{self, BroadEntry};
use crate::core::events::EventQueue;
use crate::core::gjk::{self, Placed};
use crate::core::{
    AttachedShape, Bitmask, Collider, ColliderHandle, ContactEvent, ContactKind, ContactListener, OwnerId,
    TransformSource, WorldConfig,
};
use crate::geom::{Rect, Transform, Vec2};
use fnv::{FnvHashMap, FnvHashSet};
use tracing::{debug, trace, warn};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum SlotState {
    // added, waiting for the next flush
    Pending,
    Active,
    // removal requested, waiting for the next flush
    Removing,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    state: SlotState,
    collider: Option<Collider>,
}

// A collider placed for the current step.
struct Placement {
    shape_transforms: Vec<Transform>,
}

/// Owns every collider and computes contact events one step at a time.
///
/// Adding and removing colliders is buffered: changes take effect at the
/// start of the next `step`. Each step then runs the broad phase, the GJK
/// narrow phase, and compares the result with each collider's touching set
/// to queue `OnTouch`, `WhileTouching` and `OnSeparate` events. Events are
/// read with `next` or `dispatch`.
#[derive(Debug)]
pub struct CollisionWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pending_adds: Vec<ColliderHandle>,
    pending_removes: Vec<ColliderHandle>,
    events: EventQueue,
    config: WorldConfig,
}

impl Default for CollisionWorld {
    fn default() -> CollisionWorld {
        CollisionWorld::new()
    }
}

impl CollisionWorld {
    /// Constructs an empty world with the default configuration.
    pub fn new() -> CollisionWorld {
        CollisionWorld::with_config(WorldConfig::default())
    }

    /// Constructs an empty world with the given configuration.
    pub fn with_config(config: WorldConfig) -> CollisionWorld {
        CollisionWorld {
            slots: Vec::new(),
            free: Vec::new(),
            pending_adds: Vec::new(),
            pending_removes: Vec::new(),
            events: EventQueue::default(),
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Adds a collider. It takes part in contact detection from the next `step`.
    pub fn add_collider(&mut self, collider: Collider) -> ColliderHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                assert!(self.slots.len() < u32::MAX as usize, "too many colliders");
                self.slots.push(Slot { generation: 0, state: SlotState::Pending, collider: None });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.state = SlotState::Pending;
        slot.collider = Some(collider);
        let handle = ColliderHandle::new(index, slot.generation);
        self.pending_adds.push(handle);
        handle
    }

    /// Requests removal of a collider. Returns `false` if the handle is stale
    /// or removal was already requested.
    ///
    /// At the next `step`, every remaining collider touching it receives an
    /// `OnSeparate` event, unless it is removed in that same step too.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> bool {
        let state = match self.live_slot(handle) {
            Some(slot) => slot.state,
            None => return false,
        };
        match state {
            SlotState::Pending => {
                self.pending_adds.retain(|&pending| pending != handle);
                self.vacate(handle);
            }
            SlotState::Active => {
                self.slots[handle.index()].state = SlotState::Removing;
                self.pending_removes.push(handle);
            }
            SlotState::Removing => unreachable!(),
        }
        true
    }

    /// Requests removal of every collider attached to `owner`, returning how many there were.
    pub fn remove_owner(&mut self, owner: OwnerId) -> usize {
        let handles: Vec<ColliderHandle> = self
            .colliders()
            .filter(|(_, collider)| collider.owner() == owner)
            .map(|(handle, _)| handle)
            .collect();
        for &handle in &handles {
            self.remove_collider(handle);
        }
        handles.len()
    }

    /// Returns the collider, or `None` if the handle is stale or its removal
    /// was requested.
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.live_slot(handle).and_then(|slot| slot.collider.as_ref())
    }

    /// Mutable form of `collider`.
    ///
    /// Shape, category and mask changes are picked up at the next `step`.
    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        let live = self.live_slot(handle).is_some();
        if live {
            self.slots[handle.index()].collider.as_mut()
        } else {
            None
        }
    }

    /// Iterates over every collider that has not been removed, in handle order.
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state != SlotState::Removing)
            .filter_map(|(index, slot)| {
                let handle = ColliderHandle::new(index as u32, slot.generation);
                slot.collider.as_ref().map(|collider| (handle, collider))
            })
    }

    /// Returns `true` if `this` noticed `other` touching it at the last step.
    pub fn is_touching(&self, this: ColliderHandle, other: ColliderHandle) -> bool {
        self.collider(other).is_some()
            && self.collider(this).map_or(false, |collider| collider.touching.contains(&other))
    }

    /// The colliders `this` touched at the last step, sorted.
    pub fn touching(&self, this: ColliderHandle) -> Option<Vec<ColliderHandle>> {
        self.collider(this).map(|collider| {
            let mut touching: Vec<ColliderHandle> = collider
                .touching
                .iter()
                .copied()
                .filter(|&other| self.collider(other).is_some())
                .collect();
            touching.sort_unstable();
            touching
        })
    }

    /// Estimates the translation that would separate `a` from `b` (to be
    /// applied to `b`), using the first overlapping pair of their shapes.
    ///
    /// Returns `None` if either handle is stale, a transform is missing or
    /// the colliders do not overlap.
    pub fn penetration<T>(&self, a: ColliderHandle, b: ColliderHandle, transforms: &T) -> Option<Vec2>
    where
        T: TransformSource + ?Sized,
    {
        let (collider_a, collider_b) = (self.collider(a)?, self.collider(b)?);
        let owner_a = transforms.world_transform(collider_a.owner())?;
        let owner_b = transforms.world_transform(collider_b.owner())?;
        for attached_a in collider_a.shapes() {
            let transform_a = attached_a.world_transform(&owner_a);
            let placed_a = Placed::new(&attached_a.shape, &transform_a);
            for attached_b in collider_b.shapes() {
                let transform_b = attached_b.world_transform(&owner_b);
                let placed_b = Placed::new(&attached_b.shape, &transform_b);
                if let Some(simplex) = gjk::gjk_overlap(&placed_a, &placed_b, self.config.gjk_max_iterations) {
                    return Some(gjk::epa(
                        &simplex,
                        &placed_a,
                        &placed_b,
                        self.config.epa_tolerance,
                        self.config.epa_max_iterations,
                    ));
                }
            }
        }
        None
    }

    /// Advances contact detection by one step.
    ///
    /// Applies buffered additions and removals, then recomputes which
    /// colliders touch and queues the resulting events. A collider whose
    /// owner has no transform in `transforms` is skipped for this step, and
    /// its contacts are left unchanged. Events not yet read remain queued
    /// ahead of the new ones.
    pub fn step<T>(&mut self, transforms: &T)
    where
        T: TransformSource + ?Sized,
    {
        let queued_before = self.events.len();
        self.flush();

        let mut info: FnvHashMap<ColliderHandle, (OwnerId, Bitmask)> = FnvHashMap::default();
        let mut skipped: FnvHashSet<ColliderHandle> = FnvHashSet::default();
        let mut entries = Vec::new();
        let mut placements = Vec::new();
        for (handle, collider) in self.active() {
            info.insert(handle, (collider.owner(), collider.category()));
            let owner_transform = match transforms.world_transform(collider.owner()) {
                Some(transform) => transform,
                None => {
                    warn!(collider = %handle, owner = collider.owner(), "owner transform unresolved, skipping collider");
                    skipped.insert(handle);
                    continue;
                }
            };
            let shape_transforms: Vec<Transform> = collider
                .shapes()
                .iter()
                .map(|attached| attached.world_transform(&owner_transform))
                .collect();
            let shape_bounds: Vec<Rect> = collider
                .shapes()
                .iter()
                .zip(&shape_transforms)
                .map(|(attached, transform)| attached.shape.aabb(transform))
                .collect();
            entries.push(BroadEntry::new(handle, collider.category(), collider.collision_mask(), shape_bounds));
            placements.push(Placement { shape_transforms });
        }

        let candidates = broad::candidates(&entries);
        let mut overlapping: FnvHashMap<ColliderHandle, Vec<ColliderHandle>> = FnvHashMap::default();
        for &(i, j) in &candidates {
            if self.overlaps(&entries[i], &placements[i], &entries[j], &placements[j]) {
                let (a, b) = (entries[i].handle(), entries[j].handle());
                overlapping.entry(a).or_default().push(b);
                overlapping.entry(b).or_default().push(a);
            }
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != SlotState::Active {
                continue;
            }
            let this = ColliderHandle::new(index as u32, slot.generation);
            let collider = match slot.collider.as_mut() {
                Some(collider) => collider,
                None => continue,
            };
            if skipped.contains(&this) {
                continue;
            }
            let this_id = (this, collider.owner());
            let mask = collider.collision_mask();
            collider.touching.retain(|other| match info.get(other) {
                Some(&(_, category)) => mask & category != 0,
                None => {
                    debug!(collider = %this, other = %other, "pruning stale handle from touching set");
                    false
                }
            });

            let mut now: Vec<ColliderHandle> = overlapping
                .get(&this)
                .map(|others| others.iter().copied().filter(|other| mask & info[other].1 != 0).collect())
                .unwrap_or_default();
            now.sort_unstable();
            let mut before: Vec<ColliderHandle> = collider.touching.iter().copied().collect();
            before.sort_unstable();

            for other in before {
                if skipped.contains(&other) || now.binary_search(&other).is_ok() {
                    continue;
                }
                collider.touching.remove(&other);
                let other_id = (other, info[&other].0);
                self.events.push(ContactEvent::new(ContactKind::OnSeparate, this_id, other_id));
            }
            for other in now {
                let other_id = (other, info[&other].0);
                if collider.touching.insert(other) {
                    self.events.push(ContactEvent::new(ContactKind::OnTouch, this_id, other_id));
                }
                self.events.push(ContactEvent::new(ContactKind::WhileTouching, this_id, other_id));
            }
        }

        trace!(
            colliders = info.len(),
            skipped = skipped.len(),
            candidates = candidates.len(),
            events = self.events.len() - queued_before,
            "collision step"
        );
    }

    /// Pops the oldest queued contact event.
    pub fn next(&mut self) -> Option<ContactEvent> {
        self.events.next()
    }

    /// Delivers every queued event to `listener` in order and returns how many there were.
    pub fn dispatch<L: ContactListener + ?Sized>(&mut self, listener: &mut L) -> usize {
        let mut count = 0;
        while let Some(event) = self.events.next() {
            event.deliver(listener);
            count += 1;
        }
        count
    }

    /// Number of queued events.
    pub fn queued_events(&self) -> usize {
        self.events.len()
    }

    /// Discards every queued event.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn flush(&mut self) {
        let mut removed: Vec<ColliderHandle> = self.pending_removes.drain(..).collect();
        if !removed.is_empty() {
            removed.sort_unstable();
            let owners: Vec<OwnerId> = removed
                .iter()
                .map(|handle| self.slots[handle.index()].collider.as_ref().map_or(0, Collider::owner))
                .collect();
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if slot.state != SlotState::Active {
                    continue;
                }
                let this = ColliderHandle::new(index as u32, slot.generation);
                let collider = match slot.collider.as_mut() {
                    Some(collider) => collider,
                    None => continue,
                };
                for (&other, &other_owner) in removed.iter().zip(&owners) {
                    if collider.touching.remove(&other) {
                        self.events.push(ContactEvent::new(
                            ContactKind::OnSeparate,
                            (this, collider.owner()),
                            (other, other_owner),
                        ));
                    }
                }
            }
            for handle in removed {
                self.vacate(handle);
            }
        }
        for handle in self.pending_adds.drain(..) {
            self.slots[handle.index()].state = SlotState::Active;
        }
    }

    fn vacate(&mut self, handle: ColliderHandle) {
        let slot = &mut self.slots[handle.index()];
        assert_eq!(slot.generation, handle.generation(), "illegal state");
        slot.collider = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index() as u32);
    }

    fn live_slot(&self, handle: ColliderHandle) -> Option<&Slot> {
        self.slots.get(handle.index()).filter(|slot| {
            slot.generation == handle.generation()
                && slot.collider.is_some()
                && slot.state != SlotState::Removing
        })
    }

    fn active(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Active)
            .filter_map(|(index, slot)| {
                let handle = ColliderHandle::new(index as u32, slot.generation);
                slot.collider.as_ref().map(|collider| (handle, collider))
            })
    }

    fn shapes_of(&self, handle: ColliderHandle) -> &[AttachedShape] {
        match self.slots[handle.index()].collider.as_ref() {
            Some(collider) => collider.shapes(),
            None => &[],
        }
    }

    // Narrow phase for one candidate pair: any shape pair with intersecting
    // bounds that GJK reports as overlapping.
    fn overlaps(&self, a: &BroadEntry, placed_a: &Placement, b: &BroadEntry, placed_b: &Placement) -> bool {
        let (shapes_a, shapes_b) = (self.shapes_of(a.handle()), self.shapes_of(b.handle()));
        for (i, attached_a) in shapes_a.iter().enumerate() {
            for (j, attached_b) in shapes_b.iter().enumerate() {
                if !a.shape_bounds()[i].overlaps(&b.shape_bounds()[j]) {
                    continue;
                }
                let shape_a = Placed::new(&attached_a.shape, &placed_a.shape_transforms[i]);
                let shape_b = Placed::new(&attached_b.shape, &placed_b.shape_transforms[j]);
                if gjk::gjk_overlap(&shape_a, &shape_b, self.config.gjk_max_iterations).is_some() {
                    return true;
                }
            }
        }
        false
    }
}
