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

use crate::core::{ColliderHandle, OwnerId};
use std::collections::VecDeque;

/// Kind of contact notification.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ContactKind {
    /// The colliders started touching this step.
    OnTouch,
    /// The colliders touch during this step. Also fires on the step they
    /// started touching.
    WhileTouching,
    /// The colliders stopped touching, or the other collider was removed.
    OnSeparate,
}

/// A notification to `this` collider about `other`.
///
/// Events are directional: `this` receives it because it notices `other`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct ContactEvent {
    kind: ContactKind,
    this: ColliderHandle,
    other: ColliderHandle,
    this_owner: OwnerId,
    other_owner: OwnerId,
}

impl ContactEvent {
    pub(crate) fn new(
        kind: ContactKind,
        (this, this_owner): (ColliderHandle, OwnerId),
        (other, other_owner): (ColliderHandle, OwnerId),
    ) -> ContactEvent {
        assert!(this != other, "collider {} cannot contact itself", this);
        ContactEvent { kind, this, other, this_owner, other_owner }
    }

    pub fn kind(&self) -> ContactKind { self.kind }
    pub fn this(&self) -> ColliderHandle { self.this }
    pub fn other(&self) -> ColliderHandle { self.other }
    pub fn this_owner(&self) -> OwnerId { self.this_owner }
    pub fn other_owner(&self) -> OwnerId { self.other_owner }

    /// Calls the listener method matching this event's kind.
    pub fn deliver<L: ContactListener + ?Sized>(&self, listener: &mut L) {
        match self.kind {
            ContactKind::OnTouch => listener.on_touch(self),
            ContactKind::WhileTouching => listener.while_touching(self),
            ContactKind::OnSeparate => listener.on_separate(self),
        }
    }
}

/// Receiver of contact events. Every method defaults to doing nothing.
pub trait ContactListener {
    fn on_touch(&mut self, _event: &ContactEvent) {}
    fn while_touching(&mut self, _event: &ContactEvent) {}
    fn on_separate(&mut self, _event: &ContactEvent) {}
}

impl ContactListener for Vec<ContactEvent> {
    fn on_touch(&mut self, event: &ContactEvent) {
        self.push(*event);
    }

    fn while_touching(&mut self, event: &ContactEvent) {
        self.push(*event);
    }

    fn on_separate(&mut self, event: &ContactEvent) {
        self.push(*event);
    }
}

// Events produced by a step, in emission order, waiting to be read.
#[derive(Default, Debug)]
pub(crate) struct EventQueue {
    events: VecDeque<ContactEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: ContactEvent) {
        self.events.push_back(event);
    }

    pub fn next(&mut self) -> Option<ContactEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
