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

use super::{Collider, ColliderHandle, CollisionWorld, ContactEvent, ContactKind, OwnerId, WorldConfig};
use crate::geom::{v2, ConvexShape, Transform, Vec2};
use approx::assert_relative_eq;
use std::collections::HashMap;

type Transforms = HashMap<OwnerId, Transform>;

fn circle_collider(owner: OwnerId, radius: f64) -> Collider {
    Collider::new(owner).with_shape(ConvexShape::circle(radius).unwrap())
}

fn place(transforms: &mut Transforms, owner: OwnerId, x: f64, y: f64) {
    transforms.insert(owner, Transform::from_position(v2(x, y)));
}

fn drain(world: &mut CollisionWorld) -> Vec<(ContactKind, ColliderHandle, ColliderHandle)> {
    let mut events = Vec::new();
    while let Some(event) = world.next() {
        events.push((event.kind(), event.this(), event.other()));
    }
    events
}

#[test]
fn smoke_test() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 5.0));
    let b = world.add_collider(circle_collider(2, 5.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 8.0, 0.0);

    world.step(&transforms);
    assert_eq!(
        drain(&mut world),
        vec![
            (ContactKind::OnTouch, a, b),
            (ContactKind::WhileTouching, a, b),
            (ContactKind::OnTouch, b, a),
            (ContactKind::WhileTouching, b, a),
        ]
    );
    assert!(world.is_touching(a, b));
    assert_eq!(world.touching(a), Some(vec![b]));

    place(&mut transforms, 2, 11.0, 0.0);
    world.step(&transforms);
    assert_eq!(
        drain(&mut world),
        vec![(ContactKind::OnSeparate, a, b), (ContactKind::OnSeparate, b, a)]
    );
    assert!(!world.is_touching(a, b));

    world.step(&transforms);
    assert!(drain(&mut world).is_empty());
}

#[test]
fn test_lifecycle_idempotence() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b = world.add_collider(circle_collider(2, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 10.0, 0.0);

    let positions = [10.0, 5.0, 1.5, 1.0, 0.5, 1.9, 2.5, 10.0, 10.0];
    let mut events = Vec::new();
    for &x in &positions {
        place(&mut transforms, 2, x, 0.0);
        world.step(&transforms);
        events.extend(drain(&mut world).into_iter().filter(|&(_, this, _)| this == a));
    }
    let count = |kind| events.iter().filter(|&&(k, _, _)| k == kind).count();
    assert_eq!(count(ContactKind::OnTouch), 1);
    assert_eq!(count(ContactKind::WhileTouching), 4);
    assert_eq!(count(ContactKind::OnSeparate), 1);
    assert!(events.iter().all(|&(_, _, other)| other == b));
    assert_eq!(events.first().map(|e| e.0), Some(ContactKind::OnTouch));
    assert_eq!(events.last().map(|e| e.0), Some(ContactKind::OnSeparate));
}

#[test]
fn test_directional_masks() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let sensor = world.add_collider(circle_collider(1, 1.0).with_category(0b01).with_collision_mask(0b10));
    let deaf = world.add_collider(circle_collider(2, 1.0).with_category(0b10).with_collision_mask(0b100));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);

    world.step(&transforms);
    let events = drain(&mut world);
    assert_eq!(
        events,
        vec![(ContactKind::OnTouch, sensor, deaf), (ContactKind::WhileTouching, sensor, deaf)]
    );
    assert!(world.is_touching(sensor, deaf));
    assert!(!world.is_touching(deaf, sensor));

    place(&mut transforms, 2, 5.0, 0.0);
    world.step(&transforms);
    assert_eq!(drain(&mut world), vec![(ContactKind::OnSeparate, sensor, deaf)]);
}

#[test]
fn test_mutually_deaf_pair_never_touches() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0).with_category(0b01).with_collision_mask(0b01));
    let b = world.add_collider(circle_collider(2, 1.0).with_category(0b10).with_collision_mask(0b10));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 0.0, 0.0);
    world.step(&transforms);
    assert!(drain(&mut world).is_empty());
    assert!(!world.is_touching(a, b));
}

#[test]
fn test_add_is_buffered() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 0.5, 0.0);
    let a = world.add_collider(circle_collider(1, 1.0));
    assert!(world.collider(a).is_some());
    assert_eq!(world.touching(a), Some(vec![]));

    world.step(&transforms);
    let b = world.add_collider(circle_collider(2, 1.0));
    assert!(!world.is_touching(a, b));
    world.step(&transforms);
    assert!(world.is_touching(a, b));
    assert!(world.is_touching(b, a));
}

#[test]
fn test_removal_sends_separate_to_survivors() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b = world.add_collider(circle_collider(2, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    world.step(&transforms);
    drain(&mut world);

    assert!(world.remove_collider(b));
    assert!(!world.remove_collider(b));
    assert!(world.collider(b).is_none());
    assert!(!world.is_touching(a, b));

    world.step(&transforms);
    assert_eq!(drain(&mut world), vec![(ContactKind::OnSeparate, a, b)]);
    assert_eq!(world.touching(a), Some(vec![]));

    world.step(&transforms);
    assert!(drain(&mut world).is_empty());
}

#[test]
fn test_removed_together_without_separate() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b = world.add_collider(circle_collider(2, 1.0));
    let c = world.add_collider(circle_collider(3, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    place(&mut transforms, 3, 20.0, 0.0);
    world.step(&transforms);
    drain(&mut world);

    world.remove_collider(a);
    world.remove_collider(b);
    world.step(&transforms);
    assert!(drain(&mut world).is_empty());
    assert_eq!(world.colliders().map(|(handle, _)| handle).collect::<Vec<_>>(), vec![c]);
}

#[test]
fn test_removal_events_come_first() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b = world.add_collider(circle_collider(2, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    world.step(&transforms);
    drain(&mut world);

    world.remove_collider(b);
    let c = world.add_collider(circle_collider(3, 1.0));
    place(&mut transforms, 3, -1.0, 0.0);
    world.step(&transforms);
    let events = drain(&mut world);
    assert_eq!(events[0], (ContactKind::OnSeparate, a, b));
    assert_eq!(events[1], (ContactKind::OnTouch, a, c));
}

#[test]
fn test_remove_owner() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b1 = world.add_collider(circle_collider(2, 1.0));
    let b2 = world.add_collider(circle_collider(2, 0.5));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    world.step(&transforms);
    drain(&mut world);

    assert_eq!(world.remove_owner(2), 2);
    assert_eq!(world.remove_owner(2), 0);
    world.step(&transforms);
    assert_eq!(
        drain(&mut world),
        vec![(ContactKind::OnSeparate, a, b1), (ContactKind::OnSeparate, a, b2)]
    );
}

#[test]
fn test_stale_handle() {
    let mut world = CollisionWorld::new();
    let transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    assert!(world.remove_collider(a));
    world.step(&transforms);
    let reused = world.add_collider(circle_collider(2, 1.0));
    assert_eq!(reused.index(), a.index());
    assert_ne!(reused.generation(), a.generation());
    assert!(world.collider(a).is_none());
    assert!(world.collider_mut(a).is_none());
    assert_eq!(world.touching(a), None);
    assert!(!world.remove_collider(a));
    assert_eq!(world.collider(reused).map(Collider::owner), Some(2));
}

#[test]
fn test_missing_transform_freezes_contacts() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b = world.add_collider(circle_collider(2, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    world.step(&transforms);
    drain(&mut world);

    transforms.remove(&2);
    world.step(&transforms);
    assert!(drain(&mut world).is_empty());
    assert!(world.is_touching(a, b));
    assert!(world.is_touching(b, a));

    place(&mut transforms, 2, 10.0, 0.0);
    world.step(&transforms);
    assert_eq!(
        drain(&mut world),
        vec![(ContactKind::OnSeparate, a, b), (ContactKind::OnSeparate, b, a)]
    );
}

#[test]
fn test_mask_change_drops_contact_silently() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 1.0));
    let b = world.add_collider(circle_collider(2, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    world.step(&transforms);
    drain(&mut world);

    world.collider_mut(a).unwrap().set_collision_mask(0);
    world.step(&transforms);
    assert_eq!(drain(&mut world), vec![(ContactKind::WhileTouching, b, a)]);
    assert!(!world.is_touching(a, b));
}

#[test]
fn test_multi_shape_collider() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let dumbbell = Collider::new(1)
        .with_shape_offset(ConvexShape::circle(1.0).unwrap(), Transform::from_position(v2(-5.0, 0.0)))
        .with_shape_offset(ConvexShape::circle(1.0).unwrap(), Transform::from_position(v2(5.0, 0.0)));
    let a = world.add_collider(dumbbell);
    let b = world.add_collider(Collider::new(2).with_shape(ConvexShape::rect(1.0, 1.0).unwrap()));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 0.0, 0.0);
    world.step(&transforms);
    assert!(!world.is_touching(a, b));

    place(&mut transforms, 2, 5.5, 0.0);
    world.step(&transforms);
    assert!(world.is_touching(a, b));

    // rotating the owner swings the right-hand circle down to (0, -5)
    transforms.insert(1, Transform::new(v2(0.0, 0.0), -90.0, v2(1.0, 1.0)));
    place(&mut transforms, 2, 0.0, -5.5);
    world.step(&transforms);
    assert!(world.is_touching(a, b));
}

#[test]
fn test_dispatch_to_listener() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    world.add_collider(circle_collider(1, 1.0));
    world.add_collider(circle_collider(2, 1.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.0, 0.0);
    world.step(&transforms);
    assert_eq!(world.queued_events(), 4);

    let mut received: Vec<ContactEvent> = Vec::new();
    assert_eq!(world.dispatch(&mut received), 4);
    assert_eq!(world.queued_events(), 0);
    assert_eq!(received[0].this_owner(), 1);
    assert_eq!(received[0].other_owner(), 2);
    assert_eq!(received[2].this_owner(), 2);

    world.step(&transforms);
    world.clear_events();
    assert_eq!(world.next(), None);
}

#[test]
fn test_penetration() {
    let mut world = CollisionWorld::new();
    let mut transforms = Transforms::new();
    let a = world.add_collider(Collider::new(1).with_shape(ConvexShape::rect(2.0, 2.0).unwrap()));
    let b = world.add_collider(Collider::new(2).with_shape(ConvexShape::rect(2.0, 2.0).unwrap()));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 1.5, 0.0);
    let depth: Vec2 = world.penetration(a, b, &transforms).unwrap();
    assert_relative_eq!(depth.x, 0.5, epsilon = 1e-3);
    assert_relative_eq!(depth.y, 0.0, epsilon = 1e-3);

    place(&mut transforms, 2, 3.0, 0.0);
    assert_eq!(world.penetration(a, b, &transforms), None);
}

#[test]
fn test_low_iteration_cap_misses_overlap() {
    let config = WorldConfig { gjk_max_iterations: 0, ..WorldConfig::default() };
    let mut world = CollisionWorld::with_config(config);
    let mut transforms = Transforms::new();
    let a = world.add_collider(circle_collider(1, 5.0));
    let b = world.add_collider(circle_collider(2, 5.0));
    place(&mut transforms, 1, 0.0, 0.0);
    place(&mut transforms, 2, 8.0, 0.0);
    world.step(&transforms);
    assert!(!world.is_touching(a, b));
    assert_eq!(world.config().gjk_max_iterations, 0);
}
