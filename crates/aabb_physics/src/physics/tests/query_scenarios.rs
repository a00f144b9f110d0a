//! Query scenarios: raycasts, debug raycasts, sweeps, overlaps and debug drawing

use crate::config::PhysicsConfig;
use crate::debug::{DebugDrawSystem, DebugShape};
use crate::events::RaycastEvent;
use crate::foundation::collections::{ColliderRef, CollisionHandle};
use crate::foundation::math::{Transform, Vec3};
use crate::physics::{
    Aabb, BodyFlags, ChannelId, CollisionComponent, CollisionShape, PhysicsWorld, RigidbodyComponent, TestChannels,
};
use approx::assert_relative_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(world: &mut PhysicsWorld, x: f32, channel: ChannelId) -> CollisionHandle {
        world.create_collision(CollisionComponent::new(
            CollisionShape::cuboid(Vec3::new(1.0, 1.0, 1.0)),
            Transform::from_position(Vec3::new(x, 0.0, 0.0)),
            channel,
        ))
    }

    fn shoot(world: &mut PhysicsWorld, duration: f32) -> crate::physics::RaycastHitInfos {
        world.raycast_line(Vec3::zeros(), Vec3::new(20.0, 0.0, 0.0), &TestChannels::ALL, duration)
    }

    #[test]
    fn test_debug_raycast_flags_hit_until_it_expires() {
        let mut world = PhysicsWorld::default();
        let target = unit_box(&mut world, 3.0, ChannelId::DEFAULT);

        shoot(&mut world, 0.5);
        assert_eq!(world.debug_raycast_count(), 1);
        assert!(world.collision(target).unwrap().is_intersected());

        world.step(0.2);
        assert!(world.collision(target).unwrap().is_intersected());
        world.step(0.2);
        assert!(world.collision(target).unwrap().is_intersected());

        world.step(0.2);
        assert_eq!(world.debug_raycast_count(), 0);
        assert!(!world.collision(target).unwrap().is_intersected());
    }

    #[test]
    fn test_debug_raycast_follows_moving_targets() {
        let mut world = PhysicsWorld::default();
        let target = unit_box(&mut world, 3.0, ChannelId::DEFAULT);
        shoot(&mut world, 10.0);

        world.set_collision_transform(target, Transform::from_position(Vec3::new(3.0, 5.0, 0.0)));
        world.step(0.1);

        let raycast = world.debug_raycasts().next().unwrap();
        assert!(!raycast.last_hit.is_hit());
        assert!(!world.collision(target).unwrap().is_intersected());
    }

    #[test]
    fn test_one_shot_raycast_only_fires_event() {
        let mut world = PhysicsWorld::default();
        let target = unit_box(&mut world, 3.0, ChannelId::DEFAULT);

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        world
            .collision_mut(target)
            .unwrap()
            .on_raycast_intersect
            .subscribe(move |event, _| sink.borrow_mut().push(*event));

        let hit = shoot(&mut world, 0.0);

        assert_eq!(hit.collider, Some(ColliderRef::Collision(target)));
        assert_relative_eq!(hit.location, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(world.debug_raycast_count(), 0);
        assert!(!world.collision(target).unwrap().is_intersected());
        assert_eq!(
            *events.borrow(),
            vec![RaycastEvent {
                collider: ColliderRef::Collision(target),
                location: hit.location,
                distance: hit.distance,
            }]
        );
    }

    #[test]
    fn test_raycast_hits_closest_rigidbody() {
        let mut world = PhysicsWorld::default();
        unit_box(&mut world, 6.0, ChannelId::DEFAULT);
        let enemy = world.create_rigidbody(
            RigidbodyComponent::new(CollisionComponent::new(
                CollisionShape::cuboid(Vec3::new(0.5, 1.0, 0.5)),
                Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),
                ChannelId::DEFAULT,
            ))
            .with_flags(BodyFlags::empty()),
        );

        let shot = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&shot);
        world
            .rigidbody_mut(enemy)
            .unwrap()
            .collision_mut()
            .on_raycast_intersect
            .subscribe(move |_, _| *flag.borrow_mut() = true);

        let hit = shoot(&mut world, 0.0);
        assert_eq!(hit.collider, Some(ColliderRef::Rigidbody(enemy)));
        assert_relative_eq!(hit.distance, 1.5);
        assert!(*shot.borrow());
    }

    #[test]
    fn test_raycast_respects_test_channels() {
        let mut world = PhysicsWorld::default();
        let wall = world.channel("wall").unwrap();
        unit_box(&mut world, 3.0, wall);
        let enemies_only = world.register_test_channel("shots", &["enemy"]).unwrap();

        let hit = world.raycast_line(Vec3::zeros(), Vec3::new(20.0, 0.0, 0.0), &enemies_only, 0.0);
        assert!(!hit.is_hit());
        assert_eq!(hit.distance, f32::INFINITY);
    }

    #[test]
    fn test_raycast_callback_can_remove_target() {
        let mut world = PhysicsWorld::default();
        let target = unit_box(&mut world, 3.0, ChannelId::DEFAULT);
        world
            .collision_mut(target)
            .unwrap()
            .on_raycast_intersect
            .subscribe(|event, removals| removals.remove(event.collider));

        shoot(&mut world, 0.0);
        assert_eq!(world.collision_count(), 1);

        world.step(1.0 / 60.0);
        assert_eq!(world.collision_count(), 0);
    }

    #[test]
    fn test_sweep_box_returns_closest() {
        let mut world = PhysicsWorld::default();
        let near = unit_box(&mut world, 3.0, ChannelId::DEFAULT);
        unit_box(&mut world, 8.0, ChannelId::DEFAULT);

        let (collider, hit) = world
            .sweep_box(Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5), &TestChannels::ALL)
            .unwrap();
        assert_eq!(collider, ColliderRef::Collision(near));
        assert_relative_eq!(hit.distance, 1.5);
        assert_relative_eq!(hit.contact_point, Vec3::new(2.0, 0.0, 0.0));

        let miss = world.sweep_box(Vec3::new(0.0, 5.0, 0.0), Vec3::new(10.0, 5.0, 0.0), Vec3::new(0.5, 0.5, 0.5), &TestChannels::ALL);
        assert!(miss.is_none());
    }

    #[test]
    fn test_overlap_box() {
        let mut world = PhysicsWorld::default();
        let solid = world.channel("solid").unwrap();
        unit_box(&mut world, 3.0, solid);

        let probe = Aabb::new(Vec3::new(1.8, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5));
        assert!(world.overlap_box(&probe, &TestChannels::ALL));
        assert!(world.overlap_box(&probe, &TestChannels::from_channels(&[solid])));
        assert!(!world.overlap_box(&probe, &TestChannels::from_channels(&[ChannelId::DEFAULT])));
        assert!(!world.overlap_box(&probe.translated(Vec3::new(-2.0, 0.0, 0.0)), &TestChannels::ALL));
    }

    #[test]
    fn test_draw_debug_only_when_enabled() {
        let mut world = PhysicsWorld::default();
        unit_box(&mut world, 3.0, ChannelId::DEFAULT);
        let mut drawer = DebugDrawSystem::new();

        world.draw_debug(&mut drawer);
        assert_eq!(drawer.shape_count(), 0);

        world.config_mut().debug_draw = true;
        world.draw_debug(&mut drawer);
        assert_eq!(drawer.shape_count(), 1);
    }

    #[test]
    fn test_draw_debug_colors() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default().with_debug_draw(true));
        let colors = world.config().debug_colors.clone();
        let target = unit_box(&mut world, 3.0, ChannelId::DEFAULT);
        unit_box(&mut world, -3.0, ChannelId::DEFAULT);

        shoot(&mut world, 1.0);
        world.raycast_line(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 10.0, 0.0), &TestChannels::ALL, 1.0);

        let mut drawer = DebugDrawSystem::new();
        world.draw_debug(&mut drawer);

        let boxes: Vec<_> = drawer
            .shapes()
            .iter()
            .filter_map(|shape| match shape {
                DebugShape::Box { center, color, .. } => Some((*center, *color)),
                DebugShape::Line { .. } => None,
            })
            .collect();
        let target_center = world.collision(target).unwrap().world_box().center;
        assert!(boxes.contains(&(target_center, colors.shape_colliding)));
        assert!(boxes.contains(&(Vec3::new(-3.0, 0.0, 0.0), colors.shape_default)));

        let line_colors: Vec<_> = drawer
            .shapes()
            .iter()
            .filter(|shape| matches!(shape, DebugShape::Line { .. }))
            .map(DebugShape::color)
            .collect();
        assert_eq!(line_colors, vec![colors.raycast_hit, colors.raycast_miss]);
    }
}
