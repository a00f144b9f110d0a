//! Headless stairs demo
//!
//! A player walks across a floor, climbs a short flight of stairs and fires
//! at an enemy standing on the landing, while a turret sprays fast bullets
//! at a wall. Nothing is rendered: debug geometry is collected every frame
//! and summarized in the log.
//!
//! Pass a `.toml` or `.ron` physics config path as the first argument to
//! override the defaults.

use std::cell::Cell;
use std::rc::Rc;

use aabb_physics::prelude::*;

const FRAME_TIME: f32 = 1.0 / 60.0;
const FRAME_COUNT: usize = 360;
const SHOT_INTERVAL: usize = 30;
const BULLET_INTERVAL: usize = 20;
const BULLET_SPEED: f32 = 240.0;
const ENEMY_HEALTH: u32 = 3;

struct StairsDemo {
    world: PhysicsWorld,
    debug: DebugDrawSystem,
    player: RigidbodyHandle,
    enemy: RigidbodyHandle,
    enemy_health: Rc<Cell<u32>>,
    bullets: Vec<RigidbodyHandle>,
    bullet_channel: ChannelId,
    bullet_tests: TestChannels,
    shot_tests: TestChannels,
    wall_hits: Rc<Cell<u32>>,
}

impl StairsDemo {
    fn new(config: PhysicsConfig) -> Result<Self, ChannelError> {
        let mut world = PhysicsWorld::new(config);

        let solid = world.channel("solid")?;
        let player_channel = world.channel("player")?;
        let enemy_channel = world.channel("enemy")?;
        let bullet_channel = world.channel("bullet")?;
        let walker_tests = world.register_test_channel("walker", &["solid", "player", "enemy"])?;
        let bullet_tests = world.register_test_channel("bullet", &["solid", "enemy"])?;
        let shot_tests = world.register_test_channel("shot", &["solid", "enemy"])?;

        // floor, three steps of 0.25 and a landing, then a wall for the turret
        Self::solid_box(&mut world, solid, Vec3::new(-10.0, -1.0, -5.0), Vec3::new(20.0, 0.0, 5.0));
        for step in 0..3 {
            let x = 4.0 + step as f32;
            let top = 0.25 * (step + 1) as f32;
            Self::solid_box(&mut world, solid, Vec3::new(x, -1.0, -2.0), Vec3::new(12.0, top, 2.0));
        }
        let wall = Self::solid_box(&mut world, solid, Vec3::new(-8.0, 0.0, 6.0), Vec3::new(-7.8, 3.0, 9.0));

        let wall_hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&wall_hits);
        if let Some(collision) = world.collision_mut(wall) {
            collision.on_collision_intersect.subscribe(move |_, _| counter.set(counter.get() + 1));
        }

        let player = world.create_rigidbody(
            RigidbodyComponent::new(CollisionComponent::new(
                CollisionShape::cuboid(Vec3::new(0.4, 0.9, 0.4)),
                Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
                player_channel,
            ))
            .with_step_height(0.3)
            .with_test_channels(walker_tests)
            .with_velocity(Vec3::new(1.5, 0.0, 0.0)),
        );
        if let Some(body) = world.rigidbody_mut(player) {
            body.on_collision_repulsed.subscribe(|event, _| {
                if event.response.impact_normal.y > 0.0 && event.response.repulsion.y > 0.1 {
                    log::info!("Player stepped up by {:.2}", event.response.repulsion.y);
                }
            });
        }

        let enemy = world.create_rigidbody(
            RigidbodyComponent::new(CollisionComponent::new(
                CollisionShape::cuboid(Vec3::new(0.4, 0.9, 0.4)),
                Transform::from_position(Vec3::new(10.0, 1.65, 0.0)),
                enemy_channel,
            ))
            .with_flags(BodyFlags::empty())
            .with_test_channels(walker_tests),
        );

        let enemy_health = Rc::new(Cell::new(ENEMY_HEALTH));
        let health = Rc::clone(&enemy_health);
        if let Some(body) = world.rigidbody_mut(enemy) {
            body.collision_mut().on_raycast_intersect.subscribe(move |event, removals| {
                let remaining = health.get().saturating_sub(1);
                health.set(remaining);
                log::info!("Enemy hit at {:?}, {} health left", event.location, remaining);
                if remaining == 0 {
                    removals.remove(event.collider);
                }
            });
            body.on_destroy.subscribe(|_, _| log::info!("Enemy destroyed"));
        }

        Ok(Self {
            world,
            debug: DebugDrawSystem::new(),
            player,
            enemy,
            enemy_health,
            bullets: Vec::new(),
            bullet_channel,
            bullet_tests,
            shot_tests,
            wall_hits,
        })
    }

    fn solid_box(world: &mut PhysicsWorld, channel: ChannelId, min: Vec3, max: Vec3) -> CollisionHandle {
        let aabb = Aabb::from_min_max(min, max);
        world.create_collision(CollisionComponent::new(
            CollisionShape::cuboid(aabb.half_extents),
            Transform::from_position(aabb.center),
            channel,
        ))
    }

    fn fire_bullet(&mut self) {
        let bullet = self.world.create_rigidbody(
            RigidbodyComponent::new(CollisionComponent::new(
                CollisionShape::cuboid(Vec3::new(0.05, 0.05, 0.05)),
                Transform::from_position(Vec3::new(0.0, 1.0, 7.5)),
                self.bullet_channel,
            ))
            .with_flags(BodyFlags::USE_CCD)
            .with_test_channels(self.bullet_tests),
        );

        if let Some(body) = self.world.rigidbody_mut(bullet) {
            body.on_collision_intersect.subscribe(|event, removals| removals.remove(event.this));
        }
        self.bullets.push(bullet);
    }

    fn shoot_at_enemy(&mut self) {
        let Some(player) = self.world.rigidbody(self.player) else {
            return;
        };
        let eye = player.position() + Vec3::new(0.0, 0.6, 0.0);
        let target = eye + Vec3::new(30.0, 0.0, 0.0);

        let hit = self.world.raycast_line(eye, target, &self.shot_tests, 0.5);
        match hit.collider {
            Some(ColliderRef::Rigidbody(handle)) if handle == self.enemy => {
                log::debug!("Shot hit the enemy at {:.2}", hit.distance);
            }
            Some(other) => log::debug!("Shot blocked by {:?}", other),
            None => log::debug!("Shot missed"),
        }
    }

    fn move_bullets(&mut self) {
        let world = &mut self.world;
        self.bullets.retain(|&bullet| match world.rigidbody_mut(bullet) {
            Some(body) => {
                let position = body.position() + Vec3::new(-BULLET_SPEED * FRAME_TIME, 0.0, 0.0);
                body.move_to(position);
                true
            }
            None => false,
        });
    }

    fn run(&mut self) {
        for frame in 0..FRAME_COUNT {
            if frame % SHOT_INTERVAL == 0 {
                self.shoot_at_enemy();
            }
            if frame % BULLET_INTERVAL == 0 {
                self.fire_bullet();
            }
            self.move_bullets();

            self.world.step(FRAME_TIME);

            self.debug.update(FRAME_TIME);
            self.world.draw_debug(&mut self.debug);

            if frame % 60 == 0 {
                if let Some(player) = self.world.rigidbody(self.player) {
                    log::info!(
                        "Frame {}: player at {:?} (on ground: {}), {} debug shapes",
                        frame,
                        player.position(),
                        player.is_on_ground(),
                        self.debug.shape_count()
                    );
                }
            }
        }

        log::info!(
            "Done: enemy health {}, {} bullets stopped by the wall, {} still flying",
            self.enemy_health.get(),
            self.wall_hits.get(),
            self.bullets.len()
        );
        self.world.clear_all();
    }
}

fn load_config() -> Result<PhysicsConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics config from {}", path);
            PhysicsConfig::load_from_file(&path)
        }
        None => Ok(PhysicsConfig::default().with_debug_draw(true)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting stairs demo");

    let config = load_config()?;
    let mut demo = StairsDemo::new(config)?;
    demo.run();

    log::info!("Stairs demo completed successfully");
    Ok(())
}
