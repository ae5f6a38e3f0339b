//! Polybox demo scenarios
//!
//! Drives the engine headless, the way a game shell would: a frame loop with
//! fixed-timestep substeps, per-frame input forces, event-driven game rules,
//! and explicit removal sweeps between frames.
//!
//! Usage: `polybox [config.json]` - the optional file overrides engine tuning.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use polybox::sim::{Body, Mass, Polygon, Rgb, Scene, SimEvent, Tag};
use polybox::{SimConfig, rotate_vec};

const WORLD_WIDTH: f32 = 1000.0;
const FRAME_DT: f32 = 1.0 / 30.0;
const DEMO_SEED: u64 = 0x706f_6c79;

// Platformer parameters
/// Constant downward pull the input layer applies to the player every frame
const GRAVITY_FORCE: Vec2 = Vec2::new(0.0, -500.0);
const PLATFORM_WIDTH: f32 = 100.0;
const PLATFORM_HEIGHT: f32 = 20.0;
const PLAYER_SIZE: f32 = 20.0;
const POWERUP_RADIUS: f32 = 15.0;

// Tanks parameters
const G: f32 = 6.67e-11;
const ANCHOR_MASS: f32 = 6.0e24;
const SURFACE_GRAVITY: f32 = 9.8;
const MUZZLE_SPEED: f32 = 87.0;
const SHELL_ELASTICITY: f32 = 0.85;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).expect("failed to read config file");
            SimConfig::from_json(&json).expect("failed to parse config file")
        }
        None => SimConfig::default(),
    };
    log::info!("polybox demo starting (fixed dt = {:.4}s)", config.fixed_dt);

    platformer_round(&config);
    tanks_volley(&config);
}

/// Advance one frame of wall-clock time in fixed substeps
fn step_frame(scene: &mut Scene, frame_dt: f32) {
    let dt = scene.config().fixed_dt;
    let max_substeps = scene.config().max_substeps;
    let steps = ((frame_dt / dt).ceil() as u32).clamp(1, max_substeps);
    for _ in 0..steps {
        scene.tick(dt);
    }
}

/// One platformer round: the player falls under constant force, falling
/// platforms catch it on the way down, and a powerup grants double jump.
fn platformer_round(config: &SimConfig) {
    log::info!("--- platformer round ---");
    let mut scene = Scene::with_config(config.clone());
    let mut rng = Pcg32::seed_from_u64(DEMO_SEED);

    let ground = scene.add_body(Body::with_tag(
        Polygon::rect(WORLD_WIDTH, 20.0, Vec2::new(WORLD_WIDTH / 2.0, 10.0)),
        Mass::Infinite,
        Rgb::new(0.4, 0.3, 0.2),
        Tag::Platform,
    ));
    let player = scene.add_body(Body::with_tag(
        Polygon::rect(PLAYER_SIZE, PLAYER_SIZE, Vec2::new(WORLD_WIDTH / 3.0, 300.0)),
        Mass::finite(10.0),
        Rgb::new(0.0, 0.0, 0.0),
        Tag::Player(1),
    ));
    scene.add_platform_support(ground, player);

    let powerup = scene.add_body(Body::with_tag(
        Polygon::regular(32, POWERUP_RADIUS, Vec2::new(WORLD_WIDTH / 3.0, 150.0)),
        Mass::finite(0.0001),
        Rgb::new(0.0, 1.0, 0.0),
        Tag::Powerup,
    ));
    scene.add_pickup_trigger(player, powerup);

    let mut has_double_jump = false;
    let mut supports = 0u32;

    for frame in 0..240u32 {
        // Input layer: last write per frame wins
        scene.body_mut(player).add_force(GRAVITY_FORCE);

        // A new falling platform every second, at a seeded random x
        if frame % 30 == 0 {
            let x = PLATFORM_WIDTH / 2.0
                + rng.random_range(0.0..WORLD_WIDTH - PLATFORM_WIDTH);
            let falling = scene.add_body(Body::with_tag(
                Polygon::rect(PLATFORM_WIDTH, PLATFORM_HEIGHT, Vec2::new(x, 480.0)),
                Mass::finite(10.0),
                Rgb::new(1.0, 0.0, 0.0),
                Tag::Platform,
            ));
            scene.body_mut(falling).set_velocity(Vec2::new(0.0, -120.0));
            scene.add_platform_support(falling, player);
        }

        step_frame(&mut scene, FRAME_DT);

        // Game rules react to engine responses
        for event in scene.drain_events() {
            match event {
                SimEvent::PickupCollected { .. } => {
                    has_double_jump = true;
                    log::info!("frame {frame}: double jump collected");
                }
                SimEvent::Landed { .. } => supports += 1,
                SimEvent::Impact { .. } => {}
            }
        }

        // Cull platforms that left the world, then compact
        let offscreen: Vec<_> = scene
            .iter()
            .filter(|&(handle, body)| {
                handle != ground && body.tag() == Tag::Platform && body.centroid().y < 60.0
            })
            .map(|(handle, _)| handle)
            .collect();
        for handle in offscreen {
            scene.remove_body(handle);
        }
        scene.sweep();
    }

    let player_pos = scene.body(player).centroid();
    log::info!(
        "platformer round over: player at ({:.1}, {:.1}), {} support ticks, double jump: {}, {} bodies live",
        player_pos.x,
        player_pos.y,
        supports,
        has_double_jump,
        scene.body_count()
    );
}

/// A tanks volley: two immovable tanks, a shell fired on a ballistic arc
/// under newtonian gravity from a planet-sized anchor below the world.
fn tanks_volley(config: &SimConfig) {
    log::info!("--- tanks volley ---");
    let mut scene = Scene::with_config(config.clone());

    // Deep enough that the pull reads as uniform surface gravity
    let anchor_depth = (G * ANCHOR_MASS / SURFACE_GRAVITY).sqrt();
    let anchor = scene.add_body(Body::with_tag(
        Polygon::rect(WORLD_WIDTH, 1.0, Vec2::new(WORLD_WIDTH / 2.0, -anchor_depth)),
        Mass::finite(ANCHOR_MASS),
        Rgb::new(0.0, 0.0, 0.0),
        Tag::Anchor,
    ));

    let _tank_one = scene.add_body(Body::with_tag(
        Polygon::rect(60.0, 30.0, Vec2::new(100.0, 15.0)),
        Mass::Infinite,
        Rgb::new(0.2, 0.5, 0.2),
        Tag::Player(1),
    ));
    let tank_two = scene.add_body(Body::with_tag(
        Polygon::rect(60.0, 30.0, Vec2::new(900.0, 15.0)),
        Mass::Infinite,
        Rgb::new(0.5, 0.2, 0.2),
        Tag::Player(2),
    ));

    // Fire from tank one's barrel at 45 degrees
    let shell = scene.add_body(Body::with_tag(
        Polygon::rect(8.0, 8.0, Vec2::new(130.0, 40.0)),
        Mass::finite(1.0),
        Rgb::new(0.1, 0.1, 0.1),
        Tag::Projectile,
    ));
    let muzzle = rotate_vec(Vec2::new(MUZZLE_SPEED, 0.0), std::f32::consts::FRAC_PI_4);
    scene.body_mut(shell).set_velocity(muzzle);
    scene.add_newtonian_gravity(G, anchor, shell);
    scene.add_destructive_collision(SHELL_ELASTICITY, tank_two, shell);

    let mut hit = false;
    for frame in 0..600u32 {
        step_frame(&mut scene, FRAME_DT);

        for event in scene.drain_events() {
            if let SimEvent::Impact { overlap, .. } = event {
                // Game rules decide what an impact destroys: the shell
                log::info!("frame {frame}: shell hit tank two (overlap {overlap:.2})");
                scene.remove_body(shell);
                hit = true;
            }
        }
        if hit || scene.body(shell).centroid().y < -100.0 {
            break;
        }
    }

    scene.sweep();
    log::info!(
        "tanks volley over: hit = {hit}, {} bodies remain",
        scene.body_count()
    );
}
