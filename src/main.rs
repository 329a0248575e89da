//! Road Rivals headless runner
//!
//! Drives the rider AI against a scripted player on a winding road and logs
//! what happens. `RUST_LOG=debug` shows spawns, culls and knockouts.
//!
//! Usage: `road-rivals [level-index] [frames] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
use road_rivals::persistence::SaveEnvelope;
#[cfg(not(target_arch = "wasm32"))]
use road_rivals::{AiSystem, LevelType, SpritePool, Tuning, World};

/// Fixed seed so runs are reproducible
#[cfg(not(target_arch = "wasm32"))]
const SEED: u64 = 0x5EED;

/// Player cruising speed
#[cfg(not(target_arch = "wasm32"))]
const PLAYER_CRUISE: i16 = 160;

/// Player strike reach and damage
#[cfg(not(target_arch = "wasm32"))]
const STRIKE_REACH: i32 = 32;
#[cfg(not(target_arch = "wasm32"))]
const STRIKE_DAMAGE: i16 = 25;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let level = args
        .next()
        .and_then(|s| s.parse::<u8>().ok())
        .map(LevelType::from_index)
        .unwrap_or_default();
    let frames = args.next().and_then(|s| s.parse::<u32>().ok()).unwrap_or(3600);
    let tuning = args.next().map(Tuning::load).unwrap_or_default();

    log::info!("Road Rivals (headless) starting: {:?}, {} frames", level, frames);

    let mut ai = AiSystem::new(tuning);
    let mut world = World::seeded(SEED);
    world.player.speed = PLAYER_CRUISE;
    let mut backend = SpritePool::new();
    ai.initialize(level, &mut world, &mut backend);

    let mut strikes = 0u32;
    for frame in 0..frames {
        // Scripted player: weave across the road and recover speed after hits
        world.player.track_position += i64::from(world.player.speed >> 6);
        world.player.x = road_rivals::consts::ROAD_CENTER + weave(frame);
        if world.player.speed < PLAYER_CRUISE {
            world.player.speed += 1;
        }

        ai.tick(&mut world, &mut backend, road_curve(frame));

        if frame % 60 == 0 {
            strike_nearest(&mut ai, &world, &mut backend, &mut strikes);
        }
        if frame % 1000 == 999 {
            let _ = ai.spawn_event_rider(weave(frame) / 2, &mut world);
        }
        if frame % 600 == 0 {
            log::info!(
                "frame {}: {} riders, difficulty {}, player speed {} at x={}",
                ai.frame(),
                ai.active_count(),
                ai.difficulty(),
                world.player.speed,
                world.player.x
            );
        }
    }

    log::info!(
        "Done: {} riders spawned in total, {} player strikes landed",
        ai.stats().total_spawned,
        strikes
    );

    match SaveEnvelope::new(ai.save_state(&world)).to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; the host game drives the AI
}

/// Triangle wave across the road, -60..=60
#[cfg(not(target_arch = "wasm32"))]
fn weave(frame: u32) -> i32 {
    let phase = (frame % 240) as i32;
    if phase < 120 { phase - 60 } else { 180 - phase }
}

/// Piecewise-constant bends, changing every two seconds
#[cfg(not(target_arch = "wasm32"))]
fn road_curve(frame: u32) -> i16 {
    (((frame / 120) % 7) as i16 - 3) * 8
}

#[cfg(not(target_arch = "wasm32"))]
fn strike_nearest<R>(ai: &mut AiSystem, world: &World<R>, backend: &mut SpritePool, strikes: &mut u32) {
    let Some(id) = ai.get_nearest(world.player.x) else {
        return;
    };
    let in_reach = ai
        .rider(id)
        .is_some_and(|r| (r.x() - world.player.x).abs() < STRIKE_REACH);
    if !in_reach {
        return;
    }
    if let Some(outcome) = ai.apply_external_attack(id, STRIKE_DAMAGE, backend) {
        *strikes += 1;
        log::info!("Player strike on slot {}: {:?}", id.index(), outcome);
    }
}
