//! Z2H headless runner
//!
//! Runs the simulation without a window: an autopilot walks out of the start
//! hall, hunts the roster level by level and logs what happens.
//!
//! Usage: `z2h [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use z2h::Tuning;
    use z2h::sim::{GameState, Simulation};

    env_logger::init();
    log::info!("Z2H (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);

    let mut sim = Simulation::new(GameState::with_tuning(seed, tuning));
    let frame_dt = 1.0 / 60.0;
    let mut kills = 0;

    for frame in 0..60 * 180 {
        autopilot::steer(&sim.state, &mut sim.input, frame);
        let outcome = sim.advance(frame_dt);
        kills += outcome.kills.len();
        if let Some(level) = outcome.level_cleared {
            log::info!("Cleared level {} after {:.1}s", level, sim.state.time_ms / 1000.0);
        }
        if outcome.player_defeated {
            log::info!("Defeated after {} kills", kills);
        }
    }

    let p = &sim.state.player;
    println!(
        "t={:.1}s location={:?} hp={} armor={} energy={:.1} kills={} experience={}",
        sim.state.time_ms / 1000.0,
        sim.state.location,
        p.hp,
        p.armor,
        p.energy,
        kills,
        p.experience
    );
    for notice in sim.state.notices.iter() {
        println!("  notice: {}", notice.text);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;
    use z2h::sim::{GameState, HallFixture, Location, MoveKeys, TickInput, ZoneId};

    /// Hold keys toward `target`
    fn keys_toward(from: Vec2, to: Vec2) -> MoveKeys {
        let d = to - from;
        MoveKeys {
            left: d.x < -8.0,
            right: d.x > 8.0,
            up: d.y < -8.0,
            down: d.y > 8.0,
        }
    }

    /// Pick this frame's input from the current state
    pub fn steer(state: &GameState, input: &mut TickInput, frame: u32) {
        let pos = state.player.pos;
        input.interact = false;
        input.fire = false;

        match state.location {
            Location::Hall => {
                let gate = state.hall.fixture_pos(HallFixture::Gate);
                input.keys = keys_toward(pos, gate);
                input.interact = state.hall.fixture_near(pos) == Some(HallFixture::Gate);
            }
            Location::World(ZoneId::Level(n)) => {
                let nearest = state
                    .enemies
                    .iter()
                    .filter(|e| e.alive)
                    .min_by(|a, b| a.pos.distance(pos).total_cmp(&b.pos.distance(pos)));
                match nearest {
                    Some(enemy) => {
                        input.aim = Some(enemy.pos);
                        input.fire = true;
                        // Keep some distance while shooting
                        let away = (pos - enemy.pos).normalize_or_zero() * 250.0;
                        input.keys = keys_toward(pos, enemy.pos + away);
                        input.use_skill = frame % 600 == 0;
                    }
                    None => {
                        let Some(level) = state.world.level(n) else {
                            return;
                        };
                        let gate = Vec2::new(level.bounds.max.x - 40.0, level.bounds.center().y);
                        input.keys = keys_toward(pos, gate);
                        input.interact = pos.x > level.bounds.center().x;
                    }
                }
            }
            Location::World(ZoneId::Corridor { from }) => {
                let Some(corridor) = state.world.corridor(from) else {
                    return;
                };
                let exit = Vec2::new(corridor.bounds.max.x - 40.0, corridor.bounds.center().y);
                input.keys = keys_toward(pos, exit);
                input.interact = pos.x > corridor.bounds.center().x;
            }
        }
    }
}
