use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use grim_halls_core::{Command, Event, MoveDirection, Pace, WeaponKind};
use grim_halls_world::{self as world, query, World};

#[test]
fn identical_seeds_replay_to_identical_fingerprints() {
    let script = session_script();
    let first = replay(0xfeed_f00d, &script);
    let second = replay(0xfeed_f00d, &script);

    assert_eq!(first, second, "replay diverged for the same seed and script");
}

#[test]
fn the_script_actually_mutates_the_world() {
    let script = session_script();
    let untouched = replay(0xfeed_f00d, &[]);

    assert_ne!(
        replay(0xfeed_f00d, &script),
        untouched,
        "script replay left no trace in the fingerprint"
    );
}

/// A minute of play: sprint down the corridor, wheel around, trade shotgun
/// fire, actuate whatever is ahead, then let the world settle.
fn session_script() -> Vec<Command> {
    let mut script = vec![Command::SetPace { pace: Pace::Sprint }];
    for _ in 0..30 {
        script.push(Command::Move {
            direction: MoveDirection::Forward,
        });
        script.push(Command::Tick);
    }
    script.push(Command::Rotate {
        delta_degrees: 45.0,
    });
    script.push(Command::SwitchWeapon {
        weapon: WeaponKind::Shotgun,
    });
    script.push(Command::FireWeapon);
    for _ in 0..120 {
        script.push(Command::Tick);
    }
    script.push(Command::Interact);
    for _ in 0..90 {
        script.push(Command::Tick);
    }
    script
}

fn replay(seed: u64, script: &[Command]) -> u64 {
    let mut world = World::with_seed(seed);
    let mut events: Vec<Event> = Vec::new();
    for command in script {
        world::apply(&mut world, *command, &mut events);
    }
    fingerprint(&world, &events)
}

fn fingerprint(world: &World, events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();

    let player = query::player(world);
    player.position.x().to_bits().hash(&mut hasher);
    player.position.y().to_bits().hash(&mut hasher);
    player.facing_degrees.to_bits().hash(&mut hasher);
    player.health.hash(&mut hasher);
    player.ammo.pistol.hash(&mut hasher);
    player.ammo.shotgun.hash(&mut hasher);
    player.ammo.bfg.hash(&mut hasher);

    for enemy in query::enemy_view(world).iter() {
        enemy.id.get().hash(&mut hasher);
        enemy.position.x().to_bits().hash(&mut hasher);
        enemy.position.y().to_bits().hash(&mut hasher);
        enemy.state.hash(&mut hasher);
        enemy.health.hash(&mut hasher);
        enemy.dead.hash(&mut hasher);
    }

    query::tick_index(world).hash(&mut hasher);
    events.len().hash(&mut hasher);

    hasher.finish()
}
