//! Enemy records and their per-tick state machine.

use grim_halls_core::{EnemyId, EnemySnapshot, EnemyState, TileView, WorldPoint};

/// Distance below which an enemy stops chasing and strikes, in tile-widths.
pub(crate) const ATTACK_RANGE_TILES: f32 = 1.5;
/// Distance below which an enemy notices and pursues the player, in tile-widths.
pub(crate) const CHASE_RANGE_TILES: f32 = 8.0;
/// Ticks between successive melee strikes.
pub(crate) const ATTACK_COOLDOWN_TICKS: u32 = 60;
/// Ticks of forced inactivity after absorbing a hit.
pub(crate) const HIT_STAGGER_TICKS: u32 = 5;

const ENEMY_SPEED: f32 = 1.0;
const ENEMY_START_HEALTH: u32 = 100;

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The enemy was already dead; nothing changed.
    Ignored,
    /// The enemy survived the hit.
    Wounded,
    /// The hit dropped the enemy's health to zero.
    Killed,
}

/// Mutable enemy record stored in the world's arena.
///
/// Records never leave the arena: a killed enemy keeps its slot and id so
/// external references stay valid until the next session reset.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    position: WorldPoint,
    facing_degrees: f32,
    state: EnemyState,
    health: u32,
    attack_cooldown: u32,
    stagger: u32,
    dead: bool,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, position: WorldPoint) -> Self {
        Self {
            id,
            position,
            facing_degrees: 0.0,
            state: EnemyState::Idle,
            health: ENEMY_START_HEALTH,
            attack_cooldown: 0,
            stagger: 0,
            dead: false,
        }
    }

    pub(crate) const fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) const fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Runs one tick of the state machine.
    ///
    /// Returns `true` when the enemy lands a melee strike this tick. Facing
    /// is re-derived toward the player before anything else so even a
    /// staggered enemy tracks its target; the stagger window then consumes
    /// the remainder of the tick.
    pub(crate) fn advance(&mut self, player: WorldPoint, tiles: &TileView<'_>) -> bool {
        if self.dead {
            return false;
        }

        let distance = self.position.distance_to(player);
        self.facing_degrees = self.position.bearing_to_degrees(player);

        if self.stagger > 0 {
            self.stagger -= 1;
            return false;
        }

        let tile_length = tiles.tile_length();
        if distance < ATTACK_RANGE_TILES * tile_length {
            self.state = EnemyState::Attacking;
            if self.attack_cooldown == 0 {
                self.attack_cooldown = ATTACK_COOLDOWN_TICKS;
                return true;
            }
            self.attack_cooldown -= 1;
        } else if distance < CHASE_RANGE_TILES * tile_length {
            self.state = EnemyState::Chasing;
            let candidate = self.position.advanced_by(self.facing_degrees, ENEMY_SPEED);
            // No pathfinding: a blocked step is simply refused.
            if !tiles.is_blocking_at(candidate.x(), candidate.y()) {
                self.position = candidate;
            }
        } else {
            self.state = EnemyState::Idle;
        }

        false
    }

    /// Applies damage, returning what the hit amounted to.
    pub(crate) fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(amount);
        self.stagger = HIT_STAGGER_TICKS;

        if self.health == 0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            facing_degrees: self.facing_degrees,
            state: self.state,
            health: self.health,
            dead: self.dead,
        }
    }
}
