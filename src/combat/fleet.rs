//! Per-trial entity state: the fleet of ships and the boss they fight.
//!
//! Ships are stored in a flat `Vec` and referenced by index everywhere in the
//! engine; the 3x3 grid is derived from each ship's `position` on demand so a
//! summoned unit can slot in (and vanish) mid-trial without reshuffling the
//! backing storage.

use crate::combat::lieutenants::Lieutenant;
use crate::combat::specials::SpecialAbility;
use crate::combat::stats::{effective, BonusBundle, Stat};

pub const GRID_SLOTS: usize = 9;

/// Meter gained from a regular hit, and the consolation granted when a
/// deathproof charge absorbs a killing blow.
pub const METER_PER_HIT: f64 = 25.0;

/// Meter threshold at which the next attack becomes a special attack.
pub const METER_FULL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipClass {
    Hero,
    Ranger,
    Rover,
    Protector,
    Destroyer,
    Striker,
}

impl ShipClass {
    pub fn from_name(name: &str) -> Option<ShipClass> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hero" => Some(ShipClass::Hero),
            "ranger" => Some(ShipClass::Ranger),
            "rover" => Some(ShipClass::Rover),
            "protector" => Some(ShipClass::Protector),
            "destroyer" => Some(ShipClass::Destroyer),
            "striker" => Some(ShipClass::Striker),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShipClass::Hero => "hero",
            ShipClass::Ranger => "ranger",
            ShipClass::Rover => "rover",
            ShipClass::Protector => "protector",
            ShipClass::Destroyer => "destroyer",
            ShipClass::Striker => "striker",
        }
    }
}

/// Immutable combat attributes, as configured. Rates are percentage points
/// (hit_rate 150.0 = 150%); `special_damage` and `crit_damage` are the
/// percent multipliers applied on a special attack / critical hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseStats {
    pub attack: f64,
    pub special_attack: f64,
    pub special_damage: f64,
    pub special_reset: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub penetration: f64,
    pub hit_rate: f64,
    pub dodge: f64,
    pub block: f64,
    pub damage_up: f64,
    pub special_damage_up: f64,
    pub initial_meter: f64,
    pub lock_rate: f64,
    pub de_accumulate: f64,
    pub de_accumulate_chance: f64,
    pub poison_percent: f64,
}

impl BaseStats {
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Attack => self.attack,
            Stat::SpecialAttack => self.special_attack,
            Stat::Dodge => self.dodge,
            Stat::Block => self.block,
            Stat::HitRate => self.hit_rate,
            Stat::Penetration => self.penetration,
            Stat::CritChance => self.crit_chance,
            Stat::DamageUp => self.damage_up,
            Stat::SpecialDamageUp => self.special_damage_up,
        }
    }
}

/// Invisibility keeps the boss's regular attacks from targeting the ship.
/// `source` names the granting ship so its death can cancel the grant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invisibility {
    pub active: bool,
    pub turns_left: u32,
    pub source: String,
}

impl Invisibility {
    pub fn grant(&mut self, turns: u32, source: &str) {
        self.active = true;
        self.turns_left = turns;
        self.source = source.to_string();
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.turns_left = 0;
        self.source.clear();
    }

    pub fn tick(&mut self) {
        if self.turns_left == 0 {
            self.active = false;
            self.source.clear();
        }
        self.turns_left = self.turns_left.saturating_sub(1);
    }
}

/// Deathproof converts one otherwise-fatal hit into survival; the charge is
/// consumed by the save, not merely checked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deathproof {
    pub active: bool,
    pub turns_left: u32,
}

impl Deathproof {
    pub fn grant(&mut self, turns: u32) {
        self.active = true;
        self.turns_left = turns;
    }

    pub fn consume(&mut self) {
        self.active = false;
        self.turns_left = 0;
    }

    pub fn tick(&mut self) {
        if self.turns_left == 0 {
            self.active = false;
        }
        self.turns_left = self.turns_left.saturating_sub(1);
    }
}

/// Multiplier on all linked-source damage, armed when a linked ship dies.
pub const FURY_MULTIPLIER: f64 = 8.0;
pub const FURY_ARMED_TURNS: u32 = 3;

/// Fury link: while `linked`, this ship's death arms an 8x damage multiplier
/// on the `source` ship for three of its attacks.
#[derive(Debug, Clone, PartialEq)]
pub struct FuryLink {
    pub linked: bool,
    pub turns_left: u32,
    pub source: String,
    pub multiplier: f64,
}

impl Default for FuryLink {
    fn default() -> Self {
        Self {
            linked: false,
            turns_left: 0,
            source: String::new(),
            multiplier: 1.0,
        }
    }
}

impl FuryLink {
    pub fn tick(&mut self) {
        if self.turns_left == 0 {
            self.multiplier = 1.0;
            self.linked = false;
        }
        self.turns_left = self.turns_left.saturating_sub(1);
    }
}

/// Counters extracted into the aggregate report at trial end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipTally {
    pub shots: u32,
    pub misses: u32,
    pub blocked: u32,
    pub specials: u32,
    pub damage_dealt: f64,
    pub meter_at_death: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub name: String,
    pub class: ShipClass,
    /// Grid slot 1–9; 0 means unplaced (only the summoned unit uses it).
    pub position: u8,
    /// Configured slot, restored at trial reset.
    pub home_position: u8,
    pub base: BaseStats,
    pub lieutenant: Lieutenant,
    pub special: SpecialAbility,
    pub is_summon: bool,

    // Per-trial mutable state.
    pub meter: f64,
    pub is_dead: bool,
    pub lieutenant_armed: bool,
    pub invisibility: Invisibility,
    pub deathproof: Deathproof,
    pub fury: FuryLink,
    /// Rounds the summoned unit has left before it vanishes.
    pub summon_turns_left: u32,
    /// The summon enters play at most once per trial.
    pub summon_spent: bool,
    pub lieutenant_bonus: BonusBundle,
    pub ability_bonus: BonusBundle,
    pub tally: ShipTally,
}

impl Ship {
    pub fn new(
        name: &str,
        class: ShipClass,
        position: u8,
        base: BaseStats,
        lieutenant: Lieutenant,
    ) -> Ship {
        let name = name.trim().to_ascii_lowercase();
        let special = SpecialAbility::resolve(&name);
        Ship {
            name,
            class,
            position,
            home_position: position,
            base,
            lieutenant,
            special,
            is_summon: false,
            meter: 0.0,
            is_dead: false,
            lieutenant_armed: true,
            invisibility: Invisibility::default(),
            deathproof: Deathproof::default(),
            fury: FuryLink::default(),
            summon_turns_left: 0,
            summon_spent: false,
            lieutenant_bonus: BonusBundle::default(),
            ability_bonus: BonusBundle::default(),
            tally: ShipTally::default(),
        }
    }

    /// Summed bonus from both modifier layers for one stat.
    pub fn bonus(&self, stat: Stat) -> f64 {
        self.lieutenant_bonus.total(stat) + self.ability_bonus.total(stat)
    }

    /// Current effective attribute value.
    pub fn effective(&self, stat: Stat) -> f64 {
        effective(stat, self.base.get(stat), self.bonus(stat))
    }

    pub fn meter_full(&self) -> bool {
        self.meter >= METER_FULL
    }

    pub fn gain_meter(&mut self, amount: f64) {
        self.meter = (self.meter + amount).max(0.0);
    }

    /// Expire stale turn-based effects. Runs immediately before this ship's
    /// attack resolves, so a buff granted for N turns covers exactly the next
    /// N attacks.
    pub fn expire_turn_effects(&mut self) {
        self.lieutenant_bonus.tick_all();
        self.ability_bonus.tick_all();
        self.deathproof.tick();
        self.invisibility.tick();
        self.fury.tick();
        if self.is_summon {
            self.summon_turns_left = self.summon_turns_left.saturating_sub(1);
        }
    }

    pub fn reset_for_trial(&mut self) {
        self.meter = self.base.initial_meter;
        self.is_dead = self.is_summon;
        self.position = self.home_position;
        self.lieutenant_armed = true;
        self.invisibility = Invisibility::default();
        self.deathproof = Deathproof::default();
        self.fury = FuryLink::default();
        self.summon_turns_left = 0;
        self.summon_spent = false;
        self.lieutenant_bonus.clear();
        self.ability_bonus.clear();
        self.tally = ShipTally::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fleet {
    pub ships: Vec<Ship>,
}

impl Fleet {
    pub fn new(ships: Vec<Ship>) -> Fleet {
        Fleet { ships }
    }

    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.ships.iter().position(|ship| ship.name == name)
    }

    pub fn any_alive(&self) -> bool {
        self.ships.iter().any(|ship| !ship.is_dead)
    }

    pub fn living(&self) -> impl Iterator<Item = usize> + '_ {
        self.ships
            .iter()
            .enumerate()
            .filter(|(_, ship)| !ship.is_dead)
            .map(|(index, _)| index)
    }

    pub fn summon_index(&self) -> Option<usize> {
        self.ships.iter().position(|ship| ship.is_summon)
    }

    /// Rebuild the slot→ship map from living ships. A living summon with no
    /// slot yet is placed at the lowest vacant slot as a side effect.
    pub fn position_map(&mut self) -> [Option<usize>; GRID_SLOTS] {
        let mut map = [None; GRID_SLOTS];
        let mut pending_summon = None;
        for (index, ship) in self.ships.iter().enumerate() {
            if ship.is_dead {
                continue;
            }
            if ship.is_summon && ship.position == 0 {
                pending_summon = Some(index);
            } else if (1..=GRID_SLOTS as u8).contains(&ship.position) {
                map[ship.position as usize - 1] = Some(index);
            }
        }
        if let Some(index) = pending_summon {
            if let Some(slot) = map.iter().position(Option::is_none) {
                self.ships[index].position = slot as u8 + 1;
                map[slot] = Some(index);
            }
        }
        map
    }

    /// Living ships in firing order (slots 1→9).
    pub fn firing_order(&mut self) -> Vec<usize> {
        let map = self.position_map();
        map.into_iter().flatten().collect()
    }

    pub fn reset_for_trial(&mut self) {
        for ship in &mut self.ships {
            ship.reset_for_trial();
        }
    }
}

/// Boss-side delayed damage, queued by a special ability and credited to the
/// queuing ship when it triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct Curse {
    pub source: String,
    pub damage: f64,
    pub dormant_turns: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Poison {
    pub active: bool,
    pub rate_per_turn: f64,
    pub turns_left: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BossTally {
    pub damage: f64,
    pub times_locked: u32,
    pub times_hit: u32,
    pub times_countered: u32,
    pub special_kills: u32,
}

/// Boss starting meter. The boss opens every trial halfway to its special.
pub const BOSS_INITIAL_METER: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    pub dodge: f64,
    pub block: f64,
    pub hit: f64,
    pub penetration: f64,

    // Per-trial mutable state.
    pub meter: f64,
    pub is_locked: bool,
    pub locked_turns: u32,
    pub can_block: bool,
    /// Turns left on the special-disabling debuff; while > 0 the boss's
    /// meter cannot trigger its special.
    pub special_disabled_turns: u32,
    pub special_enabled: bool,
    pub poison: Poison,
    pub curses: Vec<Curse>,
    pub tally: BossTally,
}

impl Boss {
    pub fn new(dodge: f64, block: f64, hit: f64, penetration: f64) -> Boss {
        Boss {
            dodge,
            block,
            hit,
            penetration,
            meter: BOSS_INITIAL_METER,
            is_locked: false,
            locked_turns: 0,
            can_block: true,
            special_disabled_turns: 0,
            special_enabled: true,
            poison: Poison::default(),
            curses: Vec::new(),
            tally: BossTally::default(),
        }
    }

    pub fn drain_meter(&mut self, amount: f64) {
        self.meter = (self.meter - amount).max(0.0);
    }

    pub fn reset_for_trial(&mut self) {
        self.meter = BOSS_INITIAL_METER;
        self.is_locked = false;
        self.locked_turns = 0;
        self.can_block = true;
        self.special_disabled_turns = 0;
        self.special_enabled = true;
        self.poison = Poison::default();
        self.curses.clear();
        self.tally = BossTally::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ship(name: &str, position: u8) -> Ship {
        Ship::new(
            name,
            ShipClass::Ranger,
            position,
            BaseStats::default(),
            Lieutenant::NoOp,
        )
    }

    #[test]
    fn position_map_skips_dead_ships() {
        let mut fleet = Fleet::new(vec![test_ship("a", 1), test_ship("b", 2), test_ship("c", 5)]);
        fleet.ships[1].is_dead = true;
        let map = fleet.position_map();
        assert_eq!(map[0], Some(0));
        assert_eq!(map[1], None);
        assert_eq!(map[4], Some(2));
    }

    #[test]
    fn pending_summon_takes_lowest_vacant_slot() {
        let mut fleet = Fleet::new(vec![test_ship("a", 1), test_ship("b", 3)]);
        let mut summon = test_ship("duomilian", 0);
        summon.is_summon = true;
        summon.home_position = 0;
        fleet.ships.push(summon);

        let map = fleet.position_map();
        assert_eq!(map[1], Some(2));
        assert_eq!(fleet.ships[2].position, 2);
    }

    #[test]
    fn meter_clamps_at_zero() {
        let mut ship = test_ship("a", 1);
        ship.meter = 10.0;
        ship.gain_meter(-50.0);
        assert_eq!(ship.meter, 0.0);
    }

    #[test]
    fn reset_revives_ships_and_kills_summon() {
        let mut ship = test_ship("a", 4);
        ship.is_dead = true;
        ship.meter = 75.0;
        ship.tally.shots = 12;
        ship.reset_for_trial();
        assert!(!ship.is_dead);
        assert_eq!(ship.meter, 0.0);
        assert_eq!(ship.tally.shots, 0);

        let mut summon = test_ship("duomilian", 0);
        summon.is_summon = true;
        summon.is_dead = false;
        summon.reset_for_trial();
        assert!(summon.is_dead);
    }

    #[test]
    fn invisibility_expires_through_tick() {
        let mut invisibility = Invisibility::default();
        invisibility.grant(1, "cabal");
        invisibility.tick();
        assert!(invisibility.active);
        invisibility.tick();
        assert!(!invisibility.active);
        assert!(invisibility.source.is_empty());
    }
}
