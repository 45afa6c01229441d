//! Round scheduling and attack resolution.
//!
//! A round walks the grid slots 1→9; after every ship action the boss takes
//! an opportunity (dots tick, then lock check, then its own special or
//! regular attack). A trial ends when the fleet is wiped or cumulative boss
//! damage trips the runaway guard.

use crate::combat::fleet::{
    Boss, Fleet, ShipClass, FURY_MULTIPLIER, GRID_SLOTS, METER_FULL, METER_PER_HIT,
};
use crate::combat::lieutenants;
use crate::combat::rng::Dice;
use crate::combat::specials::{self, SpecialAbility};
use crate::combat::stats::Stat;

/// Runaway-interaction guard: a trial is force-ended once cumulative boss
/// damage passes this, so degenerate buff loops cannot spin forever.
pub const DAMAGE_CAP: f64 = 5e10;

/// A configured de-accumulate of exactly 100 is the "full drain" sentinel
/// and empties 300 points instead.
const FULL_DRAIN_SENTINEL: f64 = 100.0;
const FULL_DRAIN_AMOUNT: f64 = 300.0;

/// Meter granted by a successful block-and-counter.
const COUNTER_METER_GAIN: f64 = 50.0;

/// Boss regular attacks walk the columns center-first.
const TARGETING_ORDER: [usize; GRID_SLOTS] = [2, 5, 8, 1, 4, 7, 3, 6, 9];

/// Global simulation knobs shared by every trial.
#[derive(Debug, Clone, Copy)]
pub struct Knobs {
    /// Global force-up percentage applied to all outgoing ship damage.
    pub force_up: f64,
    /// Fraction of damage that survives a block (block reduces, never
    /// negates).
    pub block_retention: f64,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            force_up: 0.0,
            block_retention: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    FleetWiped,
    GuardTripped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BossStrike {
    /// Column-order single-target attack.
    Regular,
    /// Meter-full blast against the whole fleet.
    Special,
    /// Retaliation after blocking a ship's attack: guaranteed hit.
    Counter,
}

/// Drive one full round. Returns whether the trial should continue.
pub fn run_round(fleet: &mut Fleet, boss: &mut Boss, knobs: Knobs, dice: &mut dyn Dice) -> RoundOutcome {
    expire_summon(fleet);
    let order: Vec<usize> = fleet.position_map().into_iter().flatten().collect();
    if order.is_empty() {
        return RoundOutcome::FleetWiped;
    }
    for attacker in order {
        if fleet.ships[attacker].is_dead {
            continue;
        }
        lieutenants::run_active(fleet, attacker, dice);
        resolve_ship_attack(fleet, boss, attacker, knobs, dice);
        if !fleet.any_alive() {
            return RoundOutcome::FleetWiped;
        }
        boss_opportunity(fleet, boss, knobs, dice);
        if !fleet.any_alive() {
            return RoundOutcome::FleetWiped;
        }
        if boss.tally.damage >= DAMAGE_CAP {
            return RoundOutcome::GuardTripped;
        }
    }
    RoundOutcome::Continue
}

/// The summoned unit vanishes at the first round boundary after its turn.
fn expire_summon(fleet: &mut Fleet) {
    if let Some(index) = fleet.summon_index() {
        let summon = &mut fleet.ships[index];
        if !summon.is_dead && summon.position != 0 && summon.summon_turns_left < 1 {
            summon.tally.meter_at_death = Some(summon.meter);
            summon.is_dead = true;
            summon.position = 0;
        }
    }
}

fn resolve_ship_attack(
    fleet: &mut Fleet,
    boss: &mut Boss,
    attacker: usize,
    knobs: Knobs,
    dice: &mut dyn Dice,
) {
    if fleet.ships[attacker].is_dead {
        return;
    }
    fleet.ships[attacker].tally.shots += 1;
    fleet.ships[attacker].expire_turn_effects();

    // Snapshot the attacker's attributes for this shot; turn-based boosts may
    // differ by the next one.
    let (attack, special_attack, penetration, hit_chance, crit_chance, crit_damage, damage_up, special_damage_up) = {
        let ship = &fleet.ships[attacker];
        (
            ship.effective(Stat::Attack),
            ship.effective(Stat::SpecialAttack),
            ship.effective(Stat::Penetration),
            ship.effective(Stat::HitRate) - boss.dodge,
            ship.effective(Stat::CritChance),
            ship.base.crit_damage,
            ship.effective(Stat::DamageUp),
            ship.effective(Stat::SpecialDamageUp),
        )
    };

    if dice.percent() > hit_chance {
        fleet.ships[attacker].tally.misses += 1;
        return;
    }
    boss.tally.times_hit += 1;

    let block_rate = (boss.block - penetration) * if boss.can_block { 1.0 } else { 0.0 };
    let blocked = dice.percent() <= block_rate;
    if blocked {
        fleet.ships[attacker].tally.blocked += 1;
    }

    let is_special = fleet.ships[attacker].meter >= METER_FULL;
    if is_special {
        fleet.ships[attacker].tally.specials += 1;
        // Drain abilities transfer boss meter to the attacker before damage,
        // so the stolen charge feeds the overcharge term below.
        let drain = fleet.ships[attacker].special.pre_attack_drain();
        if drain > 0.0 {
            let drained = drain.min(boss.meter);
            boss.drain_meter(drained);
            fleet.ships[attacker].gain_meter(drained);
        }
    }

    let meter = fleet.ships[attacker].meter;
    let fury = fleet.ships[attacker].fury.multiplier;
    let special_damage = fleet.ships[attacker].base.special_damage;
    let special = if is_special { 1.0 } else { 0.0 };
    let mut damage = (attack + special * special_attack)
        * (1.0 + knobs.force_up / 100.0)
        * (1.0 + special * (special_damage / 100.0 - 1.0))
        * (1.0 + special * (meter - 100.0) / 100.0)
        * (1.0 + damage_up / 100.0)
        * (1.0 + special * special_damage_up / 100.0)
        * fury;
    if dice.percent() <= crit_chance {
        damage *= crit_damage / 100.0;
    }
    if blocked {
        damage *= knobs.block_retention;
    }
    let damage = damage.floor();
    boss.tally.damage += damage;
    fleet.ships[attacker].tally.damage_dealt += damage;

    if is_special {
        specials::apply(fleet, boss, attacker, knobs.force_up, dice);
        let (lock_rate, lock_turns, de_chance, de_amount, is_starlord, poison_percent) = {
            let ship = &fleet.ships[attacker];
            (
                ship.base.lock_rate,
                ship.special.lock_turns(),
                ship.base.de_accumulate_chance,
                ship.base.de_accumulate,
                ship.special == SpecialAbility::Starlord,
                ship.base.poison_percent,
            )
        };
        if dice.percent() <= lock_rate {
            boss.is_locked = true;
            boss.can_block = false;
            boss.locked_turns = lock_turns;
        }
        if dice.percent() <= de_chance {
            let amount = if de_amount == FULL_DRAIN_SENTINEL {
                FULL_DRAIN_AMOUNT
            } else {
                de_amount
            };
            boss.drain_meter(amount);
        } else if is_starlord {
            boss.meter = (boss.meter * 0.65).floor();
        }
        if poison_percent > 0.0 {
            boss.poison.active = true;
            boss.poison.rate_per_turn = poison_percent / 100.0
                * (1.0 + knobs.force_up / 100.0)
                * (attack + special_attack)
                * (1.0 + damage_up / 100.0 + special_damage_up / 100.0);
            boss.poison.turns_left = 2;
        }
    } else {
        fleet.ships[attacker].gain_meter(METER_PER_HIT);
        if blocked && fleet.ships[attacker].class != ShipClass::Destroyer && boss.can_block {
            try_to_kill(fleet, boss, attacker, BossStrike::Counter, knobs, dice);
        }
    }
}

/// One boss opportunity: dots tick, the lock is honored, then the boss fires.
fn boss_opportunity(fleet: &mut Fleet, boss: &mut Boss, knobs: Knobs, dice: &mut dyn Dice) {
    // Due curses trigger and credit their source ship.
    let mut index = 0;
    while index < boss.curses.len() {
        if boss.curses[index].dormant_turns == 0 {
            let curse = boss.curses.remove(index);
            boss.tally.damage += curse.damage;
            if let Some(source) = fleet.by_name(&curse.source) {
                fleet.ships[source].tally.damage_dealt += curse.damage;
            }
        } else {
            boss.curses[index].dormant_turns -= 1;
            index += 1;
        }
    }

    if boss.poison.active {
        boss.tally.damage += boss.poison.rate_per_turn;
        if boss.poison.turns_left <= 1 {
            boss.poison.active = false;
            boss.poison.rate_per_turn = 0.0;
        }
        boss.poison.turns_left = boss.poison.turns_left.saturating_sub(1);
    }

    if boss.special_disabled_turns < 1 {
        boss.special_enabled = true;
    } else {
        boss.special_disabled_turns -= 1;
    }

    if boss.is_locked {
        boss.tally.times_locked += 1;
        boss.locked_turns = boss.locked_turns.saturating_sub(1);
        if boss.locked_turns == 0 {
            boss.is_locked = false;
        }
        return;
    }
    boss.can_block = true;

    let map = fleet.position_map(); // also places a freshly summoned unit
    let targets = target_order(fleet, &map);
    if targets.is_empty() {
        return;
    }
    if boss.special_enabled && boss.meter >= METER_FULL {
        for index in 0..fleet.ships.len() {
            try_to_kill(fleet, boss, index, BossStrike::Special, knobs, dice);
        }
        boss.meter = 0.0;
    } else if let Some(target) = targets
        .into_iter()
        .find(|&target| !fleet.ships[target].invisibility.active)
    {
        try_to_kill(fleet, boss, target, BossStrike::Regular, knobs, dice);
    }
    // Everything alive is hidden: the boss skips this turn.
}

fn target_order(fleet: &Fleet, map: &[Option<usize>; GRID_SLOTS]) -> Vec<usize> {
    TARGETING_ORDER
        .iter()
        .filter_map(|&slot| map[slot - 1])
        .filter(|&index| !fleet.ships[index].is_dead)
        .collect()
}

/// Resolve one boss strike against `target`. Returns whether the target died.
fn try_to_kill(
    fleet: &mut Fleet,
    boss: &mut Boss,
    target: usize,
    strike: BossStrike,
    knobs: Knobs,
    dice: &mut dyn Dice,
) -> bool {
    if fleet.ships[target].is_dead {
        return true;
    }
    let mut killed = false;
    match strike {
        BossStrike::Counter => {
            // Guaranteed hit; invisibility and dodge are ignored.
            boss.meter += METER_PER_HIT;
            if !fleet.ships[target].deathproof.active {
                killed = true;
            } else {
                fleet.ships[target].deathproof.consume();
                grant_save_meter(fleet, target);
            }
        }
        BossStrike::Special | BossStrike::Regular => {
            if strike == BossStrike::Special {
                // The blast reveals every hidden ship before resolving.
                fleet.ships[target].invisibility.clear();
            }
            debug_assert!(
                !fleet.ships[target].invisibility.active,
                "regular strike targeted a hidden ship"
            );
            let dodge = fleet.ships[target].effective(Stat::Dodge);
            let evade_chance = 100.0 - (boss.hit - dodge);
            if dice.percent() >= evade_chance {
                if strike == BossStrike::Regular {
                    boss.meter += METER_PER_HIT;
                }
                if !fleet.ships[target].deathproof.active {
                    killed = true;
                } else {
                    fleet.ships[target].deathproof.consume();
                    grant_save_meter(fleet, target);
                    if strike == BossStrike::Regular {
                        attempt_block_counter(fleet, boss, target, knobs, dice);
                    }
                }
            }
        }
    }
    if killed {
        mark_dead(fleet, boss, target, strike == BossStrike::Special);
    }
    killed
}

/// A deathproof save still charges the survivor's meter — except alfred,
/// whose absorbed blows build nothing.
fn grant_save_meter(fleet: &mut Fleet, target: usize) {
    if fleet.ships[target].name != "alfred" {
        fleet.ships[target].gain_meter(METER_PER_HIT);
    }
}

/// After a deathproof save against a regular strike the ship may block and
/// retaliate at roughly 70% strength.
fn attempt_block_counter(
    fleet: &mut Fleet,
    boss: &mut Boss,
    target: usize,
    knobs: Knobs,
    dice: &mut dyn Dice,
) {
    let block_rate = fleet.ships[target].effective(Stat::Block) - boss.penetration;
    if dice.percent() > block_rate {
        return;
    }
    boss.tally.times_hit += 1;
    boss.tally.times_countered += 1;
    fleet.ships[target].gain_meter(COUNTER_METER_GAIN);
    let (attack, crit_chance, crit_damage, damage_up) = {
        let ship = &fleet.ships[target];
        (
            ship.effective(Stat::Attack),
            ship.effective(Stat::CritChance),
            ship.base.crit_damage,
            ship.effective(Stat::DamageUp),
        )
    };
    let mut damage = attack * (1.0 + knobs.force_up / 100.0) * (1.0 + damage_up / 100.0);
    // Counterattacks land at 65–75% of a full shot.
    damage *= 0.7 + (0.5 - dice.unit()) / 10.0;
    if dice.percent() <= crit_chance {
        damage *= crit_damage / 100.0;
    }
    let damage = damage.floor();
    fleet.ships[target].tally.damage_dealt += damage;
    boss.tally.damage += damage;
}

fn mark_dead(fleet: &mut Fleet, boss: &mut Boss, target: usize, via_boss_special: bool) {
    fleet.ships[target].is_dead = true;
    fleet.ships[target].tally.meter_at_death = Some(fleet.ships[target].meter);
    if via_boss_special {
        boss.tally.special_kills += 1;
    }
    specials::arm_fury_link(fleet, target, FURY_MULTIPLIER);
    if !fleet.any_alive() {
        return;
    }
    let dead_name = fleet.ships[target].name.clone();
    // A dead cloaker drops every veil it granted.
    for index in 0..fleet.ships.len() {
        if fleet.ships[index].invisibility.source == dead_name {
            fleet.ships[index].invisibility.clear();
        }
    }
    // Dormant curses die with their source.
    boss.curses.retain(|curse| curse.source != dead_name);
    if fleet.ships[target].is_summon {
        fleet.ships[target].summon_turns_left = 0;
        fleet.ships[target].position = 0;
    }
}
