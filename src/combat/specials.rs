//! Meter-full ability catalog: the unique effect each ship fires alongside a
//! special attack.
//!
//! Ship names resolve to a closed enum once at configuration load; unknown
//! names become [SpecialAbility::NoOp] so unmodelled ships still deal plain
//! special damage. Tiered abilities (dor, sky mightlis) hold their tier value
//! explicitly instead of accumulating through dispatch order.

use crate::combat::fleet::{Boss, Curse, Fleet, ShipClass, FURY_ARMED_TURNS};
use crate::combat::rng::Dice;
use crate::combat::stats::Stat;

/// Ships that can never be turned invisible: each is itself a cloaking
/// caster, and the game refuses to stack a veil on them.
const NEVER_INVISIBLE: [&str; 3] = ["akhenaton", "izolda", "raksha"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialAbility {
    FrostJr,
    Cabal,
    DarkCarter,
    Carter,
    Raizer,
    Opal,
    Akhenaton,
    Cryptor,
    Hunter,
    Quasimodo,
    Darrien,
    DarkDarrien,
    Lazarus,
    DarkLazarus,
    Paccar,
    Roxy,
    Kit,
    Warden,
    Izolda,
    Kerom,
    Celeste,
    DarkCeleste,
    Gambit,
    Alfred,
    Ursa,
    /// Fleet hit-rate/crit surge; the tier carries its magnitude.
    Dor(f64),
    Anatoli,
    StNick,
    Louise,
    Caroline,
    /// Pre-attack boss meter drain; the tier carries the drained amount.
    SkyMightlis(f64),
    Starlord,
    Velarath,
    /// Unmodelled ship: the special attack deals damage and nothing more.
    NoOp,
}

impl SpecialAbility {
    pub fn resolve(ship_name: &str) -> SpecialAbility {
        match ship_name.trim().to_ascii_lowercase().as_str() {
            "frost jr" => SpecialAbility::FrostJr,
            "cabal" => SpecialAbility::Cabal,
            "dark carter" => SpecialAbility::DarkCarter,
            "carter" => SpecialAbility::Carter,
            "raizer" => SpecialAbility::Raizer,
            "opal" => SpecialAbility::Opal,
            "akhenaton" => SpecialAbility::Akhenaton,
            "cryptor" => SpecialAbility::Cryptor,
            "hunter" => SpecialAbility::Hunter,
            "quasimodo" => SpecialAbility::Quasimodo,
            "darrien" => SpecialAbility::Darrien,
            "dark darrien" => SpecialAbility::DarkDarrien,
            "lazarus" => SpecialAbility::Lazarus,
            "dark lazarus" => SpecialAbility::DarkLazarus,
            "paccar" => SpecialAbility::Paccar,
            "roxy" => SpecialAbility::Roxy,
            "kit" => SpecialAbility::Kit,
            "warden" => SpecialAbility::Warden,
            "izolda" => SpecialAbility::Izolda,
            "kerom" | "dark kerom" => SpecialAbility::Kerom,
            "celeste" => SpecialAbility::Celeste,
            "dark celeste" => SpecialAbility::DarkCeleste,
            "gambit" => SpecialAbility::Gambit,
            "alfred" => SpecialAbility::Alfred,
            "ursa" => SpecialAbility::Ursa,
            "dor" => SpecialAbility::Dor(50.0),
            "dor+7" => SpecialAbility::Dor(65.0),
            "dor+10" => SpecialAbility::Dor(80.0),
            "anatoli" => SpecialAbility::Anatoli,
            "st. nick" => SpecialAbility::StNick,
            "louise" => SpecialAbility::Louise,
            "caroline" => SpecialAbility::Caroline,
            "sky mightlis" => SpecialAbility::SkyMightlis(40.0),
            "sky mightlis+5" => SpecialAbility::SkyMightlis(45.0),
            "sky mightlis+7" => SpecialAbility::SkyMightlis(50.0),
            "sky mightlis+12" => SpecialAbility::SkyMightlis(60.0),
            "sky mightlis+15" => SpecialAbility::SkyMightlis(70.0),
            "starlord" => SpecialAbility::Starlord,
            "velarath" => SpecialAbility::Velarath,
            _ => SpecialAbility::NoOp,
        }
    }

    /// Boss meter drained into the attacker before damage is computed.
    pub fn pre_attack_drain(self) -> f64 {
        match self {
            SpecialAbility::SkyMightlis(amount) => amount,
            SpecialAbility::Starlord => 20.0,
            _ => 0.0,
        }
    }

    /// Lock duration when the lock roll lands.
    pub fn lock_turns(self) -> u32 {
        match self {
            SpecialAbility::Velarath => 2,
            _ => 1,
        }
    }
}

fn add_temp_to_all(
    fleet: &mut Fleet,
    stat: Stat,
    amount: f64,
    turns: u32,
    class: Option<ShipClass>,
) {
    for ship in &mut fleet.ships {
        if ship.is_dead {
            continue;
        }
        if class.map_or(true, |class| ship.class == class) {
            ship.ability_bonus.get_mut(stat).set_temporary(amount, turns);
        }
    }
}

fn add_temp_to_random(
    fleet: &mut Fleet,
    dice: &mut dyn Dice,
    stat: Stat,
    amount: f64,
    turns: u32,
    recipients: usize,
) {
    let mut choices: Vec<usize> = fleet.living().collect();
    let rolls = recipients.min(choices.len());
    for _ in 0..rolls {
        let chosen = choices.swap_remove(dice.pick(choices.len()));
        fleet.ships[chosen]
            .ability_bonus
            .get_mut(stat)
            .set_temporary(amount, turns);
    }
}

/// Grant a temporary bonus to the next `recipients` ships in firing order,
/// never to the casting ship itself.
fn add_temp_to_next(
    fleet: &mut Fleet,
    stat: Stat,
    amount: f64,
    turns: u32,
    recipients: usize,
    origin: &str,
) {
    let order = fleet.firing_order();
    if order.len() <= 1 {
        return;
    }
    let chosen: Vec<usize> = order
        .into_iter()
        .filter(|&index| fleet.ships[index].name != origin)
        .take(recipients)
        .collect();
    for index in chosen {
        fleet.ships[index]
            .ability_bonus
            .get_mut(stat)
            .set_temporary(amount, turns);
    }
}

/// Veil the next `recipients` ships in firing order. Cloaking casters can
/// never be veiled, and the origin never veils itself here.
fn add_invisibility(fleet: &mut Fleet, turns: u32, recipients: usize, origin: &str) {
    let order = fleet.firing_order();
    if order.len() <= 1 {
        return;
    }
    let eligible: Vec<usize> = order
        .into_iter()
        .filter(|&index| {
            let name = fleet.ships[index].name.as_str();
            name != origin && !NEVER_INVISIBLE.contains(&name)
        })
        .take(recipients)
        .collect();
    for index in eligible {
        fleet.ships[index].invisibility.grant(turns, origin);
    }
}

/// Deathproof the next `recipients` ships in firing order. An empty origin
/// means the caster shields itself too.
fn add_deathproof(fleet: &mut Fleet, turns: u32, recipients: usize, origin: &str) {
    let order = fleet.firing_order();
    if order.len() <= 1 {
        return;
    }
    let chosen: Vec<usize> = order
        .into_iter()
        .filter(|&index| fleet.ships[index].name != origin)
        .take(recipients)
        .collect();
    for index in chosen {
        fleet.ships[index].deathproof.grant(turns);
    }
}

fn gain_meter_fleet(fleet: &mut Fleet, amount: f64) {
    for ship in &mut fleet.ships {
        if !ship.is_dead {
            ship.gain_meter(amount);
        }
    }
}

/// Run the caster's meter-full effect. The caster's meter rests at its
/// configured reset value before the effect body, so effects that pin the
/// meter elsewhere (louise) win.
pub fn apply(fleet: &mut Fleet, boss: &mut Boss, caster: usize, force_up: f64, dice: &mut dyn Dice) {
    fleet.ships[caster].meter = fleet.ships[caster].base.special_reset;
    let ability = fleet.ships[caster].special;
    let caster_name = fleet.ships[caster].name.clone();

    match ability {
        SpecialAbility::FrostJr => {
            let choices: Vec<usize> = fleet.living().collect();
            if !choices.is_empty() {
                let chosen = choices[dice.pick(choices.len())];
                fleet.ships[chosen].gain_meter(30.0);
            }
        }
        SpecialAbility::Cabal => {
            // Takes effect after firing, so it outlasts a one-turn veil.
            fleet.ships[caster].invisibility.grant(2, &caster_name);
            add_temp_to_random(fleet, dice, Stat::Dodge, 20.0, 1, 2);
        }
        SpecialAbility::DarkCarter => gain_meter_fleet(fleet, 35.0),
        SpecialAbility::Carter => gain_meter_fleet(fleet, 50.0),
        SpecialAbility::Raizer => gain_meter_fleet(fleet, 75.0),
        SpecialAbility::Opal => add_temp_to_all(fleet, Stat::Dodge, 10.0, 1, None),
        SpecialAbility::Akhenaton => {
            if dice.percent() < 10.0 {
                // The boss raises a 100k shield, undoing that much damage.
                boss.tally.damage -= 100_000.0;
            }
            add_invisibility(fleet, 1, 5, &caster_name);
        }
        SpecialAbility::Cryptor => {
            fleet.ships[caster].deathproof.grant(5);
            add_deathproof(fleet, 5, 1, &caster_name);
        }
        SpecialAbility::Hunter => add_temp_to_random(fleet, dice, Stat::HitRate, 20.0, 2, 2),
        SpecialAbility::Quasimodo => {
            // The companion answers the call once per battle.
            if let Some(summon) = fleet.summon_index() {
                if !fleet.ships[summon].summon_spent {
                    fleet.ships[summon].summon_spent = true;
                    fleet.ships[summon].is_dead = false;
                    fleet.ships[summon].meter = 0.0;
                    fleet.ships[summon].position = 0; // placed at next map rebuild
                    fleet.ships[summon].summon_turns_left = 1;
                }
            }
        }
        SpecialAbility::Darrien => {
            add_temp_to_random(fleet, dice, Stat::HitRate, 100.0, 1, 3);
            add_temp_to_random(fleet, dice, Stat::Block, 100.0, 1, 3);
        }
        SpecialAbility::DarkDarrien => {
            add_temp_to_random(fleet, dice, Stat::HitRate, 60.0, 1, 3);
            add_temp_to_random(fleet, dice, Stat::Block, 60.0, 1, 3);
        }
        SpecialAbility::Lazarus => add_temp_to_all(fleet, Stat::SpecialAttack, 0.30, 1, None),
        SpecialAbility::DarkLazarus => add_temp_to_all(fleet, Stat::SpecialAttack, 0.25, 1, None),
        SpecialAbility::Paccar => add_temp_to_all(fleet, Stat::SpecialAttack, 0.3, 1, None),
        SpecialAbility::Roxy => {
            add_temp_to_all(fleet, Stat::CritChance, 25.0, 1, None);
            add_temp_to_all(fleet, Stat::HitRate, 25.0, 1, None);
        }
        SpecialAbility::Kit => {
            fleet.ships[caster]
                .ability_bonus
                .get_mut(Stat::Block)
                .set_temporary(30.0, 2);
        }
        SpecialAbility::Warden => add_temp_to_all(fleet, Stat::Block, 30.0, 1, None),
        SpecialAbility::Izolda => add_invisibility(fleet, 1, 1, &caster_name),
        SpecialAbility::Kerom => add_temp_to_all(fleet, Stat::HitRate, 20.0, 1, None),
        SpecialAbility::Celeste => {
            add_temp_to_all(fleet, Stat::HitRate, 100.0, 1, None);
            add_temp_to_all(fleet, Stat::CritChance, 100.0, 1, None);
        }
        SpecialAbility::DarkCeleste => {
            add_temp_to_all(fleet, Stat::HitRate, 50.0, 1, None);
            add_temp_to_all(fleet, Stat::CritChance, 50.0, 1, None);
        }
        SpecialAbility::Gambit => add_temp_to_all(fleet, Stat::Attack, 0.2, 2, None),
        SpecialAbility::Alfred => {
            // The curse snapshot uses attributes at cast time, not at trigger.
            let ship = &fleet.ships[caster];
            let damage = 4.0
                * (1.0 + force_up / 100.0)
                * (ship.effective(Stat::Attack) + ship.effective(Stat::SpecialAttack))
                * (1.0
                    + ship.effective(Stat::DamageUp) / 100.0
                    + ship.effective(Stat::SpecialDamageUp) / 100.0);
            fleet.ships[caster].invisibility.grant(1, &caster_name);
            boss.curses.push(Curse {
                source: caster_name.clone(),
                damage,
                dormant_turns: 1,
            });
        }
        SpecialAbility::Ursa => {
            fleet.ships[caster]
                .ability_bonus
                .get_mut(Stat::Block)
                .set_temporary(80.0, 4);
            for ship in &mut fleet.ships {
                if !ship.is_dead {
                    ship.fury.linked = true;
                    ship.fury.turns_left = 99;
                    ship.fury.source = caster_name.clone();
                }
            }
        }
        SpecialAbility::Dor(amount) => {
            add_temp_to_all(fleet, Stat::HitRate, amount, 1, None);
            add_temp_to_all(fleet, Stat::CritChance, amount, 1, None);
        }
        SpecialAbility::Anatoli => add_temp_to_random(fleet, dice, Stat::CritChance, 100.0, 1, 3),
        SpecialAbility::StNick => {
            fleet.ships[caster]
                .ability_bonus
                .get_mut(Stat::CritChance)
                .set_temporary(100.0, 1);
        }
        SpecialAbility::Louise => {
            add_deathproof(fleet, 1, 9, "");
            gain_meter_fleet(fleet, 25.0);
            fleet.ships[caster].meter = 50.0;
        }
        SpecialAbility::Caroline => {
            fleet.ships[caster]
                .ability_bonus
                .get_mut(Stat::Dodge)
                .set_temporary(80.0, 1);
            add_temp_to_next(fleet, Stat::Dodge, 80.0, 1, 1, &caster_name);
        }
        // Drain variants act before the attack; nothing further here.
        SpecialAbility::SkyMightlis(_)
        | SpecialAbility::Starlord
        | SpecialAbility::Velarath
        | SpecialAbility::NoOp => {}
    }
}

/// Arm the fury multiplier on the source of every link pointing at the dead
/// ship. Called from the death path.
pub fn arm_fury_link(fleet: &mut Fleet, dead: usize, multiplier: f64) {
    if !fleet.ships[dead].fury.linked {
        return;
    }
    let source = fleet.ships[dead].fury.source.clone();
    if let Some(index) = fleet.by_name(&source) {
        fleet.ships[index].fury.multiplier = multiplier;
        fleet.ships[index].fury.turns_left = FURY_ARMED_TURNS;
    }
}
