//! Lieutenant catalog: named passive/active abilities bound to one ship.
//!
//! Names are resolved to a closed enum once at configuration load; an
//! unrecognized name becomes [Lieutenant::NoOp] so new game content degrades
//! to "no effect" instead of an error. Tiered lieutenants ("+N" variants) are
//! modelled as the base effect plus a tier delta — the stacking is explicit,
//! not a dispatch accident.

use crate::combat::fleet::{Fleet, ShipClass};
use crate::combat::rng::Dice;
use crate::combat::stats::Stat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lieutenant {
    Elsa,
    Elsa4,
    Flynn,
    Flynn3,
    Dingo,
    Dingo4,
    Violette,
    Violette4,
    Pelebot,
    Simon,
    Trickster,
    EDudo,
    EDudo4,
    Jackie,
    Jackie1,
    Scarlet,
    Khala,
    Khala4,
    Volkof,
    Volkof3,
    Mileena4,
    Mileena5,
    Mileena6,
    Duomilian,
    Kilian,
    Kit,
    Kit4,
    Acctan,
    ELyon,
    BQueen,
    DGonzalo,
    Sophietia,
    Raikkonen,
    Andre,
    Dudo,
    /// Unassigned or unrecognized: contributes nothing.
    NoOp,
}

/// Who a passive bonus lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Carrier,
    Fleet,
    Class(ShipClass),
}

/// One permanent bonus applied at trial start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassiveGrant {
    pub scope: Scope,
    pub stat: Stat,
    pub amount: f64,
}

const fn grant(scope: Scope, stat: Stat, amount: f64) -> PassiveGrant {
    PassiveGrant {
        scope,
        stat,
        amount,
    }
}

const ELSA_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::SpecialAttack, 0.02)];
const FLYNN_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Ranger), Stat::Penetration, 3.0)];
const DINGO_GRANTS: &[PassiveGrant] = &[grant(Scope::Carrier, Stat::Dodge, 5.0)];
const DINGO4_GRANTS: &[PassiveGrant] = &[
    grant(Scope::Carrier, Stat::SpecialAttack, 0.3),
    grant(Scope::Carrier, Stat::Dodge, 5.0),
];
const VIOLETTE_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::HitRate, 3.0)];
const PELEBOT_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Attack, 0.01)];
const SIMON_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Striker), Stat::CritChance, 0.5)];
const TRICKSTER_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Destroyer), Stat::CritChance, 3.0)];
const EDUDO_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Destroyer), Stat::HitRate, 3.0)];
const JACKIE_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Penetration, 1.0)];
const SCARLET_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Destroyer), Stat::CritChance, 0.5)];
const KHALA_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Penetration, 2.0)];
const VOLKOF_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Striker), Stat::CritChance, 1.0)];
const MILEENA4_GRANTS: &[PassiveGrant] = &[grant(Scope::Carrier, Stat::Attack, 0.15)];
const MILEENA56_GRANTS: &[PassiveGrant] = &[
    grant(Scope::Carrier, Stat::SpecialAttack, 0.15),
    grant(Scope::Carrier, Stat::Attack, 0.15),
];
const DUOMILIAN_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Dodge, 0.5)];
const KILIAN_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Dodge, 1.0)];
const KIT_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Block, 3.0)];
const ACCTAN_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Block, 2.0)];
const ELYON_GRANTS: &[PassiveGrant] =
    &[grant(Scope::Class(ShipClass::Protector), Stat::Block, 1.0)];
const BQUEEN_GRANTS: &[PassiveGrant] = &[grant(Scope::Fleet, Stat::Block, 0.5)];

impl Lieutenant {
    pub fn from_name(name: &str) -> Lieutenant {
        match name.trim().to_ascii_lowercase().as_str() {
            "elsa" => Lieutenant::Elsa,
            "elsa+4" => Lieutenant::Elsa4,
            "flynn" => Lieutenant::Flynn,
            "flynn+3" => Lieutenant::Flynn3,
            "dingo" => Lieutenant::Dingo,
            "dingo+4" => Lieutenant::Dingo4,
            "violette" => Lieutenant::Violette,
            "violette+4" => Lieutenant::Violette4,
            "pelebot" => Lieutenant::Pelebot,
            "simon" => Lieutenant::Simon,
            "trickster" => Lieutenant::Trickster,
            "e-dudo" => Lieutenant::EDudo,
            "e-dudo+4" => Lieutenant::EDudo4,
            "jackie" => Lieutenant::Jackie,
            "jackie+1" => Lieutenant::Jackie1,
            "scarlet" => Lieutenant::Scarlet,
            "khala" => Lieutenant::Khala,
            "khala+4" => Lieutenant::Khala4,
            "volkof" => Lieutenant::Volkof,
            "volkof+3" => Lieutenant::Volkof3,
            "mileena+4" => Lieutenant::Mileena4,
            "mileena+5" => Lieutenant::Mileena5,
            "mileena+6" => Lieutenant::Mileena6,
            "duomilian" => Lieutenant::Duomilian,
            "kilian" => Lieutenant::Kilian,
            "kit" => Lieutenant::Kit,
            "kit+4" => Lieutenant::Kit4,
            "acctan" => Lieutenant::Acctan,
            "e-lyon" => Lieutenant::ELyon,
            "b-queen" => Lieutenant::BQueen,
            "d-gonzalo" => Lieutenant::DGonzalo,
            "sophietia" => Lieutenant::Sophietia,
            "raikkonen" => Lieutenant::Raikkonen,
            "andre" => Lieutenant::Andre,
            "dudo" => Lieutenant::Dudo,
            _ => Lieutenant::NoOp,
        }
    }

    /// Permanent bonuses applied once per trial, in ship iteration order.
    /// Tiered variants list the base grant alongside the tier delta.
    pub fn passive_grants(self) -> &'static [PassiveGrant] {
        match self {
            Lieutenant::Elsa | Lieutenant::Elsa4 => ELSA_GRANTS,
            Lieutenant::Flynn | Lieutenant::Flynn3 => FLYNN_GRANTS,
            Lieutenant::Dingo => DINGO_GRANTS,
            Lieutenant::Dingo4 => DINGO4_GRANTS,
            Lieutenant::Violette | Lieutenant::Violette4 => VIOLETTE_GRANTS,
            Lieutenant::Pelebot => PELEBOT_GRANTS,
            Lieutenant::Simon => SIMON_GRANTS,
            Lieutenant::Trickster => TRICKSTER_GRANTS,
            Lieutenant::EDudo | Lieutenant::EDudo4 => EDUDO_GRANTS,
            Lieutenant::Jackie | Lieutenant::Jackie1 => JACKIE_GRANTS,
            Lieutenant::Scarlet => SCARLET_GRANTS,
            Lieutenant::Khala | Lieutenant::Khala4 => KHALA_GRANTS,
            Lieutenant::Volkof | Lieutenant::Volkof3 => VOLKOF_GRANTS,
            Lieutenant::Mileena4 => MILEENA4_GRANTS,
            Lieutenant::Mileena5 | Lieutenant::Mileena6 => MILEENA56_GRANTS,
            Lieutenant::Duomilian => DUOMILIAN_GRANTS,
            Lieutenant::Kilian => KILIAN_GRANTS,
            Lieutenant::Kit | Lieutenant::Kit4 => KIT_GRANTS,
            Lieutenant::Acctan => ACCTAN_GRANTS,
            Lieutenant::ELyon => ELYON_GRANTS,
            Lieutenant::BQueen => BQUEEN_GRANTS,
            _ => &[],
        }
    }
}

fn in_scope(fleet: &Fleet, target: usize, carrier: usize, scope: Scope) -> bool {
    match scope {
        Scope::Carrier => target == carrier,
        Scope::Fleet => true,
        Scope::Class(class) => fleet.ships[target].class == class,
    }
}

/// Activate every ship's passive lieutenant, in ship iteration order.
/// Called once per trial, after reset.
pub fn run_passives(fleet: &mut Fleet) {
    for carrier in 0..fleet.ships.len() {
        if fleet.ships[carrier].is_dead || !fleet.ships[carrier].lieutenant_armed {
            continue;
        }
        let grants = fleet.ships[carrier].lieutenant.passive_grants();
        if grants.is_empty() {
            continue;
        }
        for &PassiveGrant {
            scope,
            stat,
            amount,
        } in grants
        {
            for target in 0..fleet.ships.len() {
                if in_scope(fleet, target, carrier, scope) {
                    fleet.ships[target].lieutenant_bonus.get_mut(stat).permanent += amount;
                }
            }
        }
        fleet.ships[carrier].lieutenant_armed = false;
    }
}

fn living_of_class(fleet: &Fleet, class: ShipClass) -> Vec<usize> {
    fleet
        .living()
        .filter(|&index| fleet.ships[index].class == class)
        .collect()
}

/// 50% chance, gated on at least two living ships of `class`: +20% ATK to
/// every living ship of that class for one attack. The activator's ATK turn
/// counter is set too, so the buff expires on its schedule even when the
/// activator is outside the class.
fn rally_class_attack(fleet: &mut Fleet, carrier: usize, class: ShipClass, dice: &mut dyn Dice) {
    let members = living_of_class(fleet, class);
    if members.len() < 2 || dice.unit() >= 0.5 {
        return;
    }
    for index in members {
        fleet.ships[index]
            .lieutenant_bonus
            .get_mut(Stat::Attack)
            .set_temporary(0.2, 1);
    }
    fleet.ships[carrier]
        .lieutenant_bonus
        .get_mut(Stat::Attack)
        .temporary_turns_left = 1;
}

/// One-shot 33% roll, gated on the carrier's meter: permanent +amount to a
/// class. Consumes the carrier's activation flag on success only.
fn one_shot_class_grant(
    fleet: &mut Fleet,
    carrier: usize,
    class: ShipClass,
    stat: Stat,
    amount: f64,
    meter_at_most_50: bool,
    dice: &mut dyn Dice,
) {
    if !fleet.ships[carrier].lieutenant_armed {
        return;
    }
    let meter = fleet.ships[carrier].meter;
    let gate = if meter_at_most_50 {
        meter <= 50.0
    } else {
        meter > 50.0
    };
    if !gate || dice.unit() >= 0.33 {
        return;
    }
    for index in 0..fleet.ships.len() {
        if fleet.ships[index].class == class {
            fleet.ships[index].lieutenant_bonus.get_mut(stat).permanent += amount;
        }
    }
    fleet.ships[carrier].lieutenant_armed = false;
}

/// Turn-based lieutenant check, invoked immediately before the carrier's own
/// attack resolves. Failed rolls and unmet gates are silent no-ops.
pub fn run_active(fleet: &mut Fleet, carrier: usize, dice: &mut dyn Dice) {
    if fleet.ships[carrier].is_dead {
        return;
    }
    match fleet.ships[carrier].lieutenant {
        Lieutenant::Flynn3 => rally_class_attack(fleet, carrier, ShipClass::Ranger, dice),
        Lieutenant::EDudo4 => rally_class_attack(fleet, carrier, ShipClass::Destroyer, dice),
        Lieutenant::Elsa4 => {
            // 50% to veil every Ranger until its own next attack. The
            // activator keeps one extra turn so it is not revealed by the
            // expiry pass that immediately follows in its attack.
            if fleet.ships[carrier].meter > 50.0 || dice.unit() >= 0.5 {
                return;
            }
            for index in 0..fleet.ships.len() {
                if fleet.ships[index].class == ShipClass::Ranger {
                    fleet.ships[index].invisibility.grant(0, "elsa");
                }
            }
            fleet.ships[carrier].invisibility.turns_left = 1;
        }
        Lieutenant::DGonzalo => one_shot_class_grant(
            fleet,
            carrier,
            ShipClass::Ranger,
            Stat::Attack,
            0.05,
            true,
            dice,
        ),
        Lieutenant::Sophietia => one_shot_class_grant(
            fleet,
            carrier,
            ShipClass::Striker,
            Stat::Attack,
            0.05,
            true,
            dice,
        ),
        Lieutenant::Raikkonen => one_shot_class_grant(
            fleet,
            carrier,
            ShipClass::Protector,
            Stat::SpecialAttack,
            0.05,
            true,
            dice,
        ),
        // Gated on meter above 50: the in-game text says the opposite, but
        // observed behavior matches this direction.
        Lieutenant::Andre => one_shot_class_grant(
            fleet,
            carrier,
            ShipClass::Rover,
            Stat::CritChance,
            1.0,
            false,
            dice,
        ),
        Lieutenant::Dudo => one_shot_class_grant(
            fleet,
            carrier,
            ShipClass::Destroyer,
            Stat::Attack,
            0.05,
            true,
            dice,
        ),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::fleet::{BaseStats, Ship};

    struct AlwaysLow;
    impl Dice for AlwaysLow {
        fn unit(&mut self) -> f64 {
            0.0
        }
        fn pick(&mut self, _len: usize) -> usize {
            0
        }
    }

    struct AlwaysHigh;
    impl Dice for AlwaysHigh {
        fn unit(&mut self) -> f64 {
            0.999_999
        }
        fn pick(&mut self, len: usize) -> usize {
            len - 1
        }
    }

    fn ship(name: &str, class: ShipClass, position: u8, lieutenant: Lieutenant) -> Ship {
        Ship::new(name, class, position, BaseStats::default(), lieutenant)
    }

    #[test]
    fn unknown_name_resolves_to_noop() {
        assert_eq!(Lieutenant::from_name("future content"), Lieutenant::NoOp);
        assert_eq!(Lieutenant::from_name(""), Lieutenant::NoOp);
        assert!(Lieutenant::NoOp.passive_grants().is_empty());
    }

    #[test]
    fn tiered_passive_includes_base_effect() {
        // dingo+4 keeps the dodge grant of plain dingo plus its own delta.
        let base: Vec<_> = Lieutenant::Dingo.passive_grants().to_vec();
        let tiered = Lieutenant::Dingo4.passive_grants();
        for grant in &base {
            assert!(tiered.contains(grant), "tier lost base grant {grant:?}");
        }
        assert!(tiered.len() > base.len());
    }

    #[test]
    fn passive_fleet_grant_hits_every_ship_once() {
        let mut fleet = Fleet::new(vec![
            ship("a", ShipClass::Hero, 1, Lieutenant::Violette),
            ship("b", ShipClass::Ranger, 2, Lieutenant::NoOp),
        ]);
        run_passives(&mut fleet);
        run_passives(&mut fleet); // one-shot: second call adds nothing
        assert_eq!(fleet.ships[0].bonus(Stat::HitRate), 3.0);
        assert_eq!(fleet.ships[1].bonus(Stat::HitRate), 3.0);
    }

    #[test]
    fn class_filtered_passive_skips_other_classes() {
        let mut fleet = Fleet::new(vec![
            ship("a", ShipClass::Hero, 1, Lieutenant::Flynn),
            ship("b", ShipClass::Ranger, 2, Lieutenant::NoOp),
        ]);
        run_passives(&mut fleet);
        assert_eq!(fleet.ships[0].bonus(Stat::Penetration), 0.0);
        assert_eq!(fleet.ships[1].bonus(Stat::Penetration), 3.0);
    }

    #[test]
    fn rally_needs_two_living_class_members() {
        let mut fleet = Fleet::new(vec![
            ship("a", ShipClass::Ranger, 1, Lieutenant::Flynn3),
            ship("b", ShipClass::Ranger, 2, Lieutenant::NoOp),
        ]);
        fleet.ships[1].is_dead = true;
        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert_eq!(fleet.ships[0].bonus(Stat::Attack), 0.0);

        fleet.ships[1].is_dead = false;
        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert_eq!(fleet.ships[0].bonus(Stat::Attack), 0.2);
        assert_eq!(fleet.ships[1].bonus(Stat::Attack), 0.2);
    }

    #[test]
    fn one_shot_active_consumes_flag_only_on_success() {
        let mut fleet = Fleet::new(vec![
            ship("a", ShipClass::Hero, 1, Lieutenant::DGonzalo),
            ship("b", ShipClass::Ranger, 2, Lieutenant::NoOp),
        ]);
        run_active(&mut fleet, 0, &mut AlwaysHigh); // roll fails
        assert!(fleet.ships[0].lieutenant_armed);
        assert_eq!(fleet.ships[1].bonus(Stat::Attack), 0.0);

        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert!(!fleet.ships[0].lieutenant_armed);
        assert_eq!(fleet.ships[1].bonus(Stat::Attack), 0.05);

        // Consumed: cannot fire twice.
        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert_eq!(fleet.ships[1].bonus(Stat::Attack), 0.05);
    }

    #[test]
    fn andre_gates_on_meter_above_fifty() {
        let mut fleet = Fleet::new(vec![
            ship("a", ShipClass::Hero, 1, Lieutenant::Andre),
            ship("b", ShipClass::Rover, 2, Lieutenant::NoOp),
        ]);
        fleet.ships[0].meter = 25.0;
        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert_eq!(fleet.ships[1].bonus(Stat::CritChance), 0.0);

        fleet.ships[0].meter = 75.0;
        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert_eq!(fleet.ships[1].bonus(Stat::CritChance), 1.0);
    }

    #[test]
    fn elsa_tier_veils_rangers_until_their_turn() {
        let mut fleet = Fleet::new(vec![
            ship("a", ShipClass::Ranger, 1, Lieutenant::Elsa4),
            ship("b", ShipClass::Ranger, 2, Lieutenant::NoOp),
            ship("c", ShipClass::Hero, 3, Lieutenant::NoOp),
        ]);
        run_active(&mut fleet, 0, &mut AlwaysLow);
        assert!(fleet.ships[0].invisibility.active);
        assert_eq!(fleet.ships[0].invisibility.turns_left, 1);
        assert!(fleet.ships[1].invisibility.active);
        assert_eq!(fleet.ships[1].invisibility.turns_left, 0);
        assert!(!fleet.ships[2].invisibility.active);
    }
}
