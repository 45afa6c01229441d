//! Effective-stat computation: base attribute plus the permanent/temporary
//! bonus layers granted by lieutenants and meter abilities.
//!
//! Additive stats are stored in percentage points (a block of 30.0 means 30%).
//! The two multiplicative stats carry their bonuses as fractions (0.2 = +20%),
//! composed as `base * (1 + bonus)`.

/// Every attribute the engine can query. A closed set: an unknown stat is
/// unrepresentable, so lookups cannot fail at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Attack,
    SpecialAttack,
    Dodge,
    Block,
    HitRate,
    Penetration,
    CritChance,
    DamageUp,
    SpecialDamageUp,
}

impl Stat {
    pub const ALL: [Stat; 9] = [
        Stat::Attack,
        Stat::SpecialAttack,
        Stat::Dodge,
        Stat::Block,
        Stat::HitRate,
        Stat::Penetration,
        Stat::CritChance,
        Stat::DamageUp,
        Stat::SpecialDamageUp,
    ];

    /// Attack and special-attack scale the base value; everything else adds
    /// percentage points onto it.
    pub const fn is_multiplicative(self) -> bool {
        matches!(self, Stat::Attack | Stat::SpecialAttack)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Stat::Attack => 0,
            Stat::SpecialAttack => 1,
            Stat::Dodge => 2,
            Stat::Block => 3,
            Stat::HitRate => 4,
            Stat::Penetration => 5,
            Stat::CritChance => 6,
            Stat::DamageUp => 7,
            Stat::SpecialDamageUp => 8,
        }
    }
}

/// One stat's bonus layer: a permanent part that lasts the whole trial and a
/// temporary part that covers the ship's next `temporary_turns_left` attacks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Modifier {
    pub permanent: f64,
    pub temporary: f64,
    pub temporary_turns_left: u32,
}

impl Modifier {
    pub fn total(&self) -> f64 {
        self.permanent + self.temporary
    }

    /// Expire-then-decrement, run immediately before the owner attacks.
    /// A bonus granted with `turns = 1` therefore covers exactly one attack:
    /// the grant leaves `turns_left = 1`, the next attack sees the value and
    /// drops the counter to 0, and the attack after that zeroes the value
    /// before any stat is read.
    pub fn tick(&mut self) {
        if self.temporary_turns_left == 0 {
            self.temporary = 0.0;
        }
        self.temporary_turns_left = self.temporary_turns_left.saturating_sub(1);
    }

    pub fn set_temporary(&mut self, amount: f64, turns: u32) {
        self.temporary = amount;
        self.temporary_turns_left = turns;
    }
}

/// Per-stat modifier set. Each ship carries two: one written by lieutenants,
/// one written by meter abilities. The layers never overwrite each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusBundle {
    mods: [Modifier; Stat::ALL.len()],
}

impl BonusBundle {
    pub fn get(&self, stat: Stat) -> &Modifier {
        &self.mods[stat.index()]
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut Modifier {
        &mut self.mods[stat.index()]
    }

    pub fn total(&self, stat: Stat) -> f64 {
        self.mods[stat.index()].total()
    }

    pub fn tick_all(&mut self) {
        for modifier in &mut self.mods {
            modifier.tick();
        }
    }

    pub fn clear(&mut self) {
        self.mods = Default::default();
    }
}

/// Compose a base attribute with the summed bonus from both layers.
pub fn effective(stat: Stat, base: f64, bonus: f64) -> f64 {
    if stat.is_multiplicative() {
        base * (1.0 + bonus)
    } else {
        base + bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_stats_sum_base_and_bonus() {
        assert_eq!(effective(Stat::Dodge, 40.0, 12.5), 52.5);
        assert_eq!(effective(Stat::HitRate, 100.0, -5.0), 95.0);
    }

    #[test]
    fn multiplicative_stats_scale_base() {
        assert_eq!(effective(Stat::Attack, 1000.0, 0.2), 1200.0);
        assert_eq!(effective(Stat::SpecialAttack, 500.0, 0.0), 500.0);
    }

    #[test]
    fn effective_monotone_in_permanent_bonus() {
        for stat in Stat::ALL {
            let base = 150.0;
            let mut previous = f64::NEG_INFINITY;
            for step in 0..10 {
                let value = effective(stat, base, step as f64 * 0.5);
                assert!(value >= previous, "{stat:?} decreased with added bonus");
                previous = value;
            }
        }
    }

    #[test]
    fn modifier_tick_expires_after_counted_turns() {
        let mut modifier = Modifier::default();
        modifier.set_temporary(20.0, 2);

        // Two attacks see the bonus, the third does not.
        modifier.tick();
        assert_eq!(modifier.total(), 20.0);
        modifier.tick();
        assert_eq!(modifier.total(), 20.0);
        modifier.tick();
        assert_eq!(modifier.total(), 0.0);
    }

    #[test]
    fn bundle_layers_accumulate_independently() {
        let mut bundle = BonusBundle::default();
        bundle.get_mut(Stat::Penetration).permanent += 3.0;
        bundle.get_mut(Stat::Penetration).set_temporary(10.0, 1);
        assert_eq!(bundle.total(Stat::Penetration), 13.0);

        bundle.tick_all();
        assert_eq!(bundle.total(Stat::Penetration), 13.0);
        bundle.tick_all();
        assert_eq!(bundle.total(Stat::Penetration), 3.0);
    }
}
