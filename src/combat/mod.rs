pub mod engine;
pub mod fleet;
pub mod lieutenants;
pub mod rng;
pub mod specials;
pub mod stats;

pub use engine::{run_round, Knobs, RoundOutcome, DAMAGE_CAP};
pub use fleet::{
    BaseStats, Boss, BossTally, Curse, Deathproof, Fleet, FuryLink, Invisibility, Poison, Ship,
    ShipClass, ShipTally, BOSS_INITIAL_METER, FURY_MULTIPLIER, GRID_SLOTS, METER_FULL,
    METER_PER_HIT,
};
pub use lieutenants::{run_active, run_passives, Lieutenant, PassiveGrant, Scope};
pub use rng::{Dice, Rng};
pub use specials::SpecialAbility;
pub use stats::{effective, BonusBundle, Modifier, Stat};
