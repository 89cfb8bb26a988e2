// Domain layer: reward rules, player ledger and tank simulation.

pub mod catalog;
pub mod errors;
pub mod ledger;
pub mod ports;
pub mod quota;
pub mod reward;
pub mod steering;
pub mod tank;
pub mod tuning;
pub mod weights;

pub use catalog::{Rarity, SpeciesCatalog, SpeciesDefinition};
pub use errors::DrawError;
pub use ledger::{CollectionEntry, PlayerRecord, VersionedRecord};
pub use ports::{Clock, CommitOutcome, PlayerStore, RandomSource};
pub use quota::{QuotaManager, QuotaState};
pub use reward::{DrawOutcome, RewardEngine};
pub use tank::{EntitySnapshot, Tank, TankBounds, TankEntity, TankSeed};
pub use tuning::SteeringTuning;
pub use weights::{RarityWeights, WeightTable};
