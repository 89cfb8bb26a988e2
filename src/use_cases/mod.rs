// Use cases layer: draw workflow, read models and the shared tank loop.

pub mod collection;
pub mod draw;
pub mod quota_status;
pub mod reveal;
pub mod tank;

#[cfg(test)]
pub(crate) mod test_support;

pub use collection::{CollectionUseCase, CollectionView};
pub use draw::{DrawResult, DrawUseCase};
pub use quota_status::QuotaStatusUseCase;
pub use reveal::{RevealError, Revealed, reveal};
pub use tank::{TankCommandError, TankEvent, TankHandle, TankSettings, TankUpdate, spawn_tank};
