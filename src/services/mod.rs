// Service exports
pub mod cache;
pub mod engine;
pub mod geocoder;
pub mod invitations;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use engine::MatchingEngine;
pub use geocoder::{DistanceEstimator, HttpGeocoder};
pub use invitations::InvitationService;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{InvitationTransition, MatchStore, StoreError};
