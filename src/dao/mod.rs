/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Team and score-history storage backends.
pub mod team_store;
