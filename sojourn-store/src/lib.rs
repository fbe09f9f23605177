pub mod app_config;
pub mod chapa;
pub mod database;
pub mod memory;
pub mod pg;

pub use chapa::ChapaGateway;
pub use database::DbClient;
pub use memory::MemoryStore;
pub use pg::PgStore;
