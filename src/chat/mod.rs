pub mod config;
pub mod models;
pub mod router;
pub mod session;

pub use config::GenerationConfig;
pub use models::ModelAlias;
pub use router::ProviderRouter;
pub use session::ChatSession;
