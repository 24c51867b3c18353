pub mod adapters;
pub mod context;
pub mod contract;
pub mod error;
pub mod logger;
pub mod provider;
pub mod recipients;
pub mod scheduler;

pub use error::Error;

pub type Result<T> = std::result::Result<T, error::Error>;
