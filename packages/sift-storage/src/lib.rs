pub mod chunks;
pub mod db;
pub mod documents;
pub mod models;
pub mod prompts;
pub mod qdrant;
pub mod schema;
pub mod scratch;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
