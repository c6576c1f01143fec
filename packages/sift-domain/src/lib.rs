pub mod history;
pub mod provenance;
pub mod sentinel;
pub mod verdict;

pub type DocumentId = i64;
