pub mod json_backend;

use crate::{errors::TrackerError, tracker::Tracker};

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Abstraction over persistence backends capable of storing tracker documents.
pub trait StorageBackend: Send + Sync {
    fn save(&self, tracker: &Tracker) -> Result<()>;
    fn load(&self) -> Result<Tracker>;
}

pub use json_backend::JsonStorage;
