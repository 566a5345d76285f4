pub mod capability;
pub mod media;

pub use capability::Capability;
pub use media::{is_safe_key, MediaRecord, MediaResponse, MediaUpdate, NewMedia, Visibility};
