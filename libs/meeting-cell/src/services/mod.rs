// libs/meeting-cell/src/services/mod.rs

pub mod call;
pub mod entry;
pub mod host_registry;
pub mod meeting_id;

pub use call::CallSurface;
pub use host_registry::{HostEntry, HostRegistry, InMemoryHostRegistry};
pub use meeting_id::MeetingIdGenerator;
