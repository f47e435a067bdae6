//! Backend access: REST reads and event-selection lookups

mod client;
mod selection;

pub use client::BackendClient;
pub(crate) use client::with_trailing_slash;
pub use selection::{select_event, Selection};
