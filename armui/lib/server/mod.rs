//! The HTTP surface of the dashboard backend.
//!
//! Every route lives under `/api`. Handlers are thin: they extract parameters, call into
//! [`crate::management`] or the clients held by [`ServerState`], and map [`crate::ArmUiError`]
//! onto status codes through [`ApiError`].

mod api;
mod data;
mod error;
mod handlers;
mod routes;
mod state;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use api::*;
pub use data::*;
pub use error::*;
pub use routes::*;
pub use state::*;
