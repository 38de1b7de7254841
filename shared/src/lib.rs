//! Shared types and logic for the Vertical Farm Dashboard
//!
//! This crate holds the container model and the rules that govern it: crop
//! compatibility, selection, the draft action queue and the status
//! transitions applied when a draft is committed. It is consumed by the
//! browser bridge (via WASM) and by tests.

pub mod catalog;
pub mod compatibility;
pub mod drafts;
pub mod error;
pub mod factory;
pub mod models;
pub mod selection;
pub mod session;
pub mod settings;
pub mod transitions;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use compatibility::*;
pub use drafts::*;
pub use error::*;
pub use factory::*;
pub use models::*;
pub use selection::*;
pub use session::*;
pub use settings::*;
pub use transitions::*;
pub use types::*;
pub use validation::*;
