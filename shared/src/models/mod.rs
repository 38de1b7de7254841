//! Domain models for the Vertical Farm Dashboard

mod container;
mod crop;
mod draft;
mod tray;

pub use container::*;
pub use crop::*;
pub use draft::*;
pub use tray::*;
