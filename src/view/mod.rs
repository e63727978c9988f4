//! Facade between web request handlers and a pluggable view engine.
//!
//! A view moves through `prepared -> (event applied)* -> rendered`; the
//! transitions belong to the [`ViewEngine`], while [`CrudService`] exposes
//! the entry points a controller needs.

mod error;
mod event;
mod locale;
mod model;
mod service;

pub use error::ViewError;
pub use event::EventRequest;
pub use locale::Locale;
pub use model::{Arguments, ResponseModel};
pub use service::{CrudService, EngineCrudService, ViewEngine};
