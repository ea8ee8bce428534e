pub mod handlers;
mod models;
mod service;

pub use models::Location;
pub use service::{GeocodeError, GeocodeService};
