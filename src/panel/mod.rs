mod backend;
pub mod handlers;
pub mod present;
mod service;
pub mod state;

pub use backend::{OpenMeteoBackend, WeatherBackend};
pub use present::PanelView;
pub use service::{PanelDefaults, PanelError, PanelService};
