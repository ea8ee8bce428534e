pub mod handlers;
mod lenient;
pub mod models;
mod normalize;
mod service;

pub use models::{CurrentConditions, DailyRecord, HourlyRecord, NormalizedForecast};
pub use service::{ForecastError, ForecastService};
