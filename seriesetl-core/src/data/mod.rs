//! Data fetching: provider traits and the HTTP providers.

pub mod open_meteo;
pub mod provider;
pub mod yahoo;

pub use open_meteo::OpenMeteoProvider;
pub use provider::{DataError, GeoPoint, PriceProvider, WeatherProvider};
pub use yahoo::YahooProvider;
