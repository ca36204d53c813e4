//! Live data sources for Wayfinder.
//!
//! Implementations of the `WeatherSource`, `AttractionsSource`, and
//! `PayloadCache` seams from `wayfinder_core`. Fetches are best-effort:
//! every failure maps to a `FetchError` the engine downgrades to "no
//! payload this turn".

pub mod attractions;
pub mod cache;
pub mod weather;

pub use attractions::GeoapifySource;
pub use cache::MemoryPayloadCache;
pub use weather::OpenWeatherSource;
