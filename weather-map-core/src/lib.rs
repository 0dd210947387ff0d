//! Core library for the interactive weather map.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - The weather client abstraction and its OpenWeather implementation
//! - The interaction state shared by map clicks and city searches
//! - A pure projection of that state into what the view displays
//!
//! It is used by `weather-map-cli`, but any front end that can deliver map
//! clicks and search input can drive a [`Session`].

pub mod config;
pub mod error;
pub mod map;
pub mod model;
pub mod presentation;
pub mod provider;
pub mod search;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::{COORDINATE_LOOKUP_FAILED, ErrorKind, LookupError, WeatherError};
pub use map::{MapDefaults, MapEvent};
pub use model::{Coordinate, WeatherSnapshot};
pub use presentation::{PresentationBinder, View};
pub use provider::{WeatherClient, client_from_config};
pub use session::{Session, UiEvent};
pub use state::{ClickOutcome, InteractionState, Resolution};
