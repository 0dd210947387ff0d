use crate::{
    Config, Coordinate, WeatherError, WeatherSnapshot, provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current weather, by map point or by place name.
///
/// Calls are independent of each other: implementations must not queue or
/// de-duplicate them, and must not touch interaction state.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn lookup_by_coordinate(
        &self,
        coordinate: Coordinate,
    ) -> Result<WeatherSnapshot, WeatherError>;

    async fn lookup_by_name(&self, query: &str) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the OpenWeather client from config, failing fast without a key.
pub fn client_from_config(config: &Config) -> Result<Arc<dyn WeatherClient>, WeatherError> {
    let api_key = config.require_api_key()?;

    let client = OpenWeatherClient::new(
        api_key.to_owned(),
        config.base_url(),
        config.request_timeout(),
    )?;

    Ok(Arc::new(client))
}

/// URL of the image for a provider condition icon.
pub fn icon_url(icon_base_url: &str, icon_id: &str) -> String {
    format!("{}/{icon_id}@2x.png", icon_base_url.trim_end_matches('/'))
}
