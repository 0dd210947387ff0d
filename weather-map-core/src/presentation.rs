//! Pure projection from [`InteractionState`] to what the view shows.

use chrono::DateTime;
use serde::Serialize;

use crate::{
    Coordinate, InteractionState, WeatherSnapshot, provider::icon_url, state::ClickOutcome,
};

pub const TITLE: &str = "Interactive Weather Map";
pub const SEARCH_PLACEHOLDER: &str = "Search by city...";
pub const LOADING_TEXT: &str = "Loading weather...";
pub const NO_DATA_TEXT: &str = "No weather data";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Everything the map widget and surrounding chrome should display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub marker: Option<MarkerView>,
    /// Present whenever a location is selected, even before its weather.
    /// Only [`PopupContent::Details`] belongs on the marker; a front end
    /// should show `Loading` and `Failed` as a standalone panel, since no
    /// marker exists for them.
    pub popup: Option<PopupContent>,
    pub panel: Option<PanelContent>,
    pub banner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub position: Coordinate,
    pub icon: MarkerIcon,
}

/// Marker image placement, in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub url: String,
    pub size: (u32, u32),
    pub anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
}

impl MarkerIcon {
    fn for_condition(icon_base_url: &str, icon_id: &str) -> Self {
        Self {
            url: icon_url(icon_base_url, icon_id),
            size: (50, 50),
            anchor: (25, 50),
            popup_anchor: (0, -50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum PopupContent {
    Loading,
    Failed(String),
    Details(WeatherDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum PanelContent {
    Empty,
    Details(WeatherDetails),
}

/// A snapshot laid out as display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherDetails {
    pub title: String,
    pub lines: Vec<String>,
    pub icon_url: String,
    pub icon_alt: String,
}

impl WeatherDetails {
    pub fn from_snapshot(snapshot: &WeatherSnapshot, icon_base_url: &str) -> Self {
        let mut lines = vec![format!("Temperature: {:.1} °C", snapshot.temperature_c)];

        if let Some(feels_like) = snapshot.feels_like_c {
            lines.push(format!("Feels like: {feels_like:.1} °C"));
        }
        lines.push(format!("Weather: {}", snapshot.condition_description));
        lines.push(format!("Humidity: {}%", snapshot.humidity_pct));

        let mut wind = format!("Wind Speed: {:.1} m/s", snapshot.wind_speed_mps);
        if let Some(deg) = snapshot.wind_direction_deg {
            wind.push_str(&format!(" {} ({deg}°)", compass_point(deg)));
        }
        lines.push(wind);

        if let Some(pressure) = snapshot.pressure_hpa {
            lines.push(format!("Pressure: {pressure} hPa"));
        }
        if let Some(visibility) = snapshot.visibility_m {
            lines.push(format!("Visibility: {:.1} km", f64::from(visibility) / 1000.0));
        }
        if let Some(clouds) = snapshot.cloudiness_pct {
            lines.push(format!("Cloudiness: {clouds}%"));
        }
        if let Some(sunrise) = snapshot.sunrise_epoch_sec.and_then(clock_time) {
            lines.push(format!("Sunrise: {sunrise}"));
        }
        if let Some(sunset) = snapshot.sunset_epoch_sec.and_then(clock_time) {
            lines.push(format!("Sunset: {sunset}"));
        }

        Self {
            title: snapshot
                .location_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            lines,
            icon_url: icon_url(icon_base_url, &snapshot.condition_icon_id),
            icon_alt: snapshot.condition_description.clone(),
        }
    }
}

impl std::fmt::Display for WeatherDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        write!(f, "  Icon: {}", self.icon_url)
    }
}

impl std::fmt::Display for PopupContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PopupContent::Loading => f.write_str(LOADING_TEXT),
            PopupContent::Failed(message) => f.write_str(message),
            PopupContent::Details(details) => details.fmt(f),
        }
    }
}

impl std::fmt::Display for PanelContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelContent::Empty => f.write_str(NO_DATA_TEXT),
            PanelContent::Details(details) => details.fmt(f),
        }
    }
}

/// Derives a [`View`]; holds only the static settings needed to do so.
#[derive(Debug, Clone)]
pub struct PresentationBinder {
    icon_base_url: String,
}

impl PresentationBinder {
    pub fn new(icon_base_url: impl Into<String>) -> Self {
        Self {
            icon_base_url: icon_base_url.into(),
        }
    }

    pub fn project(&self, state: &InteractionState) -> View {
        View {
            marker: self.marker(state),
            popup: self.popup(state),
            panel: self.panel(state),
            banner: state.last_error().map(|e| e.message.clone()),
        }
    }

    fn marker(&self, state: &InteractionState) -> Option<MarkerView> {
        let position = state.selected_location()?;
        let weather = state.selected_weather()?;

        Some(MarkerView {
            position,
            icon: MarkerIcon::for_condition(&self.icon_base_url, &weather.condition_icon_id),
        })
    }

    fn popup(&self, state: &InteractionState) -> Option<PopupContent> {
        state.selected_location()?;

        let content = match (state.selected_weather(), state.click_outcome()) {
            (Some(weather), _) => {
                PopupContent::Details(WeatherDetails::from_snapshot(weather, &self.icon_base_url))
            }
            (None, Some(ClickOutcome::Failed(err))) => PopupContent::Failed(err.message.clone()),
            (None, _) => PopupContent::Loading,
        };
        Some(content)
    }

    fn panel(&self, state: &InteractionState) -> Option<PanelContent> {
        if !state.search_panel_visible() {
            return None;
        }

        Some(match state.search_weather() {
            Some(weather) => {
                PanelContent::Details(WeatherDetails::from_snapshot(weather, &self.icon_base_url))
            }
            None => PanelContent::Empty,
        })
    }
}

fn compass_point(deg: u16) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = ((f64::from(deg % 360) / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}

fn clock_time(epoch_sec: i64) -> Option<String> {
    DateTime::from_timestamp(epoch_sec, 0).map(|t| t.format("%H:%M UTC").to_string())
}
