//! Map widget boundary: click events in, coordinate selections out.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    Coordinate, InteractionState, LookupError, WeatherClient,
    session::{Completion, CompletionSender, spawn_lookup},
    state::ClickTicket,
};

/// Events emitted by the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Click { lat: f64, lng: f64 },
}

/// Initial viewport and tile source for the map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDefaults {
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            // Delhi
            center: Coordinate {
                latitude: 28.6139,
                longitude: 77.2090,
            },
            zoom: 10,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            attribution: "© OpenStreetMap contributors",
        }
    }
}

/// Turns map clicks into location selections and issues their lookups.
#[derive(Debug, Clone)]
pub struct MapInteractionAdapter {
    client: Arc<dyn WeatherClient>,
}

impl MapInteractionAdapter {
    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }

    /// Returns the ticket of the lookup started, or `None` when the event
    /// did not carry a usable coordinate.
    pub(crate) fn on_event(
        &self,
        state: &mut InteractionState,
        event: MapEvent,
        completions: &CompletionSender,
    ) -> Option<ClickTicket> {
        match event {
            MapEvent::Click { lat, lng } => self.on_click(state, lat, lng, completions),
        }
    }

    fn on_click(
        &self,
        state: &mut InteractionState,
        lat: f64,
        lng: f64,
        completions: &CompletionSender,
    ) -> Option<ClickTicket> {
        let Some(coordinate) = Coordinate::from_map(lat, lng) else {
            tracing::warn!(lat, lng, "ignoring click outside the map");
            return None;
        };

        tracing::debug!(%coordinate, "map clicked");
        let ticket = state.select_location(coordinate);

        let client = Arc::clone(&self.client);
        let flow = ticket.clone();
        spawn_lookup(
            ticket.cancellation().clone(),
            async move {
                let result = client
                    .lookup_by_coordinate(flow.coordinate())
                    .await
                    .map_err(|e| LookupError::for_coordinate(&e));
                Completion::Click {
                    ticket: flow,
                    result,
                }
            },
            completions.clone(),
        );

        Some(ticket)
    }
}
