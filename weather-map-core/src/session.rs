//! One viewing session: user events and lookup completions are applied to
//! the interaction state one at a time, on whichever task owns the session.

use std::{future::Future, sync::Arc};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    Config, InteractionState, LookupError, WeatherClient, WeatherError, WeatherSnapshot,
    map::{MapEvent, MapInteractionAdapter},
    presentation::{PresentationBinder, View},
    provider::client_from_config,
    search::SearchController,
    state::{ClickTicket, Resolution, SearchTicket},
};

/// User input the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Map(MapEvent),
    QueryChanged(String),
    SubmitSearch,
    ClosePanel,
}

/// A finished lookup on its way back to the session.
#[derive(Debug)]
pub(crate) enum Completion {
    Click {
        ticket: ClickTicket,
        result: Result<WeatherSnapshot, LookupError>,
    },
    Search {
        ticket: SearchTicket,
        result: Result<WeatherSnapshot, LookupError>,
    },
}

pub(crate) type CompletionSender = mpsc::UnboundedSender<Completion>;

/// Run `lookup` in the background unless `cancel` fires first. A cancelled
/// lookup reports nothing.
pub(crate) fn spawn_lookup<F>(cancel: CancellationToken, lookup: F, completions: CompletionSender)
where
    F: Future<Output = Completion> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("lookup cancelled before completion");
            }
            completion = lookup => {
                // The session may be gone; nothing is waiting for the result then.
                let _ = completions.send(completion);
            }
        }
    });
}

#[derive(Debug)]
pub struct Session {
    state: InteractionState,
    map: MapInteractionAdapter,
    search: SearchController,
    binder: PresentationBinder,
    completions_tx: CompletionSender,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl Session {
    pub fn new(client: Arc<dyn WeatherClient>, icon_base_url: impl Into<String>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            state: InteractionState::new(),
            map: MapInteractionAdapter::new(Arc::clone(&client)),
            search: SearchController::new(client),
            binder: PresentationBinder::new(icon_base_url),
            completions_tx,
            completions_rx,
        }
    }

    /// Build the OpenWeather-backed session. Fails without an API key.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let client = client_from_config(config)?;
        Ok(Self::new(client, config.icon_base_url()))
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn view(&self) -> View {
        self.binder.project(&self.state)
    }

    /// True while either flow awaits a lookup.
    pub fn has_pending(&self) -> bool {
        self.state.click_pending() || self.state.search_pending()
    }

    /// Apply a user event. Lookups it starts run in the background and come
    /// back through [`Session::next_update`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Map(map_event) => {
                self.map
                    .on_event(&mut self.state, map_event, &self.completions_tx);
            }
            UiEvent::QueryChanged(text) => self.search.on_query_change(&mut self.state, text),
            UiEvent::SubmitSearch => {
                self.search.on_submit(&mut self.state, &self.completions_tx);
            }
            UiEvent::ClosePanel => self.search.on_close(&mut self.state),
        }
    }

    /// Wait for the next finished lookup and apply it.
    ///
    /// Pends forever when nothing is in flight, so callers normally race it
    /// against their input source.
    pub async fn next_update(&mut self) -> Option<Resolution> {
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    fn apply(&mut self, completion: Completion) -> Resolution {
        match completion {
            Completion::Click { ticket, result } => self.state.resolve_click(&ticket, result),
            Completion::Search { ticket, result } => self.state.resolve_search(&ticket, result),
        }
    }
}
