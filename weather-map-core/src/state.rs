//! The single mutable record behind the map view.
//!
//! Two flows write into it: map clicks (selected location and its weather)
//! and city searches (the slider panel). Every lookup is issued against a
//! ticket carrying the flow's sequence number at issue time; a completion
//! whose ticket is no longer current is discarded, so late answers never
//! overwrite newer selections. Superseding a flow also cancels the token of
//! the lookup it replaces.

use tokio_util::sync::CancellationToken;

use crate::{Coordinate, LookupError, WeatherSnapshot};

/// Handle for one outstanding click lookup.
#[derive(Debug, Clone)]
pub struct ClickTicket {
    seq: u64,
    coordinate: Coordinate,
    cancel: CancellationToken,
}

impl ClickTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Handle for one outstanding search submission.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    seq: u64,
    query: String,
    cancel: CancellationToken,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Where the click flow for the selected location stands. Only the click
/// flow writes it, so search results never change what the popup says.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Pending,
    Failed(LookupError),
    Resolved,
}

/// What happened to a completed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The flow moved on before the result arrived.
    Discarded,
}

#[derive(Debug, Default)]
pub struct InteractionState {
    selected_location: Option<Coordinate>,
    selected_weather: Option<WeatherSnapshot>,
    search_weather: Option<WeatherSnapshot>,
    search_panel_visible: bool,
    search_query: String,
    last_error: Option<LookupError>,

    click_outcome: Option<ClickOutcome>,
    click_seq: u64,
    click_in_flight: Option<CancellationToken>,
    search_seq: u64,
    search_in_flight: Option<CancellationToken>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_location(&self) -> Option<Coordinate> {
        self.selected_location
    }

    pub fn selected_weather(&self) -> Option<&WeatherSnapshot> {
        self.selected_weather.as_ref()
    }

    pub fn search_weather(&self) -> Option<&WeatherSnapshot> {
        self.search_weather.as_ref()
    }

    pub fn search_panel_visible(&self) -> bool {
        self.search_panel_visible
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn last_error(&self) -> Option<&LookupError> {
        self.last_error.as_ref()
    }

    /// `None` until the first click.
    pub fn click_outcome(&self) -> Option<&ClickOutcome> {
        self.click_outcome.as_ref()
    }

    pub fn click_pending(&self) -> bool {
        self.click_in_flight.is_some()
    }

    pub fn search_pending(&self) -> bool {
        self.search_in_flight.is_some()
    }

    /// Pin a new location and open a click flow for it.
    ///
    /// Weather for the previous location is dropped at once, and its
    /// outstanding lookup, if any, is cancelled.
    pub fn select_location(&mut self, coordinate: Coordinate) -> ClickTicket {
        if let Some(previous) = self.click_in_flight.take() {
            tracing::debug!(seq = self.click_seq, "cancelling superseded click lookup");
            previous.cancel();
        }

        self.click_seq += 1;
        self.selected_location = Some(coordinate);
        self.selected_weather = None;
        self.click_outcome = Some(ClickOutcome::Pending);

        let cancel = CancellationToken::new();
        self.click_in_flight = Some(cancel.clone());

        ClickTicket {
            seq: self.click_seq,
            coordinate,
            cancel,
        }
    }

    pub fn resolve_click(
        &mut self,
        ticket: &ClickTicket,
        result: Result<WeatherSnapshot, LookupError>,
    ) -> Resolution {
        if ticket.seq != self.click_seq {
            tracing::debug!(
                seq = ticket.seq,
                current = self.click_seq,
                coordinate = %ticket.coordinate,
                "discarding stale click result"
            );
            return Resolution::Discarded;
        }

        self.click_in_flight = None;
        match result {
            Ok(snapshot) => {
                tracing::info!(coordinate = %ticket.coordinate, "weather updated for selected location");
                self.selected_weather = Some(snapshot);
                self.click_outcome = Some(ClickOutcome::Resolved);
                self.last_error = None;
            }
            Err(err) => {
                self.selected_weather = None;
                self.click_outcome = Some(ClickOutcome::Failed(err.clone()));
                self.last_error = Some(err);
            }
        }

        Resolution::Applied
    }

    /// Store the search box text as typed.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }

    /// Open a search flow for the current query, superseding any pending one.
    pub fn begin_search(&mut self) -> SearchTicket {
        self.cancel_search();

        self.search_seq += 1;
        let cancel = CancellationToken::new();
        self.search_in_flight = Some(cancel.clone());

        SearchTicket {
            seq: self.search_seq,
            query: self.search_query.clone(),
            cancel,
        }
    }

    /// Search failures leave the panel and `last_error` untouched; they are
    /// only logged.
    pub fn resolve_search(
        &mut self,
        ticket: &SearchTicket,
        result: Result<WeatherSnapshot, LookupError>,
    ) -> Resolution {
        if ticket.seq != self.search_seq {
            tracing::debug!(
                seq = ticket.seq,
                current = self.search_seq,
                query = %ticket.query,
                "discarding stale search result"
            );
            return Resolution::Discarded;
        }

        self.search_in_flight = None;
        match result {
            Ok(snapshot) => {
                tracing::info!(query = %ticket.query, "search result shown in panel");
                self.search_weather = Some(snapshot);
                self.search_panel_visible = true;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(query = %ticket.query, error = %err, "search lookup failed");
            }
        }

        Resolution::Applied
    }

    /// Hide the panel, clearing its weather and the query together. A search
    /// still in flight is cancelled and its result will be ignored.
    pub fn close_panel(&mut self) {
        if self.cancel_search() {
            self.search_seq += 1;
        }
        self.search_panel_visible = false;
        self.search_weather = None;
        self.search_query.clear();
    }

    fn cancel_search(&mut self) -> bool {
        match self.search_in_flight.take() {
            Some(token) => {
                tracing::debug!(seq = self.search_seq, "cancelling pending search");
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{COORDINATE_LOOKUP_FAILED, ErrorKind};

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate {
            latitude: lat,
            longitude: lng,
        }
    }

    fn sunny(name: &str) -> WeatherSnapshot {
        WeatherSnapshot::basic(25.0, "clear sky", "01d", 40, 2.1).with_location_name(name)
    }

    fn failure() -> LookupError {
        LookupError::new(ErrorKind::Network, COORDINATE_LOOKUP_FAILED)
    }

    #[test]
    fn starts_empty() {
        let state = InteractionState::new();

        assert!(state.selected_location().is_none());
        assert!(state.selected_weather().is_none());
        assert!(state.search_weather().is_none());
        assert!(!state.search_panel_visible());
        assert_eq!(state.search_query(), "");
        assert!(state.last_error().is_none());
    }

    #[test]
    fn click_pins_location_before_weather_arrives() {
        let mut state = InteractionState::new();
        let c = coord(28.6139, 77.2090);

        let ticket = state.select_location(c);

        assert_eq!(state.selected_location(), Some(c));
        assert!(state.selected_weather().is_none());
        assert!(state.click_pending());
        assert_eq!(ticket.coordinate(), c);
    }

    #[test]
    fn late_result_for_superseded_click_is_discarded() {
        let mut state = InteractionState::new();
        let first = state.select_location(coord(1.0, 1.0));
        let second = state.select_location(coord(2.0, 2.0));

        assert_eq!(state.resolve_click(&second, Ok(sunny("Second"))), Resolution::Applied);
        assert_eq!(state.resolve_click(&first, Ok(sunny("First"))), Resolution::Discarded);

        let weather = state.selected_weather().expect("weather for second click");
        assert_eq!(weather.location_name.as_deref(), Some("Second"));
        assert_eq!(state.selected_location(), Some(coord(2.0, 2.0)));
    }

    #[test]
    fn early_result_for_superseded_click_is_discarded() {
        let mut state = InteractionState::new();
        let first = state.select_location(coord(1.0, 1.0));
        let _second = state.select_location(coord(2.0, 2.0));

        assert_eq!(state.resolve_click(&first, Ok(sunny("First"))), Resolution::Discarded);
        assert!(state.selected_weather().is_none());
        assert!(state.click_pending());
    }

    #[test]
    fn superseded_click_token_is_cancelled() {
        let mut state = InteractionState::new();
        let first = state.select_location(coord(1.0, 1.0));
        let second = state.select_location(coord(2.0, 2.0));

        assert!(first.cancellation().is_cancelled());
        assert!(!second.cancellation().is_cancelled());
    }

    #[test]
    fn errors_from_stale_clicks_are_ignored() {
        let mut state = InteractionState::new();
        let first = state.select_location(coord(1.0, 1.0));
        let second = state.select_location(coord(2.0, 2.0));

        state.resolve_click(&second, Ok(sunny("Second")));
        state.resolve_click(&first, Err(failure()));

        assert!(state.last_error().is_none());
        assert!(state.selected_weather().is_some());
    }

    #[test]
    fn click_failure_clears_weather_and_sets_error() {
        let mut state = InteractionState::new();
        let ok = state.select_location(coord(1.0, 1.0));
        state.resolve_click(&ok, Ok(sunny("First")));

        let failing = state.select_location(coord(1.0, 1.0));
        state.resolve_click(&failing, Err(failure()));

        assert!(state.selected_weather().is_none());
        assert_eq!(
            state.last_error().map(|e| e.message.as_str()),
            Some(COORDINATE_LOOKUP_FAILED)
        );
        assert!(!state.click_pending());
    }

    #[test]
    fn click_success_clears_error() {
        let mut state = InteractionState::new();
        let failing = state.select_location(coord(1.0, 1.0));
        state.resolve_click(&failing, Err(failure()));

        let ok = state.select_location(coord(3.0, 3.0));
        state.resolve_click(&ok, Ok(sunny("Third")));

        assert!(state.last_error().is_none());
        assert!(state.selected_weather().is_some());
    }

    #[test]
    fn search_success_keeps_click_failure_outcome() {
        let mut state = InteractionState::new();
        let failing = state.select_location(coord(1.0, 1.0));
        state.resolve_click(&failing, Err(failure()));

        state.set_search_query("Oslo");
        let search = state.begin_search();
        state.resolve_search(&search, Ok(sunny("Oslo")));

        assert!(state.last_error().is_none());
        assert_eq!(state.click_outcome(), Some(&ClickOutcome::Failed(failure())));
    }

    #[test]
    fn query_is_stored_verbatim() {
        let mut state = InteractionState::new();
        state.set_search_query("  new york ");
        assert_eq!(state.search_query(), "  new york ");

        state.set_search_query("");
        assert_eq!(state.search_query(), "");
    }

    #[test]
    fn search_success_opens_panel_and_clears_error() {
        let mut state = InteractionState::new();
        let failing = state.select_location(coord(1.0, 1.0));
        state.resolve_click(&failing, Err(failure()));

        state.set_search_query("Tokyo");
        let ticket = state.begin_search();
        assert_eq!(ticket.query(), "Tokyo");

        assert_eq!(state.resolve_search(&ticket, Ok(sunny("Tokyo"))), Resolution::Applied);
        assert!(state.search_panel_visible());
        assert!(state.search_weather().is_some());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn search_failure_leaves_panel_and_error_alone() {
        let mut state = InteractionState::new();
        state.set_search_query("Paris");
        let ticket = state.begin_search();

        state.resolve_search(
            &ticket,
            Err(LookupError::new(ErrorKind::NotFound, "No weather found for 'Paris'.")),
        );

        assert!(!state.search_panel_visible());
        assert!(state.search_weather().is_none());
        assert!(state.last_error().is_none());
        assert!(!state.search_pending());
    }

    #[test]
    fn newer_submission_wins_over_older() {
        let mut state = InteractionState::new();
        state.set_search_query("Lima");
        let older = state.begin_search();
        state.set_search_query("Oslo");
        let newer = state.begin_search();

        assert!(older.cancellation().is_cancelled());
        state.resolve_search(&newer, Ok(sunny("Oslo")));
        assert_eq!(state.resolve_search(&older, Ok(sunny("Lima"))), Resolution::Discarded);

        let shown = state.search_weather().and_then(|w| w.location_name.as_deref());
        assert_eq!(shown, Some("Oslo"));
    }

    #[test]
    fn close_clears_panel_atomically() {
        let mut state = InteractionState::new();
        state.set_search_query("Tokyo");
        let ticket = state.begin_search();
        state.resolve_search(&ticket, Ok(sunny("Tokyo")));

        state.close_panel();

        assert!(!state.search_panel_visible());
        assert!(state.search_weather().is_none());
        assert_eq!(state.search_query(), "");
    }

    #[test]
    fn close_from_empty_state_is_harmless() {
        let mut state = InteractionState::new();
        state.close_panel();

        assert!(!state.search_panel_visible());
        assert!(state.search_weather().is_none());
        assert_eq!(state.search_query(), "");
    }

    #[test]
    fn close_discards_pending_search() {
        let mut state = InteractionState::new();
        state.set_search_query("Tokyo");
        let ticket = state.begin_search();

        state.close_panel();
        assert!(ticket.cancellation().is_cancelled());

        assert_eq!(state.resolve_search(&ticket, Ok(sunny("Tokyo"))), Resolution::Discarded);
        assert!(!state.search_panel_visible());
        assert!(state.search_weather().is_none());
    }

    #[test]
    fn flows_do_not_interfere() {
        let mut state = InteractionState::new();
        let click = state.select_location(coord(5.0, 5.0));
        state.set_search_query("Rome");
        let search = state.begin_search();

        state.resolve_search(&search, Ok(sunny("Rome")));
        state.close_panel();
        assert_eq!(state.resolve_click(&click, Ok(sunny("Here"))), Resolution::Applied);

        assert!(state.selected_weather().is_some());
        assert!(!state.search_panel_visible());
    }
}
