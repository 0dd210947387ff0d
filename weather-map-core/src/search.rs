//! City search box and the slider panel it opens.

use std::sync::Arc;

use crate::{
    InteractionState, LookupError, WeatherClient,
    session::{Completion, CompletionSender, spawn_lookup},
    state::SearchTicket,
};

#[derive(Debug, Clone)]
pub struct SearchController {
    client: Arc<dyn WeatherClient>,
}

impl SearchController {
    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }

    /// Keystrokes only update the query; nothing is fetched until submit.
    pub(crate) fn on_query_change(&self, state: &mut InteractionState, text: String) {
        state.set_search_query(text);
    }

    /// Look up the current query, which may be empty.
    pub(crate) fn on_submit(
        &self,
        state: &mut InteractionState,
        completions: &CompletionSender,
    ) -> SearchTicket {
        let ticket = state.begin_search();
        tracing::debug!(query = ticket.query(), seq = ticket.seq(), "search submitted");

        let client = Arc::clone(&self.client);
        let flow = ticket.clone();
        spawn_lookup(
            ticket.cancellation().clone(),
            async move {
                let result = client
                    .lookup_by_name(flow.query())
                    .await
                    .map_err(|e| LookupError::for_name(flow.query(), &e));
                Completion::Search {
                    ticket: flow,
                    result,
                }
            },
            completions.clone(),
        );

        ticket
    }

    pub(crate) fn on_close(&self, state: &mut InteractionState) {
        state.close_panel();
    }
}
