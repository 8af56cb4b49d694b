//! Named filters that the user can come back to from the transactions page.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{AppState, Error, endpoints, html::LINK_STYLE};

use super::filter::{Filter, FilterQuery};

/// A filter saved under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFilter {
    /// The name shown in the list of saved filters.
    pub name: String,
    /// The saved filter.
    pub filter: Filter,
}

impl SavedFilter {
    /// The transactions page URL that applies this filter.
    pub fn url(&self) -> String {
        let query = self.filter.to_query_string();

        if query.is_empty() {
            endpoints::TRANSACTIONS_VIEW.to_owned()
        } else {
            format!("{}?{query}", endpoints::TRANSACTIONS_VIEW)
        }
    }
}

/// The saved filters, in the order they were first saved.
#[derive(Debug, Default)]
pub struct SavedFilters {
    filters: Vec<SavedFilter>,
}

impl SavedFilters {
    /// Save `filter` as `name`, replacing an existing filter with the same name.
    ///
    /// # Errors
    /// Returns [Error::EmptyFilterName] if `name` is empty or only whitespace.
    pub fn save(&mut self, name: &str, filter: Filter) -> Result<(), Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyFilterName);
        }

        match self.filters.iter_mut().find(|saved| saved.name == name) {
            Some(saved) => saved.filter = filter,
            None => self.filters.push(SavedFilter {
                name: name.to_owned(),
                filter,
            }),
        }

        Ok(())
    }

    /// The saved filters in insertion order.
    pub fn as_slice(&self) -> &[SavedFilter] {
        &self.filters
    }
}

/// The state needed to save a filter.
#[derive(Debug, Clone)]
pub struct SaveFilterState {
    /// The saved filters shared by every request.
    pub saved_filters: Arc<Mutex<SavedFilters>>,
}

impl FromRef<AppState> for SaveFilterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            saved_filters: state.saved_filters.clone(),
        }
    }
}

/// The form data for saving the current filter.
#[derive(Debug, Deserialize)]
pub struct SaveFilterForm {
    /// The name to save the filter under.
    #[serde(default)]
    pub name: String,
    /// The filter to save.
    #[serde(flatten)]
    pub query: FilterQuery,
}

/// A route handler that saves a filter and responds with the updated list of saved filters.
pub async fn save_filter_endpoint(
    State(state): State<SaveFilterState>,
    Form(form): Form<SaveFilterForm>,
) -> Response {
    let filter = match form.query.into_filter() {
        Ok(filter) => filter,
        Err(error) => return error.into_alert_response(),
    };

    let mut saved_filters = match state.saved_filters.lock() {
        Ok(saved_filters) => saved_filters,
        Err(error) => {
            tracing::error!("could not acquire saved filters lock: {error}");
            return Error::StoreLockError.into_alert_response();
        }
    };

    if let Err(error) = saved_filters.save(&form.name, filter) {
        return error.into_alert_response();
    }

    tracing::info!("saved filter \"{}\"", form.name.trim());

    saved_filters_view(saved_filters.as_slice()).into_response()
}

/// Renders the list of saved filters as links to the transactions page.
pub(crate) fn saved_filters_view(saved_filters: &[SavedFilter]) -> Markup {
    html! {
        ul id="saved-filters" class="flex flex-wrap gap-3 text-sm"
        {
            @for saved in saved_filters {
                li { a href=(saved.url()) class=(LINK_STYLE) { (saved.name) } }
            }

            @if saved_filters.is_empty() {
                li class="text-gray-500 dark:text-gray-400" { "No saved filters yet." }
            }
        }
    }
}
