use std::sync::Arc;

use tracing::{error, info};

use super::confirm::Confirm;
use super::references::{References, load_references};
use crate::api::{CrmApi, endpoints};
use crate::entity::Entity;
use crate::error::{ApiError, ViewError};
use crate::filter::{Lookup, filter_items};
use crate::models::{Task, TaskStatus};
use crate::routes::Route;

pub const TOGGLE_FAILED: &str = "Could not change the task state.";

/// Collection screen of one entity: load, search, delete, navigate.
pub struct ListView<E: Entity> {
    api: Arc<dyn CrmApi>,
    scope: E::Scope,
    items: Vec<E>,
    search: String,
    loading: bool,
    error: Option<ViewError>,
    references: References,
    lookup: Lookup,
}

impl<E: Entity> ListView<E> {
    pub fn new(api: Arc<dyn CrmApi>, scope: E::Scope) -> Self {
        Self {
            api,
            scope,
            items: Vec::new(),
            search: String::new(),
            loading: false,
            error: None,
            references: References::default(),
            lookup: Lookup::default(),
        }
    }

    /// Builds the screen and runs its first [`ListView::refresh`].
    pub async fn open(api: Arc<dyn CrmApi>, scope: E::Scope) -> Self {
        let mut view = Self::new(api, scope);
        view.refresh().await;
        view
    }

    /// Loads the collection together with the entity's reference lists.
    pub async fn refresh(&mut self) {
        self.loading = true;
        self.error = None;

        let (items, references) = tokio::join!(
            endpoints::list::<E>(self.api.as_ref(), &self.scope),
            load_references(self.api.as_ref(), E::REFERENCES),
        );

        self.set_references(references);
        self.apply_loaded(items);
    }

    /// Reloads the collection only. Prior items survive a failure.
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        let items = endpoints::list::<E>(self.api.as_ref(), &self.scope).await;
        self.apply_loaded(items);
    }

    fn apply_loaded(&mut self, items: Result<Vec<E>, ApiError>) {
        match items {
            Ok(items) => {
                info!("Loaded {} {}", items.len(), E::RESOURCE);
                self.items = items;
            }
            Err(e) => {
                error!("Failed to load {}: {}", E::RESOURCE, e);
                self.error = Some(ViewError::Load {
                    message: E::MESSAGES.load_list_failed,
                    source: e,
                });
            }
        }
        self.loading = false;
    }

    fn set_references(&mut self, references: References) {
        self.lookup = Lookup::from_references(&references);
        self.references = references;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Items matching the current search, in API order.
    pub fn filtered(&self) -> Vec<&E> {
        filter_items(&self.items, &self.search, &self.lookup)
    }

    /// Nothing to show and nothing in flight.
    pub fn shows_empty_state(&self) -> bool {
        !self.loading && self.filtered().is_empty()
    }

    /// Asks first; on yes deletes and reloads from the API. Returns whether the record was deleted.
    pub async fn delete(&mut self, id: i64, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(E::MESSAGES.confirm_delete) {
            return false;
        }

        self.loading = true;
        self.error = None;
        match endpoints::delete::<E>(self.api.as_ref(), id).await {
            Ok(()) => {
                info!("Deleted {} {}", E::RESOURCE, id);
                self.load().await;
                true
            }
            Err(e) => {
                self.loading = false;
                error!("Failed to delete {} {}: {}", E::RESOURCE, id, e);
                self.error = Some(ViewError::Mutation {
                    message: E::MESSAGES.delete_failed,
                    source: e,
                });
                false
            }
        }
    }

    pub fn new_route(&self) -> Route {
        Route::new_record(E::section(&self.scope))
    }

    pub fn detail_route(&self, id: i64) -> Route {
        Route::record(E::section(&self.scope), id)
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn scope(&self) -> &E::Scope {
        &self.scope
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    pub fn references(&self) -> &References {
        &self.references
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

impl ListView<Task> {
    /// Flips done/todo with a full `PUT` of the task, then reloads.
    pub async fn toggle_done(&mut self, id: i64) -> bool {
        let Some(task) = self.items.iter().find(|t| t.id == Some(id)) else {
            return false;
        };

        let mut updated = task.clone();
        updated.status = if task.done() { TaskStatus::Todo } else { TaskStatus::Done };

        match endpoints::update(self.api.as_ref(), id, &updated).await {
            Ok(_) => {
                self.load().await;
                true
            }
            Err(e) => {
                error!("Failed to toggle task {}: {}", id, e);
                self.error = Some(ViewError::Mutation {
                    message: TOGGLE_FAILED,
                    source: e,
                });
                false
            }
        }
    }

    /// Flips the stored `done` flag through `PATCH /tasks/{id}?done=`, then reloads.
    /// `status` is left as the store has it.
    pub async fn quick_toggle(&mut self, id: i64) -> bool {
        let Some(done) = self.items.iter().find(|t| t.id == Some(id)).map(|t| t.stored_done) else {
            return false;
        };

        match endpoints::set_task_done(self.api.as_ref(), id, !done).await {
            Ok(_) => {
                self.load().await;
                true
            }
            Err(e) => {
                error!("Failed to toggle task {}: {}", id, e);
                self.error = Some(ViewError::Mutation {
                    message: TOGGLE_FAILED,
                    source: e,
                });
                false
            }
        }
    }
}
