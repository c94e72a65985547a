use std::sync::Arc;

use tracing::{error, info};

use super::confirm::Confirm;
use super::references::{References, load_references};
use crate::api::{CrmApi, endpoints};
use crate::entity::{Entity, FieldError, parse_id};
use crate::error::ViewError;
use crate::filter::Lookup;
use crate::routes::Route;

/// Decided once from the route parameter and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Draft,
    Edit(i64),
    InvalidId,
}

impl Mode {
    pub fn from_param(param: &str) -> Self {
        if param == "new" {
            return Mode::Draft;
        }
        parse_id(param).map_or(Mode::InvalidId, Mode::Edit)
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Mode::Draft)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormState<E> {
    Loading,
    Ready(E),
    /// Not found, load error and invalid id all end here.
    Failed,
}

/// Detail screen of one entity: create, edit, delete.
pub struct FormView<E: Entity> {
    api: Arc<dyn CrmApi>,
    scope: E::Scope,
    mode: Mode,
    state: FormState<E>,
    references: References,
    lookup: Lookup,
    saving: bool,
    error: Option<ViewError>,
}

impl<E: Entity> FormView<E> {
    pub fn new(api: Arc<dyn CrmApi>, scope: E::Scope, param: &str) -> Self {
        Self {
            api,
            scope,
            mode: Mode::from_param(param),
            state: FormState::Loading,
            references: References::default(),
            lookup: Lookup::default(),
            saving: false,
            error: None,
        }
    }

    pub async fn open(api: Arc<dyn CrmApi>, scope: E::Scope, param: &str) -> Self {
        let mut view = Self::new(api, scope, param);
        view.initialize().await;
        view
    }

    /// Seeds a draft or fetches the record, with reference lists loading alongside.
    pub async fn initialize(&mut self) {
        self.state = FormState::Loading;
        self.error = None;

        let (record, references) = tokio::join!(
            Self::load_record(self.api.as_ref(), self.mode, &self.scope),
            load_references(self.api.as_ref(), E::REFERENCES),
        );

        self.lookup = Lookup::from_references(&references);
        self.references = references;

        match record {
            Ok(record) => self.state = FormState::Ready(record),
            Err(e) => {
                self.state = FormState::Failed;
                self.error = Some(e);
            }
        }
    }

    async fn load_record(api: &dyn CrmApi, mode: Mode, scope: &E::Scope) -> Result<E, ViewError> {
        match mode {
            Mode::Draft => Ok(E::draft(scope)),
            Mode::InvalidId => Err(ViewError::InvalidId(E::MESSAGES.invalid_id)),
            Mode::Edit(id) => endpoints::fetch::<E>(api, id).await.map_err(|e| {
                error!("Failed to load {} {}: {}", E::RESOURCE, id, e);
                ViewError::Load {
                    message: E::MESSAGES.load_failed,
                    source: e,
                }
            }),
        }
    }

    /// Applies one form input to the loaded record. Does nothing while no record is loaded.
    pub fn update_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match &mut self.state {
            FormState::Ready(record) => record.set_field(key, value),
            _ => Ok(()),
        }
    }

    pub fn edit(&mut self, apply: impl FnOnce(&mut E)) {
        if let FormState::Ready(record) = &mut self.state {
            apply(record);
        }
    }

    /// Validates, then creates or updates. Returns the list route on success;
    /// on failure the error is set and the draft stays as it was.
    pub async fn save(&mut self) -> Option<Route> {
        if self.saving {
            return None;
        }
        let FormState::Ready(record) = &self.state else {
            return None;
        };

        if let Err(message) = record.validate() {
            self.error = Some(ViewError::Validation(message));
            return None;
        }

        let mut payload = record.clone();
        payload.prepare(&self.scope);

        self.saving = true;
        self.error = None;

        let (result, failure) = match self.mode {
            Mode::Draft => (
                endpoints::create(self.api.as_ref(), &payload).await.map(|_| ()),
                E::MESSAGES.create_failed,
            ),
            Mode::Edit(id) => (
                endpoints::update(self.api.as_ref(), id, &payload).await.map(|_| ()),
                E::MESSAGES.save_failed,
            ),
            Mode::InvalidId => {
                self.saving = false;
                return None;
            }
        };
        self.saving = false;

        match result {
            Ok(()) => {
                info!("Saved {} ({:?})", E::RESOURCE, self.mode);
                Some(self.list_route())
            }
            Err(e) => {
                error!("Failed to save {} ({:?}): {}", E::RESOURCE, self.mode, e);
                self.error = Some(ViewError::Mutation {
                    message: failure,
                    source: e,
                });
                None
            }
        }
    }

    /// Edit mode only. Asks first; returns the list route once the record is gone.
    pub async fn delete(&mut self, confirm: &dyn Confirm) -> Option<Route> {
        let Mode::Edit(id) = self.mode else {
            return None;
        };
        if self.saving || !matches!(self.state, FormState::Ready(_)) {
            return None;
        }
        if !confirm.confirm(E::MESSAGES.confirm_delete_permanently) {
            return None;
        }

        self.saving = true;
        self.error = None;
        let result = endpoints::delete::<E>(self.api.as_ref(), id).await;
        self.saving = false;

        match result {
            Ok(()) => {
                info!("Deleted {} {}", E::RESOURCE, id);
                Some(self.list_route())
            }
            Err(e) => {
                error!("Failed to delete {} {}: {}", E::RESOURCE, id, e);
                self.error = Some(ViewError::Mutation {
                    message: E::MESSAGES.delete_failed,
                    source: e,
                });
                None
            }
        }
    }

    /// Where save, delete and the back-link lead.
    pub fn list_route(&self) -> Route {
        Route::list(E::section(&self.scope))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &FormState<E> {
        &self.state
    }

    pub fn record(&self) -> Option<&E> {
        match &self.state {
            FormState::Ready(record) => Some(record),
            _ => None,
        }
    }

    pub fn references(&self) -> &References {
        &self.references
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FormState::Loading)
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::{Value, json};

    use super::*;
    use crate::api::scripted::{ScriptedApi, server_error};
    use crate::models::{Assignee, Customer, Lead, Meeting, Task, TaskStatus, User};
    use crate::routes::Section;

    #[test]
    fn mode_comes_from_the_param() {
        assert_eq!(Mode::from_param("new"), Mode::Draft);
        assert_eq!(Mode::from_param("12"), Mode::Edit(12));
        assert_eq!(Mode::from_param("0"), Mode::InvalidId);
        assert_eq!(Mode::from_param("-3"), Mode::InvalidId);
        assert_eq!(Mode::from_param("abc"), Mode::InvalidId);
    }

    async fn open_draft<E: Entity>(scope: E::Scope) -> (FormView<E>, Arc<ScriptedApi>) {
        let api = Arc::new(ScriptedApi::new(|_| Ok(Some(json!([])))));
        let view = FormView::<E>::open(api.clone(), scope, "new").await;
        (view, api)
    }

    fn draft_json<E: Entity>(view: &FormView<E>) -> Value {
        serde_json::to_value(view.record().expect("draft not ready")).unwrap()
    }

    #[tokio::test]
    async fn draft_needs_no_network() {
        let api = Arc::new(ScriptedApi::new(|_| Err(server_error())));
        let view = FormView::<Customer>::open(api.clone(), (), "new").await;

        assert_eq!(
            draft_json(&view),
            json!({ "name": "", "email": null, "phone": null, "note": null, "status": "active" })
        );
        assert!(api.requests().is_empty());
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn lead_and_user_drafts_have_their_defaults() {
        let (lead, api) = open_draft::<Lead>(()).await;
        assert_eq!(
            draft_json(&lead),
            json!({
                "name": "", "email": null, "phone": null, "source": null,
                "note": null, "status": "new"
            })
        );
        assert!(api.requests().is_empty());

        let (user, api) = open_draft::<User>(()).await;
        assert_eq!(
            draft_json(&user),
            json!({ "name": "", "email": "", "role": "user", "active": true, "note": null })
        );
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn task_draft_belongs_to_the_screen_assignee() {
        let (task, api) = open_draft::<Task>(Assignee::Peta).await;

        assert_eq!(
            draft_json(&task),
            json!({
                "title": "", "description": null, "priority": 2, "due_date": null,
                "assignee": "peta", "done": false, "status": "todo", "customer_id": null
            })
        );
        assert_eq!(api.calls(Method::GET, "/tasks"), 0);
        assert_eq!(api.calls(Method::GET, "/customers"), 1);
    }

    #[tokio::test]
    async fn meeting_draft_only_loads_pickers() {
        let (view, api) = open_draft::<Meeting>(()).await;

        assert_eq!(
            draft_json(&view),
            json!({
                "title": "", "date": null, "time": null, "customer_id": null,
                "note": null, "status": "planned", "user_ids": []
            })
        );
        assert_eq!(api.calls(Method::GET, "/meetings"), 0);
        assert_eq!(api.calls(Method::GET, "/customers"), 1);
        assert_eq!(api.calls(Method::GET, "/users"), 1);
    }

    #[tokio::test]
    async fn invalid_id_fails_without_a_request() {
        let api = Arc::new(ScriptedApi::new(|_| Ok(None)));
        let view = FormView::<Customer>::open(api.clone(), (), "abc").await;

        assert_eq!(view.state(), &FormState::Failed);
        assert_eq!(view.error_message().as_deref(), Some(Customer::MESSAGES.invalid_id));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn not_found_ends_in_failed() {
        let api = Arc::new(ScriptedApi::new(|_| {
            Err(crate::error::ApiError::Status {
                status: 404,
                body: "{\"detail\":\"Customer not found\"}".to_string(),
            })
        }));
        let view = FormView::<Customer>::open(api, (), "9").await;

        assert_eq!(view.state(), &FormState::Failed);
        assert_eq!(view.error_message().as_deref(), Some(Customer::MESSAGES.load_failed));
    }

    #[tokio::test]
    async fn task_status_is_normalized_from_done() {
        let api = Arc::new(ScriptedApi::new(|request| match request.path.as_str() {
            "/tasks/4" => Ok(Some(json!({ "id": 4, "title": "Call", "assignee": "vlada", "done": true }))),
            "/tasks/5" => Ok(Some(json!({ "id": 5, "title": "Call", "assignee": "vlada", "done": false }))),
            _ => Ok(Some(json!([]))),
        }));

        let done = FormView::<Task>::open(api.clone(), Assignee::Vlada, "4").await;
        assert_eq!(done.record().map(|t| t.status), Some(TaskStatus::Done));

        let open = FormView::<Task>::open(api, Assignee::Vlada, "5").await;
        assert_eq!(open.record().map(|t| t.status), Some(TaskStatus::Todo));
    }

    #[tokio::test]
    async fn update_field_before_load_is_a_no_op() {
        let api = Arc::new(ScriptedApi::new(|_| Ok(None)));
        let mut view = FormView::<Customer>::new(api, (), "new");

        assert!(view.update_field("name", "Jan").is_ok());
        assert!(view.record().is_none());
    }

    #[tokio::test]
    async fn blank_required_field_never_reaches_the_api() {
        let api = Arc::new(ScriptedApi::new(|_| Ok(None)));
        let mut view = FormView::<User>::open(api.clone(), (), "new").await;

        view.update_field("name", "   ").unwrap();
        assert_eq!(view.save().await, None);
        assert!(view.error().is_some_and(ViewError::is_validation));

        view.update_field("name", "Eva").unwrap();
        view.update_field("email", " ").unwrap();
        assert_eq!(view.save().await, None);
        assert!(view.error().is_some_and(ViewError::is_validation));

        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn create_posts_and_returns_to_the_list() {
        let api = Arc::new(ScriptedApi::new(|request| {
            let mut created = request.body.clone().unwrap_or_default();
            created["id"] = json!(11);
            Ok(Some(created))
        }));
        let mut view = FormView::<Task>::open(api.clone(), Assignee::Peta, "new").await;

        view.update_field("title", "Prepare contract").unwrap();
        view.update_field("status", "done").unwrap();
        view.update_field("due_date", "").unwrap();

        let route = view.save().await;

        assert_eq!(route, Some(Route::list(Section::Tasks(Assignee::Peta))));
        let post = api
            .requests()
            .into_iter()
            .find(|r| r.method == Method::POST)
            .unwrap();
        assert_eq!(post.path, "/tasks");
        let body = post.body.unwrap();
        assert_eq!(body["assignee"], json!("peta"));
        assert_eq!(body["done"], json!(true));
        assert_eq!(body["due_date"], json!(null));
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn failed_update_keeps_the_draft() {
        let api = Arc::new(ScriptedApi::new(|request| {
            if request.method == Method::PUT {
                Err(server_error())
            } else {
                Ok(Some(json!({ "id": 3, "name": "Jan Novák", "status": "negotiation" })))
            }
        }));
        let mut view = FormView::<Customer>::open(api, (), "3").await;

        view.update_field("phone", "+420 777 123 456").unwrap();
        assert_eq!(view.save().await, None);

        assert_eq!(view.error_message().as_deref(), Some(Customer::MESSAGES.save_failed));
        let record = view.record().unwrap();
        assert_eq!(record.phone.as_deref(), Some("+420 777 123 456"));
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn failed_create_uses_the_create_message() {
        let api = Arc::new(ScriptedApi::new(|_| Err(server_error())));
        let mut view = FormView::<Customer>::open(api, (), "new").await;

        view.update_field("name", "Jan").unwrap();
        assert_eq!(view.save().await, None);
        assert_eq!(view.error_message().as_deref(), Some(Customer::MESSAGES.create_failed));
    }

    #[tokio::test]
    async fn delete_is_edit_only_and_confirmed() {
        let api = Arc::new(ScriptedApi::new(|request| {
            if request.method == Method::DELETE {
                Ok(None)
            } else {
                Ok(Some(json!({ "id": 3, "name": "Jan Novák" })))
            }
        }));

        let mut draft = FormView::<Customer>::open(api.clone(), (), "new").await;
        assert_eq!(draft.delete(&|_: &str| true).await, None);

        let mut view = FormView::<Customer>::open(api.clone(), (), "3").await;
        assert_eq!(view.delete(&|_: &str| false).await, None);
        assert_eq!(api.calls(Method::DELETE, "/customers/3"), 0);

        let route = view.delete(&|_: &str| true).await;
        assert_eq!(route, Some(Route::list(Section::Customers)));
        assert_eq!(api.calls(Method::DELETE, "/customers/3"), 1);
    }

    #[tokio::test]
    async fn failed_delete_stays_on_the_form() {
        let api = Arc::new(ScriptedApi::new(|request| {
            if request.method == Method::DELETE {
                Err(server_error())
            } else {
                Ok(Some(json!({ "id": 3, "name": "Jan Novák" })))
            }
        }));
        let mut view = FormView::<Customer>::open(api, (), "3").await;

        assert_eq!(view.delete(&|_: &str| true).await, None);
        assert_eq!(view.error_message().as_deref(), Some(Customer::MESSAGES.delete_failed));
        assert!(view.record().is_some());
    }
}
