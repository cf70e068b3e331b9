//! The Crux app a shell drives: intents in, a serializable read model out.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capabilities::{into_http_result, Capabilities};
use crate::config::{ConfigError, DirectoryConfig};
use crate::detail::RecordDetail;
use crate::event::Event;
use crate::loader::{LoadOutcome, LoadState, RemoteLoader};
use crate::model::{Record, RecordId};
use crate::session::{CommitError, EditSession, SessionState};
use crate::store::{RecordStore, StoreHandle};
use crate::validate::{FieldErrors, FormValues};
use crate::view::{SortKey, ViewProjector};

/// Prompt text shown before `record` is deleted.
pub fn delete_prompt(record: &Record) -> String {
    format!("Delete user \"{}\"?", record.name)
}

/// A deletion waiting for the shell's yes/no answer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: RecordId,
    pub prompt: String,
}

/// Everything a shell needs to render the directory.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    /// Visible records after search and sort.
    pub records: Vec<Record>,
    pub visible_count: usize,
    pub total_count: usize,
    pub load_state: LoadState,
    pub is_loading: bool,
    /// Banner text for a failed load.
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    /// Loaded without error, yet nothing matches.
    pub is_empty_result: bool,
    pub search: String,
    pub sort: SortKey,
    pub session: SessionState,
    pub is_editing: bool,
    pub form: FormValues,
    pub form_errors: FieldErrors,
    pub submit_enabled: bool,
    /// Set while a delete waits for [`Event::DeleteConfirmed`] or
    /// [`Event::DeleteDeclined`].
    pub pending_delete: Option<DeletePrompt>,
}

#[derive(Debug, Default)]
pub struct Model {
    store: StoreHandle,
    loader: RemoteLoader,
    session: EditSession,
    projector: Mutex<ViewProjector>,
    search: String,
    sort: SortKey,
    pending_delete: Option<RecordId>,
}

impl Model {
    pub fn new(config: &DirectoryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        debug!(host = endpoint.host(), policy = ?config.reload_policy(), "directory configured");

        Ok(Self {
            store: StoreHandle::new(RecordStore::with_id_prefix(&config.local_id_prefix)),
            loader: RemoteLoader::new(&endpoint, config.reload_policy()),
            session: EditSession::new(&config.local_company_fallback),
            ..Self::default()
        })
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn loader(&self) -> &RemoteLoader {
        &self.loader
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn detail(&self, id: impl AsRef<str>) -> Option<RecordDetail> {
        self.store.find(id).as_ref().map(RecordDetail::from)
    }

    fn projector(&self) -> MutexGuard<'_, ViewProjector> {
        self.projector.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the record and closes the edit session if it was the one
    /// under edit.
    fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let removed = self.store.remove(id);
        if self.session.editing_id() == Some(id) {
            self.session.cancel();
        }
        removed
    }
}

#[derive(Default)]
pub struct Directory;

impl crux_core::App for Directory {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::Configure(config) => match Model::new(&config) {
                Ok(fresh) => {
                    *model = fresh;
                    caps.render.render();
                }
                Err(error) => warn!(%error, "configuration rejected"),
            },

            Event::LoadRequested => {
                if let Some(request_id) = model.loader.start(&model.store) {
                    caps.http
                        .get(model.loader.endpoint())
                        .header("Accept", "application/json")
                        .send(move |result| Event::RecordsFetched {
                            request_id: request_id.clone(),
                            result: Box::new(into_http_result(result)),
                        });
                    caps.render.render();
                }
            }

            Event::RecordsFetched { request_id, result } => {
                if model.loader.finish(&request_id, *result) != LoadOutcome::Discarded {
                    caps.render.render();
                }
            }

            Event::CreateStarted => {
                model.session.begin_create();
                caps.render.render();
            }

            Event::EditRequested { id } => {
                if let Some(record) = model.store.find(&id) {
                    model.session.begin_edit(&record);
                    caps.render.render();
                }
            }

            Event::FieldChanged { field, value } => {
                model.session.update_field(field, value);
                caps.render.render();
            }

            // Validation failures render their messages too.
            Event::Submitted => match model.session.commit(&model.store) {
                Ok(_) | Err(CommitError::Invalid(_)) => caps.render.render(),
                Err(CommitError::Inactive) => {}
            },

            Event::EditCancelled => {
                model.session.cancel();
                caps.render.render();
            }

            Event::AddRequested(fields) => {
                model.store.add(*fields);
                caps.render.render();
            }

            Event::DeleteRequested { id } => {
                if model.store.find(&id).is_some() {
                    model.pending_delete = Some(id);
                    caps.render.render();
                }
            }

            Event::DeleteConfirmed => {
                if let Some(id) = model.pending_delete.take() {
                    model.remove(&id);
                    caps.render.render();
                }
            }

            Event::DeleteDeclined => {
                if let Some(id) = model.pending_delete.take() {
                    debug!(record_id = %id, "remove declined");
                    caps.render.render();
                }
            }

            Event::SearchChanged { text } => {
                model.search = text;
                caps.render.render();
            }

            Event::SortChanged { key } => {
                model.sort = key;
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let load_state = model.loader.state().clone();
        let error = model.loader.last_error().map(|e| e.to_app_error());

        let (records, total_count) = model.store.read(|store| {
            let mut projector = model.projector();
            let visible = projector.project(store, &model.search, model.sort);
            (visible.to_vec(), store.len())
        });
        let visible_count = records.len();

        let pending_delete = model
            .pending_delete
            .as_ref()
            .and_then(|id| model.store.find(id))
            .map(|record| DeletePrompt {
                prompt: delete_prompt(&record),
                id: record.id().clone(),
            });

        ViewModel {
            is_empty_result: load_state == LoadState::Loaded && visible_count == 0,
            is_loading: load_state.is_loading(),
            error_message: error.as_ref().map(crate::AppError::user_facing_message),
            error_code: error.map(|e| e.code().to_string()),
            load_state,
            records,
            visible_count,
            total_count,
            search: model.search.clone(),
            sort: model.sort,
            session: model.session.state().clone(),
            is_editing: model.session.editing_id().is_some(),
            form: model.session.values().clone(),
            form_errors: model.session.errors().clone(),
            submit_enabled: model.session.submit_enabled(),
            pending_delete,
        }
    }
}
