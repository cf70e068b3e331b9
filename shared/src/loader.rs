//! One-shot remote fetch of the initial collection.
//!
//! The loader owns its lifecycle (`Idle -> Loading -> Loaded | Failed`) and
//! writes into the store only through [`RecordStore::replace_all`]. The
//! request itself is a `crux_http` effect; [`RemoteLoader::start`] decides
//! whether to issue one and [`RemoteLoader::finish`] applies the answer.
//! The in-flight request holds a [`WeakStore`], so an answer that arrives
//! after its store was torn down is discarded instead of written.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::capabilities::{HttpError, HttpResponse, HttpResult, ValidatedUrl};
use crate::config::ReloadPolicy;
use crate::model::{Address, Company, Record, RecordFields, RecordId};
use crate::store::{RecordStore, StoreHandle, WeakStore};
use crate::{AppError, ErrorKind, DEFAULT_ENDPOINT};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to fetch records: {0}")]
    Transport(#[from] HttpError),

    #[error("Failed to fetch records (HTTP {status})")]
    Status { status: u16 },

    #[error("Failed to fetch records: {reason}")]
    Decode { reason: String },
}

impl LoadError {
    #[must_use]
    pub fn to_app_error(&self) -> AppError {
        match self {
            Self::Transport(_) => AppError::new(ErrorKind::Network, self.to_string()),
            Self::Status { status } => AppError::from_http_status(*status),
            Self::Decode { .. } => AppError::new(ErrorKind::Deserialization, self.to_string()),
        }
    }
}

/// What [`RemoteLoader::finish`] did with an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed(LoadError),
    /// The answer was stale or its store was dropped; nothing was written.
    Discarded,
}

#[derive(Debug, Clone)]
struct InFlight {
    request_id: String,
    store: WeakStore,
}

#[derive(Debug, Clone)]
pub struct RemoteLoader {
    endpoint: String,
    policy: ReloadPolicy,
    state: LoadState,
    last_error: Option<LoadError>,
    in_flight: Option<InFlight>,
}

impl Default for RemoteLoader {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            policy: ReloadPolicy::default(),
            state: LoadState::Idle,
            last_error: None,
            in_flight: None,
        }
    }
}

impl RemoteLoader {
    pub fn new(endpoint: &ValidatedUrl, policy: ReloadPolicy) -> Self {
        Self {
            endpoint: endpoint.as_str().to_string(),
            policy,
            ..Self::default()
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Id of the request in flight, if any.
    pub fn pending_request(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|f| f.request_id.as_str())
    }

    /// Moves to `Loading` and returns the id of the request to issue.
    ///
    /// Returns `None` when a load is in flight, a previous load failed, or
    /// the collection already holds records.
    pub fn start(&mut self, store: &StoreHandle) -> Option<String> {
        let skip = match self.state {
            LoadState::Loading | LoadState::Failed(_) => true,
            LoadState::Idle | LoadState::Loaded => !store.is_empty(),
        };
        if skip {
            debug!(state = ?self.state, "load skipped");
            return None;
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(%request_id, endpoint = %self.endpoint, "fetching records");
        self.state = LoadState::Loading;
        self.last_error = None;
        self.in_flight = Some(InFlight {
            request_id: request_id.clone(),
            store: store.downgrade(),
        });
        Some(request_id)
    }

    /// Applies the answer to the request started as `request_id`.
    ///
    /// Failures leave the collection untouched.
    pub fn finish(&mut self, request_id: &str, result: HttpResult) -> LoadOutcome {
        let Some(in_flight) = self.in_flight.take_if(|f| f.request_id == request_id) else {
            debug!(%request_id, "stale answer discarded");
            return LoadOutcome::Discarded;
        };
        let Some(handle) = in_flight.store.upgrade() else {
            debug!(%request_id, "load discarded: store dropped during fetch");
            self.state = LoadState::Idle;
            return LoadOutcome::Discarded;
        };

        match result.map_err(LoadError::from).and_then(|r| decode(&r)) {
            Ok(records) => {
                let count = records.len();
                let policy = self.policy;
                handle.write(|store| install(store, records, policy));
                self.state = LoadState::Loaded;
                info!(count, "records loaded");
                LoadOutcome::Loaded { count }
            }
            Err(error) => {
                warn!(%error, "load failed");
                self.state = LoadState::Failed(error.to_string());
                self.last_error = Some(error.clone());
                LoadOutcome::Failed(error)
            }
        }
    }
}

fn decode(response: &HttpResponse) -> Result<Vec<Record>, LoadError> {
    if !response.is_success() {
        return Err(LoadError::Status {
            status: response.status(),
        });
    }
    let remote: Vec<RemoteRecord> = response.json().map_err(|e| LoadError::Decode {
        reason: e.to_string(),
    })?;
    Ok(remote.into_iter().map(Record::from).collect())
}

fn install(store: &mut RecordStore, remote: Vec<Record>, policy: ReloadPolicy) {
    match policy {
        ReloadPolicy::ReplaceAll => store.replace_all(remote),
        ReloadPolicy::PreserveLocal => {
            let local: Vec<Record> = store.local_records().cloned().collect();
            debug!(kept = local.len(), "keeping local records ahead of remote");
            store.replace_all(local.into_iter().chain(remote));
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Number(u64),
    Text(String),
}

impl From<RemoteId> for RecordId {
    fn from(id: RemoteId) -> Self {
        match id {
            RemoteId::Number(n) => RecordId::from(n),
            RemoteId::Text(s) => RecordId::from(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteRecord {
    id: RemoteId,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    company: Option<RemoteCompany>,
    address: Option<RemoteAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteCompany {
    name: Option<String>,
    catch_phrase: Option<String>,
    bs: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteAddress {
    street: Option<String>,
    suite: Option<String>,
    city: Option<String>,
    zipcode: Option<String>,
}

impl From<RemoteRecord> for Record {
    fn from(remote: RemoteRecord) -> Self {
        let company = remote.company.unwrap_or_default();
        let address = remote.address.unwrap_or_default();
        Record::remote(
            remote.id,
            RecordFields {
                name: remote.name.unwrap_or_default(),
                email: remote.email.unwrap_or_default(),
                phone: remote.phone.unwrap_or_default(),
                website: remote.website.unwrap_or_default(),
                company: Company {
                    name: company.name.unwrap_or_default(),
                    catch_phrase: company.catch_phrase.unwrap_or_default(),
                    bs: company.bs.unwrap_or_default(),
                },
                address: Address {
                    street: address.street.unwrap_or_default(),
                    suite: address.suite.unwrap_or_default(),
                    city: address.city.unwrap_or_default(),
                    zipcode: address.zipcode.unwrap_or_default(),
                },
            },
        )
    }
}
