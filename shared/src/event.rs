use serde::{Deserialize, Serialize};

use crate::capabilities::HttpResult;
use crate::config::DirectoryConfig;
use crate::model::{RecordFields, RecordId};
use crate::validate::FormField;
use crate::view::SortKey;

/// Intents a shell can send to [`crate::Directory`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Starts over with a new configuration. Any load in flight is dropped.
    Configure(Box<DirectoryConfig>),

    // Loading
    LoadRequested,

    // Create / edit form
    CreateStarted,
    EditRequested { id: RecordId },
    FieldChanged { field: FormField, value: String },
    Submitted,
    EditCancelled,

    // Direct collection changes (boxed to keep enum size small)
    AddRequested(Box<RecordFields>),
    DeleteRequested { id: RecordId },
    DeleteConfirmed,
    DeleteDeclined,

    // View
    SearchChanged { text: String },
    SortChanged { key: SortKey },

    // Capability responses (internal; shells never send these)
    #[serde(skip)]
    RecordsFetched {
        request_id: String,
        result: Box<HttpResult>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::LoadRequested => "load_requested",
            Self::CreateStarted => "create_started",
            Self::EditRequested { .. } => "edit_requested",
            Self::FieldChanged { .. } => "field_changed",
            Self::Submitted => "submitted",
            Self::EditCancelled => "edit_cancelled",
            Self::AddRequested(_) => "add_requested",
            Self::DeleteRequested { .. } => "delete_requested",
            Self::DeleteConfirmed => "delete_confirmed",
            Self::DeleteDeclined => "delete_declined",
            Self::SearchChanged { .. } => "search_changed",
            Self::SortChanged { .. } => "sort_changed",
            Self::RecordsFetched { .. } => "records_fetched",
        }
    }
}
