//! Read-only detail presentation of a single record.

use serde::{Deserialize, Serialize};

use crate::model::{Origin, Record, RecordId};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RecordDetail {
    pub id: RecordId,
    pub origin: Origin,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    /// Display text of the website, `None` when the record has none.
    pub website: Option<String>,
    /// Absolute link for `website`.
    pub website_link: Option<String>,
}

impl RecordDetail {
    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }
}

impl From<&Record> for RecordDetail {
    fn from(record: &Record) -> Self {
        let address = record.address.parts().collect::<Vec<_>>().join(", ");
        let website = non_empty(&record.website).map(str::to_string);
        let website_link = website.as_deref().map(website_link);

        Self {
            id: record.id().clone(),
            origin: record.origin(),
            name: record.name.clone(),
            email: or_not_available(&record.email),
            phone: or_not_available(&record.phone),
            company: or_not_available(record.company_name()),
            address: or_not_available(&address),
            website,
            website_link,
        }
    }
}

/// Prefixes `https://` unless the value already names a scheme.
pub fn website_link(site: &str) -> String {
    if site.starts_with("http") {
        site.to_string()
    } else {
        format!("https://{site}")
    }
}

/// Values are shown as stored; only the empty string counts as missing.
fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn or_not_available(value: &str) -> String {
    non_empty(value).unwrap_or(NOT_AVAILABLE).to_string()
}
