//! Search and sort projection of the collection.

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

use crate::model::Record;
use crate::store::RecordStore;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Collection order.
    #[default]
    Default,
    NameAsc,
    NameDesc,
    EmailAsc,
    CompanyAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        Self::Default,
        Self::NameAsc,
        Self::NameDesc,
        Self::EmailAsc,
        Self::CompanyAsc,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::EmailAsc => "email-asc",
            Self::CompanyAsc => "company-asc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default order",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::EmailAsc => "Email (A-Z)",
            Self::CompanyAsc => "Company (A-Z)",
        }
    }

    fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::NameAsc => compare_folded(&a.name, &b.name),
            Self::NameDesc => compare_folded(&b.name, &a.name),
            Self::EmailAsc => compare_folded(&a.email, &b.email),
            Self::CompanyAsc => compare_folded(a.company_name(), b.company_name()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key '{0}'")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// Filters `records` by `search` and orders the survivors by `sort`.
///
/// The input is never reordered; sorting happens on a separate vector, and
/// equal keys keep their collection order.
pub fn derive<'a>(records: &'a [Record], search: &str, sort: SortKey) -> Vec<&'a Record> {
    let query = search.trim().to_lowercase();
    let mut visible: Vec<&Record> = records
        .iter()
        .filter(|record| matches_query(record, &query))
        .collect();

    if sort != SortKey::Default {
        visible.sort_by(|a, b| sort.compare(a, b));
    }
    visible
}

/// `query` must already be trimmed and lowercased. Empty matches everything.
fn matches_query(record: &Record, query: &str) -> bool {
    query.is_empty()
        || record.name.to_lowercase().contains(query)
        || record.email.to_lowercase().contains(query)
}

/// Root-locale collator at secondary strength: accents count, case does not.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(CollatorPreferences::default(), options)
        .map_err(|error| warn!(%error, "collator unavailable, sorting by code point"))
        .ok()
});

/// Locale-aware, case-insensitive order. Strings that differ only in case
/// compare equal.
pub fn compare_folded(a: &str, b: &str) -> Ordering {
    match COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => folded(a).cmp(folded(b)),
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Memoized [`derive`]: recomputes only when the store revision, the search
/// text, or the sort key differs from the previous call.
#[derive(Debug, Default)]
pub struct ViewProjector {
    key: Option<(u64, String, SortKey)>,
    visible: Vec<Record>,
    recomputations: u64,
}

impl ViewProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&mut self, store: &RecordStore, search: &str, sort: SortKey) -> &[Record] {
        let fresh = matches!(
            &self.key,
            Some((revision, cached_search, cached_sort))
                if *revision == store.revision() && cached_search == search && *cached_sort == sort
        );
        if !fresh {
            self.visible = derive(store.records(), search, sort)
                .into_iter()
                .cloned()
                .collect();
            self.key = Some((store.revision(), search.to_string(), sort));
            self.recomputations += 1;
        }
        &self.visible
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
