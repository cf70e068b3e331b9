use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Record identifier in its normalized string form.
///
/// Remote ids arrive as numbers and are stored as their decimal string, so
/// every lookup is plain string equality.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a locally created record: `prefix` followed by a v4 UUID.
    pub fn generate_local(prefix: &str) -> Self {
        Self(format!("{prefix}{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Remote,
    Local,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

impl Company {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// One-level merge: every sub-field present in `patch` overwrites, every
    /// absent one is kept.
    pub fn merge(&mut self, patch: CompanyPatch) {
        overwrite(&mut self.name, patch.name);
        overwrite(&mut self.catch_phrase, patch.catch_phrase);
        overwrite(&mut self.bs, patch.bs);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

impl Address {
    /// Same contract as [`Company::merge`].
    pub fn merge(&mut self, patch: AddressPatch) {
        overwrite(&mut self.street, patch.street);
        overwrite(&mut self.suite, patch.suite);
        overwrite(&mut self.city, patch.city);
        overwrite(&mut self.zipcode, patch.zipcode);
    }

    /// Non-empty parts in display order.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.street, &self.suite, &self.city, &self.zipcode]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
    }
}

/// Field values for a record that does not exist yet.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RecordFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company: Company,
    pub address: Address,
}

/// A directory entry.
///
/// `id` and `origin` are fixed at construction; everything else changes only
/// through [`Record::apply_patch`].
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    origin: Origin,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company: Company,
    pub address: Address,
}

impl Record {
    pub fn remote(id: impl Into<RecordId>, fields: RecordFields) -> Self {
        Self::with_origin(id.into(), Origin::Remote, fields)
    }

    pub(crate) fn local(id: RecordId, fields: RecordFields) -> Self {
        Self::with_origin(id, Origin::Local, fields)
    }

    fn with_origin(id: RecordId, origin: Origin, fields: RecordFields) -> Self {
        let RecordFields {
            name,
            email,
            phone,
            website,
            company,
            address,
        } = fields;
        Self {
            id,
            origin,
            name,
            email,
            phone,
            website,
            company,
            address,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }

    /// Company name, empty when the record has none.
    pub fn company_name(&self) -> &str {
        &self.company.name
    }

    pub fn apply_patch(&mut self, patch: RecordPatch) {
        let RecordPatch {
            name,
            email,
            phone,
            website,
            company,
            address,
        } = patch;
        overwrite(&mut self.name, name);
        overwrite(&mut self.email, email);
        overwrite(&mut self.phone, phone);
        overwrite(&mut self.website, website);
        if let Some(company) = company {
            self.company.merge(company);
        }
        if let Some(address) = address {
            self.address.merge(address);
        }
    }
}

// Redact debug output because records hold personal contact data.
impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("name_len", &self.name.len())
            .field("email_present", &!self.email.is_empty())
            .field("phone_present", &!self.phone.is_empty())
            .field("website_present", &!self.website.is_empty())
            .field("company_present", &!self.company.name.is_empty())
            .field("address_parts", &self.address.parts().count())
            .finish()
    }
}

/// Partial update of a record. `None` means "leave unchanged".
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub company: Option<CompanyPatch>,
    pub address: Option<AddressPatch>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    #[must_use]
    pub fn company(mut self, company: CompanyPatch) -> Self {
        self.company = Some(company);
        self
    }

    #[must_use]
    pub fn address(mut self, address: AddressPatch) -> Self {
        self.address = Some(address);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub catch_phrase: Option<String>,
    pub bs: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub suite: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
}

fn overwrite(slot: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *slot = value;
    }
}
