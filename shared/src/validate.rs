//! Form values and their validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::Record;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Enter a valid email address";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Company,
    Phone,
    Website,
    Street,
    Suite,
    City,
    Zipcode,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        Self::Name,
        Self::Email,
        Self::Company,
        Self::Phone,
        Self::Website,
        Self::Street,
        Self::Suite,
        Self::City,
        Self::Zipcode,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Company => "company",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::Street => "street",
            Self::Suite => "suite",
            Self::City => "city",
            Self::Zipcode => "zipcode",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Flat, unvalidated form input. Company and address sub-fields are
/// flattened to plain strings.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub website: String,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

impl FormValues {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            company: record.company_name().to_string(),
            phone: record.phone.clone(),
            website: record.website.clone(),
            street: record.address.street.clone(),
            suite: record.address.suite.clone(),
            city: record.address.city.clone(),
            zipcode: record.address.zipcode.clone(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Company => &self.company,
            FormField::Phone => &self.phone,
            FormField::Website => &self.website,
            FormField::Street => &self.street,
            FormField::Suite => &self.suite,
            FormField::City => &self.city,
            FormField::Zipcode => &self.zipcode,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    /// Copy with every value trimmed.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let mut out = Self::default();
        for field in FormField::ALL {
            out.set(field, self.get(field).trim());
        }
        out
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Company => &mut self.company,
            FormField::Phone => &mut self.phone,
            FormField::Website => &mut self.website,
            FormField::Street => &mut self.street,
            FormField::Suite => &mut self.suite,
            FormField::City => &mut self.city,
            FormField::Zipcode => &mut self.zipcode,
        }
    }
}

/// Per-field error messages. Empty means the values may be committed.
pub type FieldErrors = BTreeMap<FormField, String>;

pub fn validate(values: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if values.name.trim().is_empty() {
        errors.insert(FormField::Name, NAME_REQUIRED.to_string());
    }

    let email = values.email.trim();
    if email.is_empty() {
        errors.insert(FormField::Email, EMAIL_REQUIRED.to_string());
    } else if !is_valid_email(email) {
        errors.insert(FormField::Email, EMAIL_INVALID.to_string());
    }

    errors
}

/// Syntactic check: one `@` with something before it, and a `.` after it
/// with characters on both sides. No whitespace anywhere.
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = candidate.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
