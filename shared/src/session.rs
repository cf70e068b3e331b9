//! The create/edit staging buffer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{
    Address, AddressPatch, Company, CompanyPatch, Record, RecordFields, RecordId, RecordPatch,
};
use crate::store::StoreHandle;
use crate::validate::{validate, FieldErrors, FormField, FormValues};
use crate::DEFAULT_COMPANY_FALLBACK;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Creating,
    Editing(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    Added(RecordId),
    /// `found` is false when the target disappeared before the commit.
    Patched { id: RecordId, found: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("no record is being created or edited")]
    Inactive,

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct EditSession {
    state: SessionState,
    values: FormValues,
    errors: FieldErrors,
    company_fallback: String,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(DEFAULT_COMPANY_FALLBACK)
    }
}

impl EditSession {
    pub fn new(company_fallback: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            values: FormValues::default(),
            errors: FieldErrors::new(),
            company_fallback: company_fallback.into(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        match &self.state {
            SessionState::Editing(id) => Some(id),
            _ => None,
        }
    }

    /// Name and email both non-blank; mirrors the submit button's enabled
    /// state, not full validation.
    pub fn submit_enabled(&self) -> bool {
        !self.values.name.trim().is_empty() && !self.values.email.trim().is_empty()
    }

    pub fn begin_create(&mut self) {
        self.reset(SessionState::Creating);
        debug!("create session started");
    }

    pub fn begin_edit(&mut self, record: &Record) {
        self.reset(SessionState::Editing(record.id().clone()));
        self.values = FormValues::from_record(record);
        debug!(record_id = %record.id(), "edit session started");
    }

    /// Typing into an idle form opens a create session.
    ///
    /// This extends the explicit [`EditSession::begin_create`] entry point
    /// for shells that keep the form on screen at all times; the first
    /// keystroke stands in for `CreateStarted`.
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Creating;
        }
        self.values.set(field, value);
        self.errors.remove(&field);
    }

    /// Validates and applies the buffer to `store`.
    ///
    /// On validation failure the session stays open and keeps the errors.
    pub fn commit(&mut self, store: &StoreHandle) -> Result<Committed, CommitError> {
        if self.state == SessionState::Idle {
            return Err(CommitError::Inactive);
        }

        let errors = validate(&self.values);
        if !errors.is_empty() {
            debug!(invalid_fields = errors.len(), "commit rejected");
            self.errors = errors.clone();
            return Err(CommitError::Invalid(errors));
        }

        let values = self.values.trimmed();
        let company_name = if values.company.is_empty() {
            self.company_fallback.clone()
        } else {
            values.company
        };

        let committed = match &self.state {
            SessionState::Editing(id) => {
                let patch = RecordPatch {
                    name: Some(values.name),
                    email: Some(values.email),
                    phone: Some(values.phone),
                    website: Some(values.website),
                    company: Some(CompanyPatch {
                        name: Some(company_name),
                        ..CompanyPatch::default()
                    }),
                    address: Some(AddressPatch {
                        street: Some(values.street),
                        suite: Some(values.suite),
                        city: Some(values.city),
                        zipcode: Some(values.zipcode),
                    }),
                };
                let found = store.patch(id, patch);
                Committed::Patched {
                    id: id.clone(),
                    found,
                }
            }
            _ => {
                let fields = RecordFields {
                    name: values.name,
                    email: values.email,
                    phone: values.phone,
                    website: values.website,
                    company: Company::named(company_name),
                    address: Address {
                        street: values.street,
                        suite: values.suite,
                        city: values.city,
                        zipcode: values.zipcode,
                    },
                };
                Committed::Added(store.add(fields))
            }
        };

        debug!(?committed, "session committed");
        self.reset(SessionState::Idle);
        Ok(committed)
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!("session cancelled");
        }
        self.reset(SessionState::Idle);
    }

    fn reset(&mut self, state: SessionState) {
        self.state = state;
        self.values = FormValues::default();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Origin;
    use crate::validate::{EMAIL_INVALID, NAME_REQUIRED};

    fn remote_record() -> Record {
        Record::remote(
            1u64,
            RecordFields {
                name: "Leanne Graham".into(),
                email: "Sincere@april.biz".into(),
                phone: "1-770-736-8031".into(),
                website: "hildegard.org".into(),
                company: Company {
                    name: "Romaguera-Crona".into(),
                    catch_phrase: "Multi-layered".into(),
                    bs: "e-markets".into(),
                },
                address: Address {
                    street: "Kulas Light".into(),
                    suite: "Apt. 556".into(),
                    city: "Gwenborough".into(),
                    zipcode: "92998-3874".into(),
                },
            },
        )
    }

    fn seeded_store() -> StoreHandle {
        let store = StoreHandle::default();
        store.write(|s| s.replace_all(vec![remote_record()]));
        store
    }

    #[test]
    fn begin_edit_flattens_the_record() {
        let mut session = EditSession::default();
        session.begin_edit(&remote_record());

        assert_eq!(session.state(), &SessionState::Editing(RecordId::from("1")));
        let values = session.values();
        assert_eq!(values.company, "Romaguera-Crona");
        assert_eq!(values.street, "Kulas Light");
        assert_eq!(values.zipcode, "92998-3874");
        assert_eq!(values.website, "hildegard.org");
    }

    #[test]
    fn invalid_commit_keeps_session_open_and_store_untouched() {
        let store = seeded_store();
        let mut session = EditSession::default();
        session.begin_create();
        session.update_field(FormField::Email, "x");

        let err = session.commit(&store).unwrap_err();

        let CommitError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors[&FormField::Name], NAME_REQUIRED);
        assert_eq!(errors[&FormField::Email], EMAIL_INVALID);
        assert_eq!(session.errors(), &errors);
        assert_eq!(session.state(), &SessionState::Creating);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn updating_a_field_clears_only_its_error() {
        let store = StoreHandle::default();
        let mut session = EditSession::default();
        session.begin_create();
        assert!(session.commit(&store).is_err());
        assert_eq!(session.errors().len(), 2);

        session.update_field(FormField::Name, "Ann");

        assert!(!session.errors().contains_key(&FormField::Name));
        assert!(session.errors().contains_key(&FormField::Email));
    }

    #[test]
    fn create_commit_trims_and_applies_company_fallback() {
        let store = seeded_store();
        let mut session = EditSession::default();
        session.begin_create();
        session.update_field(FormField::Name, "  Ann Lee ");
        session.update_field(FormField::Email, " ann@example.com ");
        session.update_field(FormField::City, " Paris ");
        session.update_field(FormField::Company, "   ");

        let Committed::Added(id) = session.commit(&store).unwrap() else {
            panic!("expected an add");
        };

        let first = &store.snapshot()[0];
        assert_eq!(first.id(), &id);
        assert_eq!(first.origin(), Origin::Local);
        assert_eq!(first.name, "Ann Lee");
        assert_eq!(first.email, "ann@example.com");
        assert_eq!(first.address.city, "Paris");
        assert_eq!(first.company_name(), "Local Company");
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.values(), &FormValues::default());
    }

    #[test]
    fn edit_commit_patches_in_place_and_keeps_company_extras() {
        let store = seeded_store();
        let mut session = EditSession::new("Fallback Inc");
        session.begin_edit(&remote_record());
        session.update_field(FormField::Email, "new@x.com");
        session.update_field(FormField::Company, "");

        let committed = session.commit(&store).unwrap();

        assert_eq!(
            committed,
            Committed::Patched {
                id: RecordId::from("1"),
                found: true
            }
        );
        let record = store.find("1").unwrap();
        assert_eq!(record.email, "new@x.com");
        assert_eq!(record.company.name, "Fallback Inc");
        assert_eq!(record.company.catch_phrase, "Multi-layered");
        assert_eq!(record.origin(), Origin::Remote);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn edit_commit_against_removed_record_is_harmless() {
        let store = seeded_store();
        let mut session = EditSession::default();
        session.begin_edit(&remote_record());
        store.remove("1");

        let committed = session.commit(&store).unwrap();

        assert!(matches!(committed, Committed::Patched { found: false, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn cancel_discards_the_buffer() {
        let store = seeded_store();
        let mut session = EditSession::default();
        session.begin_edit(&remote_record());
        session.update_field(FormField::Name, "Changed");

        session.cancel();

        assert!(!session.is_open());
        assert_eq!(session.values(), &FormValues::default());
        assert_eq!(store.find("1").unwrap().name, "Leanne Graham");
    }

    #[test]
    fn idle_commit_is_rejected() {
        let store = StoreHandle::default();
        let mut session = EditSession::default();
        assert_eq!(session.commit(&store), Err(CommitError::Inactive));
        assert!(store.is_empty());
    }

    #[test]
    fn typing_into_idle_form_starts_create() {
        let mut session = EditSession::default();
        session.update_field(FormField::Name, "A");
        assert_eq!(session.state(), &SessionState::Creating);
        assert!(!session.submit_enabled());
        session.update_field(FormField::Email, "a@b.co");
        assert!(session.submit_enabled());
    }
}
