use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;

use super::{
    binding::{BindingError, MemoryBinding, StringBinding},
    entry::{not_blank, Entry, ValidationError},
    presenter::ErrorPresenter,
};
use crate::service::accounts::{Account, AccountsService, NewAccount, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    GarageNumber,
    FullName,
    PhoneNumber,
    Address,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::GarageNumber,
        Field::FullName,
        Field::PhoneNumber,
        Field::Address,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::GarageNumber => "garage number",
            Field::FullName => "full name",
            Field::PhoneNumber => "phone",
            Field::Address => "address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub error: ValidationError,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.error)
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid input: {}", describe(.0))]
    Invalid(Vec<FieldError>),
    #[error("{field} binding error: {source}")]
    Binding {
        field: Field,
        #[source]
        source: BindingError,
    },
    #[error("account error: {0}")]
    Account(#[source] StoreError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Invalid,
    Populating,
    Submitting,
    Succeeded,
    Failed,
}

/// Collects garage number, full name, phone and address, and creates the
/// account once every field is filled in.
pub struct CreateAccountForm {
    accounts: Arc<dyn AccountsService>,
    presenter: Arc<dyn ErrorPresenter>,
    garage_number: Entry,
    full_name: Entry,
    phone_number: Entry,
    address: Entry,
    state: Mutex<FormState>,
}

impl CreateAccountForm {
    pub fn new(accounts: Arc<dyn AccountsService>, presenter: Arc<dyn ErrorPresenter>) -> Self {
        Self::with_bindings(accounts, presenter, |_| {
            Arc::new(MemoryBinding::new()) as Arc<dyn StringBinding>
        })
    }

    /// Builds the form with a caller-supplied binding per field.
    pub fn with_bindings(
        accounts: Arc<dyn AccountsService>,
        presenter: Arc<dyn ErrorPresenter>,
        mut binding_for: impl FnMut(Field) -> Arc<dyn StringBinding>,
    ) -> Self {
        let mut entry = |field: Field| {
            Entry::with_data(binding_for(field))
                .placeholder(field.label())
                .validator(not_blank)
        };

        Self {
            accounts,
            presenter,
            garage_number: entry(Field::GarageNumber),
            full_name: entry(Field::FullName),
            phone_number: entry(Field::PhoneNumber),
            address: entry(Field::Address),
            state: Mutex::new(FormState::Idle),
        }
    }

    pub fn entry(&self, field: Field) -> &Entry {
        match field {
            Field::GarageNumber => &self.garage_number,
            Field::FullName => &self.full_name,
            Field::PhoneNumber => &self.phone_number,
            Field::Address => &self.address,
        }
    }

    /// Types `value` into the entry for `field`.
    pub fn fill(&self, field: Field, value: impl Into<String>) -> Result<(), FormError> {
        self.entry(field)
            .set_text(value)
            .map_err(|source| FormError::Binding { field, source })
    }

    #[allow(dead_code)]
    pub fn state(&self) -> FormState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: FormState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = ?*state, to = ?next, "form: state");
        *state = next;
    }

    /// Validates, copies the bound values into a new account and inserts it.
    /// Every failure is shown through the presenter exactly once.
    pub async fn submit(&self) -> Result<Account, FormError> {
        let result = self.run_submit().await;
        if let Err(err) = &result {
            self.presenter.show_error(err);
        }
        self.transition(FormState::Idle);
        result
    }

    async fn run_submit(&self) -> Result<Account, FormError> {
        self.transition(FormState::Validating);
        let failures: Vec<FieldError> = Field::ALL
            .into_iter()
            .filter_map(|field| {
                self.entry(field)
                    .validate()
                    .err()
                    .map(|error| FieldError { field, error })
            })
            .collect();
        if !failures.is_empty() {
            self.transition(FormState::Invalid);
            return Err(FormError::Invalid(failures));
        }

        self.transition(FormState::Populating);
        let input = match self.populate() {
            Ok(input) => input,
            Err(err) => {
                self.transition(FormState::Failed);
                return Err(err);
            }
        };

        self.transition(FormState::Submitting);
        match self.accounts.insert(input).await {
            Ok(account) => {
                self.transition(FormState::Succeeded);
                Ok(account)
            }
            Err(err) => {
                self.transition(FormState::Failed);
                Err(FormError::Account(err))
            }
        }
    }

    fn populate(&self) -> Result<NewAccount, FormError> {
        let read = |field: Field| {
            self.entry(field)
                .bound_value()
                .map_err(|source| FormError::Binding { field, source })
        };

        Ok(NewAccount {
            garage_number: read(Field::GarageNumber)?,
            full_name: read(Field::FullName)?,
            phone_number: Some(read(Field::PhoneNumber)?),
            address: Some(read(Field::Address)?),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::accounts,
        repo::{accounts::SeaOrmAccountsRepo, payments::SeaOrmPaymentsRepo, rates::SeaOrmRatesRepo},
        service::accounts::{AccountsServiceImpl, SearchQuery},
        state::testing::memory_db,
    };
    use async_trait::async_trait;
    use sea_orm::DbErr;

    #[derive(Default)]
    struct FakeAccounts {
        inserted: Mutex<Vec<NewAccount>>,
        fail_insert: bool,
    }

    impl FakeAccounts {
        fn inserted(&self) -> Vec<NewAccount> {
            self.inserted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountsService for FakeAccounts {
        async fn search(&self, _query: SearchQuery) -> Result<Vec<Account>, StoreError> {
            Ok(Vec::new())
        }

        async fn get_all(&self) -> Result<Vec<Account>, StoreError> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, id: i32) -> Result<Account, StoreError> {
            Err(StoreError::NotFound(id))
        }

        async fn insert(&self, input: NewAccount) -> Result<Account, StoreError> {
            if self.fail_insert {
                self.inserted.lock().unwrap().push(input);
                return Err(StoreError::Create(DbErr::Custom("disk full".to_string())));
            }

            let mut inserted = self.inserted.lock().unwrap();
            let now = chrono::Utc::now();
            let account = accounts::Model {
                id: inserted.len() as i32 + 1,
                garage_number: input.garage_number.clone(),
                full_name: input.full_name.clone(),
                phone_number: input.phone_number.clone(),
                address: input.address.clone(),
                debt: input.debt,
                electricity_number: input.electricity_number,
                created_at: now.into(),
                updated_at: now.into(),
                deleted_at: None,
            };
            inserted.push(input);
            Ok(Account {
                account,
                payments: Vec::new(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingPresenter {
        shown: Mutex<Vec<String>>,
    }

    impl RecordingPresenter {
        fn shown(&self) -> Vec<String> {
            self.shown.lock().unwrap().clone()
        }
    }

    impl ErrorPresenter for RecordingPresenter {
        fn show_error(&self, err: &FormError) {
            self.shown.lock().unwrap().push(err.to_string());
        }
    }

    struct BrokenBinding;

    impl StringBinding for BrokenBinding {
        fn get(&self) -> Result<String, BindingError> {
            Err(BindingError::Poisoned)
        }

        fn set(&self, _value: String) -> Result<(), BindingError> {
            Ok(())
        }
    }

    fn form_with(
        accounts: Arc<FakeAccounts>,
        presenter: Arc<RecordingPresenter>,
    ) -> CreateAccountForm {
        CreateAccountForm::new(accounts, presenter)
    }

    fn fill_all(form: &CreateAccountForm, values: [&str; 4]) {
        for (field, value) in Field::ALL.into_iter().zip(values) {
            form.fill(field, value).unwrap();
        }
    }

    #[tokio::test]
    async fn blank_required_field_never_inserts() {
        for blank in Field::ALL {
            let accounts = Arc::new(FakeAccounts::default());
            let presenter = Arc::new(RecordingPresenter::default());
            let form = form_with(accounts.clone(), presenter.clone());

            for field in Field::ALL {
                let value = if field == blank { "   " } else { "value" };
                form.fill(field, value).unwrap();
            }

            let err = form.submit().await.unwrap_err();
            match err {
                FormError::Invalid(ref failures) => {
                    assert_eq!(
                        failures,
                        &vec![FieldError {
                            field: blank,
                            error: ValidationError::Blank,
                        }]
                    );
                }
                other => panic!("unexpected error: {other}"),
            }
            assert!(accounts.inserted().is_empty(), "inserted with blank {blank}");
            assert_eq!(presenter.shown().len(), 1);
            assert_eq!(form.state(), FormState::Idle);
        }
    }

    #[tokio::test]
    async fn every_blank_field_is_reported_in_one_dialog() {
        let accounts = Arc::new(FakeAccounts::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let form = form_with(accounts.clone(), presenter.clone());

        assert!(form.submit().await.is_err());
        assert_eq!(
            presenter.shown(),
            vec![
                "invalid input: garage number should not be blank, \
                 full name should not be blank, phone should not be blank, \
                 address should not be blank"
                    .to_string()
            ]
        );
        assert!(accounts.inserted().is_empty());
    }

    #[tokio::test]
    async fn valid_submission_inserts_once_with_values_verbatim() {
        let accounts = Arc::new(FakeAccounts::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let form = form_with(accounts.clone(), presenter.clone());
        fill_all(&form, [" 142", "Ivan Petrenko ", "+380501234567", "Sadova 3"]);

        let created = form.submit().await.unwrap();
        assert_eq!(created.account.garage_number, " 142");
        assert!(presenter.shown().is_empty());
        assert_eq!(form.state(), FormState::Idle);

        assert_eq!(
            accounts.inserted(),
            vec![NewAccount {
                garage_number: " 142".to_string(),
                full_name: "Ivan Petrenko ".to_string(),
                phone_number: Some("+380501234567".to_string()),
                address: Some("Sadova 3".to_string()),
                ..Default::default()
            }]
        );
    }

    #[tokio::test]
    async fn binding_failure_aborts_before_insert() {
        let accounts = Arc::new(FakeAccounts::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let form = CreateAccountForm::with_bindings(accounts.clone(), presenter.clone(), |field| {
            if field == Field::FullName {
                Arc::new(BrokenBinding) as Arc<dyn StringBinding>
            } else {
                Arc::new(MemoryBinding::new())
            }
        });
        fill_all(&form, ["7", "Owner", "123", "Lisova 1"]);

        let err = form.submit().await.unwrap_err();
        assert!(matches!(
            err,
            FormError::Binding {
                field: Field::FullName,
                ..
            }
        ));
        assert_eq!(
            presenter.shown(),
            vec!["full name binding error: binding lock poisoned".to_string()]
        );
        assert!(accounts.inserted().is_empty());
        assert_eq!(form.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn insert_failure_is_wrapped_and_shown_once() {
        let accounts = Arc::new(FakeAccounts {
            fail_insert: true,
            ..Default::default()
        });
        let presenter = Arc::new(RecordingPresenter::default());
        let form = form_with(accounts.clone(), presenter.clone());
        fill_all(&form, ["7", "Owner", "123", "Lisova 1"]);

        let err = form.submit().await.unwrap_err();
        assert!(err
            .to_string()
            .starts_with("account error: cannot create account record: "));
        assert_eq!(presenter.shown().len(), 1);
        assert_eq!(accounts.inserted().len(), 1);
    }

    #[tokio::test]
    async fn submits_into_the_store_and_reports_duplicates() {
        let db = memory_db().await;
        let accounts_repo = Arc::new(SeaOrmAccountsRepo::new(db.clone()));
        let store: Arc<dyn AccountsService> = Arc::new(AccountsServiceImpl::new(
            accounts_repo,
            Arc::new(SeaOrmPaymentsRepo::new(db.clone())),
            Arc::new(SeaOrmRatesRepo::new(db)),
        ));
        let presenter = Arc::new(RecordingPresenter::default());

        let form = CreateAccountForm::new(store.clone(), presenter.clone());
        fill_all(&form, ["42", "First Owner", "111", "Lisova 1"]);
        let created = form.submit().await.unwrap();
        assert_eq!(created.account.garage_number, "42");
        assert_eq!(created.last_payed_year(), "No payments");
        assert!(presenter.shown().is_empty());

        let again = CreateAccountForm::new(store.clone(), presenter.clone());
        fill_all(&again, ["42", "Second Owner", "222", "Lisova 2"]);
        let err = again.submit().await.unwrap_err();
        assert!(matches!(
            err,
            FormError::Account(StoreError::GarageNumberTaken { .. })
        ));
        assert_eq!(presenter.shown().len(), 1);

        let stored = store.get_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].account.full_name, "First Owner");
    }
}
