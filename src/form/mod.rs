//! Headless account creation form.
//!
//! Widgets are modelled by the pieces a toolkit would provide: a string
//! [`binding::StringBinding`], an [`entry::Entry`] with a pluggable
//! validator, and a [`presenter::ErrorPresenter`] standing in for the modal
//! error dialog.

mod binding;
mod create_account;
mod entry;
mod presenter;

pub use create_account::{CreateAccountForm, Field, FormError};
pub use presenter::TracingPresenter;
