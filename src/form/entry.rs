use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use super::binding::{BindingError, StringBinding};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("should not be blank")]
    Blank,
}

pub type Validator = Box<dyn Fn(&str) -> Result<(), ValidationError> + Send + Sync>;

/// Rejects empty and whitespace-only input.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank);
    }
    Ok(())
}

/// A text entry bound to a [`StringBinding`]. Validation runs against the
/// entry's text; the bound value is what gets read on submit.
pub struct Entry {
    placeholder: String,
    text: Mutex<String>,
    binding: Arc<dyn StringBinding>,
    validator: Option<Validator>,
}

impl Entry {
    pub fn with_data(binding: Arc<dyn StringBinding>) -> Self {
        Self {
            placeholder: String::new(),
            text: Mutex::new(String::new()),
            binding,
            validator: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn validator(
        mut self,
        validator: impl Fn(&str) -> Result<(), ValidationError> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    #[allow(dead_code)]
    pub fn placeholder_text(&self) -> &str {
        &self.placeholder
    }

    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Types `text` into the entry and pushes it to the binding.
    pub fn set_text(&self, text: impl Into<String>) -> Result<(), BindingError> {
        let text = text.into();
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = text.clone();
        self.binding.set(text)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator(&self.text()),
            None => Ok(()),
        }
    }

    pub fn bound_value(&self) -> Result<String, BindingError> {
        self.binding.get()
    }
}
