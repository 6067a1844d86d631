use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("binding lock poisoned")]
    Poisoned,
}

/// A bindable string value, the data side of a text entry.
pub trait StringBinding: Send + Sync {
    fn get(&self) -> Result<String, BindingError>;
    fn set(&self, value: String) -> Result<(), BindingError>;
}

#[derive(Debug, Default)]
pub struct MemoryBinding {
    value: Mutex<String>,
}

impl MemoryBinding {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringBinding for MemoryBinding {
    fn get(&self) -> Result<String, BindingError> {
        self.value
            .lock()
            .map(|value| (*value).clone())
            .map_err(|_| BindingError::Poisoned)
    }

    fn set(&self, value: String) -> Result<(), BindingError> {
        let mut guard = self.value.lock().map_err(|_| BindingError::Poisoned)?;
        *guard = value;
        Ok(())
    }
}
