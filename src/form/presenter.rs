use super::FormError;

/// Shows a failed submission to the user, once per failure.
pub trait ErrorPresenter: Send + Sync {
    fn show_error(&self, err: &FormError);
}

/// Presenter for headless use: the error goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl ErrorPresenter for TracingPresenter {
    fn show_error(&self, err: &FormError) {
        tracing::warn!(error = %err, "form: submission failed");
    }
}
