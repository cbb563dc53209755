// Reset-password notification dispatch
//
// The delivery transport is an external collaborator; the trait keeps it
// swappable and the default implementation just logs the token for
// development, matching how the service behaves without an SMTP setup.

use async_trait::async_trait;

/// Dispatches a password-reset token to the account owner
#[async_trait]
pub trait ResetMailer: Send + Sync {
    async fn send_reset_token(&self, email: &str, token: &str);
}

/// Development mailer that logs the reset link instead of sending mail
pub struct LogMailer {
    reset_url_base: String,
}

impl LogMailer {
    pub fn new(reset_url_base: String) -> Self {
        Self { reset_url_base }
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new("http://localhost:3000/reset-password".to_string())
    }
}

#[async_trait]
impl ResetMailer for LogMailer {
    async fn send_reset_token(&self, email: &str, token: &str) {
        tracing::info!(
            "password reset requested for {}: {}?token={}",
            email,
            self.reset_url_base,
            token
        );
    }
}
