//! Team invitation collaborator.
//!
//! The registrar only forwards an email address; the remote web application
//! owns the invitation itself. Handlers see the `InviteGateway` trait.

pub mod livewire;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::InviteConfig;

pub use livewire::LivewireInviteGateway;

/// Why an invitation could not be submitted.
#[derive(Debug, Error)]
pub enum InviteError {
    #[error("invitations are not configured")]
    NotConfigured,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("failed to fetch CSRF token: status {0}")]
    TokenFetch(u16),

    #[error("CSRF token not found in page")]
    TokenMissing,

    #[error("invitation rejected: status {status}, body {body}")]
    Rejected { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl InviteError {
    /// Message safe to return to callers.
    pub fn public_detail(&self) -> &'static str {
        match self {
            InviteError::NotConfigured => "Invitations are not enabled",
            InviteError::InvalidEmail => "Invalid email address",
            _ => "Failed to send invitation",
        }
    }
}

/// Submits an invitation for `email`.
#[async_trait]
pub trait InviteGateway: Send + Sync {
    async fn submit(&self, email: &str) -> Result<(), InviteError>;
}

/// Gateway used when the endpoint is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledInviteGateway;

#[async_trait]
impl InviteGateway for DisabledInviteGateway {
    async fn submit(&self, _email: &str) -> Result<(), InviteError> {
        Err(InviteError::NotConfigured)
    }
}

pub fn from_config(config: &InviteConfig) -> Arc<dyn InviteGateway> {
    if !config.enabled {
        return Arc::new(DisabledInviteGateway);
    }

    match LivewireInviteGateway::from_config(config) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build invite client; invitations disabled");
            Arc::new(DisabledInviteGateway)
        }
    }
}

/// One `@` with something on both sides and no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}
