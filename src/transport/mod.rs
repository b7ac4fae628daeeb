// MIT License - Copyright (c) 2026 Peter Wright
// Session-authenticated request path

pub mod auth;
pub mod http;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::PanelSettings;
use crate::error::{NxError, Result};
use crate::protocol::Command;
use crate::session::SessionStore;

pub use auth::Authenticator;
pub use http::{classify, HttpChannel, Reply};

/// Sends commands with the current session attached and recovers from
/// dropped sessions.
///
/// One call makes at most `max_attempts` requests. Between two attempts that
/// were rejected as unauthenticated, the [`Authenticator`] runs once, so a
/// budget of 2 allows exactly one re-login per call.
#[derive(Debug, Clone)]
pub struct PanelTransport {
    channel: HttpChannel,
    auth: Authenticator,
    session: Arc<SessionStore>,
}

impl PanelTransport {
    pub fn new(settings: PanelSettings, session: Arc<SessionStore>) -> Result<Self> {
        let auth = Authenticator::new(&settings.user, &settings.pin, session.clone());
        let channel = HttpChannel::new(settings)?;
        Ok(Self {
            channel,
            auth,
            session,
        })
    }

    pub fn settings(&self) -> &PanelSettings {
        self.channel.settings()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Log in now, replacing the stored session.
    pub async fn login(&self) -> Result<String> {
        self.auth.login(&self.channel).await
    }

    /// Execute `command` and return the raw body of the accepted reply.
    ///
    /// `max_attempts` below 1 counts as 1. When every attempt is rejected the
    /// call fails with [`NxError::AuthExhausted`]. The login command is sent
    /// once and never triggers another login.
    pub async fn execute(&self, command: &Command, max_attempts: u32) -> Result<Vec<u8>> {
        if command.is_login() {
            return match self.channel.send(command, &command.form()).await? {
                Reply::Body(body) => Ok(body),
                Reply::AuthFailure => Err(NxError::LoginRejected),
            };
        }

        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let token = if command.requires_session() {
                self.session.get().await?
            } else {
                String::new()
            };
            let form = command.form_with_session(&token);

            match self.channel.send(command, &form).await? {
                Reply::Body(body) => {
                    if attempt > 1 {
                        debug!("{} accepted after re-login", command.path());
                    }
                    return Ok(body);
                }
                Reply::AuthFailure if attempt < max_attempts => {
                    debug!(
                        "Session rejected by {} (attempt {}/{}), logging in again",
                        command.path(),
                        attempt,
                        max_attempts
                    );
                    self.auth.login(&self.channel).await?;
                    attempt += 1;
                }
                Reply::AuthFailure => {
                    warn!(
                        "{} still rejects the session after {} attempts",
                        command.path(),
                        attempt
                    );
                    return Err(NxError::AuthExhausted {
                        path: command.path().to_string(),
                        attempts: attempt,
                    });
                }
            }
        }
    }
}
