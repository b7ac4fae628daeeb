// MIT License - Copyright (c) 2026 Peter Wright
// Panel login

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{NxError, Result};
use crate::parse::session_token;
use crate::protocol::Command;
use crate::session::SessionStore;
use crate::transport::http::{HttpChannel, Reply};

/// Obtains fresh session tokens and commits them to the [`SessionStore`].
#[derive(Debug, Clone)]
pub struct Authenticator {
    user: String,
    pin: String,
    session: Arc<SessionStore>,
}

impl Authenticator {
    pub fn new(user: impl Into<String>, pin: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            user: user.into(),
            pin: pin.into(),
            session,
        }
    }

    /// Post the credentials once and store whatever token the reply embeds.
    ///
    /// Login never re-logs in: a rejected login is
    /// [`NxError::LoginRejected`]. A reply without a token stores and returns
    /// an empty token.
    pub async fn login(&self, channel: &HttpChannel) -> Result<String> {
        let command = Command::Login {
            user: self.user.clone(),
            pin: self.pin.clone(),
        };
        info!("Logging in to panel as {}", self.user);

        let body = match channel.send(&command, &command.form()).await? {
            Reply::Body(body) => body,
            Reply::AuthFailure => {
                warn!("Panel rejected login for {}", self.user);
                return Err(NxError::LoginRejected);
            }
        };

        let token = session_token(&body).unwrap_or_default();
        if token.is_empty() {
            warn!("Login reply carried no session token");
        } else {
            info!("Obtained new session ({}...)", redact(&token));
        }
        self.session.set(&token).await?;
        Ok(token)
    }
}

/// First few characters of a token, for logs.
pub(crate) fn redact(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(4)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}
