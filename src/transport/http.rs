// MIT License - Copyright (c) 2026 Peter Wright
// Single HTTP exchange with the panel web server

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, error};

use crate::config::PanelSettings;
use crate::error::{NxError, Result};
use crate::parse::is_login_form;
use crate::protocol::{Command, FormBody, Method};

/// Outcome of one request after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200 with a real payload; the body is returned unmodified.
    Body(Vec<u8>),
    /// 403, or 200 carrying the login form: the session is no longer valid.
    AuthFailure,
}

/// Classify a fully read response.
///
/// Statuses other than 200 and 403 are connectivity failures.
pub fn classify(path: &str, status: StatusCode, body: Vec<u8>) -> Result<Reply> {
    match status {
        StatusCode::FORBIDDEN => Ok(Reply::AuthFailure),
        StatusCode::OK if is_login_form(&body) => Ok(Reply::AuthFailure),
        StatusCode::OK => Ok(Reply::Body(body)),
        other => Err(NxError::Connectivity {
            path: path.to_string(),
            status: other.as_u16(),
        }),
    }
}

/// HTTP channel to one panel.
///
/// The panel presents a self-signed certificate, so certificate validation is
/// turned off for this client only.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: reqwest::Client,
    settings: PanelSettings,
}

impl HttpChannel {
    pub fn new(settings: PanelSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    /// Send `command` with `form` once and classify the reply. GET requests
    /// carry no parameters.
    ///
    /// The whole body is read before classifying, since a dropped session can
    /// hide behind a 200 status.
    pub async fn send(&self, command: &Command, form: &FormBody) -> Result<Reply> {
        let path = command.path();
        let url = self.settings.url_for(path);
        let method = command.method();
        debug!("{:?} {}", method, path);

        let mut request = self.client.request(method.as_reqwest(), &url);
        if method == Method::Post {
            request = request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form.encode());
        }

        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", path, e);
            NxError::Http(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        let reply = classify(path, status, body)?;
        if reply == Reply::AuthFailure {
            debug!("{} rejected the session (HTTP {})", path, status.as_u16());
        }
        Ok(reply)
    }
}
