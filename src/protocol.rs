// MIT License - Copyright (c) 2026 Peter Wright
// Panel web commands and form encoding

use crate::config::SystemTrigger;
use crate::constants::{
    COMM_KEY_FUNCTION, COMM_ZONE_BYPASS, KEY_FUNCTION_DATA0, KEY_FUNCTION_DATA1, KEY_FUNCTION_PATH,
    LOGIN_PATH, SEQUENCE_PATH, SESSION_PARAM, STATUS_AREA_SELECT, STATUS_PATH,
    ZONE_FUNCTION_PATH, ZONE_NAMES_PATH, ZONE_STATE_PATH,
};

/// HTTP method used by a panel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Ordered form parameters, encoded only when the request is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping insertion order.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Set the session parameter as the first pair, replacing any previous
    /// session. An empty token removes the parameter.
    pub fn set_session(&mut self, token: &str) {
        self.pairs.retain(|(k, _)| k != SESSION_PARAM);
        if !token.is_empty() {
            self.pairs
                .insert(0, (SESSION_PARAM.to_string(), token.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` serialization.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Requests understood by the panel's embedded web server.
///
/// # Session Handling
///
/// Every command except [`Command::Login`] and [`Command::ZoneNames`] carries
/// the session token as the `sess` form parameter. The panel may drop a
/// session at any time; it then answers with 403 or serves the login page
/// with a 200 status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `POST login.cgi` with `lgname`, `lgpin`. The HTML reply embeds
    /// `function getSession(){return "<token>";}`.
    Login { user: String, pin: String },
    /// `POST user/status.xml` with `arsel=7`. Area flags, bank and sequence.
    Status,
    /// `POST user/seq.xml`. Area count and one token per zone-state row.
    Sequence,
    /// `POST user/zstate.xml` with `state=<row>`. The reply echoes the row
    /// slot it carries (`zstate`) which need not equal the requested one.
    ZoneState { row: usize },
    /// `GET user/zones.htm`. Zone names in an inline script array.
    ZoneNames,
    /// `POST user/zonefunction.cgi` with `comm=82&data0=<zone>`.
    Bypass { zone: usize },
    /// `POST user/keyfunction.cgi` with `comm=80&data0=2&data2=<code>&data1=1`.
    KeyFunction { trigger: SystemTrigger },
}

impl Command {
    /// Endpoint path relative to the panel base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Command::Login { .. } => LOGIN_PATH,
            Command::Status => STATUS_PATH,
            Command::Sequence => SEQUENCE_PATH,
            Command::ZoneState { .. } => ZONE_STATE_PATH,
            Command::ZoneNames => ZONE_NAMES_PATH,
            Command::Bypass { .. } => ZONE_FUNCTION_PATH,
            Command::KeyFunction { .. } => KEY_FUNCTION_PATH,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Command::ZoneNames => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Command::Login { .. })
    }

    /// Whether the `sess` parameter is attached.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Command::Login { .. } | Command::ZoneNames)
    }

    /// Form parameters without the session.
    pub fn form(&self) -> FormBody {
        match self {
            Command::Login { user, pin } => FormBody::new().with("lgname", user).with("lgpin", pin),
            Command::Status => FormBody::new().with("arsel", STATUS_AREA_SELECT),
            Command::Sequence | Command::ZoneNames => FormBody::new(),
            Command::ZoneState { row } => FormBody::new().with("state", row),
            Command::Bypass { zone } => FormBody::new()
                .with("comm", COMM_ZONE_BYPASS)
                .with("data0", zone),
            Command::KeyFunction { trigger } => FormBody::new()
                .with("comm", COMM_KEY_FUNCTION)
                .with("data0", KEY_FUNCTION_DATA0)
                .with("data2", trigger.key_code())
                .with("data1", KEY_FUNCTION_DATA1),
        }
    }

    /// Form parameters with `token` attached when the command needs one.
    pub fn form_with_session(&self, token: &str) -> FormBody {
        let mut form = self.form();
        if self.requires_session() {
            form.set_session(token);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_paths_and_methods() {
        assert_eq!(Command::Status.path(), "user/status.xml");
        assert_eq!(Command::ZoneState { row: 3 }.path(), "user/zstate.xml");
        assert_eq!(Command::ZoneNames.method(), Method::Get);
        assert_eq!(Command::Sequence.method(), Method::Post);
        assert!(Command::Login {
            user: "u".into(),
            pin: "p".into()
        }
        .is_login());
        assert!(!Command::ZoneNames.requires_session());
        assert!(Command::Bypass { zone: 1 }.requires_session());
    }

    #[test]
    fn test_status_form() {
        assert_eq!(
            Command::Status.form_with_session("ABC123").encode(),
            "sess=ABC123&arsel=7"
        );
    }

    #[test]
    fn test_zone_state_form() {
        assert_eq!(
            Command::ZoneState { row: 5 }.form_with_session("S").encode(),
            "sess=S&state=5"
        );
    }

    #[test]
    fn test_bypass_form() {
        assert_eq!(
            Command::Bypass { zone: 12 }.form_with_session("S").encode(),
            "sess=S&comm=82&data0=12"
        );
    }

    #[test]
    fn test_key_function_forms() {
        let cases = [
            (SystemTrigger::Arm, "sess=S&comm=80&data0=2&data2=17&data1=1"),
            (SystemTrigger::Stay, "sess=S&comm=80&data0=2&data2=18&data1=1"),
            (SystemTrigger::Disarm, "sess=S&comm=80&data0=2&data2=16&data1=1"),
            (SystemTrigger::Chime, "sess=S&comm=80&data0=2&data2=1&data1=1"),
        ];
        for (trigger, expected) in cases {
            assert_eq!(
                Command::KeyFunction { trigger }.form_with_session("S").encode(),
                expected
            );
        }
    }

    #[test]
    fn test_login_form_escapes_credentials() {
        let cmd = Command::Login {
            user: "User 1".to_string(),
            pin: "12&34".to_string(),
        };
        let form = cmd.form_with_session("ignored");
        assert_eq!(form.get("sess"), None);
        assert_eq!(form.encode(), "lgname=User+1&lgpin=12%2634");
    }

    #[test]
    fn test_set_session_replaces_previous() {
        let mut form = Command::Sequence.form_with_session("old");
        form.set_session("new");
        assert_eq!(form.encode(), "sess=new");
        form.set_session("");
        assert!(form.is_empty());
    }

    #[test]
    fn test_zone_names_form_is_empty() {
        assert!(Command::ZoneNames.form_with_session("S").is_empty());
    }
}
