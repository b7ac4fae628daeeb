// MIT License - Copyright (c) 2026 Peter Wright
// NX-595E web endpoints and wire constants

/// Login endpoint. Posting `lgname`/`lgpin` returns an HTML page that embeds
/// the new session token.
pub const LOGIN_PATH: &str = "login.cgi";
/// Area status (XML).
pub const STATUS_PATH: &str = "user/status.xml";
/// Zone sequence descriptor (XML).
pub const SEQUENCE_PATH: &str = "user/seq.xml";
/// One raw zone-state row (XML).
pub const ZONE_STATE_PATH: &str = "user/zstate.xml";
/// Zone names page (HTML with an inline script array).
pub const ZONE_NAMES_PATH: &str = "user/zones.htm";
/// Zone functions (bypass).
pub const ZONE_FUNCTION_PATH: &str = "user/zonefunction.cgi";
/// Keypad functions (arm, stay, disarm, chime).
pub const KEY_FUNCTION_PATH: &str = "user/keyfunction.cgi";

/// Form parameter carrying the session token.
pub const SESSION_PARAM: &str = "sess";

/// Area selector sent with every status poll.
pub const STATUS_AREA_SELECT: u32 = 7;

/// `comm` code for zone bypass.
pub const COMM_ZONE_BYPASS: u32 = 82;
/// `comm` code for keypad functions.
pub const COMM_KEY_FUNCTION: u32 = 80;
/// `data0` value for keypad functions.
pub const KEY_FUNCTION_DATA0: u32 = 2;
/// `data1` value for keypad functions.
pub const KEY_FUNCTION_DATA1: u32 = 1;

/// Marker of the login form the panel serves (sometimes with a 200 status)
/// once a session has been dropped.
pub const LOGIN_FORM_MARKER: &str = r#"form method="post" action="/login.cgi""#;

/// Attempts per facade operation: the initial request plus one retry after
/// a re-login.
pub const DEFAULT_AUTH_ATTEMPTS: u32 = 2;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default location of the persisted session token.
pub const DEFAULT_SESSION_FILE: &str = "session";

/// Zones packed into one integer of a zone-state row.
pub const ZONES_PER_CHUNK: usize = 16;
/// Integers per zone-state row.
pub const ZONE_CHUNKS: usize = 4;
/// Highest zone position the panel can encode.
pub const MAX_ZONES: usize = ZONES_PER_CHUNK * ZONE_CHUNKS;

/// Zone-state rows needed to decode every status category.
pub const ZONE_CATEGORY_ROWS: usize = 8;

/// Zone-state row indices, one per status category.
pub mod zone_rows {
    /// Set when the zone is NOT ready.
    pub const NOT_READY: usize = 0;
    pub const SYSTEM_CONDITION_A: usize = 1;
    pub const SYSTEM_CONDITION_B: usize = 2;
    pub const BYPASS_A: usize = 3;
    pub const BYPASS_B: usize = 4;
    pub const IN_ALARM: usize = 5;
    pub const SYSTEM_CONDITION_C: usize = 6;
    pub const SYSTEM_CONDITION_D: usize = 7;
}
