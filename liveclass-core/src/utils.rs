pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Default lifetime of an undelivered signaling message.
pub const DEFAULT_SIGNAL_TTL_SECS: u64 = 60 * 60;

/// Default client polling period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

pub const SIGNAL_PATH: &str = "/api/live-classes/signal";

pub const IDENTITY_PATH: &str = "/api/live-classes/me";

pub fn roster_path(class_id: &crate::ClassId) -> String {
    format!("/api/live-classes/{}/participants", class_id)
}
