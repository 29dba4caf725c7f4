//! Session configuration.
//!
//! Controls the session cookie issued at login.

use serde::{Deserialize, Serialize};

/// Configuration for login sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Session lifetime in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,

    /// Add the `Secure` attribute to cookies (HTTPS deployments).
    #[serde(default)]
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_secs: default_max_age_secs(),
            secure: false,
        }
    }
}

impl SessionConfig {
    /// Session lifetime as a chrono duration. `None` unless positive and
    /// representable.
    pub fn max_age(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_seconds(self.max_age_secs).filter(|age| *age > chrono::Duration::zero())
    }
}

fn default_cookie_name() -> String {
    "shelf_session".to_string()
}

// Two weeks.
fn default_max_age_secs() -> i64 {
    1_209_600
}
