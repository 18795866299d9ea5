use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settings a driver applies to every connection it opens.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Fixed session time zone, e.g. `UTC` or `+00:00`
    pub timezone: Option<String>,

    /// Runtime parameters set at session start
    pub params: IndexMap<String, String>,

    /// Scan date and time columns into [`Value::Time`]. When false they are
    /// returned as text.
    ///
    /// [`Value::Time`]: crate::stmt::Value::Time
    pub parse_time: bool,

    pub tls: Tls,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tls {
    #[default]
    Disable,
    Prefer,
    Require,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            timezone: None,
            params: IndexMap::new(),
            parse_time: true,
            tls: Tls::Disable,
        }
    }
}
