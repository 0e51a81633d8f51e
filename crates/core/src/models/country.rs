use serde::{Deserialize, Serialize};

/// A market/economy the dashboard can analyze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Stable slug derived from the name (see [`slug_id`]).
    pub id: String,
    pub name: String,
}

impl Country {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Economies every install starts with. Discovered ones are merged on top and
/// never persisted redundantly with these.
pub fn base_countries() -> Vec<Country> {
    vec![
        Country::new("us", "United States"),
        Country::new("cn", "China"),
        Country::new("eu", "Eurozone"),
        Country::new("jp", "Japan"),
        Country::new("hk", "Hong Kong"),
    ]
}

/// Derive a stable id from a display name: trim, lowercase, and map every
/// character outside `[a-z0-9]` to `_`.
pub fn slug_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}
