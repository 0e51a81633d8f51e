use crate::errors::CoreError;
use crate::models::country::{base_countries, slug_id, Country};
use crate::storage::traits::KeyValueStore;

/// Storage key for discovered (non-base) countries.
pub const DISCOVERED_KEY: &str = "discovered_countries";

/// Append-only set of known economies: the static base list plus everything
/// discovered in provider payloads (revenue/expenditure country mentions).
///
/// Only non-base entries are persisted, to bound storage growth.
pub struct CountryRegistry {
    countries: Vec<Country>,
}

impl CountryRegistry {
    /// Merge the base set with persisted discoveries. Corrupted JSON falls
    /// back to the base set alone.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut countries = base_countries();
        if let Some(raw) = store.get(DISCOVERED_KEY) {
            if let Ok(saved) = serde_json::from_str::<Vec<Country>>(&raw) {
                for country in saved {
                    if !country.id.is_empty() && !countries.iter().any(|c| c.id == country.id) {
                        countries.push(country);
                    }
                }
            }
        }
        Self { countries }
    }

    /// All known countries, base first, in discovery order after that.
    pub fn all(&self) -> &[Country] {
        &self.countries
    }

    pub fn get(&self, id: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.id == id)
    }

    /// Register newly sighted country names.
    ///
    /// Idempotent: an empty slug, an already-known id, or an already-known
    /// case-insensitive name is skipped, and nothing is written when nothing
    /// changed. First-seen casing wins. Returns how many entries were added.
    pub fn add_countries(
        &mut self,
        store: &mut dyn KeyValueStore,
        names: &[String],
    ) -> Result<usize, CoreError> {
        let mut added = 0;
        for name in names {
            let trimmed = name.trim();
            let id = slug_id(name);
            if id.is_empty() {
                continue;
            }
            let known = self.countries.iter().any(|c| {
                c.id == id || c.name.to_lowercase() == trimmed.to_lowercase()
            });
            if known {
                continue;
            }
            self.countries.push(Country::new(id, trimmed));
            added += 1;
        }

        if added > 0 {
            self.persist(store)?;
        }
        Ok(added)
    }

    /// Write only the entries outside the static base list.
    fn persist(&self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        let base = base_countries();
        let discovered: Vec<&Country> = self
            .countries
            .iter()
            .filter(|c| !base.iter().any(|b| b.id == c.id))
            .collect();
        let json = serde_json::to_string(&discovered)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(DISCOVERED_KEY, &json)
    }
}
