//! `[git]` section.
use serde::Deserialize;
use std::collections::BTreeMap;

/// Global git identity and settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitSection {
    /// `user.name`; skipped when empty.
    pub user_name: String,
    /// `user.email`; skipped when empty.
    pub user_email: String,
    /// Extra `key = value` settings, e.g. `"pull.rebase" = "false"`.
    pub settings: BTreeMap<String, String>,
}

impl GitSection {
    /// Every key/value to apply: identity first, then settings in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        let identity = [("user.name", &self.user_name), ("user.email", &self.user_email)];
        identity
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.to_string(), v.clone()))
            .chain(self.settings.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }
}
