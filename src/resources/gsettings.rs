//! Desktop settings (`gsettings`) resource.
use anyhow::Result;

use super::{Applicable, ResourceChange};
use crate::exec::Executor;

/// One `gsettings set <schema> <key> <value>` write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsettingsEntry {
    /// Settings schema, e.g. `org.gnome.desktop.wm.keybindings`.
    pub schema: String,
    /// Key within the schema.
    pub key: String,
    /// Value in GVariant text form, e.g. `['<Super>3']`.
    pub value: String,
}

impl GsettingsEntry {
    fn new(schema: &str, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            schema: schema.to_string(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The full set of writes for a fixed workspace layout.
///
/// Two layout writes (static workspaces, workspace count) followed by three
/// keybinding writes per workspace: clear the conflicting
/// `switch-to-application-<i>`, then bind switch and move. Workspace 10 is
/// bound to the `0` key.
#[must_use]
pub fn workspace_layout(workspaces: u8, modifier: &str) -> Vec<GsettingsEntry> {
    let mut entries = vec![
        GsettingsEntry::new("org.gnome.mutter", "dynamic-workspaces", "false"),
        GsettingsEntry::new(
            "org.gnome.desktop.wm.preferences",
            "num-workspaces",
            workspaces.to_string(),
        ),
    ];
    for i in 1..=workspaces {
        let digit = i % 10;
        entries.push(GsettingsEntry::new(
            "org.gnome.shell.keybindings",
            format!("switch-to-application-{i}"),
            "[]",
        ));
        entries.push(GsettingsEntry::new(
            "org.gnome.desktop.wm.keybindings",
            format!("switch-to-workspace-{i}"),
            format!("['{modifier}{digit}']"),
        ));
        entries.push(GsettingsEntry::new(
            "org.gnome.desktop.wm.keybindings",
            format!("move-to-workspace-{i}"),
            format!("['{modifier}<Shift>{digit}']"),
        ));
    }
    entries
}

/// A blind, write-only desktop setting.
///
/// There is no read-back: the write is declarative and repeating it is
/// harmless.
#[derive(Debug)]
pub struct GsettingsResource<'a> {
    /// The write to perform.
    pub entry: GsettingsEntry,
    executor: &'a dyn Executor,
}

impl<'a> GsettingsResource<'a> {
    /// Create a new gsettings resource.
    #[must_use]
    pub const fn new(entry: GsettingsEntry, executor: &'a dyn Executor) -> Self {
        Self { entry, executor }
    }
}

impl Applicable for GsettingsResource<'_> {
    fn description(&self) -> String {
        format!(
            "{} {} = {}",
            self.entry.schema, self.entry.key, self.entry.value
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "gsettings",
            &[
                "set",
                &self.entry.schema,
                &self.entry.key,
                &self.entry.value,
            ],
        )?;
        Ok(ResourceChange::Applied)
    }
}
