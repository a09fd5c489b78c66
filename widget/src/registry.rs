//! One-editor-per-host bookkeeping.
//!
//! A host is any render surface a [`TagEditor`] can be mounted into (a pane,
//! a panel id, a view slot). The registry enforces the mount invariant: at
//! most one live editor per host, and a replaced or unmounted editor is
//! always destroyed so its subscribers see the channel close.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::editor::TagEditor;
use crate::options::TagEditorOptions;

/// Identifies a mount point. Equality is on the id string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
pub struct EditorRegistry {
    editors: HashMap<HostId, TagEditor>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a fresh editor for `host`, replacing (and destroying) any
    /// editor already mounted there.
    pub fn mount(&mut self, host: HostId, options: TagEditorOptions) -> &mut TagEditor {
        match self.editors.entry(host) {
            Entry::Occupied(mut entry) => {
                tracing::debug!("remounting editor for host {}", entry.key());
                entry.get_mut().destroy();
                entry.insert(TagEditor::new(options));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(TagEditor::new(options)),
        }
    }

    /// Destroy and drop the editor mounted for `host`.
    ///
    /// Returns whether an editor was mounted there.
    pub fn unmount(&mut self, host: &HostId) -> bool {
        match self.editors.remove(host) {
            Some(mut editor) => {
                editor.destroy();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, host: &HostId) -> Option<&TagEditor> {
        self.editors.get(host)
    }

    pub fn get_mut(&mut self, host: &HostId) -> Option<&mut TagEditor> {
        self.editors.get_mut(host)
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}
