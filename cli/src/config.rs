use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;

/// Read-only view of the user's `config.toml`.
///
/// Widget defaults live under a `[tags]` table:
///
/// ```toml
/// [tags]
/// max_tags = 10
/// max_len = 50
/// placeholder = "Type a tag and press Enter or comma"
/// suggestions = ["javascript", "java", "html", "css"]
/// ```
///
/// A missing file and a missing key both mean "no opinion"; a malformed file
/// is treated the same rather than aborting startup.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn max_tags(&self) -> anyhow::Result<Option<NonZeroUsize>> {
        Ok(self.document()?.as_ref().and_then(|doc| read_count(doc, "max_tags")))
    }

    pub fn max_len(&self) -> anyhow::Result<Option<NonZeroUsize>> {
        Ok(self.document()?.as_ref().and_then(|doc| read_count(doc, "max_len")))
    }

    pub fn placeholder(&self) -> anyhow::Result<Option<String>> {
        Ok(self.document()?.as_ref().and_then(read_placeholder))
    }

    pub fn suggestions(&self) -> anyhow::Result<Option<Vec<String>>> {
        Ok(self.document()?.as_ref().and_then(read_suggestions))
    }

    fn document(&self) -> anyhow::Result<Option<DocumentMut>> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(None);
        };
        Ok(content.parse::<DocumentMut>().ok())
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".tagfield").join("config.toml")
}

fn tags_table(doc: &DocumentMut) -> Option<&TomlTable> {
    doc.get("tags").and_then(TomlItem::as_table)
}

fn read_count(doc: &DocumentMut, key: &str) -> Option<NonZeroUsize> {
    tags_table(doc)?
        .get(key)
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_integer())
        .and_then(|n| usize::try_from(n).ok())
        .and_then(NonZeroUsize::new)
}

fn read_placeholder(doc: &DocumentMut) -> Option<String> {
    tags_table(doc)?
        .get("placeholder")
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn read_suggestions(doc: &DocumentMut) -> Option<Vec<String>> {
    let array = tags_table(doc)?
        .get("suggestions")
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_array())?;
    Some(
        array
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
    )
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
