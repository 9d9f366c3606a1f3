use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for reading and writing ReqIF documents.
///
/// This struct holds settings that control how documents are written,
/// including pretty-printing, archive compression and async write chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Indentation width used when writing XML.
    ///
    /// `0` writes compact XML without line breaks.
    indent: usize,

    /// Whether to emit the `<?xml ...?>` declaration.
    pub write_declaration: bool,

    /// How `.reqif` entries are stored in `.reqifz` archives.
    pub archive_compression: Compression,

    /// Size of the chunks the async writer hands to the output stream.
    ///
    /// Cancellation is checked between chunks.
    io_chunk_size: usize,
}

/// Compression of archive entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression.
    Stored,
    /// Deflate.
    #[default]
    Deflated,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            write_declaration: true,
            archive_compression: Compression::default(),
            io_chunk_size: default_io_chunk_size(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the indentation width.
    #[must_use]
    pub const fn indent(&self) -> usize {
        self.indent
    }

    /// Sets the indentation width. `0` disables pretty-printing.
    pub const fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    /// Returns the async write chunk size in bytes.
    #[must_use]
    pub const fn io_chunk_size(&self) -> usize {
        self.io_chunk_size
    }

    /// Sets the async write chunk size. Values below 1 are raised to 1.
    pub fn set_io_chunk_size(&mut self, size: usize) {
        self.io_chunk_size = size.max(1);
    }
}

const fn default_indent() -> usize {
    2
}

const fn default_io_chunk_size() -> usize {
    64 * 1024
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_indent")]
        indent: usize,

        #[serde(default = "default_true")]
        write_declaration: bool,

        #[serde(default)]
        archive_compression: Compression,

        /// Async write chunk size in bytes.
        #[serde(default = "default_io_chunk_size")]
        io_chunk_size: usize,
    },
}

const fn default_true() -> bool {
    true
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                indent,
                write_declaration,
                archive_compression,
                io_chunk_size,
            } => Self {
                indent,
                write_declaration,
                archive_compression,
                io_chunk_size: io_chunk_size.max(1),
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            indent: config.indent,
            write_declaration: config.write_declaration,
            archive_compression: config.archive_compression,
            io_chunk_size: config.io_chunk_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nindent = 4\nwrite_declaration = false\narchive_compression = \"stored\"\nio_chunk_size = 1024\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.indent(), 4);
        assert!(!config.write_declaration);
        assert_eq!(config.archive_compression, Compression::Stored);
        assert_eq!(config.io_chunk_size(), 1024);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nindent = \"two\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reqif.toml");
        let mut config = Config::default();
        config.set_indent(0);
        config.set_io_chunk_size(0);

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.io_chunk_size(), 1);
    }
}
