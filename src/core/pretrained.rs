//! Pretrained Tekken releases.
//!
//! Resolves a release tag to its model file under a data directory and loads
//! it. Two releases are published:
//! - `240718` - Tekken as shipped with Mistral NeMo
//! - `240911` - current release (Pixtral, Mistral Large 2 refresh)

use std::path::{Path, PathBuf};

use super::model::from_model_file;
use super::tokenizer::{Tokenizer, TokenizerError};

/// Supported Tekken model releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TekkenRelease {
    /// July 2024 release.
    R240718,
    /// September 2024 release (default).
    R240911,
}

impl TekkenRelease {
    /// Parse a release tag.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "240718" => Some(Self::R240718),
            "240911" => Some(Self::R240911),
            _ => None,
        }
    }

    /// All supported release tags.
    pub fn supported_names() -> &'static [&'static str] {
        &["240718", "240911"]
    }

    /// Model file name for this release.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::R240718 => "tekken_240718.json",
            Self::R240911 => "tekken_240911.json",
        }
    }

    /// Model file path under a data directory.
    pub fn path_in(&self, data_dir: impl AsRef<Path>) -> PathBuf {
        data_dir.as_ref().join(self.file_name())
    }
}

impl Default for TekkenRelease {
    fn default() -> Self {
        Self::R240911
    }
}

/// Load a pretrained tokenizer by release tag from a data directory.
///
/// # Example
/// ```ignore
/// let tokenizer = tekkenizer::from_pretrained("data", "240911")?;
/// let ids = tokenizer.encode("Hello, world!", true, false);
/// ```
pub fn from_pretrained(
    data_dir: impl AsRef<Path>,
    name: &str,
) -> Result<Tokenizer, TokenizerError> {
    let release = TekkenRelease::from_name(name).ok_or_else(|| {
        TokenizerError::UnknownPretrained(format!(
            "{}. Supported: {}",
            name,
            TekkenRelease::supported_names().join(", ")
        ))
    })?;

    from_model_file(release.path_in(data_dir))
}
