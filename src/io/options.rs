use std::{fmt, path::Path, sync::Arc};

use tokio_util::sync::CancellationToken;

use super::validation::ValidationIssue;
use crate::error::{Error, Result};

/// Receives every issue reported by the schema validator.
pub type ValidationCallback = Arc<dyn Fn(&ValidationIssue) + Send + Sync>;

/// Options for reading documents.
#[derive(Clone, Default)]
pub struct DeserializeOptions {
    /// Run the schema validator over each document before reading it.
    pub validate: bool,

    /// Where validation issues go. Without a callback the first error aborts
    /// the read.
    pub validation_callback: Option<ValidationCallback>,

    /// Observed while reading; once fired the call returns
    /// [`Error::Cancelled`].
    pub cancellation: CancellationToken,
}

impl DeserializeOptions {
    /// Enable schema validation.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.validate = true;
        self
    }

    /// Enable schema validation and route issues to `callback`.
    #[must_use]
    pub fn with_validation_callback(
        mut self,
        callback: impl Fn(&ValidationIssue) + Send + Sync + 'static,
    ) -> Self {
        self.validate = true;
        self.validation_callback = Some(Arc::new(callback));
        self
    }

    /// Use `cancellation` to abort the read.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.validation_callback.is_some() && !self.validate {
            return Err(Error::invalid_argument(
                "a validation callback requires validation to be enabled",
            ));
        }
        checkpoint(&self.cancellation)
    }
}

impl fmt::Debug for DeserializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeserializeOptions")
            .field("validate", &self.validate)
            .field("validation_callback", &self.validation_callback.is_some())
            .field("cancellation", &self.cancellation.is_cancelled())
            .finish()
    }
}

/// Options for writing documents.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Observed between entities and between write chunks.
    pub cancellation: CancellationToken,
}

impl SerializeOptions {
    /// Use `cancellation` to abort the write.
    #[must_use]
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }
}

pub(crate) fn checkpoint(cancellation: &CancellationToken) -> Result<()> {
    if cancellation.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// The container a byte stream holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedFileExtension {
    /// A single `.reqif` document.
    Reqif,
    /// A `.reqifz` (or `.zip`) archive of documents.
    Reqifz,
}

impl SupportedFileExtension {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the path is empty, has no
    /// extension, or has an extension other than `reqif`, `reqifz` or `zip`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("the path must not be empty"));
        }
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .ok_or_else(|| {
                Error::invalid_argument(format!("'{}' has no file extension", path.display()))
            })?;
        match extension.to_ascii_lowercase().as_str() {
            "reqif" => Ok(Self::Reqif),
            "reqifz" | "zip" => Ok(Self::Reqifz),
            other => Err(Error::invalid_argument(format!(
                "unsupported file extension '.{other}'"
            ))),
        }
    }

    /// The canonical extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Reqif => "reqif",
            Self::Reqifz => "reqifz",
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("spec.reqif", SupportedFileExtension::Reqif ; "reqif")]
    #[test_case("dir/spec.REQIFZ", SupportedFileExtension::Reqifz ; "uppercase archive")]
    #[test_case("bundle.zip", SupportedFileExtension::Reqifz ; "zip")]
    fn classifies_extension(path: &str, expected: SupportedFileExtension) {
        assert_eq!(
            SupportedFileExtension::from_path(Path::new(path)).unwrap(),
            expected
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("spec" ; "no extension")]
    #[test_case("spec.xml" ; "unsupported")]
    fn rejects_path(path: &str) {
        assert!(matches!(
            SupportedFileExtension::from_path(Path::new(path)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_and_extensionless_paths_have_distinct_messages() {
        let empty = SupportedFileExtension::from_path(Path::new("")).unwrap_err();
        let bare = SupportedFileExtension::from_path(Path::new("spec")).unwrap_err();
        assert_ne!(empty.to_string(), bare.to_string());
    }

    #[test]
    fn callback_requires_validation() {
        let mut options = DeserializeOptions::default().with_validation_callback(|_| {});
        assert!(options.check().is_ok());

        options.validate = false;
        assert!(matches!(options.check(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn cancelled_options_fail_check() {
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let options = DeserializeOptions::default().with_cancellation(cancellation);
        assert!(matches!(options.check(), Err(Error::Cancelled)));
    }
}
