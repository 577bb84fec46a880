use crate::error::InferenceError;

/// Accepted upload file types, matched on the filename extension.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { allowed_extensions }
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Checks the filename of the `file` part, `None` meaning the part was absent.
    pub fn validate(&self, filename: Option<&str>) -> Result<(), InferenceError> {
        let filename = filename.ok_or(InferenceError::MissingFile)?;
        if filename.is_empty() {
            return Err(InferenceError::EmptyFilename);
        }
        if !self.is_allowed(filename) {
            return Err(InferenceError::InvalidFileType {
                allowed: self.allowed_extensions.clone(),
            });
        }
        Ok(())
    }

    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EXTENSIONS)
    }
}
