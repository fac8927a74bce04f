use crate::constants::{DEFAULT_FILE_PREFIX, DEFAULT_OUTPUT_DIR_NAME};
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the output file is named inside the output folder
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NamingScheme {
    /// `<prefix>_<unix-seconds>.pdf`
    Timestamp { prefix: String },
    /// A caller-chosen file name; `.pdf` is appended when missing
    Fixed { file_name: String },
}

impl Default for NamingScheme {
    fn default() -> Self {
        NamingScheme::Timestamp {
            prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

/// What to do when the chosen output name already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionPolicy {
    /// Append `_1`, `_2`, ... to the file stem until a free name is found
    #[default]
    Disambiguate,
    /// Refuse to write and report the collision
    Fail,
    /// Replace the existing file
    Overwrite,
}

/// Poster tiling configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TiledPosterOptions {
    // Input
    pub source_file: PathBuf,

    // Grid
    pub rows: usize,
    pub cols: usize,

    // Output
    pub output_folder: PathBuf,
    pub naming: NamingScheme,
    pub on_collision: CollisionPolicy,
    pub compress: bool,
}

impl Default for TiledPosterOptions {
    fn default() -> Self {
        Self {
            source_file: PathBuf::new(),
            rows: 1,
            cols: 1,
            output_folder: default_output_folder(),
            naming: NamingScheme::default(),
            on_collision: CollisionPolicy::default(),
            compress: true,
        }
    }
}

/// Per-user temp folder used by default for generated posters
pub fn default_output_folder() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_OUTPUT_DIR_NAME)
}

impl TiledPosterOptions {
    pub fn new(source_file: impl Into<PathBuf>, rows: usize, cols: usize) -> Self {
        Self {
            source_file: source_file.into(),
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| PosterError::InvalidArgument(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            PosterError::InvalidArgument(format!("Failed to serialize config: {}", e))
        })?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validated grid shape
    pub fn grid_shape(&self) -> Result<GridShape> {
        GridShape::new(self.rows, self.cols)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.source_file.as_os_str().is_empty() {
            return Err(PosterError::InvalidArgument(
                "No source file specified".to_string(),
            ));
        }

        self.grid_shape()?;

        if self.output_folder.as_os_str().is_empty() {
            return Err(PosterError::InvalidArgument(
                "No output folder specified".to_string(),
            ));
        }

        match &self.naming {
            NamingScheme::Timestamp { prefix } if prefix.contains(['/', '\\']) => {
                return Err(PosterError::InvalidArgument(format!(
                    "File prefix must not contain path separators: {:?}",
                    prefix
                )));
            }
            NamingScheme::Fixed { file_name }
                if file_name.trim().is_empty() || file_name.contains(['/', '\\']) =>
            {
                return Err(PosterError::InvalidArgument(format!(
                    "Invalid output file name: {:?}",
                    file_name
                )));
            }
            _ => {}
        }

        Ok(())
    }
}
