pub mod types;

use std::path::Path;

use crate::error::{HostelError, Result};
use types::Config;

/// A missing file is not an error; built-in defaults cover every field.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No config at {}, running on defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(HostelError::Config(format!(
                "could not read {}: {e}",
                path.display()
            )));
        }
    };
    Ok(serde_yml::from_str(&content)?)
}
