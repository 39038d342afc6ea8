use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory for `cleaner.log`; logs go to stdout when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}
