//! Configuration system.
//!
//! Merges configuration tiers field-by-field, lowest first:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/studydesk/config.yaml`
//! 3. **User** - `~/.studydesk/config.yaml`
//! 4. **Environment** - variables below
//!
//! Command-line flags are applied by the binary after loading.
//!
//! ## Environment Variables
//! - `STUDYDESK_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `STUDYDESK_PORT` - HTTP port
//! - `STUDYDESK_CHAT_MODEL` - Study buddy model name
//! - `GEMINI_API_KEY` (or `API_KEY`) - Study buddy API key
//! - `STUDYDESK_USER_DIR` - User config dir (default: `~/.studydesk`)
//! - `STUDYDESK_PROJECT_DIR` - Project config dir (default: `./studydesk`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
