//! Configuration system for linqguard
//!
//! Settings come from `linqguard.toml`, `.linqguardrc.toml` or
//! `linqguard.json`, discovered by walking up from the checked directory.
//! Every section is optional and unknown keys are rejected.
//!
//! ## Example Configuration
//!
//! ```toml
//! [files]
//! include = ["src/**/*.cs"]
//! exclude = ["**/obj/**", "**/*.g.cs"]
//!
//! [fix]
//! allow_side_effecting_receivers = false
//!
//! [[catalog.types]]
//! namespace = "Acme.Collections"
//! name = "Guards"
//! methods = [{ name = "IsNullOrEmpty", parameters = ["IEnumerable<T>"], extension = true }]
//! ```

mod linqguard_config;
mod loader;

pub use linqguard_config::{CatalogConfig, FileMatcher, FilesConfig, FixConfig, LinqGuardConfig};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
