//! Configuration system for recast
//!
//! Configuration is a single JSON or JSONC document discovered by walking up
//! from the document's directory (see [`ConfigLoader::auto_discover`]).
//!
//! ## Example Configuration
//!
//! ```jsonc
//! {
//!   "formatter": {
//!     "indentStyle": "spaces",
//!     "indentSize": 4,
//!     "newline": "lf"
//!   },
//!   "refactorings": {
//!     "rules": { "refactor/if-else-braces": false }
//!   },
//!   "analyzers": {
//!     "configureAwait": "include",
//!     "rules": { "reliability/configure-await": "warn" }
//!   },
//!   "semantic": {
//!     "catalog": {
//!       "extensions": [{
//!         "receiver": "Job",
//!         "method": { "name": "ConfigureAwait", "kind": "method",
//!                     "parameters": ["bool"], "type": "ConfiguredTaskAwaitable" }
//!       }]
//!     }
//!   }
//! }
//! ```

mod loader;
mod recast_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use recast_config::{
    AnalyzersConfiguration, ConfigureAwaitPolicy, FormatterConfiguration, IndentStyle,
    NewlineKind, RecastConfiguration, RefactoringsConfiguration, RuleSeverity,
    SemanticConfiguration,
};
