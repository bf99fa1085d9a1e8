use serde::{Deserialize, Serialize};

fn default_iteration_metadata() -> bool {
    true
}

/// Compile-time switches, loadable from a host's config file:
///
/// ```toml
/// [templates]
/// iteration-metadata = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Expose `@index`, `@first` and `@last` inside `{{#each}}`. Default: true.
    #[serde(default = "default_iteration_metadata")]
    pub iteration_metadata: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            iteration_metadata: default_iteration_metadata(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iteration_metadata(mut self, enabled: bool) -> Self {
        self.iteration_metadata = enabled;
        self
    }
}
