use std::collections::BTreeSet;
use std::path::Path;

/// Exclusion rules applied while walking a project tree.
///
/// A path is excluded when any of its components matches an excluded name
/// (directory names like `.git` or `node_modules`) or when its extension is in
/// the excluded set (binary and media formats).
#[derive(Debug, Clone, Default)]
pub struct WalkFilter {
    excluded_names: BTreeSet<String>,
    excluded_extensions: BTreeSet<String>,
}

impl WalkFilter {
    #[must_use]
    pub fn new<N, E>(names: N, extensions: E) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            excluded_names: names.into_iter().map(Into::into).collect(),
            excluded_extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        for component in path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if self.excluded_names.contains(name) {
                    return true;
                }
            }
        }

        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            if self.excluded_extensions.contains(&extension.to_lowercase()) {
                return true;
            }
        }

        false
    }
}
