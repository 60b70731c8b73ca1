use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::error::ResolveError;
use crate::filter::WalkFilter;
use crate::score::pattern_score;

/// One resolved file with its match confidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub score: u8,
}

/// Knobs controlling the fuzzy stage of resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    pub fuzzy_enabled: bool,
    pub min_fuzzy_score: u8,
    /// Upper bound on files considered during a fuzzy walk.
    pub max_walk_entries: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fuzzy_enabled: false,
            min_fuzzy_score: 80,
            max_walk_entries: 1000,
        }
    }
}

/// Resolves a user-supplied pattern to files under `root`.
///
/// Stages, first non-empty wins:
/// 1. exact path relative to `root` (or absolute inside it), score 100;
/// 2. glob expansion, traversal order, deduplicated, each score 100;
/// 3. fuzzy similarity walk when enabled, keeping scores at or above
///    `min_fuzzy_score`.
///
/// Candidates are returned in deterministic order: score descending, then
/// path length ascending, then lexicographic. An empty result is the
/// `NoMatch` error.
pub fn resolve(
    pattern: &str,
    root: &Path,
    filter: &WalkFilter,
    options: ResolverOptions,
) -> Result<Vec<FileCandidate>, ResolveError> {
    let root = root
        .canonicalize()
        .map_err(|source| ResolveError::io("resolving project root", root, source))?;

    if let Some(candidate) = resolve_exact(pattern, &root)? {
        return Ok(vec![candidate]);
    }

    let glob_hits = resolve_glob(pattern, &root, filter)?;
    if !glob_hits.is_empty() {
        return Ok(sorted(glob_hits, &root));
    }

    if options.fuzzy_enabled {
        let fuzzy_hits = resolve_fuzzy(pattern, &root, filter, options);
        if !fuzzy_hits.is_empty() {
            return Ok(sorted(fuzzy_hits, &root));
        }
    }

    Err(ResolveError::no_match(pattern, root))
}

fn resolve_exact(pattern: &str, root: &Path) -> Result<Option<FileCandidate>, ResolveError> {
    let raw = Path::new(pattern);
    let candidate = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        root.join(raw)
    };

    if !candidate.is_file() {
        return Ok(None);
    }

    let canonical = candidate
        .canonicalize()
        .map_err(|source| ResolveError::io("resolving path", &candidate, source))?;

    if !canonical.starts_with(root) {
        return Err(ResolveError::OutsideRoot {
            path: canonical,
            root: root.to_path_buf(),
        });
    }

    Ok(Some(FileCandidate {
        path: canonical,
        score: 100,
    }))
}

fn resolve_glob(
    pattern: &str,
    root: &Path,
    filter: &WalkFilter,
) -> Result<Vec<FileCandidate>, ResolveError> {
    let full_pattern = root.join(pattern).to_string_lossy().into_owned();

    let paths = match glob::glob(&full_pattern) {
        Ok(paths) => paths,
        Err(source) => {
            // A malformed pattern that never meant to be a glob falls
            // through to the fuzzy stage instead of erroring.
            if pattern.contains(['*', '?', '[']) {
                return Err(ResolveError::InvalidGlob {
                    pattern: pattern.to_string(),
                    source,
                });
            }

            return Ok(Vec::new());
        }
    };

    let mut seen = BTreeSet::new();
    let mut hits = Vec::new();

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(_) => continue,
        };

        if !path.is_file() {
            continue;
        }

        let canonical = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => continue,
        };

        if !canonical.starts_with(root) {
            continue;
        }

        let relative = canonical.strip_prefix(root).unwrap_or(&canonical);
        if filter.is_excluded(relative) {
            continue;
        }

        if seen.insert(canonical.clone()) {
            hits.push(FileCandidate {
                path: canonical,
                score: 100,
            });
        }
    }

    Ok(hits)
}

fn resolve_fuzzy(
    pattern: &str,
    root: &Path,
    filter: &WalkFilter,
    options: ResolverOptions,
) -> Vec<FileCandidate> {
    let walk_filter = filter.clone();
    let walk_root = root.to_path_buf();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .filter_entry(move |entry| {
            let relative = entry
                .path()
                .strip_prefix(&walk_root)
                .unwrap_or_else(|_| entry.path());
            !walk_filter.is_excluded(relative)
        })
        .build();

    let mut hits = Vec::new();
    let mut visited = 0usize;

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };

        if !entry.file_type().is_some_and(|kind| kind.is_file()) {
            continue;
        }

        visited += 1;
        if visited > options.max_walk_entries {
            debug!(limit = options.max_walk_entries, "fuzzy walk bound reached");
            break;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path())
            .to_string_lossy()
            .into_owned();

        let score = pattern_score(pattern, &relative);
        if score >= options.min_fuzzy_score {
            hits.push(FileCandidate {
                path: entry.into_path(),
                score,
            });
        }
    }

    debug!(pattern, candidates = hits.len(), "fuzzy resolution");
    hits
}

fn sorted(mut candidates: Vec<FileCandidate>, root: &Path) -> Vec<FileCandidate> {
    candidates.sort_by(|a, b| {
        let a_rel = relative_display(&a.path, root);
        let b_rel = relative_display(&b.path, root);

        b.score
            .cmp(&a.score)
            .then(a_rel.len().cmp(&b_rel.len()))
            .then(a_rel.cmp(&b_rel))
    });

    candidates
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{resolve, ResolverOptions};
    use crate::error::ResolveError;
    use crate::filter::WalkFilter;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/config.rs"), "pub struct Config;").unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();
        fs::write(dir.path().join("node_modules/pkg/main.rs"), "ignored").unwrap();
        dir
    }

    fn filter() -> WalkFilter {
        WalkFilter::new(vec!["node_modules", ".git"], Vec::<String>::new())
    }

    fn fuzzy_options() -> ResolverOptions {
        ResolverOptions {
            fuzzy_enabled: true,
            ..ResolverOptions::default()
        }
    }

    #[test]
    fn exact_path_short_circuits_with_score_100() {
        let dir = workspace();
        let hits = resolve("src/main.rs", dir.path(), &filter(), ResolverOptions::default())
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 100);
        assert!(hits[0].path.ends_with("src/main.rs"));
    }

    #[test]
    fn glob_matches_are_deterministic_and_exclusion_filtered() {
        let dir = workspace();
        let hits =
            resolve("**/*.rs", dir.path(), &filter(), ResolverOptions::default()).unwrap();

        let names: Vec<_> = hits
            .iter()
            .map(|hit| hit.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![Path::new("src/main.rs"), Path::new("src/config.rs")]
        );
        assert!(hits.iter().all(|hit| hit.score == 100));
    }

    #[test]
    fn fuzzy_finds_misspelled_names_when_enabled() {
        let dir = workspace();
        let hits = resolve("confg.rs", dir.path(), &filter(), fuzzy_options()).unwrap();

        assert!(hits[0].path.ends_with("src/config.rs"));
        assert!(hits[0].score >= 80);
    }

    #[test]
    fn fuzzy_disabled_yields_no_match() {
        let dir = workspace();
        let error = resolve("confg.rs", dir.path(), &filter(), ResolverOptions::default())
            .unwrap_err();
        assert!(matches!(error, ResolveError::NoMatch { .. }));
    }

    #[test]
    fn raising_the_threshold_never_adds_candidates() {
        let dir = workspace();
        let loose = ResolverOptions {
            fuzzy_enabled: true,
            min_fuzzy_score: 60,
            ..ResolverOptions::default()
        };
        let strict = ResolverOptions {
            fuzzy_enabled: true,
            min_fuzzy_score: 90,
            ..ResolverOptions::default()
        };

        let loose_hits = resolve("confg", dir.path(), &filter(), loose)
            .map(|hits| hits.len())
            .unwrap_or(0);
        let strict_hits = resolve("confg", dir.path(), &filter(), strict)
            .map(|hits| hits.len())
            .unwrap_or(0);

        assert!(strict_hits <= loose_hits);
    }

    #[test]
    fn absolute_path_outside_root_is_rejected() {
        let dir = workspace();
        let outside = tempfile::tempdir().unwrap();
        let stray = outside.path().join("stray.rs");
        fs::write(&stray, "x").unwrap();

        let error = resolve(
            stray.to_str().unwrap(),
            dir.path(),
            &filter(),
            ResolverOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, ResolveError::OutsideRoot { .. }));
    }

    #[test]
    fn missing_pattern_is_no_match() {
        let dir = workspace();
        let error = resolve(
            "does_not_exist.rs",
            dir.path(),
            &filter(),
            ResolverOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, ResolveError::NoMatch { .. }));
    }
}
