use super::models::{Config, ProjectConfig};
use super::sources;
use super::validation;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("invalid include pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("invalid project in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: validation::ValidationError,
    },

    #[error("{path} conflicts with an already loaded project: {source}")]
    Conflict {
        path: PathBuf,
        #[source]
        source: validation::ValidationError,
    },
}

/// Expands `common.include` globs into the projects they define.
///
/// Included files may include further files; each file is read at most once,
/// so include cycles terminate. A file that fails to load, holds an invalid
/// project, or reuses a name or log file already merged is logged and skipped
/// without affecting the others.
pub struct IncludeResolver {
    visited: HashSet<PathBuf>,
    skipped: Vec<IncludeError>,
}

impl IncludeResolver {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
            skipped: Vec::new(),
        }
    }

    /// Projects of `root` followed by those of every file it (transitively) includes.
    pub fn resolve(mut self, root: Config, root_path: &Path) -> Resolved {
        self.visited.insert(canonical(root_path));
        let mut projects = root.projects;
        let base = parent_dir(root_path);
        self.expand(root.common.include.as_deref(), &base, &mut projects);

        Resolved {
            projects,
            skipped: self.skipped,
        }
    }

    fn expand(&mut self, pattern: Option<&str>, base: &Path, projects: &mut Vec<ProjectConfig>) {
        let Some(pattern) = pattern.filter(|p| !p.trim().is_empty()) else {
            return;
        };

        for path in self.matches(pattern, base) {
            if !self.visited.insert(canonical(&path)) {
                debug!(path = %path.display(), "include already loaded");
                continue;
            }

            let included = match load_included(&path) {
                Ok(config) => config,
                Err(e) => {
                    error!(error = %e, "include file read error, skipping");
                    self.skipped.push(e);
                    continue;
                }
            };

            if let Err(source) =
                validation::validate_merge(projects.as_slice(), &included.projects)
            {
                let e = IncludeError::Conflict { path, source };
                error!(error = %e, "include conflicts with loaded projects, skipping");
                self.skipped.push(e);
                continue;
            }

            debug!(path = %path.display(), projects = included.projects.len(), "include loaded");
            projects.extend(included.projects);
            self.expand(included.common.include.as_deref(), &parent_dir(&path), projects);
        }
    }

    fn matches(&mut self, pattern: &str, base: &Path) -> Vec<PathBuf> {
        let full = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            format!("{}/{}", glob::Pattern::escape(&base.to_string_lossy()), pattern)
        };

        match glob::glob(&full) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, "unreadable include candidate");
                        None
                    }
                })
                .collect(),
            Err(source) => {
                let e = IncludeError::Pattern {
                    pattern: full,
                    source,
                };
                error!(error = %e, "include pattern error, skipping");
                self.skipped.push(e);
                Vec::new()
            }
        }
    }
}

impl Default for IncludeResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Merged projects plus the include sources that were skipped.
#[derive(Debug)]
pub struct Resolved {
    pub projects: Vec<ProjectConfig>,
    pub skipped: Vec<IncludeError>,
}

fn load_included(path: &Path) -> Result<Config, IncludeError> {
    let config = sources::load_file(path).map_err(|source| IncludeError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    for (index, project) in config.projects.iter().enumerate() {
        validation::validate_project(index, project).map_err(|source| IncludeError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(config)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
