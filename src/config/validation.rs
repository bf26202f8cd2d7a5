use super::models::{Config, ProjectConfig};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Project #{index} has an empty name")]
    MissingName { index: usize },

    #[error("Project '{project}' has an empty '{field}' path")]
    MissingPath {
        project: String,
        field: &'static str,
    },

    #[error("Project name '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("Log file '{path}' is rotated by both '{first}' and '{second}'")]
    DuplicateSource {
        path: String,
        first: String,
        second: String,
    },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    for (index, project) in config.projects.iter().enumerate() {
        validate_project(index, project)?;
    }
    validate_unique(&config.projects)?;
    Ok(())
}

/// Ensure every field a job needs is filled in
pub fn validate_project(index: usize, project: &ProjectConfig) -> Result<(), ValidationError> {
    if project.name.trim().is_empty() {
        return Err(ValidationError::MissingName { index });
    }
    if project.from.as_os_str().is_empty() {
        return Err(ValidationError::MissingPath {
            project: project.name.clone(),
            field: "from",
        });
    }
    if project.to.is_empty() {
        return Err(ValidationError::MissingPath {
            project: project.name.clone(),
            field: "to",
        });
    }
    Ok(())
}

/// Jobs run concurrently, so no two may share a name or a live log file
fn validate_unique(projects: &[ProjectConfig]) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for project in projects {
        if !names.insert(project.name.as_str()) {
            return Err(ValidationError::DuplicateName(project.name.clone()));
        }
    }

    for (i, project) in projects.iter().enumerate() {
        if let Some(other) = projects[..i].iter().find(|p| p.from == project.from) {
            return Err(ValidationError::DuplicateSource {
                path: project.from.display().to_string(),
                first: other.name.clone(),
                second: project.name.clone(),
            });
        }
    }

    Ok(())
}

/// Check projects from an included file against those already merged
pub fn validate_merge(
    existing: &[ProjectConfig],
    added: &[ProjectConfig],
) -> Result<(), ValidationError> {
    validate_unique(added)?;
    for project in added {
        if existing.iter().any(|p| p.name == project.name) {
            return Err(ValidationError::DuplicateName(project.name.clone()));
        }
        if let Some(other) = existing.iter().find(|p| p.from == project.from) {
            return Err(ValidationError::DuplicateSource {
                path: project.from.display().to_string(),
                first: other.name.clone(),
                second: project.name.clone(),
            });
        }
    }
    Ok(())
}
