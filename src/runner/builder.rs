use crate::config::ProjectConfig;
use crate::rotate::{Callback, DestinationTemplate, JobError, RotationJob, RotationRule};
use tracing::{debug, warn};

/// Build the job for one project, rejecting bad size strings and templates.
pub fn build_job(project: &ProjectConfig) -> Result<RotationJob, JobError> {
    let rule = RotationRule::from_settings(&project.rotate.term, &project.rotate.size).map_err(
        |source| JobError::InvalidSize {
            job: project.name.clone(),
            source,
        },
    )?;

    let destination =
        DestinationTemplate::parse(&project.to).map_err(|source| JobError::InvalidTemplate {
            job: project.name.clone(),
            source,
        })?;

    if matches!(rule, RotationRule::Schedule(_)) {
        warn!(
            job = %project.name,
            term = %project.rotate.term,
            "schedule rules are not evaluated; this job will never rotate"
        );
    }
    if project.rotate.count == 0 {
        warn!(job = %project.name, "rotate.count is 0; every rotated copy will be evicted");
    }

    let job = RotationJob::builder()
        .name(project.name.as_str())
        .source(&project.from)
        .destination(destination)
        .archive_ext(project.compress.extension())
        .maybe_archiver(project.compress.kind.archiver())
        .rule(rule)
        .retention(project.rotate.count)
        .maybe_pid_file(project.pid.as_ref())
        .on_success(Callback::command(&project.success_command))
        .on_failure(Callback::command(&project.failed_command))
        .build();

    debug!(job = %project.name, rule = %job.rule(), archive = %project.compress.kind, "job built");
    Ok(job)
}

/// Build every job, stopping at the first project that cannot be built.
pub fn build_jobs(projects: &[ProjectConfig]) -> Result<Vec<RotationJob>, JobError> {
    projects.iter().map(build_job).collect()
}
