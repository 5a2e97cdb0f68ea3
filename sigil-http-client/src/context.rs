//! Workflow identifiers forwarded as request headers.

use serde::{Deserialize, Serialize};

/// Header carrying the repository identifier.
pub const CONTEXT_HEADER: &str = "x-github-context";

/// Header carrying the workflow run URL.
pub const WORKFLOW_HEADER: &str = "x-github-workflow";

/// Repository and workflow run identifiers.
///
/// Both values are opaque and forwarded unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowContext {
    /// Repository identifier, e.g. `owner/name`.
    pub repository: String,
    /// Workflow run URL.
    pub workflow_run_url: String,
}

impl WorkflowContext {
    /// Create a context from already-formed values.
    pub fn new(repository: impl Into<String>, workflow_run_url: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            workflow_run_url: workflow_run_url.into(),
        }
    }

    /// Build the run URL as `{server_url}/{repository}/actions/runs/{run_id}`.
    pub fn from_parts(server_url: &str, repository: &str, run_id: &str) -> Self {
        Self::new(
            repository,
            format!("{server_url}/{repository}/actions/runs/{run_id}"),
        )
    }

    /// Read `GITHUB_SERVER_URL`, `GITHUB_REPOSITORY` and `GITHUB_RUN_ID`.
    ///
    /// Missing variables become empty strings.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self::from_parts(
            &var("GITHUB_SERVER_URL"),
            &var("GITHUB_REPOSITORY"),
            &var("GITHUB_RUN_ID"),
        )
    }

    /// Header pairs to merge into a request.
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (CONTEXT_HEADER, self.repository.as_str()),
            (WORKFLOW_HEADER, self.workflow_run_url.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let ctx = WorkflowContext::from_parts("https://github.com", "octo/repo", "42");
        assert_eq!(ctx.repository, "octo/repo");
        assert_eq!(
            ctx.workflow_run_url,
            "https://github.com/octo/repo/actions/runs/42"
        );
    }

    #[test]
    fn test_headers() {
        let ctx = WorkflowContext::new("octo/repo", "run-url");
        let headers = ctx.headers();
        assert_eq!(headers[0], ("x-github-context", "octo/repo"));
        assert_eq!(headers[1], ("x-github-workflow", "run-url"));
    }
}
