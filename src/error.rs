use thiserror::Error;

/// Any failure talking to GitHub, through either the gh CLI or the REST API.
#[derive(Debug, Error)]
pub enum GitHubApiError {
    #[error("gh CLI not found. Please install GitHub CLI: https://cli.github.com/")]
    NotInstalled,
    #[error("gh CLI not authenticated. Please run: gh auth login")]
    NotAuthenticated,
    #[error("gh CLI error: {stderr}")]
    Command { stderr: String },
    #[error("Invalid JSON response from GitHub: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Failed to run gh: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error accessing GitHub API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API rate limit exceeded. Try again later or install/authenticate gh CLI for higher limits.")]
    RateLimited,
    #[error("Repository or resource not found: {0}")]
    NotFound(String),
    #[error("GitHub API returned status {status} for {url}")]
    Status { status: u16, url: String },
}

impl GitHubApiError {
    /// Map the stderr of a failed gh invocation to the most specific error.
    pub fn from_gh_stderr(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if lower.contains("not found") {
            GitHubApiError::NotInstalled
        } else if lower.contains("authentication") || lower.contains("not logged in") {
            GitHubApiError::NotAuthenticated
        } else {
            GitHubApiError::Command {
                stderr: stderr.trim().to_string(),
            }
        }
    }
}
