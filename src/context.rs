//! Commit metadata shared by every platform adapter
//!
//! The context is built once from CI inputs and handed to each adapter behind
//! an `Arc`. Its only behavior is changelog templating and the commit permalink
//! used by the notifier.

/// Placeholder replaced with the commit SHA
pub const COMMIT_HASH_PLACEHOLDER: &str = "%COMMIT_HASH%";
/// Placeholder replaced with the commit message
pub const COMMIT_MESSAGE_PLACEHOLDER: &str = "%COMMIT_MESSAGE%";

/// Commit the artifact was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitContext {
    sha: String,
    message: String,
    repository_url: String,
}

impl CommitContext {
    /// Create a new commit context
    pub fn new(
        repository_url: impl Into<String>,
        sha: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CommitContext {
            sha: sha.into(),
            message: message.into(),
            repository_url: repository_url.into(),
        }
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    /// Permalink to the commit, e.g. `https://github.com/org/repo/commit/<sha>`
    pub fn commit_url(&self) -> String {
        let repo = self.repository_url.trim_end_matches('/');
        format!("{repo}/commit/{}", self.sha)
    }

    /// Substitute the commit placeholders in changelog text
    ///
    /// The hash is substituted first, so a commit message that itself contains
    /// `%COMMIT_HASH%` is inserted verbatim.
    pub fn render_changelog(&self, changelog: &str) -> String {
        changelog
            .replace(COMMIT_HASH_PLACEHOLDER, &self.sha)
            .replace(COMMIT_MESSAGE_PLACEHOLDER, &self.message)
    }
}
