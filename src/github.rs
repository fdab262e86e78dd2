//! GitHub API helpers for replacing the coverage report comment on a pull
//! request.

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use tracing::info;

use crate::report::REPORT_MARKER;

const DEFAULT_API_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

/// Where to post: repository, pull request and credentials.
#[derive(Debug, Clone)]
pub struct Context {
    token: String,
    repo: String,
    pr_number: u64,
    api_url: String,
}

impl Context {
    pub fn new(token: impl Into<String>, repo: impl Into<String>, pr_number: u64) -> Self {
        Self {
            token: token.into(),
            repo: repo.into(),
            pr_number,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Use a different API root (GitHub Enterprise).
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn pr_number(&self) -> u64 {
        self.pr_number
    }
}

/// Extract the PR number from a ref such as `refs/pull/42/merge`.
pub fn pr_number_from_ref(github_ref: &str) -> Option<u64> {
    let parts: Vec<&str> = github_ref.split('/').collect();
    if parts.len() >= 3 && parts[0] == "refs" && parts[1] == "pull" {
        parts[2].parse().ok()
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: Option<String>,
}

impl Comment {
    fn is_report(&self) -> bool {
        self.body
            .as_deref()
            .is_some_and(|body| body.contains(REPORT_MARKER))
    }
}

/// One page of issue comments.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub comments: Vec<Comment>,
    pub has_next: bool,
}

/// The comment operations needed to replace a report.
pub trait CommentApi {
    /// List one page (1-based) of comments on the pull request.
    fn list_comments(&self, page: u32) -> Result<Page>;

    fn delete_comment(&self, id: u64) -> Result<()>;

    fn create_comment(&self, body: &str) -> Result<()>;
}

/// Lazily walks the comment pages, yielding the report comments on each
/// page. Pages without report comments are skipped. Iteration stops after
/// the last page or the first error.
pub struct CommentPages<'a, A: CommentApi + ?Sized> {
    api: &'a A,
    next_page: Option<u32>,
}

impl<'a, A: CommentApi + ?Sized> CommentPages<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            next_page: Some(1),
        }
    }
}

impl<A: CommentApi + ?Sized> Iterator for CommentPages<'_, A> {
    type Item = Result<Vec<Comment>>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(page) = self.next_page {
            let listed = match self.api.list_comments(page) {
                Ok(listed) => listed,
                Err(e) => {
                    self.next_page = None;
                    return Some(Err(e));
                }
            };
            self.next_page = listed.has_next.then_some(page + 1);

            let reports: Vec<Comment> = listed
                .comments
                .into_iter()
                .filter(Comment::is_report)
                .collect();
            if !reports.is_empty() {
                return Some(Ok(reports));
            }
        }
        None
    }
}

/// Delete every previous report comment, then post `body`. All pages are
/// read before the first deletion so the listing is never paged while it
/// is being modified. Returns the number of comments deleted.
pub fn replace_report<A: CommentApi + ?Sized>(api: &A, body: &str) -> Result<usize> {
    let pages = CommentPages::new(api).collect::<Result<Vec<_>>>()?;
    let stale: Vec<Comment> = pages.into_iter().flatten().collect();

    for comment in &stale {
        api.delete_comment(comment.id)?;
    }
    info!(deleted = stale.len(), "removed stale coverage reports");

    api.create_comment(body)?;
    Ok(stale.len())
}

/// [`CommentApi`] over the GitHub REST API.
pub struct GitHubApi {
    context: Context,
}

impl GitHubApi {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}/repos/{}{}", self.context.api_url, self.context.repo, path);
        ureq::request(method, &url)
            .set("Authorization", &format!("Bearer {}", self.context.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "covdelta")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }
}

fn check(
    resp: std::result::Result<ureq::Response, ureq::Error>,
    action: &str,
) -> Result<ureq::Response> {
    match resp {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            bail!("GitHub API error {action} (HTTP {code}): {body}");
        }
        Err(e) => bail!("Failed {action}: {e}"),
    }
}

impl CommentApi for GitHubApi {
    fn list_comments(&self, page: u32) -> Result<Page> {
        let path = format!(
            "/issues/{}/comments?per_page={PER_PAGE}&page={page}",
            self.context.pr_number
        );
        let resp = check(self.request("GET", &path).call(), "listing comments")?;
        let has_next = resp
            .header("link")
            .is_some_and(|link| link.contains("rel=\"next\""));
        let comments: Vec<Comment> = resp
            .into_json()
            .context("Failed to parse comments JSON")?;
        Ok(Page { comments, has_next })
    }

    fn delete_comment(&self, id: u64) -> Result<()> {
        let path = format!("/issues/comments/{id}");
        check(self.request("DELETE", &path).call(), "deleting comment")?;
        info!(id, "deleted comment");
        Ok(())
    }

    fn create_comment(&self, body: &str) -> Result<()> {
        let path = format!("/issues/{}/comments", self.context.pr_number);
        check(
            self.request("POST", &path)
                .send_json(serde_json::json!({ "body": body })),
            "creating comment",
        )?;
        info!(
            "Comment posted to {}/pull/{}",
            self.context.repo, self.context.pr_number
        );
        Ok(())
    }
}
