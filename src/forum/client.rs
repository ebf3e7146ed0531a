//! Reddit API client.
//!
//! Uses the application-only OAuth2 flow (client credentials), pages
//! through `/r/{name}/top`, and enriches every submission with its
//! author's profile and its top-level comments.

use super::error::{ForumError, Result};
use super::types::{
    AccountData, CommentNode, LinkData, Listing, MoreChildrenResponse, Thing, TokenResponse,
    KIND_ACCOUNT, KIND_LINK,
};
use super::ForumClient;
use crate::config::{ApiConfig, Credentials};
use crate::models::{Author, AuthorLookup, Comment, Submission, Timeframe, DELETED_AUTHOR};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum number of comment ids accepted by `/api/morechildren`.
const MORE_CHILDREN_BATCH: usize = 100;

/// Comments requested with the initial comment-tree call.
const COMMENT_PAGE_LIMIT: &str = "500";

/// Authenticated Reddit API client.
pub struct RedditClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    page_size: u32,
    listing_limit: usize,
}

impl RedditClient {
    /// Build the HTTP client and obtain an application-only access token.
    pub async fn connect(credentials: &Credentials, api: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .user_agent(api.user_agent.clone())
            .build()?;

        let token = authenticate(&http, &api.auth_url, credentials).await?;
        info!("Authenticated against {}", api.auth_url);

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token,
            page_size: api.page_size,
            listing_limit: api.listing_limit,
        })
    }

    /// GET a JSON document from the API.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ForumError::Api {
                status: status.as_u16(),
                endpoint: path.to_string(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Page through the top listing until the cursor runs out.
    async fn fetch_links(&self, subreddit: &str, timeframe: Timeframe) -> Result<Vec<LinkData>> {
        let path = format!("/r/{}/top", subreddit);
        let mut links = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![
                ("t", timeframe.as_str().to_string()),
                ("limit", self.page_size.to_string()),
                ("raw_json", "1".to_string()),
            ];
            if let Some(ref cursor) = after {
                query.push(("after", cursor.clone()));
            }

            let listing: Listing = match self.get_json(&path, &query).await {
                Err(ForumError::Api { status, .. })
                    if status == StatusCode::FORBIDDEN.as_u16()
                        || status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    return Err(ForumError::SubredditUnavailable(subreddit.to_string()));
                }
                other => other?,
            };

            let page_len = listing.data.children.len();
            for thing in listing.data.children {
                if thing.kind == KIND_LINK {
                    links.push(serde_json::from_value::<LinkData>(thing.data)?);
                }
            }
            debug!("Fetched listing page of {} items ({} total)", page_len, links.len());

            after = listing.data.after;
            if after.is_none() || page_len == 0 || links.len() >= self.listing_limit {
                break;
            }
        }

        links.truncate(self.listing_limit);
        Ok(links)
    }

    /// Resolve an author's profile. Failures degrade to `Unavailable`.
    async fn lookup_author(&self, name: &str) -> AuthorLookup {
        let path = format!("/user/{}/about", name);
        let query = [("raw_json", "1".to_string())];

        match self.get_json::<Thing>(&path, &query).await {
            Ok(thing) if thing.kind == KIND_ACCOUNT => {
                match serde_json::from_value::<AccountData>(thing.data) {
                    Ok(account) => AuthorLookup::Resolved(Author {
                        created_at: account.created_at(),
                        name: account.name,
                    }),
                    Err(e) => AuthorLookup::Unavailable(e.to_string()),
                }
            }
            Ok(thing) => AuthorLookup::Unavailable(format!("unexpected kind {}", thing.kind)),
            Err(ForumError::Network(message)) => {
                warn!("Author lookup for {} failed: {}", name, message);
                AuthorLookup::Unavailable(message)
            }
            Err(e) => {
                debug!("Author {} unavailable: {}", name, e);
                AuthorLookup::Unavailable(e.to_string())
            }
        }
    }

    /// Fetch all top-level comments, expanding every "more" placeholder.
    async fn fetch_comments(&self, link_id: &str) -> Result<Vec<Comment>> {
        let link_fullname = format!("t3_{}", link_id);
        let path = format!("/comments/{}", link_id);
        let query = [
            ("depth", "1".to_string()),
            ("limit", COMMENT_PAGE_LIMIT.to_string()),
            ("raw_json", "1".to_string()),
        ];

        // [submission listing, comment listing]
        let listings: Vec<Listing> = self.get_json(&path, &query).await?;
        let tree = listings
            .into_iter()
            .nth(1)
            .map(|listing| listing.data.children)
            .unwrap_or_default();

        let mut comments = Vec::new();
        let mut pending = Vec::new();
        collect_top_level(tree, &link_fullname, &mut comments, &mut pending)?;

        let mut requested: HashSet<String> = HashSet::new();
        while !pending.is_empty() {
            let take = pending.len().min(MORE_CHILDREN_BATCH);
            let batch: Vec<String> = pending
                .drain(..take)
                .filter(|id| requested.insert(id.clone()))
                .collect();
            if batch.is_empty() {
                continue;
            }

            let query = [
                ("api_type", "json".to_string()),
                ("link_id", link_fullname.clone()),
                ("children", batch.join(",")),
                ("limit_children", "false".to_string()),
                ("raw_json", "1".to_string()),
            ];
            let response: MoreChildrenResponse =
                self.get_json("/api/morechildren", &query).await?;

            if !response.json.errors.is_empty() {
                return Err(ForumError::Rejected {
                    endpoint: "/api/morechildren".to_string(),
                    message: format!("{:?}", response.json.errors),
                });
            }

            let things = response.json.data.unwrap_or_default().things;
            collect_top_level(things, &link_fullname, &mut comments, &mut pending)?;
        }

        debug!("Collected {} top-level comments for {}", comments.len(), link_id);
        Ok(comments)
    }
}

impl ForumClient for RedditClient {
    async fn fetch_top(&self, subreddit: &str, timeframe: Timeframe) -> Result<Vec<Submission>> {
        info!("Fetching top submissions of r/{} ({})", subreddit, timeframe);
        let links = self.fetch_links(subreddit, timeframe).await?;
        info!("Found {} submissions, fetching authors and comments", links.len());

        let progress = ProgressBar::new(links.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} submissions")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut authors: HashMap<String, AuthorLookup> = HashMap::new();
        let mut submissions = Vec::with_capacity(links.len());

        for link in links {
            let author = match link.author.as_deref() {
                Some(name) if is_live_author(name) => {
                    if let Some(known) = authors.get(name) {
                        known.clone()
                    } else {
                        let lookup = self.lookup_author(name).await;
                        authors.insert(name.to_string(), lookup.clone());
                        lookup
                    }
                }
                _ => AuthorLookup::Deleted,
            };

            let comments = self.fetch_comments(&link.id).await?;

            submissions.push(Submission {
                id: link.id,
                score: link.score,
                title: link.title,
                url: link.url,
                author,
                comments,
            });
            progress.inc(1);
        }

        progress.finish_and_clear();
        sort_by_score(&mut submissions);
        Ok(submissions)
    }
}

/// Exchange client credentials for a bearer token.
async fn authenticate(
    http: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<String> {
    let resp = http
        .post(auth_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ForumError::Auth(
            "client_id/client_secret were rejected".to_string(),
        ));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ForumError::Api {
            status: status.as_u16(),
            endpoint: auth_url.to_string(),
            message: body,
        });
    }

    let token: TokenResponse = resp.json().await?;
    match token.access_token {
        Some(access_token) if !access_token.is_empty() => Ok(access_token),
        _ => Err(ForumError::Auth(
            token
                .error
                .unwrap_or_else(|| "no access token in response".to_string()),
        )),
    }
}

/// Whether an author name refers to an account that can be looked up.
fn is_live_author(name: &str) -> bool {
    !name.is_empty() && name != DELETED_AUTHOR
}

/// Keep comments and placeholders whose parent is the submission itself.
fn collect_top_level(
    things: Vec<Thing>,
    link_fullname: &str,
    comments: &mut Vec<Comment>,
    pending: &mut Vec<String>,
) -> Result<()> {
    for thing in things {
        match thing.into_comment_node()? {
            Some(CommentNode::Comment(data)) if data.parent_id == link_fullname => {
                comments.push(data.into());
            }
            Some(CommentNode::More(more)) if more.parent_id == link_fullname => {
                pending.extend(more.children);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Order submissions by score, highest first; equal scores keep API order.
pub fn sort_by_score(submissions: &mut [Submission]) {
    submissions.sort_by(|a, b| b.score.cmp(&a.score));
}
