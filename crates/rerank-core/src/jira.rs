//! Blocking Jira REST client.
//!
//! Uses the v2 REST API for fields, search and issue reads/updates, and the
//! Agile API for rank changes. Authentication is a personal access token sent
//! as a bearer token.

use crate::error::{RerankError, Result};
use crate::fields::custom_field_number;
use crate::tracker::{FieldInfo, SearchLimit, Tracker};
use crate::types::Ticket;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://issues.redhat.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<Ticket>,
}

#[derive(Debug, Clone)]
pub struct JiraClient {
    base_url: String,
    token: String,
    page_size: u32,
    http: Client,
}

impl JiraClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rerank/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            http,
        })
    }

    /// Results requested per search page when fetching everything.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()?;
        let status = response.status();
        // 207 from the rank endpoint means at least one issue was not ranked.
        if !status.is_success() || status.as_u16() == 207 {
            let body = response.text().unwrap_or_default();
            return Err(RerankError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, ?query, "GET");
        let response = self.send(self.http.get(&url).query(query), &url)?;
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|source| RerankError::Decode {
            context: url,
            source,
        })
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.url(path);
        tracing::debug!(%url, "PUT");
        self.send(self.http.put(&url).json(body), &url)?;
        Ok(())
    }

    fn search_page(
        &self,
        jql: &str,
        start_at: u32,
        max_results: u32,
        fields: &[String],
    ) -> Result<SearchPage> {
        let mut query = vec![
            ("jql", jql.to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        if !fields.is_empty() {
            query.push(("fields", fields.join(",")));
        }
        self.get_json("/rest/api/2/search", &query)
    }
}

impl Tracker for JiraClient {
    fn fields(&self) -> Result<Vec<FieldInfo>> {
        self.get_json("/rest/api/2/field", &[])
    }

    fn search(&self, jql: &str, limit: SearchLimit, fields: &[String]) -> Result<Vec<Ticket>> {
        match limit {
            SearchLimit::First(n) => Ok(self.search_page(jql, 0, n, fields)?.issues),
            SearchLimit::All => {
                let mut tickets = Vec::new();
                loop {
                    let start_at = tickets.len() as u32;
                    let page = self.search_page(jql, start_at, self.page_size, fields)?;
                    let fetched = page.issues.len();
                    tickets.extend(page.issues);
                    if fetched == 0 || tickets.len() as u32 >= page.total {
                        break;
                    }
                }
                Ok(tickets)
            }
        }
    }

    fn ticket(&self, key: &str, fields: &[String]) -> Result<Ticket> {
        let query = if fields.is_empty() {
            Vec::new()
        } else {
            vec![("fields", fields.join(","))]
        };
        self.get_json(&format!("/rest/api/2/issue/{key}"), &query)
    }

    fn update_ticket(&self, key: &str, fields: &Value) -> Result<()> {
        self.put_json(
            &format!("/rest/api/2/issue/{key}"),
            &json!({ "fields": fields }),
        )
    }

    fn rank_before(&self, key: &str, before: &str, rank_field: &str) -> Result<()> {
        let mut body = json!({
            "issues": [key],
            "rankBeforeIssue": before,
        });
        if let Some(id) = custom_field_number(rank_field) {
            body["rankCustomFieldId"] = json!(id);
        }
        self.put_json("/rest/agile/1.0/issue/rank", &body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
