// src/store/rest.rs
use anyhow::{anyhow, bail, Context, Result};
use reqwest::{
    header::{self, HeaderMap},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;

use super::TableStore;
use crate::dataset::{Record, COLUMNS};

/// Rows requested per read; matches the server's default row cap.
pub const PAGE_SIZE: usize = 1000;

/// Paged reads are ordered by primary key so offsets stay stable.
const ORDER_BY: &str = "id";

/// Table client for a Supabase project, speaking PostgREST under `/rest/v1/`.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base: Url,
    key: String,
}

/// Error body PostgREST sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteRow {
    gender: Option<String>,
    findings: Option<String>,
    human_impression: Option<String>,
}

impl From<RemoteRow> for Record {
    fn from(row: RemoteRow) -> Self {
        Record {
            gender: row.gender.unwrap_or_default(),
            findings: row.findings.unwrap_or_default(),
            human_impression: row.human_impression.unwrap_or_default(),
        }
    }
}

impl RestStore {
    pub fn new(client: Client, project_url: &Url, key: impl Into<String>) -> Result<Self> {
        let mut root = project_url.clone();
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let base = root
            .join("rest/v1/")
            .with_context(|| format!("building REST endpoint from {}", project_url))?;
        Ok(Self {
            client,
            base,
            key: key.into(),
        })
    }

    pub fn table_url(&self, table: &str) -> Result<Url> {
        self.base
            .join(table)
            .with_context(|| format!("invalid table name {:?}", table))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn insert_request(&self, table: &str, records: &[Record]) -> Result<RequestBuilder> {
        Ok(self
            .request(Method::POST, self.table_url(table)?)
            .header("Prefer", "return=minimal")
            .json(records))
    }

    fn count_request(&self, table: &str) -> Result<RequestBuilder> {
        Ok(self
            .request(Method::HEAD, self.table_url(table)?)
            .query(&[("select", "*")])
            .header("Prefer", "count=exact"))
    }

    fn page_request(
        &self,
        table: &str,
        select: &str,
        offset: usize,
    ) -> Result<RequestBuilder> {
        let mut url = self.table_url(table)?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("select", select);
            q.append_pair("order", ORDER_BY);
            q.append_pair("limit", &PAGE_SIZE.to_string());
            q.append_pair("offset", &offset.to_string());
        }
        Ok(self.request(Method::GET, url))
    }

    /// Read every row of `table`, one page at a time, until an empty page.
    async fn fetch_all<T: DeserializeOwned>(&self, table: &str, select: &str) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        let mut offset = 0;
        loop {
            let resp = self
                .page_request(table, select, offset)?
                .send()
                .await
                .with_context(|| format!("GET {} failed", table))?;
            let page: Vec<T> = check_status(resp)
                .await?
                .json()
                .await
                .with_context(|| format!("decoding rows of {}", table))?;
            let n = page.len();
            trace!(table, offset, n, "fetched page");
            rows.extend(page);
            match next_offset(offset, n) {
                Some(next) => offset = next,
                None => break,
            }
        }
        Ok(rows)
    }
}

/// Offset of the page after one that started at `offset` and returned
/// `page_len` rows. The server may cap pages below [`PAGE_SIZE`], so only
/// an empty page ends the read.
fn next_offset(offset: usize, page_len: usize) -> Option<usize> {
    (page_len > 0).then_some(offset + page_len)
}

/// Total row count from the `Content-Range` header of a count response.
fn total_from_headers(headers: &HeaderMap, table: &str) -> Result<u64> {
    let range = headers
        .get(header::CONTENT_RANGE)
        .ok_or_else(|| anyhow!("count response for {} has no Content-Range", table))?
        .to_str()
        .context("Content-Range is not valid text")?;
    parse_content_range(range)
        .ok_or_else(|| anyhow!("unexpected Content-Range {:?} for {}", range, table))
}

impl TableStore for RestStore {
    #[instrument(level = "debug", skip(self, records), fields(rows = records.len()))]
    async fn insert(&self, table: &str, records: &[Record]) -> Result<()> {
        let resp = self
            .insert_request(table, records)?
            .send()
            .await
            .with_context(|| format!("POST {} failed", table))?;
        check_status(resp).await?;
        debug!("insert accepted");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn count(&self, table: &str) -> Result<u64> {
        let resp = self
            .count_request(table)?
            .send()
            .await
            .with_context(|| format!("HEAD {} failed", table))?;
        // HEAD responses have no error body
        let resp = check_status(resp)
            .await
            .with_context(|| format!("count request for {} failed", table))?;
        total_from_headers(resp.headers(), table)
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let rows: Vec<serde_json::Map<String, Value>> = self.fetch_all(table, column).await?;
        Ok(rows
            .into_iter()
            .map(|mut row| match row.remove(column) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s),
                Some(other) => Some(other.to_string()),
            })
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_records(&self, table: &str) -> Result<Vec<Record>> {
        let rows: Vec<RemoteRow> = self.fetch_all(table, &COLUMNS.join(",")).await?;
        Ok(rows.into_iter().map(Record::from).collect())
    }
}

/// Pass 2xx responses through; turn anything else into an error carrying
/// the server's message.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    Err(anyhow!("{} ({})", describe_error(status, &body), url))
}

fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => {
            let mut msg = format!("{}: {}", status, err.message);
            if let Some(code) = err.code {
                msg.push_str(&format!(" [{}]", code));
            }
            if let Some(hint) = err.hint {
                msg.push_str(&format!(" (hint: {})", hint));
            }
            msg
        }
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{}: {}", status, body.trim()),
    }
}

/// Total from a `Content-Range` value such as `0-24/3573` or `*/0`.
pub fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// Validate and parse the project URL given on the command line.
pub fn parse_project_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid Supabase URL {:?}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Supabase URL must be http(s), got {:?}", url.scheme());
    }
    Ok(url)
}
