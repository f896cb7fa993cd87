//! Notion-backed implementation of the document API port.
//!
//! All transport and schema fallibility is translated here into the tagged
//! error taxonomy: connection failures and non-success statuses become
//! `Downstream`, 401/403 become `Unauthorized`, and responses missing
//! expected structure become `Format`. Nothing past this boundary sees raw
//! HTTP errors.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use ps_core::{BlockKind, ChildBlock, DocumentApi, PageMeta, PageRef, PsError, PsResult};

use crate::config::NotionConfig;

/// Notion caps a single append request at this many blocks.
const MAX_BLOCKS_PER_APPEND: usize = 100;

#[derive(Debug)]
pub struct NotionApi {
    client: reqwest::Client,
    token: String,
    base_url: String,
    version: String,
    parent_page_id: Option<String>,
}

impl NotionApi {
    pub fn new(token: impl Into<String>, config: &NotionConfig) -> PsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PsError::Internal(format!("http client error: {e}")))?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            version: config.version.clone(),
            parent_page_id: config.parent_page_id.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
    }

    /// Send a request and decode the response body, mapping failures into
    /// the error taxonomy.
    async fn execute(&self, request: reqwest::RequestBuilder) -> PsResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| PsError::Downstream(format!("notion request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PsError::Downstream(format!("notion response read failed: {e}")))?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PsError::Unauthorized(format!(
                "notion returned {status}: {}",
                snippet(&body)
            )));
        }
        if !status.is_success() {
            return Err(PsError::Downstream(format!(
                "notion returned {status}: {}",
                snippet(&body)
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DocumentApi for NotionApi {
    async fn create_page(&self, title: &str) -> PsResult<PageRef> {
        let parent = self.parent_page_id.as_deref().ok_or_else(|| {
            PsError::InvalidInput("no parent page configured for page creation".into())
        })?;

        let body = json!({
            "parent": { "type": "page_id", "page_id": parent },
            "properties": {
                "title": { "title": rich_text(title) },
            },
        });

        let value = self
            .execute(self.request(reqwest::Method::POST, "/v1/pages").json(&body))
            .await?;

        let id = require_str(&value, "id", "page response")?;
        let url = require_str(&value, "url", "page response")?;
        Ok(PageRef {
            id: id.to_string(),
            url: url.to_string(),
        })
    }

    async fn append_content_blocks(&self, parent_id: &str, texts: &[String]) -> PsResult<()> {
        for batch in texts.chunks(MAX_BLOCKS_PER_APPEND) {
            let children: Vec<Value> = batch.iter().map(|text| paragraph_block(text)).collect();
            let body = json!({ "children": children });
            self.execute(
                self.request(
                    reqwest::Method::PATCH,
                    &format!("/v1/blocks/{parent_id}/children"),
                )
                .json(&body),
            )
            .await?;
        }
        Ok(())
    }

    async fn list_child_blocks(&self, parent_id: &str) -> PsResult<Vec<ChildBlock>> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut path = format!("/v1/blocks/{parent_id}/children?page_size=100");
            if let Some(cursor) = &cursor {
                path.push_str(&format!("&start_cursor={cursor}"));
            }

            let value = self.execute(self.request(reqwest::Method::GET, &path)).await?;
            let results = value
                .get("results")
                .and_then(Value::as_array)
                .ok_or_else(|| PsError::Format("child list response missing results".into()))?;

            for item in results {
                blocks.push(parse_child_block(item)?);
            }

            if value.get("has_more").and_then(Value::as_bool) == Some(true) {
                let next = value
                    .get("next_cursor")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        PsError::Format("paginated child list has no next_cursor".into())
                    })?;
                cursor = Some(next.to_string());
            } else {
                return Ok(blocks);
            }
        }
    }

    async fn update_content_block(&self, block_id: &str, text: &str) -> PsResult<()> {
        let body = json!({ "paragraph": { "rich_text": rich_text(text) } });
        self.execute(
            self.request(reqwest::Method::PATCH, &format!("/v1/blocks/{block_id}"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete_block(&self, block_id: &str) -> PsResult<()> {
        self.execute(self.request(reqwest::Method::DELETE, &format!("/v1/blocks/{block_id}")))
            .await?;
        Ok(())
    }

    async fn update_page_title(&self, page_id: &str, title: &str) -> PsResult<()> {
        let body = json!({
            "properties": {
                "title": { "title": rich_text(title) },
            },
        });
        self.execute(
            self.request(reqwest::Method::PATCH, &format!("/v1/pages/{page_id}"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn get_page(&self, page_id: &str) -> PsResult<PageMeta> {
        let value = self
            .execute(self.request(reqwest::Method::GET, &format!("/v1/pages/{page_id}")))
            .await?;

        let id = require_str(&value, "id", "page response")?.to_string();
        let url = require_str(&value, "url", "page response")?.to_string();
        let title = extract_title(&value)?;

        Ok(PageMeta {
            id,
            title,
            url,
            created_at: parse_timestamp(&value, "created_time"),
            updated_at: parse_timestamp(&value, "last_edited_time"),
        })
    }
}

fn rich_text(text: &str) -> Value {
    json!([{ "type": "text", "text": { "content": text } }])
}

fn paragraph_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": rich_text(text) },
    })
}

fn require_str<'a>(value: &'a Value, field: &str, context: &str) -> PsResult<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PsError::Format(format!("{context} missing '{field}'")))
}

/// Validate one child entry into the tagged union of known block shapes.
/// Unknown types map to `Other`, never to an error.
fn parse_child_block(item: &Value) -> PsResult<ChildBlock> {
    let id = require_str(item, "id", "child block")?.to_string();
    let kind = require_str(item, "type", "child block")?;

    match kind {
        "paragraph" => {
            let paragraph = item
                .get("paragraph")
                .ok_or_else(|| PsError::Format("paragraph block missing payload".into()))?;
            let text = paragraph
                .get("rich_text")
                .and_then(Value::as_array)
                .map(|items| plain_text(items))
                .unwrap_or_default();
            Ok(ChildBlock {
                id,
                kind: BlockKind::Content,
                text: Some(text),
            })
        }
        "child_page" => {
            let title = item
                .get("child_page")
                .and_then(|page| page.get("title"))
                .and_then(Value::as_str)
                .map(str::to_string);
            Ok(ChildBlock {
                id,
                kind: BlockKind::ChildDocument,
                text: title,
            })
        }
        _ => Ok(ChildBlock {
            id,
            kind: BlockKind::Other,
            text: None,
        }),
    }
}

fn plain_text(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|item| {
            item.get("plain_text")
                .and_then(Value::as_str)
                .or_else(|| {
                    item.get("text")
                        .and_then(|text| text.get("content"))
                        .and_then(Value::as_str)
                })
        })
        .collect()
}

/// Locate the title property by scanning for the property of type `"title"`;
/// the property key itself is user-renameable.
fn extract_title(page: &Value) -> PsResult<String> {
    let properties = page
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| PsError::Format("page response has no properties".into()))?;

    let title_items = properties
        .values()
        .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
        .and_then(|prop| prop.get("title"))
        .and_then(Value::as_array)
        .ok_or_else(|| PsError::Format("page response has no title property".into()))?;

    Ok(plain_text(title_items))
}

fn parse_timestamp(value: &Value, field: &str) -> Option<DateTime<Utc>> {
    value
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(i, _)| i);
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_for(server: &mockito::ServerGuard) -> NotionApi {
        let config = NotionConfig {
            base_url: server.url(),
            parent_page_id: Some("parent-1".into()),
            ..Default::default()
        };
        NotionApi::new("secret-token", &config).unwrap()
    }

    #[tokio::test]
    async fn create_page_parses_identity_and_sends_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/pages")
            .match_header("Authorization", "Bearer secret-token")
            .match_header("Notion-Version", "2022-06-28")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "id": "page-1",
                    "url": "https://notion.so/page-1",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = api_for(&server);
        let page = api.create_page("My prompt").await.unwrap();
        assert_eq!(page.id, "page-1");
        assert_eq!(page.url, "https://notion.so/page-1");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_page_without_parent_is_invalid_input() {
        let server = mockito::Server::new_async().await;
        let config = NotionConfig {
            base_url: server.url(),
            parent_page_id: None,
            ..Default::default()
        };
        let api = NotionApi::new("secret-token", &config).unwrap();

        let err = api.create_page("Orphan").await.unwrap_err();
        assert!(matches!(err, PsError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn list_child_blocks_maps_known_kinds_and_skips_nothing() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "results": [
                {
                    "id": "b1",
                    "type": "paragraph",
                    "paragraph": { "rich_text": [
                        { "plain_text": "Hello " },
                        { "plain_text": "world" },
                    ]},
                },
                { "id": "p2", "type": "child_page", "child_page": { "title": "Nested" } },
                { "id": "d1", "type": "divider" },
            ],
            "has_more": false,
        });
        let mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"/v1/blocks/page-1/children\?page_size=100$".to_string()),
            )
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let api = api_for(&server);
        let blocks = api.list_child_blocks("page-1").await.unwrap();

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Content);
        assert_eq!(blocks[0].text.as_deref(), Some("Hello world"));
        assert_eq!(blocks[1].kind, BlockKind::ChildDocument);
        assert_eq!(blocks[1].text.as_deref(), Some("Nested"));
        assert_eq!(blocks[2].kind, BlockKind::Other);
        assert!(blocks[2].text.is_none());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_child_blocks_follows_pagination() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"/v1/blocks/page-1/children\?page_size=100$".to_string()),
            )
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "results": [
                        { "id": "b1", "type": "paragraph", "paragraph": { "rich_text": [
                            { "plain_text": "First" },
                        ]}},
                    ],
                    "has_more": true,
                    "next_cursor": "cur-2",
                })
                .to_string(),
            )
            .create_async()
            .await;
        let second = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"start_cursor=cur-2$".to_string()),
            )
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "results": [
                        { "id": "b2", "type": "paragraph", "paragraph": { "rich_text": [
                            { "plain_text": "Second" },
                        ]}},
                    ],
                    "has_more": false,
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = api_for(&server);
        let blocks = api.list_child_blocks("page-1").await.unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text.as_deref(), Some("First"));
        assert_eq!(blocks[1].text.as_deref(), Some("Second"));

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn get_page_finds_renamed_title_property() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "id": "page-1",
            "url": "https://notion.so/page-1",
            "created_time": "2024-01-01T00:00:00.000Z",
            "last_edited_time": "2024-02-01T12:30:00.000Z",
            "properties": {
                "Name": {
                    "type": "title",
                    "title": [ { "plain_text": "Renamed title" } ],
                },
            },
        });
        let _mock = server
            .mock("GET", "/v1/pages/page-1")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let api = api_for(&server);
        let page = api.get_page("page-1").await.unwrap();

        assert_eq!(page.title, "Renamed title");
        assert!(page.created_at.is_some());
        assert!(page.updated_at.is_some());
    }

    #[tokio::test]
    async fn get_page_without_title_property_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "id": "page-1",
            "url": "https://notion.so/page-1",
            "properties": {
                "Status": { "type": "select", "select": { "name": "Active" } },
            },
        });
        let _mock = server
            .mock("GET", "/v1/pages/page-1")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let api = api_for(&server);
        let err = api.get_page("page-1").await.unwrap_err();
        assert!(matches!(err, PsError::Format(_)));
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/pages/page-1")
            .with_status(401)
            .with_body(r#"{"message":"API token is invalid."}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let err = api.get_page("page-1").await.unwrap_err();
        assert!(matches!(err, PsError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn server_error_maps_to_downstream() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PATCH", "/v1/blocks/b1")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let api = api_for(&server);
        let err = api.update_content_block("b1", "new text").await.unwrap_err();
        assert!(matches!(err, PsError::Downstream(_)));
    }

    #[tokio::test]
    async fn append_sends_one_paragraph_per_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/blocks/page-1/children")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "children": [
                    { "type": "paragraph", "paragraph": { "rich_text": [
                        { "type": "text", "text": { "content": "one" } },
                    ]}},
                    { "type": "paragraph", "paragraph": { "rich_text": [
                        { "type": "text", "text": { "content": "two" } },
                    ]}},
                ],
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let api = api_for(&server);
        api.append_content_blocks("page-1", &["one".to_string(), "two".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_child_list_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"/v1/blocks/page-1/children.*".to_string()),
            )
            .with_status(200)
            .with_body(r#"{"object":"list"}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let err = api.list_child_blocks("page-1").await.unwrap_err();
        assert!(matches!(err, PsError::Format(_)));
    }
}
