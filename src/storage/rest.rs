use axum::http::{HeaderMap, HeaderValue};
use reqwest::{Response, header};
use serde::Deserialize;

use crate::content::{NewPost, Post, PostChanges};

use super::{PostStore, StoreError};

const TABLE_PATH: &str = "/rest/v1/posts";
const SELECT_ALL: (&str, &str) = ("select", "*");
const NEWEST_FIRST: (&str, &str) = ("order", "created_at.desc,id.desc");

/// PostgREST 兼容的 REST 存储客户端
///
/// 访问密钥同时作为 `apikey` 与 `Authorization: Bearer` 请求头发送。
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    endpoint: String,
}

impl RestStore {
    /// 使用存储地址与访问密钥创建客户端
    ///
    /// ```ignore
    /// let store = RestStore::new("https://project.supabase.co", "anon-key")?;
    /// ```
    pub fn new(base_url: &str, key: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers({
                let mut header = HeaderMap::new();
                header.insert("apikey", header_value(key)?);
                header.insert(header::AUTHORIZATION, header_value(&format!("Bearer {key}"))?);
                header.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
                header
            })
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TABLE_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value).map_err(|_| StoreError::Rejected {
        status: 0,
        message: "access key contains invalid header characters".to_string(),
    })
}

fn eq_filter(slug: &str) -> (&'static str, String) {
    ("slug", format!("eq.{slug}"))
}

/// PostgREST 的错误响应体
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: String,
    details: Option<String>,
}

/// 将非 2xx 响应转换为 [`StoreError::Rejected`]
async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = match resp.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(%e, %status, "failed to read error body");
            String::new()
        }
    };
    Err(rejected(status.as_u16(), &text))
}

fn rejected(status: u16, body: &str) -> StoreError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message,
            details: Some(details),
        }) if !message.is_empty() => format!("{message} ({details})"),
        Ok(ErrorBody { message, .. }) if !message.is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {status}"),
    };
    StoreError::Rejected { status, message }
}

impl PostStore for RestStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[SELECT_ALL, NEWEST_FIRST])
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn get(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[SELECT_ALL, ("limit", "1")])
            .query(&[eq_filter(slug)])
            .send()
            .await?;
        let rows: Vec<Post> = check(resp).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=representation")
            .json(&[post])
            .send()
            .await?;
        let rows: Vec<Post> = check(resp).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| StoreError::Rejected {
            status: 200,
            message: "insert returned no row".to_string(),
        })
    }

    async fn update(&self, slug: &str, changes: PostChanges) -> Result<Option<Post>, StoreError> {
        let resp = self
            .client
            .patch(&self.endpoint)
            .header("Prefer", "return=representation")
            .query(&[eq_filter(slug)])
            .json(&changes)
            .send()
            .await?;
        let rows: Vec<Post> = check(resp).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, slug: &str) -> Result<bool, StoreError> {
        let resp = self
            .client
            .delete(&self.endpoint)
            .header("Prefer", "return=representation")
            .query(&[eq_filter(slug)])
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = check(resp).await?.json().await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        body::to_bytes,
        extract::{Request, State},
        http::{Method, StatusCode},
        response::IntoResponse,
        routing::any,
    };

    use super::*;

    const KEY: &str = "anon-key";

    const ROW: &str = r#"[{"id":7,"created_at":"2025-01-01T08:00:00+00:00","title":"Tin Nóng","description":"d","image":"https://img.example/a.png","slug":"tin-nong","externalUrl":null}]"#;

    /// 存储端收到的一次请求
    #[derive(Debug)]
    struct Seen {
        method: Method,
        query: Vec<(String, String)>,
        headers: HeaderMap,
        body: String,
    }

    impl Seen {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|v| v.to_str().ok())
        }

        fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).expect("请求体不是 JSON")
        }
    }

    type SeenLog = Arc<Mutex<Vec<Seen>>>;

    #[derive(Clone)]
    struct Upstream {
        seen: SeenLog,
        status: StatusCode,
        body: &'static str,
    }

    async fn record(State(upstream): State<Upstream>, req: Request) -> impl IntoResponse {
        let (parts, body) = req.into_parts();
        let body = to_bytes(body, usize::MAX).await.expect("读取请求体失败");
        let query = serde_urlencoded::from_str(parts.uri.query().unwrap_or_default())
            .expect("查询参数解析失败");

        upstream.seen.lock().unwrap().push(Seen {
            method: parts.method,
            query,
            headers: parts.headers,
            body: String::from_utf8(body.to_vec()).expect("请求体不是 UTF-8"),
        });

        (
            upstream.status,
            [(header::CONTENT_TYPE, "application/json")],
            upstream.body,
        )
    }

    /// 启动一个只在表路径上应答固定内容的本地服务
    async fn upstream(status: StatusCode, body: &'static str) -> (RestStore, SeenLog) {
        let seen = SeenLog::default();
        let router = Router::new()
            .route(TABLE_PATH, any(record))
            .with_state(Upstream {
                seen: seen.clone(),
                status,
                body,
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let store = RestStore::new(&format!("http://{addr}"), KEY).unwrap();
        (store, seen)
    }

    fn single(seen: &SeenLog) -> Seen {
        let mut seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "应只发出一次请求");
        seen.remove(0)
    }

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn assert_auth(req: &Seen) {
        assert_eq!(req.header("apikey"), Some(KEY));
        assert_eq!(req.header("authorization"), Some("Bearer anon-key"));
    }

    fn changes() -> PostChanges {
        PostChanges {
            title: "Tin Nóng".to_string(),
            description: "mới".to_string(),
            image: "https://img.example/a.png".to_string(),
            external_url: None,
        }
    }

    #[tokio::test]
    async fn test_list_selects_all_newest_first() {
        let (store, seen) = upstream(StatusCode::OK, ROW).await;

        let posts = store.list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "tin-nong");
        assert_eq!(posts[0].id, 7);

        let req = single(&seen);
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.query,
            pairs(&[("select", "*"), ("order", "created_at.desc,id.desc")])
        );
        assert_auth(&req);
        assert_eq!(req.header("prefer"), None);
    }

    #[tokio::test]
    async fn test_get_filters_by_slug_with_limit() {
        let (store, seen) = upstream(StatusCode::OK, ROW).await;

        let post = store.get("tin-nong").await.unwrap();
        assert_eq!(post.map(|p| p.title), Some("Tin Nóng".to_string()));

        let req = single(&seen);
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.query,
            pairs(&[("select", "*"), ("limit", "1"), ("slug", "eq.tin-nong")])
        );
        assert_auth(&req);
    }

    #[tokio::test]
    async fn test_get_missing_row() {
        let (store, _seen) = upstream(StatusCode::OK, "[]").await;
        assert_eq!(store.get("khong-co").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_posts_array_and_returns_row() {
        let (store, seen) = upstream(StatusCode::CREATED, ROW).await;

        let created = store
            .insert(NewPost {
                title: "Tin Nóng".to_string(),
                description: "d".to_string(),
                image: "https://img.example/a.png".to_string(),
                slug: "tin-nong".to_string(),
                external_url: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 7);

        let req = single(&seen);
        assert_eq!(req.method, Method::POST);
        assert!(req.query.is_empty());
        assert_auth(&req);
        assert_eq!(req.header("prefer"), Some("return=representation"));

        let body = req.json();
        let rows = body.as_array().expect("新建请求体应为数组");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["slug"], "tin-nong");
        assert_eq!(rows[0]["title"], "Tin Nóng");
        assert!(rows[0].get("externalUrl").is_some());
    }

    #[tokio::test]
    async fn test_update_patches_without_slug() {
        let (store, seen) = upstream(StatusCode::OK, ROW).await;

        let updated = store.update("tin-nong", changes()).await.unwrap();
        assert!(updated.is_some());

        let req = single(&seen);
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.query, pairs(&[("slug", "eq.tin-nong")]));
        assert_auth(&req);
        assert_eq!(req.header("prefer"), Some("return=representation"));

        let body = req.json();
        assert!(body.is_object());
        assert_eq!(body["description"], "mới");
        assert!(body.get("slug").is_none(), "更新请求不应包含 slug");
    }

    #[tokio::test]
    async fn test_delete_reports_removed_rows() {
        let (store, seen) = upstream(StatusCode::OK, ROW).await;
        assert!(store.delete("tin-nong").await.unwrap());

        let req = single(&seen);
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.query, pairs(&[("slug", "eq.tin-nong")]));
        assert_auth(&req);

        let (store, _seen) = upstream(StatusCode::OK, "[]").await;
        assert!(!store.delete("tin-nong").await.unwrap());
    }

    #[tokio::test]
    async fn test_error_response_surfaces_message() {
        let body = r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint \"posts_slug_key\""}"#;
        let (store, _seen) = upstream(StatusCode::CONFLICT, body).await;

        let err = store.update("tin-nong", changes()).await.unwrap_err();
        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(
                    message,
                    r#"duplicate key value violates unique constraint "posts_slug_key""#
                );
            }
            other => panic!("应为 Rejected，实际为 {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_error_body_falls_back_to_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0; 4096];
            let _ = socket.read(&mut buf).await;
            // 声明的长度大于实际发送的内容，读取响应体会失败
            let response = concat!(
                "HTTP/1.1 500 Internal Server Error\r\n",
                "content-length: 64\r\n\r\n",
                "partial",
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let store = RestStore::new(&format!("http://{addr}"), KEY).unwrap();
        match store.list().await.unwrap_err() {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP 500");
            }
            other => panic!("应为 Rejected，实际为 {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = RestStore::new("https://project.supabase.co/", "anon").unwrap();
        assert_eq!(
            store.endpoint(),
            "https://project.supabase.co/rest/v1/posts"
        );
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        assert!(RestStore::new("https://project.supabase.co", "bad\nkey").is_err());
    }

    #[test]
    fn test_rejected_uses_store_message() {
        let body = r#"{"code":"23505","details":"Key (slug)=(a) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"posts_slug_key\""}"#;
        let err = rejected(409, body);
        assert_eq!(
            err.to_string(),
            r#"duplicate key value violates unique constraint "posts_slug_key" (Key (slug)=(a) already exists.)"#
        );
    }

    #[test]
    fn test_rejected_falls_back_to_body_or_status() {
        assert_eq!(rejected(500, "upstream down").to_string(), "upstream down");
        assert_eq!(rejected(503, "").to_string(), "HTTP 503");
    }
}
