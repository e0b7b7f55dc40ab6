use std::time::Duration;

use anyhow::{bail, Result};
use chrono::SecondsFormat;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use url::Url;

use crate::model::{self, CreatedPost, StreamItem, Timestamp};
use crate::service::{BlogService, ServiceError};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("blog client user agent required");
        }
        let base = if config.base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.base_url
        };
        let base_url = Url::parse(&base)?;

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(Duration::from_secs(20)))
                .build()?,
        };

        let credentials = if config.username.is_empty() {
            None
        } else {
            Some((config.username, config.password))
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|err| ServiceError::Transport(format!("bad url {path}: {err}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| ServiceError::Transport(err.to_string()))?;
    if !status.is_success() {
        return Err(ServiceError::Rejected { status, body });
    }
    serde_json::from_str(&body).map_err(|err| ServiceError::Decode(err.to_string()))
}

/// RFC 3339 as the server's `before` parser expects it.
pub fn format_boundary(before: &Timestamp) -> String {
    before.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl BlogService for Client {
    fn publish(&self, html: &str) -> Result<CreatedPost, ServiceError> {
        let url = self.endpoint("post")?;
        let request = self.authorize(self.http.post(url)).form(&[("html", html)]);
        self.send(request)
    }

    fn stream(&self, before: Option<Timestamp>) -> Result<Vec<StreamItem>, ServiceError> {
        let before = before.unwrap_or_else(model::now);
        let url = self.endpoint("stream")?;
        let request = self
            .http
            .get(url)
            .query(&[("before", format_boundary(&before))]);
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::io::Read;
    use std::thread::{self, JoinHandle};
    use tiny_http::{Request, Response as HttpResponse, Server};

    struct Captured {
        method: String,
        url: String,
        authorization: Option<String>,
        content_type: Option<String>,
        body: String,
    }

    fn header(request: &Request, name: &'static str) -> Option<String> {
        request
            .headers()
            .iter()
            .find(|header| header.field.equiv(name))
            .map(|header| header.value.as_str().to_string())
    }

    /// Answer one request with `status` and `body`, handing back what was sent.
    fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Captured>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let mut captured = Captured {
                method: request.method().to_string(),
                url: request.url().to_string(),
                authorization: header(&request, "Authorization"),
                content_type: header(&request, "Content-Type"),
                body: String::new(),
            };
            request
                .as_reader()
                .read_to_string(&mut captured.body)
                .unwrap();
            request
                .respond(HttpResponse::from_string(body).with_status_code(status))
                .unwrap();
            captured
        });
        (format!("http://127.0.0.1:{port}/"), handle)
    }

    fn client(base_url: String, username: &str, password: &str) -> Client {
        Client::new(ClientConfig {
            base_url,
            user_agent: "cares-test".into(),
            username: username.into(),
            password: password.into(),
            timeout: Some(Duration::from_secs(5)),
            http_client: None,
        })
        .unwrap()
    }

    #[test]
    fn publish_posts_html_form_with_basic_auth() {
        let (base, server) = serve_once(
            200,
            r#"{"Html":"<b>hi</b>","Posted":"2024-03-01T10:00:00Z","Id":42}"#,
        );
        let created = client(base, "ann", "secret").publish("<b>hi</b>").unwrap();
        let seen = server.join().unwrap();

        assert_eq!(seen.method, "POST");
        assert_eq!(seen.url, "/post");
        assert_eq!(seen.authorization.as_deref(), Some("Basic YW5uOnNlY3JldA=="));
        assert_eq!(
            seen.content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(seen.body, "html=%3Cb%3Ehi%3C%2Fb%3E");

        assert_eq!(created.id, "42");
        assert_eq!(created.into_post().permalink, "/2024/42");
    }

    #[test]
    fn stream_sends_before_boundary() {
        let (base, server) = serve_once(200, "[]");
        let before = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap();
        let items = client(base, "", "").stream(Some(before)).unwrap();
        let seen = server.join().unwrap();

        assert!(items.is_empty());
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.url, "/stream?before=2024-03-01T10%3A00%3A00Z");
        assert_eq!(seen.authorization, None);
    }

    #[test]
    fn rejection_carries_raw_body() {
        let (base, server) = serve_once(400, "html value is required");
        let err = client(base, "ann", "secret").publish("").unwrap_err();
        server.join().unwrap();

        match &err {
            ServiceError::Rejected { status, body } => {
                assert_eq!(*status, reqwest::StatusCode::BAD_REQUEST);
                assert_eq!(body, "html value is required");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(err.user_message(), "html value is required");
    }

    #[test]
    fn requires_user_agent() {
        assert!(Client::new(ClientConfig::default()).is_err());
    }

    #[test]
    fn empty_base_url_uses_default() {
        let client = Client::new(ClientConfig {
            user_agent: "cares-test".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(
            client.endpoint("stream").unwrap().as_str(),
            "http://127.0.0.1:8080/stream"
        );
    }

    #[test]
    fn endpoints_respect_base_path() {
        let client = Client::new(ClientConfig {
            base_url: "https://blog.example/cares/".into(),
            user_agent: "cares-test".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint("post").unwrap().as_str(),
            "https://blog.example/cares/post"
        );
    }

    #[test]
    fn boundary_keeps_offset_and_fraction() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T10:00:00.250+02:00").unwrap();
        assert_eq!(format_boundary(&ts), "2024-03-01T10:00:00.250+02:00");
        let utc = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(format_boundary(&utc), "2024-03-01T10:00:00Z");
    }
}
