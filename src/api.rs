//! Client for the genealogy JSON API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::model::{Event, FamilySnapshot, Person, Relationship, Statistics};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait FamilyApi: Send + Sync {
    async fn statistics(&self) -> ApiResult<Statistics>;
    async fn people(&self) -> ApiResult<Vec<Person>>;
    async fn relationships(&self) -> ApiResult<Vec<Relationship>>;
    async fn events(&self) -> ApiResult<Vec<Event>>;

    async fn create_person(&self, person: &Person) -> ApiResult<Person>;
    async fn update_person(&self, id: &str, person: &Person) -> ApiResult<()>;
    async fn delete_person(&self, id: &str) -> ApiResult<()>;

    async fn create_relationship(&self, relationship: &Relationship) -> ApiResult<Relationship>;
    async fn delete_relationship(&self, id: &str) -> ApiResult<()>;

    async fn create_event(&self, event: &Event) -> ApiResult<Event>;
    async fn update_event(&self, id: &str, event: &Event) -> ApiResult<()>;
    async fn delete_event(&self, id: &str) -> ApiResult<()>;

    /// People, relationships and events fetched concurrently.
    async fn family(&self) -> ApiResult<FamilySnapshot> {
        let (people, relationships, events) =
            tokio::try_join!(self.people(), self.relationships(), self.events())?;
        Ok(FamilySnapshot {
            people,
            relationships,
            events,
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// `FamilyApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        debug!(%url, %status, "api response");
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.or(body.message))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or(text)
            });
        warn!(%url, %status, %message, "api request failed");
        Err(ApiError::Status {
            url: url.to_string(),
            status,
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        let response = self.send(&url, self.client.get(&url)).await?;
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.client.request(method, &url).json(body);
        let response = self.send(&url, request).await?;
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: serde::Serialize + Sync + ?Sized,
    {
        let url = self.url(path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(&url, request).await?;
        Ok(())
    }
}

#[async_trait]
impl FamilyApi for HttpApi {
    async fn statistics(&self) -> ApiResult<Statistics> {
        self.get_json("statistics").await
    }

    async fn people(&self) -> ApiResult<Vec<Person>> {
        self.get_json("people").await
    }

    async fn relationships(&self) -> ApiResult<Vec<Relationship>> {
        self.get_json("relationships").await
    }

    async fn events(&self) -> ApiResult<Vec<Event>> {
        self.get_json("events").await
    }

    async fn create_person(&self, person: &Person) -> ApiResult<Person> {
        self.send_json(Method::POST, "people", person).await
    }

    async fn update_person(&self, id: &str, person: &Person) -> ApiResult<()> {
        self.send_unit(Method::PUT, &format!("people/{id}"), Some(person))
            .await
    }

    async fn delete_person(&self, id: &str) -> ApiResult<()> {
        self.send_unit::<()>(Method::DELETE, &format!("people/{id}"), None)
            .await
    }

    async fn create_relationship(&self, relationship: &Relationship) -> ApiResult<Relationship> {
        self.send_json(Method::POST, "relationships", relationship)
            .await
    }

    async fn delete_relationship(&self, id: &str) -> ApiResult<()> {
        self.send_unit::<()>(Method::DELETE, &format!("relationships/{id}"), None)
            .await
    }

    async fn create_event(&self, event: &Event) -> ApiResult<Event> {
        self.send_json(Method::POST, "events", event).await
    }

    async fn update_event(&self, id: &str, event: &Event) -> ApiResult<()> {
        self.send_unit(Method::PUT, &format!("events/{id}"), Some(event))
            .await
    }

    async fn delete_event(&self, id: &str) -> ApiResult<()> {
        self.send_unit::<()>(Method::DELETE, &format!("events/{id}"), None)
            .await
    }
}
