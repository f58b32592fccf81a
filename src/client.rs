use crate::error::{ApiError, CaraError};
use crate::models::{EntriesPage, parse_entries_page};
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::{Client as HttpClient, Response, StatusCode};

const BASE_URL: &str = "https://web.gohidoc.com/api/dashboard/me";
const TOKEN_HEADER: &str = "x-token";

/// Date-bounded, limit/offset-bounded request for diary entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntriesQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub limit: u32,
    pub offset: u32,
}

/// Result of asking the dashboard for one meal photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResponse {
    Found(Vec<u8>),
    Unavailable(StatusCode),
}

/// The two dashboard calls the exporter needs.
#[allow(async_fn_in_trait)]
pub trait DiaryApi {
    async fn fetch_entries(&self, query: &EntriesQuery) -> Result<EntriesPage, CaraError>;

    async fn fetch_image(&self, image_id: &str) -> Result<ImageResponse, CaraError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    token: String,
    http: HttpClient,
    base_url: String,
}

impl Client {
    /// Create a new client with the default base URL.
    pub fn new(token: impl Into<String>) -> Result<Self, CaraError> {
        let token = token.into();
        if token.is_empty() {
            return Err(CaraError::MissingToken);
        }

        let http = HttpClient::builder().build()?;

        info!("Initialized dashboard client with default base URL");
        Ok(Self {
            token,
            http,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Updated dashboard base URL to {}", self.base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path and query of the entries request, relative to the base URL.
    pub fn entries_path(query: &EntriesQuery) -> String {
        format!(
            "/data-points/?start={}&end={}&limit={}&offset={}",
            query.start.format("%Y-%m-%d"),
            query.end.format("%Y-%m-%d"),
            query.limit,
            query.offset
        )
    }

    pub fn image_path(image_id: &str) -> String {
        format!("/images/{}/", image_id)
    }

    async fn get(&self, path: String) -> Result<Response, CaraError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET request to {}", url);
        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        debug!("Received status {}", response.status());
        Ok(response)
    }

    fn handle_status(&self, status: StatusCode) -> Result<(), CaraError> {
        if status.is_success() {
            return Ok(());
        }
        let api_error = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(status),
            StatusCode::NOT_FOUND => ApiError::NotFound,
            _ => ApiError::UnexpectedStatus(status),
        };
        Err(CaraError::Api(api_error))
    }
}

impl DiaryApi for Client {
    /// Fetch a single page of diary entries for the given window.
    async fn fetch_entries(&self, query: &EntriesQuery) -> Result<EntriesPage, CaraError> {
        if query.start > query.end {
            return Err(CaraError::InvalidDateRange {
                start: query.start,
                end: query.end,
            });
        }
        debug!(
            "Fetching entries from {} to {} (limit {}, offset {})",
            query.start, query.end, query.limit, query.offset
        );
        let response = self.get(Self::entries_path(query)).await?;
        self.handle_status(response.status())?;
        let body = response.text().await?;
        parse_entries_page(&body)
    }

    /// Fetch the bytes of one meal photo. Only a 200 counts as an image.
    async fn fetch_image(&self, image_id: &str) -> Result<ImageResponse, CaraError> {
        let response = self.get(Self::image_path(image_id)).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok(ImageResponse::Unavailable(status));
        }
        let bytes = response.bytes().await?;
        Ok(ImageResponse::Found(bytes.to_vec()))
    }
}
