//! Quran API client wrapper

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use crate::{log_api_request, log_api_result};
use super::quran::{Envelope, SurahDetail, SurahSummary};

/// Client for the two GET endpoints plus audio downloads
#[derive(Clone)]
pub struct QuranClient {
    http: Client,
    base_url: Arc<str>,
    imam_id: u32,
}

impl QuranClient {
    pub fn new(base_url: &str, imam_id: u32, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quran-tui/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            imam_id,
        })
    }

    pub fn list_url(&self) -> String {
        format!("{}/quran", self.base_url)
    }

    pub fn detail_url(&self, number: u32) -> String {
        format!("{}/quran/{}?imamId={}", self.base_url, number, self.imam_id)
    }

    pub async fn list_surahs(&self) -> AppResult<Vec<SurahSummary>> {
        let url = self.list_url();
        log_api_request!("list_surahs", url = %url);
        let result = self.get_data(&url).await;
        log_api_result!("list_surahs", result);
        result
    }

    pub async fn get_surah_detail(&self, number: u32) -> AppResult<SurahDetail> {
        log_api_request!("get_surah_detail", number);
        let result = self.get_data(&self.detail_url(number)).await;
        log_api_result!("get_surah_detail", result);
        result
    }

    /// Download a recitation track into memory for the audio backend
    pub async fn fetch_audio(&self, url: &str) -> AppResult<Vec<u8>> {
        log_api_request!("fetch_audio", url);
        let response = self.http.get(url).send().await?;
        let response = Self::check_status(response, url)?;
        let bytes = response.bytes().await?;
        tracing::debug!(url, size = bytes.len(), "Audio downloaded");
        Ok(bytes.to_vec())
    }

    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self.http.get(url).send().await?;
        let response = Self::check_status(response, url)?;
        let body = response.bytes().await?;
        decode_envelope(&body)
    }

    fn check_status(response: reqwest::Response, url: &str) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AppError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

/// Unwrap the `data` field of a response body
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok(envelope.data)
}
