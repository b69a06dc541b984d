use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use flashcards_core::model::QuestionId;

use crate::repository::{QuestionRecord, QuestionRepository, StorageError};

/// Connection settings for the hosted question store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
}

impl StoreConfig {
    /// Default table name when none is configured.
    pub const DEFAULT_TABLE: &'static str = "flashcards";
}

/// Question repository backed by a PostgREST-style hosted store.
#[derive(Clone)]
pub struct RestQuestionRepository {
    client: Client,
    config: StoreConfig,
}

impl RestQuestionRepository {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    async fn patch(&self, filter: &str, known: bool) -> Result<(), StorageError> {
        let url = format!("{}?{filter}", self.table_url());
        let response = self
            .client
            .patch(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .json(&KnownPatch { known })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for RestQuestionRepository {
    async fn fetch_all(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let url = format!("{}?select=*", self.table_url());
        let response = self
            .client
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::HttpStatus(response.status()));
        }

        let records: Vec<QuestionRecord> = response.json().await?;
        Ok(records)
    }

    async fn set_known(&self, id: &QuestionId, known: bool) -> Result<(), StorageError> {
        self.patch(&format!("id=eq.{id}"), known).await
    }

    async fn reset_all(&self) -> Result<(), StorageError> {
        // `id=neq.` matches every row, the same trick the hosted client used
        // for its bulk reset.
        self.patch("id=neq.", false).await
    }
}

#[derive(Debug, Serialize)]
struct KnownPatch {
    known: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StoreConfig {
        StoreConfig {
            base_url: base_url.to_owned(),
            api_key: "anon-key".to_owned(),
            table: "flashcards".to_owned(),
        }
    }

    #[test]
    fn table_url_joins_base_and_table() {
        let repo = RestQuestionRepository::new(config("https://example.test"));
        assert_eq!(repo.table_url(), "https://example.test/rest/v1/flashcards");
    }

    #[test]
    fn table_url_trims_trailing_slash() {
        let repo = RestQuestionRepository::new(config("https://example.test/"));
        assert_eq!(repo.table_url(), "https://example.test/rest/v1/flashcards");
    }
}
