//! # Remote Data Service
//!
//! Contract and HTTP implementation for the hosted relational backend.
//!
//! The backend exposes row-oriented CRUD per collection: insert with
//! return-representation, update and delete by id-equality filter, and
//! select with ordering and equality filters. Failure is a non-success
//! status or transport error; all calls are fail-fast with the configured
//! request timeout, never retried here (retries belong to the pending
//! queue).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{RemoteError, RemoteResult};
use crate::model::{
    Rt, RtInput, RtPatch, SavingsTransaction, SavingsTransactionInput, WasteTransaction,
    WasteTransactionInput, WasteType, WasteTypeInput,
};

/// Row-CRUD contract of the remote data service.
///
/// The sync manager depends only on this trait; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn insert_rt(&self, input: &RtInput) -> RemoteResult<Rt>;
    async fn update_rt(&self, id: &str, patch: &RtPatch) -> RemoteResult<()>;
    async fn delete_rt(&self, id: &str) -> RemoteResult<()>;
    /// All units ordered by display number
    async fn list_rt(&self) -> RemoteResult<Vec<Rt>>;
    async fn count_rt(&self) -> RemoteResult<i64>;

    async fn insert_waste_type(&self, input: &WasteTypeInput) -> RemoteResult<WasteType>;
    /// Active categories ordered by name
    async fn list_active_waste_types(&self) -> RemoteResult<Vec<WasteType>>;
    /// Every category, active or not
    async fn list_waste_types(&self) -> RemoteResult<Vec<WasteType>>;
    async fn count_waste_types(&self) -> RemoteResult<i64>;

    async fn insert_waste_transaction(
        &self,
        input: &WasteTransactionInput,
    ) -> RemoteResult<WasteTransaction>;
    /// All deposits, newest first
    async fn list_waste_transactions(&self) -> RemoteResult<Vec<WasteTransaction>>;

    async fn insert_savings_transaction(
        &self,
        input: &SavingsTransactionInput,
    ) -> RemoteResult<SavingsTransaction>;
    /// All savings adjustments, newest first
    async fn list_savings_transactions(&self) -> RemoteResult<Vec<SavingsTransaction>>;
}

/// PostgREST-style HTTP client for the remote data service.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: Config,
}

impl HttpRemote {
    /// Build a client with the configured timeout and auth headers
    pub fn new(config: Config) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key() {
            let value = HeaderValue::from_str(key)
                .map_err(|e| RemoteError::Network(format!("invalid api key: {}", e)))?;
            headers.insert("apikey", value.clone());
            let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| RemoteError::Network(format!("invalid api key: {}", e)))?;
            headers.insert(reqwest::header::AUTHORIZATION, bearer);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    async fn check_status(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// `POST /{table}` with `Prefer: return=representation`; the backend
    /// answers with an array holding the inserted row
    async fn insert_returning<I, R>(&self, table: &str, input: &I) -> RemoteResult<R>
    where
        I: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.config.rest_url(table))
            .header("Prefer", "return=representation")
            .json(input)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let mut rows: Vec<R> = response.json().await?;
        if rows.is_empty() {
            return Err(RemoteError::Decode(format!(
                "insert into {} returned no rows",
                table
            )));
        }
        Ok(rows.remove(0))
    }

    /// `PATCH /{table}?id=eq.{id}`
    async fn patch_by_id<P>(&self, table: &str, id: &str, patch: &P) -> RemoteResult<()>
    where
        P: Serialize + Sync,
    {
        let response = self
            .client
            .patch(self.config.rest_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .json(patch)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// `DELETE /{table}?id=eq.{id}`
    async fn delete_by_id(&self, table: &str, id: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.config.rest_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// `GET /{table}?select=*` with the given extra query pairs
    async fn select<R>(&self, table: &str, query: &[(&str, &str)]) -> RemoteResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.config.rest_url(table))
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Exact row count via the `Content-Range` header
    async fn count(&self, table: &str) -> RemoteResult<i64> {
        let response = self
            .client
            .get(self.config.rest_url(table))
            .query(&[("select", "id"), ("limit", "1")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| RemoteError::Decode("missing Content-Range header".to_string()))?;

        parse_content_range_total(range)
            .ok_or_else(|| RemoteError::Decode(format!("malformed Content-Range: {}", range)))
    }
}

/// Total from a `Content-Range` value such as `0-0/42` or `*/0`
fn parse_content_range_total(range: &str) -> Option<i64> {
    range.rsplit('/').next()?.parse().ok()
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn insert_rt(&self, input: &RtInput) -> RemoteResult<Rt> {
        self.insert_returning("rt", input).await
    }

    async fn update_rt(&self, id: &str, patch: &RtPatch) -> RemoteResult<()> {
        self.patch_by_id("rt", id, patch).await
    }

    async fn delete_rt(&self, id: &str) -> RemoteResult<()> {
        self.delete_by_id("rt", id).await
    }

    async fn list_rt(&self) -> RemoteResult<Vec<Rt>> {
        self.select("rt", &[("order", "nomor.asc")]).await
    }

    async fn count_rt(&self) -> RemoteResult<i64> {
        self.count("rt").await
    }

    async fn insert_waste_type(&self, input: &WasteTypeInput) -> RemoteResult<WasteType> {
        self.insert_returning("waste_types", input).await
    }

    async fn list_active_waste_types(&self) -> RemoteResult<Vec<WasteType>> {
        self.select(
            "waste_types",
            &[("is_active", "eq.true"), ("order", "name.asc")],
        )
        .await
    }

    async fn list_waste_types(&self) -> RemoteResult<Vec<WasteType>> {
        self.select("waste_types", &[("order", "name.asc")]).await
    }

    async fn count_waste_types(&self) -> RemoteResult<i64> {
        self.count("waste_types").await
    }

    async fn insert_waste_transaction(
        &self,
        input: &WasteTransactionInput,
    ) -> RemoteResult<WasteTransaction> {
        self.insert_returning("waste_transactions", input).await
    }

    async fn list_waste_transactions(&self) -> RemoteResult<Vec<WasteTransaction>> {
        self.select("waste_transactions", &[("order", "created_at.desc")])
            .await
    }

    async fn insert_savings_transaction(
        &self,
        input: &SavingsTransactionInput,
    ) -> RemoteResult<SavingsTransaction> {
        self.insert_returning("savings_transactions", input).await
    }

    async fn list_savings_transactions(&self) -> RemoteResult<Vec<SavingsTransaction>> {
        self.select("savings_transactions", &[("order", "created_at.desc")])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-0/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_client_builds_without_api_key() {
        let config = Config::new().with_remote_url("http://127.0.0.1:54321");
        assert!(HttpRemote::new(config).is_ok());
    }
}
