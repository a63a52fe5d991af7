//! HTTP Resource Manager
//!
//! [`ResourceManager`] over one REST collection:
//!
//! | capability           | request                                   |
//! |----------------------|-------------------------------------------|
//! | `create`             | `POST   {base}/{keyword}`                 |
//! | `get`                | `GET    {base}/{keyword}/{id}`            |
//! | `list`               | `GET    {base}/{keyword}`                 |
//! | `update`             | `PUT    {base}/{keyword}/{id}`            |
//! | `delete_with_params` | `DELETE {base}/{keyword}/{id}`            |
//! | `get_specific`       | `GET    {base}/{keyword}/{id}/{spec}`     |
//! | `perform_action`     | `POST   {base}/{keyword}/{id}/{action}`   |
//!
//! GET and DELETE carry params in the query string, the rest in the JSON body.

use super::auth::Session;
use super::http::{add_query_params, ApiClient};
use crate::resource::{ListResult, Params, ResourceManager};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

#[derive(Clone)]
pub struct HttpManager {
    api: ApiClient,
    base: Url,
    keyword: String,
}

impl HttpManager {
    /// Manager for the collection `keyword` under `endpoint`
    pub fn new(api: ApiClient, endpoint: &str, keyword: impl Into<String>) -> Result<Self> {
        let mut base =
            Url::parse(endpoint).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Endpoint cannot be used as a base URL: {}", endpoint);
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            api,
            base,
            keyword: keyword.into(),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// `{base}/{keyword}/{segments...}` with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<String> {
        let mut path = urlencoding::encode(&self.keyword).into_owned();
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        let url = self
            .base
            .join(&path)
            .with_context(|| format!("Failed to build URL for {}", path))?;
        Ok(url.to_string())
    }
}

impl std::fmt::Debug for HttpManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpManager")
            .field("base", &self.base.as_str())
            .field("keyword", &self.keyword)
            .finish()
    }
}

#[async_trait]
impl ResourceManager for HttpManager {
    async fn create(&self, session: &Session, params: &Params) -> Result<Value> {
        let url = self.url(&[])?;
        self.api.post(&url, session.token(), params).await
    }

    async fn get(&self, session: &Session, id: &str, params: &Params) -> Result<Value> {
        let url = add_query_params(&self.url(&[id])?, params);
        self.api.get(&url, session.token()).await
    }

    async fn list(&self, session: &Session, params: &Params) -> Result<ListResult> {
        let url = add_query_params(&self.url(&[])?, params);
        let response = self.api.get(&url, session.token()).await?;
        if response.is_null() {
            return Ok(ListResult::default());
        }
        serde_json::from_value(response).context("Failed to parse list response")
    }

    async fn update(&self, session: &Session, id: &str, params: &Params) -> Result<Value> {
        let url = self.url(&[id])?;
        self.api.put(&url, session.token(), params).await
    }

    async fn delete_with_params(
        &self,
        session: &Session,
        id: &str,
        params: &Params,
        extra: Option<&Params>,
    ) -> Result<Value> {
        let url = add_query_params(&self.url(&[id])?, params);
        self.api.delete(&url, session.token(), extra).await
    }

    async fn get_specific(
        &self,
        session: &Session,
        id: &str,
        spec: &str,
        params: &Params,
    ) -> Result<Value> {
        let url = add_query_params(&self.url(&[id, spec])?, params);
        self.api.get(&url, session.token()).await
    }

    async fn perform_action(
        &self,
        session: &Session,
        id: &str,
        action: &str,
        params: &Params,
    ) -> Result<Value> {
        let url = self.url(&[id, action])?;
        self.api.post(&url, session.token(), params).await
    }
}
