//! HTTP client for the cluster agent's REST API.
//!
//! One `reqwest::Client` is built at construction and reused for every
//! call. Resource routes follow the agent's convention:
//!
//! ```text
//! GET/POST        /v1/namespaces/{ns}/workloads
//! GET/PUT/DELETE  /v1/namespaces/{ns}/workloads/{name}
//! GET/POST        /v1/namespaces/{ns}/endpoints
//! GET/DELETE      /v1/namespaces/{ns}/endpoints/{name}
//! GET             /v1/namespaces/{ns}/pods?selector={sel}
//! POST            /v1/namespaces/{ns}/pods/{name}/exec
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::api::ClusterApi;
use crate::error::{ClusterError, ClusterResult};
use crate::types::{Endpoint, EndpointSpec, ExecOutput, ExecRequest, PodInfo, Workload, WorkloadSpec};

/// REST client for the cluster agent.
pub struct HttpClusterClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpClusterClient {
    /// Build a client for the agent at `base_url`, with optional bearer auth.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> ClusterResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClusterError::Transport(e.to_string()))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClusterResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|e| ClusterError::Transport(e.to_string()))
    }

    /// Map a non-success response into a typed error.
    async fn fail(resource: &str, resp: reqwest::Response) -> ClusterError {
        let status = resp.status();
        match status {
            StatusCode::NOT_FOUND => ClusterError::NotFound(resource.to_string()),
            StatusCode::CONFLICT => ClusterError::AlreadyExists(resource.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ClusterError::Unauthorized(resource.to_string())
            }
            _ => {
                let message = resp.text().await.unwrap_or_default();
                ClusterError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> ClusterResult<T> {
        resp.json::<T>()
            .await
            .map_err(|e| ClusterError::Serialize(e.to_string()))
    }
}

#[async_trait]
impl ClusterApi for HttpClusterClient {
    async fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<Option<Workload>> {
        let path = format!("/v1/namespaces/{namespace}/workloads/{name}");
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::fail(name, resp).await);
        }
        Ok(Some(Self::json(resp).await?))
    }

    async fn create_workload(&self, spec: &WorkloadSpec) -> ClusterResult<()> {
        let path = format!("/v1/namespaces/{}/workloads", spec.namespace);
        let resp = self
            .send(self.request(reqwest::Method::POST, &path).json(spec))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(&spec.name, resp).await);
        }
        debug!(name = %spec.name, namespace = %spec.namespace, "workload created");
        Ok(())
    }

    async fn update_workload(&self, spec: &WorkloadSpec) -> ClusterResult<()> {
        let path = format!("/v1/namespaces/{}/workloads/{}", spec.namespace, spec.name);
        let resp = self
            .send(self.request(reqwest::Method::PUT, &path).json(spec))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(&spec.name, resp).await);
        }
        Ok(())
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> ClusterResult<bool> {
        let path = format!("/v1/namespaces/{namespace}/workloads/{name}");
        let resp = self
            .send(self.request(reqwest::Method::DELETE, &path))
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(Self::fail(name, resp).await);
        }
        Ok(true)
    }

    async fn list_workloads(&self, namespace: &str) -> ClusterResult<Vec<Workload>> {
        let path = format!("/v1/namespaces/{namespace}/workloads");
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        if !resp.status().is_success() {
            return Err(Self::fail(namespace, resp).await);
        }
        Self::json(resp).await
    }

    async fn get_endpoint(&self, namespace: &str, name: &str) -> ClusterResult<Option<Endpoint>> {
        let path = format!("/v1/namespaces/{namespace}/endpoints/{name}");
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::fail(name, resp).await);
        }
        Ok(Some(Self::json(resp).await?))
    }

    async fn create_endpoint(&self, spec: &EndpointSpec) -> ClusterResult<()> {
        let path = format!("/v1/namespaces/{}/endpoints", spec.namespace);
        let resp = self
            .send(self.request(reqwest::Method::POST, &path).json(spec))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(&spec.name, resp).await);
        }
        debug!(name = %spec.name, namespace = %spec.namespace, "endpoint created");
        Ok(())
    }

    async fn delete_endpoint(&self, namespace: &str, name: &str) -> ClusterResult<bool> {
        let path = format!("/v1/namespaces/{namespace}/endpoints/{name}");
        let resp = self
            .send(self.request(reqwest::Method::DELETE, &path))
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(Self::fail(name, resp).await);
        }
        Ok(true)
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> ClusterResult<Vec<PodInfo>> {
        let path = format!("/v1/namespaces/{namespace}/pods");
        let resp = self
            .send(
                self.request(reqwest::Method::GET, &path)
                    .query(&[("selector", selector)]),
            )
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(selector, resp).await);
        }
        Self::json(resp).await
    }

    async fn exec(
        &self,
        namespace: &str,
        pod: &str,
        req: &ExecRequest,
    ) -> ClusterResult<ExecOutput> {
        let path = format!("/v1/namespaces/{namespace}/pods/{pod}/exec");
        let resp = self
            .send(self.request(reqwest::Method::POST, &path).json(req))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(pod, resp).await);
        }
        Self::json(resp).await
    }
}
