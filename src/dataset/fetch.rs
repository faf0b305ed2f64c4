use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{ExplorerError, Result};

/// 数据集字节流获取能力；失败时携带 HTTP 语义的状态码
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, logical_path: &str) -> Result<Bytes>;
}

/// 从本地数据目录读取数据集
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataFetcher for FsFetcher {
    async fn fetch(&self, logical_path: &str) -> Result<Bytes> {
        let path = self.root.join(logical_path);
        debug!("reading dataset from {}", path.display());
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) => {
                let status = match e.kind() {
                    ErrorKind::NotFound => 404,
                    ErrorKind::PermissionDenied => 403,
                    _ => 500,
                };
                Err(ExplorerError::DatasetFetch {
                    path: logical_path.to_string(),
                    status,
                })
            }
        }
    }
}

/// 通过 HTTP 从基础 URL 拉取数据集
#[cfg(feature = "http-fetch")]
pub struct HttpFetcher {
    base: url::Url,
    client: reqwest::Client,
}

#[cfg(feature = "http-fetch")]
impl HttpFetcher {
    pub fn new(base: url::Url) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "http-fetch")]
#[async_trait]
impl DataFetcher for HttpFetcher {
    async fn fetch(&self, logical_path: &str) -> Result<Bytes> {
        let url = self
            .base
            .join(logical_path)
            .map_err(|_| ExplorerError::DatasetFetch {
                path: logical_path.to_string(),
                status: 400,
            })?;
        debug!("fetching dataset from {}", url);

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ExplorerError::DatasetFetch {
                    path: logical_path.to_string(),
                    status: e.status().map(|s| s.as_u16()).unwrap_or(503),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::DatasetFetch {
                path: logical_path.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|_| ExplorerError::DatasetFetch {
                path: logical_path.to_string(),
                status: 502,
            })
    }
}
