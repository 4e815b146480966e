use crate::domain::ports::HttpProber;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: Client,
}

impl ReqwestProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProber for ReqwestProber {
    async fn is_reachable(&self, url: &str) -> bool {
        tracing::debug!("Probing {}", url);
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!("{} answered {}", url, status);
                status.is_success()
            }
            Err(e) => {
                tracing::debug!("{} unreachable: {}", url, e);
                false
            }
        }
    }
}
