use std::time::Duration;

use futures::{FutureExt, TryFutureExt, future::BoxFuture};
use reqwest::{Client, ClientBuilder};
use smb_core::{APP_USER_AGENT, error::SourceError, interface::source::ResponseSource};
use url::Url;

/// 固定 URL から JSON を GET する取得元。
#[derive(Debug, Clone)]
pub struct HttpResponseSource {
    client: Client,
    url: Url,
}

impl HttpResponseSource {
    pub fn new(url: Url, timeout: Duration) -> Result<HttpResponseSource, SourceError> {
        let client = ClientBuilder::new()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(SourceError::by_internal)?;
        Ok(HttpResponseSource { client, url })
    }

    async fn fetch_body(&self) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(SourceError::by_transport)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response.text().map_err(SourceError::by_transport).await
    }
}

impl ResponseSource for HttpResponseSource {
    fn description(&self) -> String {
        self.url.to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        async move { self.fetch_body().await }.boxed()
    }
}
