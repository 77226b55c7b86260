use anyhow::{bail, Context};

/// Thin wrapper over a pooled `reqwest::Client`, anchored to one base URL.
/// Connection pooling, keep-alive and request concurrency all live in the
/// underlying client; this type only joins routes onto the base URL.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    client: reqwest::Client,
}

impl Client {
    /// No request timeout is configured on purpose: a trial at batch size 1
    /// over half a million documents legitimately keeps a connection busy
    /// for a long time.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .build()
            .context("could not build the HTTP client")?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }

    pub fn request(&self, method: reqwest::Method, route: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}/{}", self.base_url, route))
    }

    pub fn post(&self, route: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::POST, route)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Reads the body into the error message on a non-2xx status, since Solr
/// reports the interesting part of a rejected update there.
pub async fn expect_success(response: reqwest::Response) -> anyhow::Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    bail!("server responded with {status}: {body}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let client = Client::new("http://localhost:8983/solr/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8983/solr");
    }
}
