use crate::{CrawlerError, Fetcher};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use tokio::time::Duration;
use tracing::{debug, warn};

/// Only a 200 carrying some flavour of HTML counts as a page.
pub(crate) fn is_good_response(status: StatusCode, content_type: Option<&str>) -> bool {
    status == StatusCode::OK
        && content_type
            .map(|ct| ct.to_lowercase().contains("html"))
            .unwrap_or(false)
}

/// `reqwest` backed fetcher. Every request waits `delay` first.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(delay: Duration) -> Result<HttpFetcher, CrawlerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { client, delay })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        tokio::time::sleep(self.delay).await;

        debug!("Visit {}", url);
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Error during request to {}: {}", url, e);
                return None;
            }
        };

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        if !is_good_response(resp.status(), content_type) {
            warn!(
                "Unusable response from {}: {} {:?}",
                url,
                resp.status(),
                content_type
            );
            return None;
        }

        match resp.bytes().await {
            Ok(body) => Some(body.to_vec()),
            Err(e) => {
                warn!("Error reading body of {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_response_needs_200_and_html() {
        assert!(is_good_response(StatusCode::OK, Some("text/html; charset=utf-8")));
        assert!(is_good_response(StatusCode::OK, Some("application/XHTML+xml")));
        assert!(!is_good_response(StatusCode::OK, Some("application/json")));
        assert!(!is_good_response(StatusCode::OK, None));
        assert!(!is_good_response(StatusCode::NOT_FOUND, Some("text/html")));
        assert!(!is_good_response(StatusCode::MOVED_PERMANENTLY, Some("text/html")));
    }
}
