//! News search client
//!
//! Headlines are scraped from the HTML of a news search page. The page is
//! fetched asynchronously; parsing happens in a plain function so the
//! (non-`Send`) parsed document never lives across an await point.

use crate::config::StrategyConfig;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

const USER_AGENT: &str = concat!("market-strategy/", env!("CARGO_PKG_VERSION"));

/// A source of news headlines for a topic
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetch headlines for `topic`, most relevant first
    ///
    /// An empty list is a valid answer; transport and parse failures are
    /// errors.
    async fn headlines(&self, topic: &str) -> Result<Vec<String>>;
}

/// Google News search page scraper
#[derive(Debug, Clone)]
pub struct GoogleNewsClient {
    client: Client,
    base_url: Url,
    selector: Selector,
    max_headlines: usize,
}

impl GoogleNewsClient {
    /// Create a client from the news settings of `config`
    ///
    /// Fails when the selector is not valid CSS or the base URL does not
    /// parse.
    pub fn new(config: &StrategyConfig) -> Result<Self> {
        let selector = parse_selector(&config.headline_selector)?;
        let base_url = Url::parse(&config.news_base_url)?;
        let client = Client::builder()
            .timeout(config.news_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            selector,
            max_headlines: config.max_headlines.max(1),
        })
    }

    /// URL of the search page for `topic`
    pub fn search_url(&self, topic: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AgentError::ConfigError(format!("news base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("search");
        url.query_pairs_mut().clear().append_pair("q", topic);
        Ok(url)
    }
}

#[async_trait]
impl HeadlineSource for GoogleNewsClient {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn headlines(&self, topic: &str) -> Result<Vec<String>> {
        let url = self.search_url(topic)?;
        debug!("Fetching news search page {}", url);

        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(AgentError::NewsSource {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let headlines = parse_headlines(&body, &self.selector, self.max_headlines);
        debug!("Parsed {} headlines from {} bytes", headlines.len(), body.len());
        Ok(headlines)
    }
}

/// Compile a CSS selector, reporting the offending text on failure
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AgentError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Extract up to `max` headline texts matching `selector`
///
/// Text inside each match is whitespace-normalized; empty matches are
/// skipped and do not count toward `max`.
pub fn parse_headlines(html: &str, selector: &Selector, max: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .take(max)
        .collect()
}
