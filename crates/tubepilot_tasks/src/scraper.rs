use tubepilot_core::{Phase, ScraperResult};
use tubepilot_gateway::wire::{BatchScrapeRequest, ScrapeRequest};
use tubepilot_gateway::{FailureKind, GatewayError};
use url::Url;

use crate::cell::TaskCell;
use crate::TaskContext;

/// Scrapes remote video pages and accumulates the results in finishing order.
pub struct ScraperTask {
    ctx: TaskContext,
    cell: TaskCell<Vec<ScraperResult>>,
}

impl ScraperTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            cell: TaskCell::new("scraper"),
        }
    }

    pub async fn scrape_one(&self, url: &str) -> Result<ScraperResult, GatewayError> {
        let call = self.cell.begin();
        let outcome = match check_url(url) {
            Ok(url) => self.ctx.gateway().scrape(&ScrapeRequest { url }).await,
            Err(err) => Err(err),
        };
        self.cell.settle(call, &outcome, |results, outcome| {
            if let Ok(result) = outcome {
                results.push(result.clone());
            }
        });
        outcome
    }

    /// A failing batch appends nothing.
    pub async fn scrape_many(&self, urls: &[String]) -> Result<Vec<ScraperResult>, GatewayError> {
        let call = self.cell.begin();
        let outcome = match check_urls(urls) {
            Ok(urls) => {
                self.ctx
                    .gateway()
                    .scrape_batch(&BatchScrapeRequest { urls })
                    .await
            }
            Err(err) => Err(err),
        };
        self.cell.settle(call, &outcome, |results, outcome| {
            if let Ok(batch) = outcome {
                results.extend(batch.iter().cloned());
            }
        });
        outcome
    }

    /// Empties the results and the error.
    pub fn clear(&self) {
        self.cell.write(|transient, results| {
            results.clear();
            transient.clear_error();
        });
    }

    pub fn reset(&self) {
        self.cell.reset();
    }

    pub fn results(&self) -> Vec<ScraperResult> {
        self.cell.read(|_, results| results.clone())
    }

    pub fn loading(&self) -> bool {
        self.cell.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.cell.error()
    }

    pub fn phase(&self) -> Phase {
        self.cell.phase()
    }

    pub fn in_flight(&self) -> usize {
        self.cell.in_flight()
    }
}

fn check_url(raw: &str) -> Result<String, GatewayError> {
    let trimmed = raw.trim();
    Url::parse(trimmed)
        .map(|_| trimmed.to_string())
        .map_err(|err| {
            GatewayError::new(
                FailureKind::Validation,
                format!("invalid url '{trimmed}': {err}"),
            )
        })
}

fn check_urls(urls: &[String]) -> Result<Vec<String>, GatewayError> {
    if urls.is_empty() {
        return Err(GatewayError::new(FailureKind::Validation, "no urls to scrape"));
    }
    urls.iter().map(|url| check_url(url)).collect()
}
