//! USD to ARS "blue" rate lookup with a fixed fallback.
//!
//! A lookup never fails: any problem with the quote service yields
//! [`RateSource::Fallback`] carrying the reason, so callers and tests can tell the two
//! paths apart without the pipeline ever aborting on a missing quote.

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use tracing::warn;

use crate::config::RateConfig;
use crate::http_client::http_client;

pub const DOLARAPI_BLUE_URL: &str = "https://dolarapi.com/v1/dolares/blue";
pub const FALLBACK_USD_ARS_RATE: f64 = 1000.0;

const SELL_RATE_FIELD: &str = "venta";

#[derive(Debug, Clone, PartialEq)]
pub enum RateSource {
    Live,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    pub source: RateSource,
}

impl RateQuote {
    pub fn used_fallback(&self) -> bool {
        matches!(self.source, RateSource::Fallback { .. })
    }
}

pub trait RateProvider {
    fn quote(&self) -> RateQuote;

    fn get_rate(&self) -> f64 {
        self.quote().rate
    }
}

/// Quote service client. One GET per call, no retries.
pub struct DolarApiRates {
    client: Client,
    url: String,
    fallback: f64,
}

impl DolarApiRates {
    pub fn new(cfg: &RateConfig) -> Result<Self> {
        Ok(Self::with_client(http_client()?.clone(), cfg))
    }

    pub fn with_client(client: Client, cfg: &RateConfig) -> Self {
        Self {
            client,
            url: cfg.url.clone(),
            fallback: cfg.fallback,
        }
    }

    fn fetch_live(&self) -> Result<f64> {
        let resp = self
            .client
            .get(&self.url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_sell_rate(&body)
    }
}

impl RateProvider for DolarApiRates {
    fn quote(&self) -> RateQuote {
        match self.fetch_live() {
            Ok(rate) => RateQuote {
                rate,
                source: RateSource::Live,
            },
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    url = %self.url,
                    error = %reason,
                    fallback = self.fallback,
                    "rate fetch failed, using fallback"
                );
                RateQuote {
                    rate: self.fallback,
                    source: RateSource::Fallback { reason },
                }
            }
        }
    }
}

/// Constant rate for offline runs and tests; always reported as live.
#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub f64);

impl RateProvider for FixedRate {
    fn quote(&self) -> RateQuote {
        RateQuote {
            rate: self.0,
            source: RateSource::Live,
        }
    }
}

/// Extract the sell rate from a quote body. Accepts a number or a numeric string.
pub fn parse_sell_rate(body: &str) -> Result<f64> {
    let value = serde_json::from_str::<Value>(body.trim()).context("invalid quote json")?;
    let field = value
        .get(SELL_RATE_FIELD)
        .ok_or_else(|| anyhow!("quote missing {SELL_RATE_FIELD:?}"))?;
    let rate = field
        .as_f64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .ok_or_else(|| anyhow!("quote field {SELL_RATE_FIELD:?} is not numeric: {field}"))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(anyhow!("quote rate out of range: {rate}"));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_string_sell_rate() {
        let body = r#"{"moneda":"USD","casa":"blue","compra":1180,"venta":1205.5}"#;
        assert_eq!(parse_sell_rate(body).unwrap(), 1205.5);
        assert_eq!(parse_sell_rate(r#"{"venta":"1210"}"#).unwrap(), 1210.0);
    }

    #[test]
    fn rejects_malformed_quotes() {
        assert!(parse_sell_rate("<html>oops</html>").is_err());
        assert!(parse_sell_rate(r#"{"compra":1180}"#).is_err());
        assert!(parse_sell_rate(r#"{"venta":null}"#).is_err());
        assert!(parse_sell_rate(r#"{"venta":0}"#).is_err());
        assert!(parse_sell_rate(r#"{"venta":"abc"}"#).is_err());
    }

    #[test]
    fn fixed_rate_reports_live() {
        let q = FixedRate(950.0).quote();
        assert_eq!(q.rate, 950.0);
        assert!(!q.used_fallback());
    }
}
