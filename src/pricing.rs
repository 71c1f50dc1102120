//! On-demand price lookup for a single instance type.

use std::fmt;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::config::PricingConfig;

/// Printed whenever a price cannot be determined.
pub const NO_PRICE_FOUND: &str = "No price found";

pub const PRICE_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors raised by a price lookup.
#[derive(Debug)]
pub enum PriceError {
    /// `KEY` or `SECRET` is not set.
    MissingCredentials,
    /// The request failed or timed out.
    Http(reqwest::Error),
    /// The response body is not the expected JSON document.
    Parse(serde_json::Error),
    /// The response lists no prices.
    NoItems,
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for PriceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => f.write_str("KEY and SECRET must both be set"),
            Self::Http(err) => write!(f, "Price request failed: {err}"),
            Self::Parse(err) => write!(f, "Unexpected price response: {err}"),
            Self::NoItems => f.write_str("The price response contains no items"),
        }
    }
}

impl std::error::Error for PriceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::MissingCredentials | Self::NoItems => None,
        }
    }
}

/// The instance to price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceQuery {
    pub provider: String,
    pub region: String,
    pub instance_type: String,
}

/// A price as reported by the API, with the value kept in its JSON spelling.
#[derive(Clone, Debug, PartialEq)]
pub struct InstancePrice {
    pub currency: String,
    pub value: serde_json::Number,
}

impl fmt::Display for InstancePrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.value)
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    items: Vec<PriceItem>,
}

#[derive(Debug, Deserialize)]
struct PriceItem {
    price: Price,
}

#[derive(Debug, Deserialize)]
struct Price {
    currency: String,
    value: serde_json::Number,
}

/// Extracts the first item's price from a response body.
pub fn parse_price_response(body: &str) -> Result<InstancePrice, PriceError> {
    let response: PriceResponse = serde_json::from_str(body)?;
    let item = response.items.into_iter().next().ok_or(PriceError::NoItems)?;
    Ok(InstancePrice {
        currency: item.price.currency,
        value: item.price.value,
    })
}

/// Blocking client for the instance price endpoint.
#[derive(Debug)]
pub struct PriceClient {
    client: reqwest::blocking::Client,
    config: PricingConfig,
}

impl PriceClient {
    pub fn new(config: PricingConfig) -> Result<Self, PriceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(PRICE_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetches the on-demand price for `query`, for an OS image without licence fees.
    pub fn lookup(&self, query: &PriceQuery) -> Result<InstancePrice, PriceError> {
        let (Some(key), Some(secret)) = (&self.config.key, &self.config.secret) else {
            return Err(PriceError::MissingCredentials);
        };

        debug!(
            "Requesting price for {} / {} / {}",
            query.provider, query.region, query.instance_type
        );
        let body = self
            .client
            .get(&self.config.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("yd-key {key}:{secret}"))
            .query(&[
                ("providers", query.provider.as_str()),
                ("region", query.region.as_str()),
                ("instanceType", query.instance_type.as_str()),
                ("usageTypes", "ON_DEMAND"),
                ("operatingSystemLicences", "NONE"),
            ])
            .send()?
            .text()?;
        parse_price_response(&body)
    }
}

/// Looks up a price and renders the single line the price tool prints.
///
/// Every failure collapses to [`NO_PRICE_FOUND`]; the reason is logged at debug level.
pub fn price_line(config: &PricingConfig, query: &PriceQuery) -> String {
    let result = PriceClient::new(config.clone()).and_then(|client| client.lookup(query));
    match result {
        Ok(price) => price.to_string(),
        Err(err) => {
            debug!("{err}");
            NO_PRICE_FOUND.to_owned()
        }
    }
}
