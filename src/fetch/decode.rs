use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

use super::models::{Instrument, PriceSample};
use super::FetchResult;

/// Shapes the instrument listing endpoint is known to return.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogShape {
    /// `{ "Apple": "AAPL" }`, optionally nested under a `stocks` key.
    Mapping(Vec<(String, String)>),
    /// `[{ "name": "Apple", "symbol": "AAPL" }]`
    Sequence(Vec<Instrument>),
    Unrecognised(String),
}

impl CatalogShape {
    pub fn classify(root: &Value) -> Self {
        let source = match root.get("stocks") {
            Some(inner @ Value::Object(_)) => inner,
            _ => root,
        };

        match source {
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (name, symbol) in map {
                    let Some(symbol) = symbol.as_str() else {
                        return CatalogShape::Unrecognised(format!(
                            "mapping entry `{name}` does not hold a symbol string"
                        ));
                    };
                    pairs.push((name.clone(), symbol.trim().to_string()));
                }
                CatalogShape::Mapping(pairs)
            }
            Value::Array(_) => match Vec::<Instrument>::deserialize(source) {
                Ok(instruments) => CatalogShape::Sequence(instruments),
                Err(err) => {
                    CatalogShape::Unrecognised(format!("instrument sequence rejected: {err}"))
                }
            },
            other => CatalogShape::Unrecognised(format!("unexpected {} payload", json_kind(other))),
        }
    }

    /// Flatten any recognised shape into instruments; anything else becomes empty.
    pub fn into_instruments(self) -> Vec<Instrument> {
        match self {
            CatalogShape::Mapping(pairs) => pairs
                .into_iter()
                .map(|(name, symbol)| Instrument { name, symbol })
                .collect(),
            CatalogShape::Sequence(instruments) => instruments,
            CatalogShape::Unrecognised(reason) => {
                warn!("Unexpected instrument catalog format: {reason}");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPriceSample {
    price: f64,
    #[serde(rename = "lastUpdatedAt", alias = "observedAt", alias = "observed_at")]
    observed_at: DateTime<Utc>,
}

impl RawPriceSample {
    fn into_sample(self) -> FetchResult<PriceSample> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(FetchError::service(format!(
                "price sample carries non-positive price {}",
                self.price
            )));
        }
        Ok(PriceSample {
            price: self.price,
            observed_at: self.observed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCurrentPrice {
    Wrapped { stock: RawPriceSample },
    Direct(RawPriceSample),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHistory {
    Series(Vec<RawPriceSample>),
    Single(RawPriceSample),
}

pub fn parse_json(body: &str) -> FetchResult<Value> {
    serde_json::from_str(body)
        .map_err(|err| FetchError::service(format!("malformed response body: {err}")))
}

pub fn decode_catalog(body: &str) -> FetchResult<Vec<Instrument>> {
    let root = parse_json(body)?;
    Ok(CatalogShape::classify(&root).into_instruments())
}

pub fn decode_current_price(body: &str) -> FetchResult<PriceSample> {
    let raw: RawCurrentPrice = serde_json::from_str(body)
        .map_err(|err| FetchError::service(format!("malformed price payload: {err}")))?;
    match raw {
        RawCurrentPrice::Wrapped { stock } => stock.into_sample(),
        RawCurrentPrice::Direct(sample) => sample.into_sample(),
    }
}

/// Decode a history payload, lifting a lone sample into a one-element series.
pub fn decode_history(body: &str) -> FetchResult<Vec<PriceSample>> {
    let raw: RawHistory = serde_json::from_str(body)
        .map_err(|err| FetchError::service(format!("malformed history payload: {err}")))?;
    match raw {
        RawHistory::Series(rows) => rows.into_iter().map(RawPriceSample::into_sample).collect(),
        RawHistory::Single(sample) => Ok(vec![sample.into_sample()?]),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
