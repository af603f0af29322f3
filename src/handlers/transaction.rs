use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Response, StatusCode},
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use std::str::FromStr;

use crate::domain::Transaction;
use crate::error::AppError;
use crate::use_cases::{BatchReport, IngestBatch};
use crate::validation::validate_amount_exponent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    pub id: String,
    pub vendor: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

impl From<TransactionPayload> for Transaction {
    fn from(payload: TransactionPayload) -> Self {
        Transaction::new(payload.id, payload.vendor, payload.amount, payload.timestamp)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(serde_json::Number),
    Text(String),
}

/// Accepts a JSON number or a decimal string.
///
/// Numbers go through their shortest decimal form, so `19.99` stays `19.99`
/// instead of picking up binary floating point noise. Exponents outside
/// +/-`AMOUNT_MAX_EXPONENT` are a decode error.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match AmountRepr::deserialize(deserializer)? {
        AmountRepr::Number(number) => number.to_string(),
        AmountRepr::Text(text) => text.trim().to_string(),
    };

    let amount = BigDecimal::from_str(&raw)
        .map_err(|e| de::Error::custom(format!("invalid amount '{}': {}", raw, e)))?;
    validate_amount_exponent(&amount).map_err(de::Error::custom)?;

    Ok(amount)
}

/// Decodes a request body into an ordered batch.
pub fn decode_batch(body: &[u8]) -> Result<Vec<Transaction>, AppError> {
    let payloads: Vec<TransactionPayload> =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;

    Ok(payloads.into_iter().map(Transaction::from).collect())
}

pub async fn ingest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response<Body>, AppError> {
    let batch = decode_batch(&body).map_err(|e| {
        tracing::warn!(error = %e, "Error decoding transaction batch");
        e
    })?;

    let report = IngestBatch::new(state.repository.clone())
        .execute(batch)
        .await;

    created_response(&report)
}

fn created_response(report: &BatchReport) -> Result<Response<Body>, AppError> {
    Response::builder()
        .status(StatusCode::CREATED)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("x-ingest-duplicates", report.duplicates())
        .header("x-ingest-failed", report.failed())
        .body(Body::from(format!(
            "Processed {} transaction(s)",
            report.inserted()
        )))
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
