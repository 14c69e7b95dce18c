//! Turns a raw webhook body into an [`Alert`].
//!
//! Two payload shapes are understood and never mixed within one request:
//!
//! * structured: `{"ticker": "AAPL", "side": "buy", "qty": 10}`
//!   (`symbol`, `action` and `quantity` are accepted as aliases)
//! * free text:  `{"alert": "AAPL buy 10"}`
//!
//! Bodies that are not JSON at all are wrapped as `{"message": <raw>}` so they
//! can still be logged.

use std::fmt;

use serde_json::{Map, Value, json};

use crate::models::{Alert, Side};

const DEFAULT_QUANTITY: u64 = 1;

/// What the caller claimed to send, taken from `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentHint {
    Json,
    Text,
    Other,
    Missing,
}

impl ContentHint {
    pub fn from_content_type(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return ContentHint::Missing;
        };

        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "application/json" || mime.ends_with("+json") {
            ContentHint::Json
        } else if mime.starts_with("text/") {
            ContentHint::Text
        } else {
            ContentHint::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Ticker,
    Side,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Ticker => f.write_str("ticker"),
            MissingField::Side => f.write_str("side"),
        }
    }
}

/// Why a body did not produce an alert. Both cases carry the record that was
/// decoded so the caller can log it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Malformed { record: Value, hint: ContentHint },
    Incomplete { record: Value, missing: MissingField },
}

impl ParseOutcome {
    pub fn record(&self) -> &Value {
        match self {
            ParseOutcome::Malformed { record, .. } => record,
            ParseOutcome::Incomplete { record, .. } => record,
        }
    }
}

/// Result of the decode-or-wrap step.
#[derive(Debug, Clone, PartialEq)]
pub struct Intake {
    pub record: Value,
    pub malformed: bool,
}

pub fn decode_body(body: &[u8]) -> Intake {
    match serde_json::from_slice::<Value>(body) {
        Ok(record) => Intake {
            record,
            malformed: false,
        },
        Err(_) => Intake {
            record: json!({ "message": String::from_utf8_lossy(body) }),
            malformed: true,
        },
    }
}

pub fn parse(body: &[u8], hint: ContentHint) -> Result<Alert, ParseOutcome> {
    let intake = decode_body(body);

    if intake.malformed {
        return Err(ParseOutcome::Malformed {
            record: intake.record,
            hint,
        });
    }

    let parsed = match intake.record.as_object() {
        Some(obj) => match obj.get("alert").and_then(Value::as_str) {
            Some(text) => from_alert_text(text),
            None => from_fields(obj),
        },
        None => Err(MissingField::Ticker),
    };

    parsed.map_err(|missing| ParseOutcome::Incomplete {
        record: intake.record,
        missing,
    })
}

/// `"<TICKER> <SIDE> [QTY]"`, whitespace separated.
fn from_alert_text(text: &str) -> Result<Alert, MissingField> {
    let mut tokens = text.split_whitespace();

    let ticker = tokens.next().ok_or(MissingField::Ticker)?;
    let side = tokens.next().ok_or(MissingField::Side)?;
    let quantity = tokens
        .next()
        .and_then(parse_quantity_str)
        .unwrap_or(DEFAULT_QUANTITY);

    Ok(Alert {
        ticker: ticker.to_string(),
        side: Side::parse(side),
        quantity,
    })
}

fn from_fields(obj: &Map<String, Value>) -> Result<Alert, MissingField> {
    let ticker = first_text(obj, &["ticker", "symbol"]).ok_or(MissingField::Ticker)?;
    let side = first_text(obj, &["side", "action"]).ok_or(MissingField::Side)?;

    let quantity = ["qty", "quantity"]
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(quantity_from_value)
        .unwrap_or(DEFAULT_QUANTITY);

    Ok(Alert {
        ticker: ticker.to_string(),
        side: Side::parse(side),
        quantity,
    })
}

fn first_text<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn quantity_from_value(value: &Value) -> Option<u64> {
    let quantity = match value {
        Value::Number(n) => match n.as_u64() {
            Some(q) => Some(q),
            // whole floats like 3.0 are fine, 2.5 is not
            None => n
                .as_f64()
                .filter(|f| {
                    f.is_finite() && *f >= 1.0 && f.fract() == 0.0 && *f <= u64::MAX as f64
                })
                .map(|f| f as u64),
        },
        Value::String(s) => parse_quantity_str(s),
        _ => None,
    };

    quantity.filter(|q| *q > 0)
}

fn parse_quantity_str(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|q| *q > 0)
}
