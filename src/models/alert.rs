use std::fmt;

use serde::Serialize;

/// A trading instruction pulled out of one webhook request. Lives for the
/// duration of that request and is handed to the dispatcher by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub ticker: String,
    pub side: Side,
    pub quantity: u64,
}

// "buy" | "sell", anything else is forwarded untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Side {
    Buy,
    Sell,
    Other(String),
}

impl Side {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("buy") {
            Side::Buy
        } else if raw.eq_ignore_ascii_case("sell") {
            Side::Sell
        } else {
            Side::Other(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
            Side::Other(s) => s,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Side> for String {
    fn from(side: Side) -> Self {
        side.as_str().to_string()
    }
}
