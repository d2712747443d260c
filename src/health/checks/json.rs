//! Structured-data encode/decode round-trip check

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::health::check::{CheckResult, CheckValue, SelfCheck};
use crate::health::error::CheckError;

/// Serializes values to text and parses them back
pub trait JsonCodec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String, CheckError>;

    fn decode(&self, text: &str) -> Result<Value, CheckError>;
}

/// [`JsonCodec`] backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CheckError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, text: &str) -> Result<Value, CheckError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Round-trips a sample value and compares the result
///
/// Never raises: codec errors and mismatches are reported as failures.
pub struct JsonRoundTripCheck<C = SerdeJsonCodec> {
    codec: C,
    sample: Value,
}

impl JsonRoundTripCheck {
    pub fn new() -> Self {
        Self::with_codec(SerdeJsonCodec)
    }
}

impl Default for JsonRoundTripCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: JsonCodec> JsonRoundTripCheck<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            sample: json!({ "test": "value" }),
        }
    }

    pub fn with_sample(mut self, sample: Value) -> Self {
        self.sample = sample;
        self
    }
}

#[async_trait]
impl<C: JsonCodec> SelfCheck for JsonRoundTripCheck<C> {
    fn name(&self) -> &str {
        "JSON"
    }

    fn description(&self) -> Option<&str> {
        Some("Encodes a sample value and decodes it back")
    }

    async fn run(&self) -> CheckResult {
        let encoded = match self.codec.encode(&self.sample) {
            Ok(text) => text,
            Err(err) => return Ok(CheckValue::failed(format!("Encode failed: {err}"))),
        };
        let decoded = match self.codec.decode(&encoded) {
            Ok(value) => value,
            Err(err) => return Ok(CheckValue::failed(format!("Decode failed: {err}"))),
        };

        if decoded == self.sample {
            Ok(CheckValue::ok("OK"))
        } else {
            Ok(CheckValue::failed(format!("Mismatch: got {decoded}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TruncatingCodec;

    impl JsonCodec for TruncatingCodec {
        fn encode(&self, value: &Value) -> Result<String, CheckError> {
            let text = serde_json::to_string(value)?;
            Ok(text[..text.len() - 1].to_string())
        }

        fn decode(&self, text: &str) -> Result<Value, CheckError> {
            SerdeJsonCodec.decode(text)
        }
    }

    #[tokio::test]
    async fn test_sample_round_trips() {
        let check = JsonRoundTripCheck::new();
        assert_eq!(check.run().await.unwrap(), CheckValue::ok("OK"));
    }

    #[tokio::test]
    async fn test_unparseable_encoding_is_failure() {
        let check = JsonRoundTripCheck::with_codec(TruncatingCodec);
        match check.run().await.unwrap() {
            CheckValue::Failed(text) => assert!(text.starts_with("Decode failed:"), "{text}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_sample() {
        let check = JsonRoundTripCheck::new().with_sample(json!([1, 2.5, null, {"nested": true}]));
        assert_eq!(check.run().await.unwrap(), CheckValue::ok("OK"));
    }
}
