use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Utilisation of one CPU (or of all of them, for the aggregate entry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCpu {
    /// Busy time in percent.
    pub usage: f32,
    /// Current frequency in MHz.
    pub frequency: u64,
}

/// Payload emitted on the `cpu` channel once per sampling tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStat {
    pub cpu: SingleCpu,
    pub cpus: Vec<SingleCpu>,
}

/// A single metric reading. Carries no identity beyond its arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value: f32,
}

impl Sample {
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    /// Reads `cpu.usage` out of a raw payload.
    ///
    /// Only the metric field is required; the per-core list is optional so
    /// that a producer which stops reporting cores still feeds the chart.
    pub fn decode(payload: &Value) -> Result<Self, DecodeError> {
        let field = payload
            .get("cpu")
            .and_then(|cpu| cpu.get("usage"))
            .ok_or(DecodeError::MissingField("cpu.usage"))?;

        field
            .as_f64()
            .map(|value| Sample::new(value as f32))
            .ok_or(DecodeError::NonNumeric("cpu.usage"))
    }
}

impl From<f32> for Sample {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_usage_from_cpu_stat() {
        let stat = CpuStat {
            cpu: SingleCpu {
                usage: 42.5,
                frequency: 3200,
            },
            cpus: vec![SingleCpu::default(); 4],
        };
        let payload = serde_json::to_value(&stat).unwrap();

        assert_eq!(Sample::decode(&payload), Ok(Sample::new(42.5)));
    }

    #[test]
    fn per_core_list_is_optional() {
        let payload = json!({ "cpu": { "usage": 7 } });
        assert_eq!(Sample::decode(&payload), Ok(Sample::new(7.0)));
    }

    #[test]
    fn missing_field_is_reported() {
        assert_eq!(
            Sample::decode(&json!({ "cpus": [] })),
            Err(DecodeError::MissingField("cpu.usage"))
        );
        assert_eq!(
            Sample::decode(&json!({ "cpu": { "frequency": 1000 } })),
            Err(DecodeError::MissingField("cpu.usage"))
        );
        assert_eq!(
            Sample::decode(&json!(null)),
            Err(DecodeError::MissingField("cpu.usage"))
        );
    }

    #[test]
    fn non_numeric_field_is_reported() {
        assert_eq!(
            Sample::decode(&json!({ "cpu": { "usage": "high" } })),
            Err(DecodeError::NonNumeric("cpu.usage"))
        );
        assert_eq!(
            Sample::decode(&json!({ "cpu": { "usage": null } })),
            Err(DecodeError::NonNumeric("cpu.usage"))
        );
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let payload = json!({ "cpu": { "usage": 130.0 } });
        assert_eq!(Sample::decode(&payload), Ok(Sample::new(130.0)));
    }
}
