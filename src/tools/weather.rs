//! Weather forecast tool.
//!
//! Returns a fixed forecast. Swap in a real forecast source here; the agent
//! only depends on the tool contract.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::types::{Tool, ToolError, ToolResult, required_str};

/// Forecast returned for every location.
pub const FORECAST: &str = "Tomorrow will be partly cloudy. \
High temperature will be seventy two degrees Fahrenheit. \
Low temperature will be fifty five degrees Fahrenheit.";

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Look up the weather forecast for a location."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City, region or postal code"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location = required_str(&args, "location")?;
        tracing::info!(location, "weather requested");
        Ok(ToolResult::success(FORECAST.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_spelled_out_forecast() {
        let result = WeatherTool
            .execute(json!({"location": "Conshohocken, PA"}))
            .await;
        let text = match result {
            Ok(r) => r.into_model_text(),
            Err(e) => unreachable!("should succeed: {e}"),
        };
        assert_eq!(text, FORECAST);
        assert!(!text.chars().any(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn location_required() {
        let result = WeatherTool.execute(json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
