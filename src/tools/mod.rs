pub mod weather;

use crate::llm::{Tool, ToolCall};
use serde_json::{json, Value};
use tracing::{debug, warn};
use weather::WeatherProvider;

/// Tools declared to the model. Adding a tool means adding a variant here
/// and an arm in [`ToolBox::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    GetWeather,
}

impl ToolKind {
    pub const ALL: [ToolKind; 1] = [ToolKind::GetWeather];

    /// Name of the tool as used by the chat API
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::GetWeather => "get_weather",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn definition(&self) -> Tool {
        match self {
            ToolKind::GetWeather => Tool {
                name: self.name().to_string(),
                description: "Get weather information for the provided city".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "The name of the city, e.g. Boston"
                        }
                    },
                    "required": ["city"]
                }),
            },
        }
    }

    pub fn definitions() -> Vec<Tool> {
        Self::ALL.iter().map(ToolKind::definition).collect()
    }
}

/// Executes tool calls requested by the model.
pub struct ToolBox {
    weather: Box<dyn WeatherProvider>,
}

impl ToolBox {
    pub fn new(weather: Box<dyn WeatherProvider>) -> Self {
        Self { weather }
    }

    /// Runs one tool call and returns its textual output. Failures are
    /// reported in the output rather than as errors.
    pub async fn dispatch(&self, call: &ToolCall) -> String {
        debug!(id = %call.id, name = %call.name, arguments = %call.arguments, "Dispatching tool call");

        match ToolKind::from_name(&call.name) {
            Some(ToolKind::GetWeather) => match city_argument(&call.arguments) {
                Ok(Some(city)) => weather::get_weather(self.weather.as_ref(), &city).await,
                Ok(None) => "Invalid or missing 'city' argument.".to_string(),
                Err(e) => format!("Error parsing JSON: {}", e),
            },
            None => {
                warn!(name = %call.name, "Model requested an unknown tool");
                "Unknown function call.".to_string()
            }
        }
    }

    /// Runs the weather tool directly, bypassing the model.
    pub async fn weather(&self, city: &str) -> String {
        weather::get_weather(self.weather.as_ref(), city).await
    }
}

/// Extracts a non-empty `city` string from the raw argument JSON.
fn city_argument(arguments: &str) -> serde_json::Result<Option<String>> {
    let value: Value = serde_json::from_str(arguments)?;
    Ok(value
        .get("city")
        .and_then(Value::as_str)
        .filter(|city| !city.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::weather::{CurrentWeather, GeoLocation};
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeWeather {
        cities: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn resolve_location(&self, city: &str) -> Result<Option<Vec<GeoLocation>>> {
            self.cities.lock().unwrap().push(city.to_string());
            Ok(Some(vec![GeoLocation {
                latitude: 0.0,
                longitude: 0.0,
            }]))
        }

        async fn current_weather(&self, _: f64, _: f64) -> Result<Option<CurrentWeather>> {
            Ok(Some(serde_json::from_value(json!({
                "main": { "temp": 21.0 },
                "weather": [{ "description": "few clouds" }]
            }))?))
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[test]
    fn test_weather_tool_schema() {
        let tool = ToolKind::GetWeather.definition();
        assert_eq!(tool.name, "get_weather");
        assert_eq!(
            tool.input_schema,
            json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string", "description": "The name of the city, e.g. Boston" }
                },
                "required": ["city"]
            })
        );
        assert_eq!(ToolKind::definitions().len(), 1);
    }

    #[test]
    fn test_from_name_round_trips() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("get_stock_price"), None);
    }

    #[tokio::test]
    async fn test_dispatch_runs_weather_lookup() {
        let toolbox = ToolBox::new(Box::new(FakeWeather::default()));
        let output = toolbox
            .dispatch(&call("get_weather", r#"{"city":"Boston"}"#))
            .await;
        assert_eq!(
            output,
            "Current weather in Boston. Temperature: 21°C. Condition: few clouds."
        );
    }

    #[tokio::test]
    async fn test_dispatch_reports_malformed_json() {
        let toolbox = ToolBox::new(Box::new(FakeWeather::default()));
        let output = toolbox.dispatch(&call("get_weather", "{city:}")).await;
        assert!(output.starts_with("Error parsing JSON: "));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_missing_or_empty_city() {
        let toolbox = ToolBox::new(Box::new(FakeWeather::default()));

        for arguments in ["{}", r#"{"city":""}"#, r#"{"city":42}"#, "[]"] {
            let output = toolbox.dispatch(&call("get_weather", arguments)).await;
            assert_eq!(output, "Invalid or missing 'city' argument.", "{arguments}");
        }
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let toolbox = ToolBox::new(Box::new(FakeWeather::default()));
        let output = toolbox.dispatch(&call("get_time", "{}")).await;
        assert_eq!(output, "Unknown function call.");
    }
}
