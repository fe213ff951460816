//! Weather lookup — a single stateless call to weatherapi.com.

use secrecy::{ExposeSecret, SecretString};

use crate::error::WeatherError;

/// Current weather for the configured location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentWeather {
    pub temperature_celsius: f64,
}

/// Client for the weatherapi.com current-conditions endpoint.
pub struct WeatherClient {
    api_key: SecretString,
    location: String,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(api_key: SecretString, location: String) -> Self {
        Self {
            api_key,
            location,
            client: reqwest::Client::new(),
        }
    }

    /// The location this client reports on.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Build the current-conditions request. The query pairs go through
    /// reqwest's encoder so locations like "New York" stay intact.
    fn request(&self) -> reqwest::RequestBuilder {
        self.client
            .get("https://api.weatherapi.com/v1/current.json")
            .query(&[
                ("key", self.api_key.expose_secret()),
                ("q", self.location.as_str()),
            ])
    }

    /// Fetch the current temperature.
    pub async fn fetch(&self) -> Result<CurrentWeather, WeatherError> {
        let resp = self
            .request()
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

        parse_current(&body)
    }
}

/// Extract the temperature from a weatherapi.com response body.
fn parse_current(body: &serde_json::Value) -> Result<CurrentWeather, WeatherError> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Err(WeatherError::Api(message.to_string()));
    }

    let temperature_celsius = body
        .get("current")
        .and_then(|c| c.get("temp_c"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| WeatherError::MalformedResponse("missing current.temp_c".into()))?;

    Ok(CurrentWeather {
        temperature_celsius,
    })
}

/// Display symbol for a temperature, by fixed thresholds.
pub fn weather_symbol(temp_c: f64) -> &'static str {
    if temp_c < 0.0 {
        "❄️"
    } else if temp_c < 15.0 {
        "🧥"
    } else if temp_c < 25.0 {
        "🌤️"
    } else {
        "🔥"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_thresholds() {
        assert_eq!(weather_symbol(-10.0), "❄️");
        assert_eq!(weather_symbol(-0.1), "❄️");
        assert_eq!(weather_symbol(0.0), "🧥");
        assert_eq!(weather_symbol(14.9), "🧥");
        assert_eq!(weather_symbol(15.0), "🌤️");
        assert_eq!(weather_symbol(24.9), "🌤️");
        assert_eq!(weather_symbol(25.0), "🔥");
        assert_eq!(weather_symbol(35.0), "🔥");
    }

    #[test]
    fn request_encodes_multi_word_locations() {
        let client = WeatherClient::new(SecretString::from("test-key"), "New York".into());
        let request = client.request().build().unwrap();
        let url = request.url().as_str();
        assert!(url.starts_with("https://api.weatherapi.com/v1/current.json?"));
        assert!(url.contains("q=New+York"), "unencoded location in {url}");
        assert!(url.contains("key=test-key"));
    }

    #[test]
    fn parse_ok_response() {
        let body = serde_json::json!({
            "location": { "name": "Moscow" },
            "current": { "temp_c": 17.5 }
        });
        let weather = parse_current(&body).unwrap();
        assert_eq!(weather.temperature_celsius, 17.5);
    }

    #[test]
    fn parse_api_error() {
        let body = serde_json::json!({
            "error": { "code": 1002, "message": "API key is invalid." }
        });
        let err = parse_current(&body).unwrap_err();
        assert!(matches!(err, WeatherError::Api(ref m) if m.contains("invalid")));
    }

    #[test]
    fn parse_missing_temp_is_malformed() {
        let body = serde_json::json!({ "current": {} });
        assert!(matches!(
            parse_current(&body),
            Err(WeatherError::MalformedResponse(_))
        ));
    }
}
