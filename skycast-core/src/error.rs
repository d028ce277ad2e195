use thiserror::Error;

/// Closed set of failures a weather fetch can surface.
///
/// Every variant carries a message suitable for showing to the user verbatim;
/// none is fatal to the process. No retries happen below this layer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Please enter a city name")]
    Validation,

    #[error(
        "Missing OpenWeather API key. Run `skycast configure` or set OPENWEATHER_API_KEY."
    )]
    Configuration,

    #[error("City not found. Please check the spelling.")]
    NotFound,

    #[error("Invalid API key. Please check your configuration.")]
    Auth,

    #[error("Weather service is currently unavailable. Please try again later.")]
    ServiceUnavailable,

    #[error("Error fetching weather data: HTTP {0}")]
    Provider(u16),

    #[error("Request timed out. Please check your internet connection.")]
    Timeout,

    #[error("Network error. Please check your internet connection.")]
    Network,

    #[error("An unexpected error occurred: {0}")]
    Unknown(String),
}
