use crate::app_config::{AppConfig, Environment};
use crate::geo::GeoPoint;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Default reference point: Tiananmen, Beijing.
const DEFAULT_LAT: f64 = 39.9042;
const DEFAULT_LNG: f64 = 116.4074;

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, raw: &str| -> Result<f64, ConfigError> {
        raw.parse::<f64>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("TALKMAP_ENV", "development"))?;

    let api_url = or_default("TALKMAP_API_URL", "http://localhost:8000");
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(invalid(
            "TALKMAP_API_URL",
            format!("expected an http(s) URL, got '{api_url}'"),
        ));
    }

    let log_level = or_default("TALKMAP_LOG_LEVEL", env.default_log_level());
    let request_timeout_secs = parse_u64("TALKMAP_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "TALKMAP_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("TALKMAP_USER_AGENT", "talkmap/0.1 (nl-navigation)");

    // The fallback point is configured as a pair; half a pair is a mistake.
    let default_location = match (lookup("TALKMAP_DEFAULT_LAT"), lookup("TALKMAP_DEFAULT_LNG")) {
        (Ok(lat), Ok(lng)) => {
            let lat = parse_f64("TALKMAP_DEFAULT_LAT", &lat)?;
            let lng = parse_f64("TALKMAP_DEFAULT_LNG", &lng)?;
            GeoPoint::new(lat, lng).map_err(|e| invalid("TALKMAP_DEFAULT_LAT", e.to_string()))?
        }
        (Ok(_), Err(_)) => return Err(ConfigError::MissingEnvVar("TALKMAP_DEFAULT_LNG".into())),
        (Err(_), Ok(_)) => return Err(ConfigError::MissingEnvVar("TALKMAP_DEFAULT_LAT".into())),
        (Err(_), Err(_)) => GeoPoint::new(DEFAULT_LAT, DEFAULT_LNG)
            .map_err(|e| invalid("TALKMAP_DEFAULT_LAT", e.to_string()))?,
    };

    let map_zoom = or_default("TALKMAP_MAP_ZOOM", "13")
        .parse::<u8>()
        .map_err(|e| invalid("TALKMAP_MAP_ZOOM", e.to_string()))?;
    if !(3..=20).contains(&map_zoom) {
        return Err(invalid(
            "TALKMAP_MAP_ZOOM",
            format!("zoom {map_zoom} is outside [3, 20]"),
        ));
    }
    let map_style = or_default("TALKMAP_MAP_STYLE", "amap://styles/dark");
    let fit_padding_px = parse_u32("TALKMAP_FIT_PADDING_PX", "50")?;

    Ok(AppConfig {
        env,
        api_url,
        log_level,
        request_timeout_secs,
        user_agent,
        default_location,
        map_zoom,
        map_style,
        fit_padding_px,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TALKMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
