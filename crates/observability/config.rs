use tracing::Level;
use url::Url;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) stage: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DiscordSettings {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service: ServiceContext,
    pub(crate) discord: Option<DiscordSettings>,
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let component = component.trim().to_string();

        let service = ServiceContext {
            service_name: get("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            stage: get("STAGE").unwrap_or_else(|| "local".to_string()),
            component,
        };

        let mut warnings = Vec::new();
        let discord = discord_settings(&get, &mut warnings);

        Self {
            service,
            discord,
            warnings,
        }
    }
}

fn discord_settings<F>(get: &F, warnings: &mut Vec<String>) -> Option<DiscordSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let enabled = match get("DISCORD_NOTIFY_ENABLED") {
        None => true,
        Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "DISCORD_NOTIFY_ENABLED has an unrecognised value ({raw}); treating it as enabled"
            ));
            true
        }),
    };
    if !enabled {
        return None;
    }

    let raw_url = get("DISCORD_WEBHOOK_URL")?;
    let webhook_url = match Url::parse(&raw_url) {
        Ok(url) => url,
        Err(err) => {
            // The URL embeds the webhook token; only the parse error is reported.
            warnings.push(format!(
                "DISCORD_WEBHOOK_URL could not be parsed ({err}); Discord alerts disabled"
            ));
            return None;
        }
    };

    let min_level = match get("DISCORD_NOTIFY_LEVEL") {
        None => Level::ERROR,
        Some(raw) => parse_level(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "DISCORD_NOTIFY_LEVEL has an unrecognised value ({raw}); using error"
            ));
            Level::ERROR
        }),
    };

    Some(DiscordSettings {
        webhook_url,
        min_level,
    })
}

pub(crate) fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

pub(crate) fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
