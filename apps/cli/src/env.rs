use std::sync::OnceLock;

use serde::{Deserialize, Deserializer};

fn default_offset_debounce_ms() -> u64 {
    500
}

/// `KARAOKE_*` settings, read once after an optional `.env`.
#[derive(Debug, Deserialize)]
pub struct Env {
    #[serde(default, deserialize_with = "filter_empty")]
    pub api_base_url: Option<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub api_token: Option<String>,
    #[serde(default = "default_offset_debounce_ms")]
    pub offset_debounce_ms: u64,
}

fn filter_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let _ = dotenvy::dotenv();
        envy::prefixed("KARAOKE_")
            .from_env()
            .expect("Failed to load KARAOKE_* environment")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Env {
        envy::prefixed("KARAOKE_")
            .from_iter(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .unwrap()
    }

    #[test]
    fn defaults_when_unset() {
        let env = parse(&[]);
        assert_eq!(env.api_base_url, None);
        assert_eq!(env.offset_debounce_ms, 500);
    }

    #[test]
    fn empty_values_are_unset() {
        let env = parse(&[
            ("KARAOKE_API_BASE_URL", "https://karaoke.test"),
            ("KARAOKE_API_TOKEN", " "),
            ("KARAOKE_OFFSET_DEBOUNCE_MS", "250"),
        ]);
        assert_eq!(env.api_base_url.as_deref(), Some("https://karaoke.test"));
        assert_eq!(env.api_token, None);
        assert_eq!(env.offset_debounce_ms, 250);
    }
}
