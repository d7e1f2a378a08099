//! Startup configuration — suggestion provider selection and the agent
//! roster the studio opens with.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::agent::{AGENT_COLORS, Agent, BodyColor, VOICES, Voice};
use crate::constants::{
    APP_NAME, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL,
};
use crate::gemini::GeminiClient;
use crate::openai::OpenAiClient;
use crate::suggest::{
    GeminiSuggester, OpenAiSuggester, PersonalitySuggester, UnconfiguredSuggester,
};
use crate::util::{first_present, normalize_url};

// ── Provider ─────────────────────────────────────────────────────────

const GEMINI_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];
const GEMINI_MODEL_VARS: &[&str] = &["GEMINI_MODEL"];
const GEMINI_BASE_VARS: &[&str] = &["GEMINI_BASE_URL"];
const OPENAI_KEY_VARS: &[&str] = &["OPENAI_API_KEY"];
const OPENAI_MODEL_VARS: &[&str] = &["OPENAI_MODEL"];
const OPENAI_BASE_VARS: &[&str] = &["OPENAI_BASE_URL", "OPENAI_API_BASE"];

/// Which text-generation backend produces suggestions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn label(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(anyhow!("unknown provider {other:?} (expected openai or gemini)")),
        }
    }
}

/// Resolved provider settings.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Resolve using `lookup` for variable access.
    ///
    /// `AGENT_STUDIO_PROVIDER` wins; otherwise Gemini is used when a Gemini
    /// key is present and OpenAI in every other case.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match first_present(&["AGENT_STUDIO_PROVIDER"], &lookup) {
            Some(raw) => raw.parse::<Provider>()?,
            None if first_present(GEMINI_KEY_VARS, &lookup).is_some() => Provider::Gemini,
            None => Provider::OpenAi,
        };

        let (model_vars, base_vars, key_vars, default_model, default_base) = match provider {
            Provider::OpenAi => (
                OPENAI_MODEL_VARS,
                OPENAI_BASE_VARS,
                OPENAI_KEY_VARS,
                DEFAULT_OPENAI_MODEL,
                DEFAULT_OPENAI_BASE_URL,
            ),
            Provider::Gemini => (
                GEMINI_MODEL_VARS,
                GEMINI_BASE_VARS,
                GEMINI_KEY_VARS,
                DEFAULT_GEMINI_MODEL,
                DEFAULT_GEMINI_BASE_URL,
            ),
        };

        let model = first_present(model_vars, &lookup).unwrap_or_else(|| default_model.to_string());
        let base_url = match first_present(base_vars, &lookup) {
            Some(raw) => validate_base_url(&raw)?,
            None => default_base.to_string(),
        };

        Ok(ProviderConfig {
            provider,
            model: model.trim().to_string(),
            base_url,
            api_key: first_present(key_vars, &lookup).map(|key| key.trim().to_string()),
        })
    }

    /// Build the suggester for this configuration.  Without a key every
    /// suggestion fails with a missing-key error instead of aborting startup.
    pub fn build_suggester(&self) -> Arc<dyn PersonalitySuggester> {
        let Some(key) = self.api_key.clone() else {
            return Arc::new(UnconfiguredSuggester {
                provider: self.provider.label(),
            });
        };
        match self.provider {
            Provider::OpenAi => Arc::new(OpenAiSuggester::new(
                OpenAiClient::with_endpoint(&self.model, &self.base_url),
                key,
            )),
            Provider::Gemini => Arc::new(GeminiSuggester::new(
                GeminiClient::with_endpoint(&self.model, &self.base_url),
                key,
            )),
        }
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let normalized = normalize_url(raw.trim());
    Url::parse(&normalized).with_context(|| format!("invalid base URL {raw:?}"))?;
    Ok(normalized.trim_end_matches('/').to_string())
}

// ── Roster ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RosterFile {
    agents: Vec<AgentSeed>,
}

/// An agent as written in `agents.json`; ids are assigned on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentSeed {
    name: String,
    #[serde(default)]
    personality: String,
    #[serde(default = "default_color")]
    body_color: BodyColor,
    #[serde(default = "default_voice")]
    voice: Voice,
}

fn default_color() -> BodyColor {
    AGENT_COLORS[0]
}

fn default_voice() -> Voice {
    VOICES[0]
}

impl From<AgentSeed> for Agent {
    fn from(seed: AgentSeed) -> Self {
        Agent::new(seed.name, seed.personality, seed.body_color, seed.voice)
    }
}

/// Where the roster was loaded from.
#[derive(Clone, Debug)]
pub enum RosterSource {
    Embedded,
    File(PathBuf),
}

impl RosterSource {
    pub fn label(&self) -> String {
        match self {
            RosterSource::Embedded => "embedded defaults".to_string(),
            RosterSource::File(path) => path.display().to_string(),
        }
    }
}

/// Load the starting roster: `AGENT_STUDIO_AGENTS`, then `./agents.json`,
/// then the platform config dir, then the embedded defaults.
pub fn load_roster() -> Result<(Vec<Agent>, RosterSource)> {
    if let Ok(path) = env::var("AGENT_STUDIO_AGENTS") {
        let path = PathBuf::from(path);
        return Ok((load_roster_from_path(&path)?, RosterSource::File(path)));
    }

    let cwd_path = PathBuf::from("agents.json");
    if cwd_path.exists() {
        return Ok((load_roster_from_path(&cwd_path)?, RosterSource::File(cwd_path)));
    }

    if let Some(config_path) = config_dir_file("agents.json") {
        if config_path.exists() {
            return Ok((
                load_roster_from_path(&config_path)?,
                RosterSource::File(config_path),
            ));
        }
    }

    let embedded = parse_roster(include_str!("../agents.json")).context("parse embedded agents.json")?;
    Ok((embedded, RosterSource::Embedded))
}

fn load_roster_from_path(path: &Path) -> Result<Vec<Agent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read roster from {}", path.display()))?;
    parse_roster(&contents).with_context(|| format!("parse roster from {}", path.display()))
}

fn parse_roster(contents: &str) -> Result<Vec<Agent>> {
    let file: RosterFile = serde_json::from_str(contents)?;
    Ok(file.agents.into_iter().map(Agent::from).collect())
}

fn config_dir_file(filename: &str) -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", APP_NAME, APP_NAME)?;
    Some(proj_dirs.config_dir().join(filename))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_openai_without_keys() {
        let config = ProviderConfig::resolve(vars(&[])).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.base_url, DEFAULT_OPENAI_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.build_suggester().label(), "OpenAI (no key)");
    }

    #[test]
    fn gemini_key_selects_gemini() {
        let config = ProviderConfig::resolve(vars(&[("API_KEY", "g-123")])).unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.api_key.as_deref(), Some("g-123"));
        assert_eq!(config.build_suggester().label(), "gemini/gemini-2.5-flash");
    }

    #[test]
    fn explicit_provider_wins() {
        let config = ProviderConfig::resolve(vars(&[
            ("AGENT_STUDIO_PROVIDER", "OpenAI"),
            ("GEMINI_API_KEY", "g"),
            ("OPENAI_API_KEY", "sk"),
            ("OPENAI_MODEL", "gpt-test"),
            ("OPENAI_BASE_URL", "localhost:9000/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.api_key.as_deref(), Some("sk"));
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.build_suggester().label(), "openai/gpt-test");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = ProviderConfig::resolve(vars(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
    }

    #[test]
    fn unknown_provider_is_an_error() {
        assert!(ProviderConfig::resolve(vars(&[("AGENT_STUDIO_PROVIDER", "llama")])).is_err());
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        let result = ProviderConfig::resolve(vars(&[
            ("AGENT_STUDIO_PROVIDER", "gemini"),
            ("GEMINI_BASE_URL", "http://exa mple.com"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn embedded_roster_parses() {
        let agents = parse_roster(include_str!("../agents.json")).unwrap();
        assert!(!agents.is_empty());
        assert!(agents.iter().all(|agent| !agent.name.is_empty()));
    }

    #[test]
    fn roster_defaults_and_validation() {
        let agents = parse_roster(r#"{"agents":[{"name":"Zeke"}]}"#).unwrap();
        assert_eq!(agents[0].personality, "");
        assert_eq!(agents[0].body_color, AGENT_COLORS[0]);
        assert_eq!(agents[0].voice, VOICES[0]);

        assert!(parse_roster(r##"{"agents":[{"name":"Zeke","bodyColor":"#fff"}]}"##).is_err());
        assert!(parse_roster(r#"{"agents":[{"name":"Zeke","voice":"V1"}]}"#).is_err());
    }

    #[test]
    fn provider_parsing() {
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(" openai ".parse::<Provider>().unwrap(), Provider::OpenAi);
    }
}
