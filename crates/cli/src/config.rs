//! Runtime configuration.
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults ([`ActionConfig::default`])
//! 2. Optional TOML file (`METAPHORE_CONFIG`, default `.github/metaphore-bot.toml`)
//! 3. `GITHUB_API_URL` (set by the Actions runner; GHES support)
//! 4. Action inputs, which the runner exports as `INPUT_<NAME>` with the
//!    input name upper-cased and hyphens kept (`INPUT_GITHUB-TOKEN`)
//!
//! The runner exports declared-but-unset inputs as empty strings, so an empty
//! value always means "use the default".

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use github::{GitHubClientConfig, DEFAULT_API_URL};
use handlers::{GreetingConfig, PublisherConfig};
use pipeline::{BotIdentity, BranchName, LabelName, RepositoryId, ReviewerAllowList, UserLogin};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_VAR: &str = "METAPHORE_CONFIG";

/// Config file read when [`CONFIG_PATH_VAR`] is unset. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = ".github/metaphore-bot.toml";

const DEFAULT_STORIES_ROOT: &str = "src/content/stories";
const DEFAULT_REVIEWER: &str = "darkterminal";
const DEFAULT_PUBLISHED_LABEL: &str = "published";
const DEFAULT_BOT_NAME: &str = "metaphore-bot";
const DEFAULT_BOT_EMAIL: &str = "metaphore-bot@users.noreply.github.com";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("input 'github-token' is required")]
    MissingToken,

    #[error("at least one reviewer must be configured")]
    NoReviewers,

    #[error("invalid reviewer handle '{0}'")]
    InvalidReviewer(String),

    #[error("invalid content-repository: {0}")]
    InvalidRepository(#[from] pipeline::InvalidRepositoryId),

    #[error("'{0}' must not be blank")]
    Blank(&'static str),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for the Actions log viewer.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// An access token. Never printed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0.is_empty() { "<unset>" } else { "<redacted>" })
    }
}

/// Raw configuration as merged from all providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActionConfig {
    pub github_token: Token,
    #[serde(default, deserialize_with = "free_text")]
    pub issue_message: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub pr_message: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub footer: Option<String>,
    pub stories_root: String,
    pub content_repository: Option<String>,
    pub content_branch: Option<String>,
    /// `None` when the input is blank; the default reviewer applies.
    #[serde(default, deserialize_with = "list_or_csv")]
    pub reviewers: Option<Vec<String>>,
    pub published_label: String,
    pub bot_name: String,
    pub bot_email: String,
    pub api_url: String,
    #[serde(default, deserialize_with = "optional_log_format")]
    pub log_format: Option<LogFormat>,
    pub otlp_endpoint: Option<String>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            github_token: Token::default(),
            issue_message: None,
            pr_message: None,
            footer: None,
            stories_root: DEFAULT_STORIES_ROOT.into(),
            content_repository: None,
            content_branch: None,
            reviewers: Some(vec![DEFAULT_REVIEWER.into()]),
            published_label: DEFAULT_PUBLISHED_LABEL.into(),
            bot_name: DEFAULT_BOT_NAME.into(),
            bot_email: DEFAULT_BOT_EMAIL.into(),
            api_url: DEFAULT_API_URL.into(),
            log_format: None,
            otlp_endpoint: None,
        }
    }
}

/// Any scalar input. The env provider types values it can parse, so an input
/// of `true` or `42` arrives as a bool or a number rather than a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

/// Reads a free-text input as a string whatever type the provider gave it.
fn free_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

/// Accepts `["a", "b"]` or `"a, b"`. A blank string is `None`.
fn list_or_csv<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<Scalar>),
        Csv(Scalar),
    }

    let items: Vec<String> = match Option::<ListOrCsv>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(ListOrCsv::List(items)) => items.into_iter().map(Scalar::into_text).collect(),
        Some(ListOrCsv::Csv(raw)) => {
            let raw = raw.into_text();
            if raw.trim().is_empty() {
                return Ok(None);
            }
            raw.split(',').map(str::to_string).collect()
        }
    };
    Ok(Some(
        items
            .into_iter()
            .map(|s| s.trim().trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    ))
}

/// `pretty` or `json`, case-insensitive. A blank string is `None`.
fn optional_log_format<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<LogFormat>, D::Error> {
    let Some(raw) = free_text(deserializer)? else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "pretty" => Ok(Some(LogFormat::Pretty)),
        "json" => Ok(Some(LogFormat::Json)),
        _ => Err(serde::de::Error::unknown_variant(&raw, &["pretty", "json"])),
    }
}

/// Where observability output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

/// Validated, typed settings for every component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: GitHubClientConfig,
    pub greeting: GreetingConfig,
    pub publisher: PublisherConfig,
    pub telemetry: TelemetryConfig,
}

/// Builds the provider chain described in the module docs.
pub fn figment() -> Figment {
    let file = std::env::var(CONFIG_PATH_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    Figment::new()
        .merge(Serialized::defaults(ActionConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::raw().only(&["GITHUB_API_URL"]).map(|_| "api-url".into()))
        .merge(Env::prefixed("INPUT_"))
}

/// Loads and validates configuration.
pub fn load() -> Result<Settings, ConfigError> {
    let raw: ActionConfig = figment().extract().map_err(Box::new)?;
    raw.into_settings()
}

/// `None` for unset or blank values.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The trimmed value, or `default` when blank.
fn or_default(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

impl ActionConfig {
    /// Validates the raw values and converts them into component settings.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let token = self.github_token.expose().trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let reviewers = self
            .reviewers
            .unwrap_or_else(|| vec![DEFAULT_REVIEWER.to_string()])
            .iter()
            .map(|r| {
                UserLogin::new(r.as_str()).ok_or_else(|| ConfigError::InvalidReviewer(r.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if reviewers.is_empty() {
            return Err(ConfigError::NoReviewers);
        }

        let content_repository = non_blank(self.content_repository)
            .map(|r| r.parse::<RepositoryId>())
            .transpose()?;

        let published_label =
            LabelName::new(or_default(self.published_label, DEFAULT_PUBLISHED_LABEL))
                .ok_or(ConfigError::Blank("published-label"))?;

        let identity = BotIdentity {
            name: or_default(self.bot_name, DEFAULT_BOT_NAME),
            email: or_default(self.bot_email, DEFAULT_BOT_EMAIL),
        };

        Ok(Settings {
            client: GitHubClientConfig {
                token,
                api_url: or_default(self.api_url, DEFAULT_API_URL),
                user_agent: format!("metaphore-bot/{}", env!("CARGO_PKG_VERSION")),
            },
            greeting: GreetingConfig {
                issue_message: self.issue_message,
                pr_message: self.pr_message,
                footer: self.footer,
            },
            publisher: PublisherConfig {
                stories_root: or_default(self.stories_root, DEFAULT_STORIES_ROOT),
                content_repository,
                content_branch: non_blank(self.content_branch).and_then(BranchName::new),
                identity,
                reviewers: ReviewerAllowList::new(reviewers),
                published_label,
            },
            telemetry: TelemetryConfig {
                format: self.log_format.unwrap_or_default(),
                otlp_endpoint: non_blank(self.otlp_endpoint),
            },
        })
    }
}
