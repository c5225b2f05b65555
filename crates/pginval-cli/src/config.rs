use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::RunArgs;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!("invalid config file {}: {e:#}", config_path.display())
        })?;

        Ok(Self { config_path, file })
    }

    /// Load `path` if it exists; a missing default config is not an error.
    pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
        if path.exists() {
            Self::load(path.to_path_buf()).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,
    pub project_ref: Option<String>,
    pub default_schema: Option<String>,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl ConfigFile {
    /// Parse, expand `${VAR}` references and validate.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile =
            toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse: {e}"))?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        if let Some(project_ref) = self.project_ref.as_mut() {
            *project_ref = expand_env_vars(project_ref)?;
        }
        if let Some(schema) = self.default_schema.as_mut() {
            *schema = expand_env_vars(schema)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if let Some(project_ref) = &self.project_ref {
            if project_ref.trim().is_empty() {
                anyhow::bail!("project_ref must not be empty");
            }
        }
        if let Some(schema) = &self.default_schema {
            if schema.trim().is_empty() {
                anyhow::bail!("default_schema must not be empty");
            }
        }
        Ok(())
    }
}

/// Effective options for one run: flags win over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_ref: Option<String>,
    pub default_schema: String,
    pub format: OutputFormat,
}

impl Settings {
    pub fn resolve(args: &RunArgs, config: Option<&ConfigFile>) -> Self {
        let project_ref = args
            .project
            .clone()
            .or_else(|| config.and_then(|c| c.project_ref.clone()));
        let default_schema = args
            .schema
            .clone()
            .or_else(|| config.and_then(|c| c.default_schema.clone()))
            .unwrap_or_else(|| pginval::DEFAULT_SCHEMA.to_string());
        let format = if args.json {
            OutputFormat::Json
        } else {
            config.map(|c| c.output.format).unwrap_or_default()
        };

        Self {
            project_ref,
            default_schema,
            format,
        }
    }

    /// Load `.env` and the config named by `args`, then resolve.
    pub fn load(args: &RunArgs) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let project = ProjectConfig::load_optional(&args.config)?;
        if let Some(project) = &project {
            tracing::debug!(config = %project.config_path.display(), "loaded config");
        }
        Ok(Self::resolve(args, project.as_ref().map(|p| &p.file)))
    }

    pub fn require_project_ref(&self) -> anyhow::Result<&str> {
        self.project_ref.as_deref().ok_or_else(|| {
            anyhow::anyhow!("missing project ref; pass --project or set project_ref in pginval.toml")
        })
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
