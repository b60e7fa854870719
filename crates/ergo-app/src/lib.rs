use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ergo_lang::repository::DEFAULT_MAX_MATCHES;
use ergo_lang::{
    AnalysisEnv, AnalysisReport, Diagnostic, FsRepository, KnowledgeBase, KnowledgeTable,
    Severity, analyze_document,
};

pub const DIAGNOSTIC_SOURCE: &str = "EasyErgo";
pub const ROBOT_PATHS_ENV: &str = "EASYBUILD_ROBOT_PATHS";
pub const DEFAULT_ROBOT_PATH: &str = "/apps/easybuild-easyconfigs/easybuild/easyconfigs";
pub const DEFAULT_ANALYSIS_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Default)]
pub struct AppLoadOptions {
    pub config: Option<PathBuf>,
    pub robot_paths: Vec<PathBuf>,
    pub knowledge: Option<PathBuf>,
}

/// Contents of an `easyergo.toml` settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub robot_paths: Vec<PathBuf>,
    pub knowledge: Option<PathBuf>,
    pub max_matches: Option<usize>,
    pub analysis_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppSession {
    knowledge: Arc<KnowledgeBase>,
    repository: Arc<FsRepository>,
    analysis_timeout: Duration,
}

impl AppSession {
    pub fn new(knowledge: KnowledgeBase, repository: FsRepository) -> Self {
        Self {
            knowledge: Arc::new(knowledge),
            repository: Arc::new(repository),
            analysis_timeout: Duration::from_millis(DEFAULT_ANALYSIS_TIMEOUT_MS),
        }
    }

    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn repository(&self) -> &FsRepository {
        &self.repository
    }

    pub fn analysis_timeout(&self) -> Duration {
        self.analysis_timeout
    }

    pub fn analyze(&self, text: &str, file_name: &str) -> Result<AnalysisReport, String> {
        let env = AnalysisEnv::new(&self.knowledge, self.repository.as_ref());
        analyze_document(text, file_name, &env)
            .map_err(|err| format!("failed to analyze {file_name}: {err}"))
    }

    pub fn check_file(&self, path: &Path) -> Result<AnalysisReport, String> {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
        self.analyze(&text, &path.to_string_lossy())
    }
}

pub fn load_session(options: &AppLoadOptions) -> Result<AppSession, String> {
    let settings = load_settings(options.config.as_deref())?;
    let knowledge_path = options
        .knowledge
        .as_deref()
        .or(settings.knowledge.as_deref());
    let knowledge = load_knowledge(knowledge_path)?;

    let env_paths = std::env::var(ROBOT_PATHS_ENV).ok();
    let robot_paths = resolve_robot_paths(
        &options.robot_paths,
        &settings.robot_paths,
        env_paths.as_deref(),
    );
    for root in robot_paths.iter().filter(|root| !root.is_dir()) {
        tracing::warn!(path = %root.display(), "robot path does not exist");
    }
    tracing::info!(
        robot_paths = ?robot_paths,
        knowledge = ?knowledge_path,
        "session loaded"
    );

    let repository = FsRepository::new(robot_paths)
        .with_max_matches(settings.max_matches.unwrap_or(DEFAULT_MAX_MATCHES));
    let timeout = settings
        .analysis_timeout_ms
        .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_MS);
    Ok(AppSession::new(knowledge, repository).with_analysis_timeout(Duration::from_millis(timeout)))
}

/// The built-in tables, with the table at `path` merged on top.
pub fn load_knowledge(path: Option<&Path>) -> Result<KnowledgeBase, String> {
    let mut table = KnowledgeTable::builtin().map_err(|err| err.to_string())?;
    if let Some(path) = path {
        table.merge(KnowledgeTable::load(path).map_err(|err| err.to_string())?);
    }
    KnowledgeBase::try_from(table).map_err(|err| err.to_string())
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read settings {}: {err}", path.display()))?;
    let value = text
        .parse::<toml::Table>()
        .map_err(|err| format!("failed to parse settings {}: {err}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut settings = Settings::default();
    for (key, value) in &value {
        match key.as_str() {
            "robot_paths" => {
                let items = value
                    .as_array()
                    .ok_or_else(|| "settings robot_paths must be an array of strings".to_string())?;
                for item in items {
                    let raw = item
                        .as_str()
                        .ok_or_else(|| "settings robot_paths must be an array of strings".to_string())?;
                    settings.robot_paths.push(base.join(raw));
                }
            }
            "knowledge" => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| "settings knowledge must be a string".to_string())?;
                settings.knowledge = Some(base.join(raw));
            }
            "max_matches" => {
                let raw = value
                    .as_integer()
                    .filter(|raw| *raw > 0)
                    .ok_or_else(|| "settings max_matches must be a positive integer".to_string())?;
                settings.max_matches = usize::try_from(raw).ok();
            }
            "analysis_timeout_ms" => {
                let raw = value.as_integer().filter(|raw| *raw > 0).ok_or_else(|| {
                    "settings analysis_timeout_ms must be a positive integer".to_string()
                })?;
                settings.analysis_timeout_ms = u64::try_from(raw).ok();
            }
            other => {
                return Err(format!(
                    "unknown setting `{other}` in {}",
                    path.display()
                ));
            }
        }
    }
    Ok(settings)
}

/// Command-line roots win over the settings file, which wins over
/// `$EASYBUILD_ROBOT_PATHS`; the conventional location is the fallback.
pub fn resolve_robot_paths(cli: &[PathBuf], settings: &[PathBuf], env: Option<&str>) -> Vec<PathBuf> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    if !settings.is_empty() {
        return settings.to_vec();
    }
    let from_env = env
        .unwrap_or_default()
        .split(':')
        .filter(|item| !item.trim().is_empty())
        .map(PathBuf::from)
        .collect::<Vec<_>>();
    if !from_env.is_empty() {
        return from_env;
    }
    vec![PathBuf::from(DEFAULT_ROBOT_PATH)]
}

pub fn diagnostic_to_json(diag: &Diagnostic) -> serde_json::Value {
    serde_json::json!({
        "severity": match diag.severity { Severity::Information => "information" },
        "code": diag.code,
        "message": diag.message,
        "source": DIAGNOSTIC_SOURCE,
        "span": {
            "start": diag.range.span.start,
            "end": diag.range.span.end,
        },
        "range": {
            "start": { "line": diag.range.start.line, "character": diag.range.start.character },
            "end": { "line": diag.range.end.line, "character": diag.range.end.character },
        }
    })
}
