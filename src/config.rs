//! Configuration resolution
//!
//! Three layers, highest priority first:
//!
//! 1. the override file (`netkeep.env`, `KEY=value` lines)
//! 2. the persisted record (`/etc/netkeep/netkeep.toml`)
//! 3. built-in defaults
//!
//! A field takes the first non-empty value. The group list has a preferred
//! key (`GROUPS` / `groups`) and a legacy one (`DEVICE_GROUPS` /
//! `device_groups`); within a layer the preferred key wins.
//!
//! The override file is read, never sourced. Comments must sit on their own
//! line; a trailing `# comment` after a value is rejected rather than
//! guessed at.

use anyhow::Context;
use declarative::{Call, OperationError, ReconcileOutcome, Reconciler, ResourceSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::ProvisionError;

pub const DEFAULT_GROUP: &str = "default";
pub const DEFAULT_IDENTITY_NAME: &str = "netkeep";
pub const DEFAULT_IDENTITY_EMAIL: &str = "netkeep@localhost";
pub const DEFAULT_BASE_DIR: &str = "/var/lib/netkeep";
pub const DEFAULT_ETC_DIR: &str = "/etc/netkeep";
pub const DEFAULT_SCHEDULE_FILE: &str = "/etc/cron.d/netkeep";
pub const DEFAULT_SCHEDULE_LINE: &str = "0 * * * * netkeep /usr/local/bin/netkeep-collect";
pub const DEFAULT_SERVICE_ACCOUNT: &str = "netkeep";

/// Owner of root-held resources (the record, the schedule file)
pub const ROOT_ACCOUNT: &str = "root";

const RECORD_MODE: u32 = 0o640;
const RECORD_DIR_MODE: u32 = 0o755;

static ACCOUNT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_-]*$").expect("hardcoded regex pattern is valid")
});

static ENV_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("hardcoded regex pattern is valid")
});

// ============================================================================
// ConfigSet
// ============================================================================

/// The validated, immutable configuration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSet {
    /// Group names in configured order; not yet checked against the identifier pattern
    pub groups: Vec<String>,
    pub identity_name: String,
    pub identity_email: String,
    pub base_dir: PathBuf,
    pub etc_dir: PathBuf,
    pub schedule_file: PathBuf,
    pub schedule_line: String,
    pub service_user: String,
    pub service_group: String,
    pub template_dir: PathBuf,
}

impl ConfigSet {
    /// Check every invariant, reporting all problems at once
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let mut problems = Vec::new();

        if self.groups.is_empty() {
            problems.push("at least one group name is required".to_string());
        }

        for (key, value) in [
            ("IDENTITY_NAME", &self.identity_name),
            ("IDENTITY_EMAIL", &self.identity_email),
            ("SCHEDULE_LINE", &self.schedule_line),
            ("SERVICE_USER", &self.service_user),
            ("SERVICE_GROUP", &self.service_group),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{key} must not be empty"));
            }
        }

        for (key, path) in [
            ("BASE_DIR", &self.base_dir),
            ("ETC_DIR", &self.etc_dir),
            ("SCHEDULE_FILE", &self.schedule_file),
            ("template directory", &self.template_dir),
        ] {
            if !path.is_absolute() {
                problems.push(format!("{key} must be an absolute path, got '{}'", path.display()));
            }
        }

        if self.schedule_line.contains(['\n', '\r']) {
            problems.push("SCHEDULE_LINE must be a single line".to_string());
        }

        for (key, name) in [
            ("SERVICE_USER", &self.service_user),
            ("SERVICE_GROUP", &self.service_group),
        ] {
            if !name.is_empty() && !ACCOUNT_NAME.is_match(name) {
                problems.push(format!("{key} '{name}' is not a valid account name"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::Validation { problems })
        }
    }

    pub fn inventory_template(&self) -> PathBuf {
        self.template_dir.join(crate::paths::INVENTORY_TEMPLATE)
    }

    pub fn credentials_template(&self) -> PathBuf {
        self.template_dir.join(crate::paths::CREDENTIALS_TEMPLATE)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.etc_dir.join(crate::paths::CREDENTIALS_FILE)
    }
}

// ============================================================================
// Layers
// ============================================================================

/// A group list as written: a real sequence or one whitespace-separated string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupList {
    Sequence(Vec<String>),
    Words(String),
}

impl GroupList {
    /// Individual names, trimmed, empty entries dropped, duplicates removed
    /// keeping first-seen order
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Sequence(items) => items.iter().map(|s| s.trim()).collect(),
            Self::Words(words) => words.split_whitespace().collect(),
        };

        let mut names: Vec<String> = Vec::with_capacity(raw.len());
        for name in raw {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

/// One configuration layer; every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub groups: Option<GroupList>,
    pub device_groups: Option<GroupList>,
    pub identity_name: Option<String>,
    pub identity_email: Option<String>,
    pub base_dir: Option<String>,
    pub etc_dir: Option<String>,
    pub schedule_file: Option<String>,
    pub schedule_line: Option<String>,
    pub service_user: Option<String>,
    pub service_group: Option<String>,
}

impl ConfigLayer {
    /// Group names this layer defines, preferring the current key over the legacy one
    pub fn group_names(&self) -> Option<Vec<String>> {
        [&self.groups, &self.device_groups]
            .into_iter()
            .flatten()
            .map(GroupList::names)
            .find(|names| !names.is_empty())
    }

    /// Parse the persisted TOML record
    pub fn from_toml(content: &str) -> Result<Self, ProvisionError> {
        toml::from_str(content)
            .map_err(|e| ProvisionError::validation(format!("malformed configuration record: {e}")))
    }

    /// Build a layer from the override file's `KEY=value` content
    pub fn from_env(content: &str) -> Result<Self, ProvisionError> {
        let mut layer = Self::default();
        let mut problems = Vec::new();

        for (line_no, key, value) in parse_env(content)? {
            let slot = match key.as_str() {
                "GROUPS" => {
                    layer.groups = Some(value.into_group_list());
                    continue;
                }
                "DEVICE_GROUPS" => {
                    layer.device_groups = Some(value.into_group_list());
                    continue;
                }
                "IDENTITY_NAME" => &mut layer.identity_name,
                "IDENTITY_EMAIL" => &mut layer.identity_email,
                "BASE_DIR" => &mut layer.base_dir,
                "ETC_DIR" => &mut layer.etc_dir,
                "SCHEDULE_FILE" => &mut layer.schedule_file,
                "SCHEDULE_LINE" => &mut layer.schedule_line,
                "SERVICE_USER" => &mut layer.service_user,
                "SERVICE_GROUP" => &mut layer.service_group,
                _ => {
                    log::debug!("Ignoring unknown key {key} on line {line_no}");
                    continue;
                }
            };

            match value {
                EnvValue::Scalar(s) => *slot = Some(s),
                EnvValue::List(_) => {
                    problems.push(format!("line {line_no}: {key} does not accept a list"));
                }
            }
        }

        if problems.is_empty() {
            Ok(layer)
        } else {
            Err(ProvisionError::Validation { problems })
        }
    }
}

/// Layer written back to disk on first run
#[derive(Debug, Serialize)]
struct PersistedRecord<'a> {
    identity_name: &'a str,
    identity_email: &'a str,
    base_dir: &'a Path,
    etc_dir: &'a Path,
    schedule_file: &'a Path,
    schedule_line: &'a str,
    service_user: &'a str,
    service_group: &'a str,
    groups: &'a [String],
}

impl<'a> From<&'a ConfigSet> for PersistedRecord<'a> {
    fn from(config: &'a ConfigSet) -> Self {
        Self {
            identity_name: &config.identity_name,
            identity_email: &config.identity_email,
            base_dir: &config.base_dir,
            etc_dir: &config.etc_dir,
            schedule_file: &config.schedule_file,
            schedule_line: &config.schedule_line,
            service_user: &config.service_user,
            service_group: &config.service_group,
            groups: &config.groups,
        }
    }
}

/// Render the record file content for a resolved configuration
pub fn render_record(config: &ConfigSet) -> Result<String, ProvisionError> {
    let body = toml::to_string(&PersistedRecord::from(config))
        .context("Failed to serialize configuration record")
        .map_err(|e| ProvisionError::external("writing configuration record", e))?;
    Ok(format!(
        "# netkeep configuration record, written on first run.\n\
         # Values here are overridden by a local netkeep.env.\n{body}"
    ))
}

// ============================================================================
// Override file parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvValue {
    Scalar(String),
    List(Vec<String>),
}

impl EnvValue {
    fn into_group_list(self) -> GroupList {
        match self {
            Self::Scalar(s) => GroupList::Words(s),
            Self::List(items) => GroupList::Sequence(items),
        }
    }
}

/// Parse `KEY=value`, `KEY="value"` and `KEY=(a "b c")` lines
///
/// Blank lines and `#` comments are skipped and a leading `export` is
/// allowed. Trailing comments are not supported. Nothing is expanded or
/// executed. Every malformed line is reported.
fn parse_env(content: &str) -> Result<Vec<(usize, String, EnvValue)>, ProvisionError> {
    let mut entries = Vec::new();
    let mut problems = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map_or(line, str::trim_start);

        let Some((key, value)) = line.split_once('=') else {
            problems.push(format!("line {line_no}: expected KEY=value"));
            continue;
        };

        let key = key.trim_end();
        if !ENV_KEY.is_match(key) {
            problems.push(format!("line {line_no}: invalid key '{key}'"));
            continue;
        }

        let value = value.trim();
        let parsed = if let Some(inner) = value.strip_prefix('(') {
            match inner.strip_suffix(')') {
                Some(inner) => split_words(inner).map(EnvValue::List),
                None if inner.contains(')') => Err(TRAILING_TEXT.to_string()),
                None => Err("unterminated list".to_string()),
            }
        } else {
            unquote(value).map(EnvValue::Scalar)
        };

        match parsed {
            Ok(value) => entries.push((line_no, key.to_string(), value)),
            Err(msg) => problems.push(format!("line {line_no}: {msg}")),
        }
    }

    if problems.is_empty() {
        Ok(entries)
    } else {
        Err(ProvisionError::Validation { problems })
    }
}

const TRAILING_TEXT: &str = "unexpected text after the value (trailing comments are not supported)";

fn unquote(value: &str) -> Result<String, String> {
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            return match rest.split_once(quote) {
                Some((inner, "")) => Ok(inner.to_string()),
                Some(_) => Err(TRAILING_TEXT.to_string()),
                None => Err(format!("unterminated {quote} quote")),
            };
        }
    }
    if value.contains(char::is_whitespace) {
        return Err("unquoted value contains whitespace".to_string());
    }
    Ok(value.to_string())
}

/// Split list contents on whitespace, honoring single and double quotes
fn split_words(input: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote in list"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// ============================================================================
// Resolution
// ============================================================================

/// Where configuration comes from for one run
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Override file; skipped when absent
    pub env_file: Option<PathBuf>,
    /// Persisted record location
    pub record_path: PathBuf,
    pub template_dir: PathBuf,
}

/// Resolved configuration plus what the resolver noticed along the way
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: ConfigSet,
    pub record_present: bool,
    pub warnings: Vec<String>,
}

/// Merge the three layers into a validated [`ConfigSet`]
pub fn resolve(sources: &ConfigSources) -> Result<Resolution, ProvisionError> {
    let overrides = match &sources.env_file {
        Some(path) => match read_optional(path)? {
            Some(content) => {
                log::info!("Reading overrides from {}", path.display());
                ConfigLayer::from_env(&content)?
            }
            None => ConfigLayer::default(),
        },
        None => ConfigLayer::default(),
    };

    let record_content = read_optional(&sources.record_path)?;
    let record_present = record_content.is_some();
    let record = match record_content {
        Some(content) => ConfigLayer::from_toml(&content)?,
        None => ConfigLayer::default(),
    };

    let (config, warnings) = merge(&[&overrides, &record], &sources.template_dir);
    config.validate()?;

    Ok(Resolution {
        config,
        record_present,
        warnings,
    })
}

/// Merge layers (highest priority first) over the built-in defaults
pub fn merge(layers: &[&ConfigLayer], template_dir: &Path) -> (ConfigSet, Vec<String>) {
    let mut warnings = Vec::new();

    let groups = match layers.iter().find_map(|layer| layer.group_names()) {
        Some(names) => names,
        None => {
            warnings.push(format!(
                "No group names configured; using default group '{DEFAULT_GROUP}'"
            ));
            vec![DEFAULT_GROUP.to_string()]
        }
    };

    let pick = |field: fn(&ConfigLayer) -> Option<&String>, default: &str| -> String {
        layers
            .iter()
            .filter_map(|layer| field(layer))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    let config = ConfigSet {
        groups,
        identity_name: pick(|l| l.identity_name.as_ref(), DEFAULT_IDENTITY_NAME),
        identity_email: pick(|l| l.identity_email.as_ref(), DEFAULT_IDENTITY_EMAIL),
        base_dir: PathBuf::from(pick(|l| l.base_dir.as_ref(), DEFAULT_BASE_DIR)),
        etc_dir: PathBuf::from(pick(|l| l.etc_dir.as_ref(), DEFAULT_ETC_DIR)),
        schedule_file: PathBuf::from(pick(|l| l.schedule_file.as_ref(), DEFAULT_SCHEDULE_FILE)),
        schedule_line: pick(|l| l.schedule_line.as_ref(), DEFAULT_SCHEDULE_LINE),
        service_user: pick(|l| l.service_user.as_ref(), DEFAULT_SERVICE_ACCOUNT),
        service_group: pick(|l| l.service_group.as_ref(), DEFAULT_SERVICE_ACCOUNT),
        template_dir: template_dir.to_path_buf(),
    };

    (config, warnings)
}

fn read_optional(path: &Path) -> Result<Option<String>, ProvisionError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(OperationError::io(Call::Read, path, e).into()),
    }
}

/// Write the record if it does not exist yet
///
/// The record's parent directory is created when missing but otherwise left
/// alone; it may be the etc directory, whose ownership is managed later.
pub fn persist_record(
    config: &ConfigSet,
    record_path: &Path,
    reconciler: &Reconciler<'_>,
) -> Result<Vec<ReconcileOutcome>, ProvisionError> {
    let mut outcomes = Vec::new();

    if let Some(parent) = record_path.parent()
        && !parent.exists()
    {
        let dir = ResourceSpec::directory(parent, ROOT_ACCOUNT, ROOT_ACCOUNT, RECORD_DIR_MODE);
        outcomes.push(reconciler.reconcile(&dir, &[], false)?);
    }

    let content = render_record(config)?;
    outcomes.push(reconciler.reconcile(&record_spec(record_path), content.as_bytes(), false)?);
    Ok(outcomes)
}

/// Spec of the persisted record, for verification
pub fn record_spec(record_path: &Path) -> ResourceSpec {
    ResourceSpec::file(record_path, ROOT_ACCOUNT, ROOT_ACCOUNT, RECORD_MODE).protected()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layer_with_groups(groups: GroupList) -> ConfigLayer {
        ConfigLayer {
            groups: Some(groups),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_words_normalize_and_dedupe() {
        let list = GroupList::Words("  core edge\tcore\n lab ".to_string());
        assert_eq!(list.names(), vec!["core", "edge", "lab"]);

        let list = GroupList::Sequence(vec![" core ".into(), String::new(), "bad name!".into()]);
        assert_eq!(list.names(), vec!["core", "bad name!"]);
    }

    #[test]
    fn test_preferred_group_key_wins_over_legacy() {
        let layer = ConfigLayer {
            groups: Some(GroupList::Words("core edge".into())),
            device_groups: Some(GroupList::Sequence(vec!["legacy".into()])),
            ..Default::default()
        };
        assert_eq!(layer.group_names(), Some(vec!["core".into(), "edge".into()]));

        let env = ConfigLayer::from_env("DEVICE_GROUPS=(old)\nGROUPS=(new)\n").unwrap();
        let (config, _) = merge(&[&env], Path::new("/opt/netkeep/templates"));
        assert_eq!(config.groups, vec!["new"]);
    }

    #[test]
    fn test_legacy_key_used_when_preferred_is_empty() {
        let layer = ConfigLayer {
            groups: Some(GroupList::Words("   ".into())),
            device_groups: Some(GroupList::Words("legacy".into())),
            ..Default::default()
        };
        assert_eq!(layer.group_names(), Some(vec!["legacy".into()]));
    }

    #[test]
    fn test_override_layer_beats_record_and_defaults() {
        let overrides = ConfigLayer {
            base_dir: Some("/srv/netkeep".into()),
            identity_email: Some(String::new()),
            ..Default::default()
        };
        let record = ConfigLayer {
            base_dir: Some("/data/netkeep".into()),
            identity_email: Some("ops@example.net".into()),
            ..layer_with_groups(GroupList::Sequence(vec!["core".into()]))
        };

        let (config, warnings) = merge(&[&overrides, &record], Path::new("/t"));
        assert!(warnings.is_empty());
        assert_eq!(config.base_dir, PathBuf::from("/srv/netkeep"));
        assert_eq!(config.identity_email, "ops@example.net");
        assert_eq!(config.identity_name, DEFAULT_IDENTITY_NAME);
        assert_eq!(config.groups, vec!["core"]);
    }

    #[test]
    fn test_empty_group_list_falls_back_to_default_with_warning() {
        let layer = layer_with_groups(GroupList::Words(String::new()));
        let (config, warnings) = merge(&[&layer], Path::new("/t"));
        assert_eq!(config.groups, vec![DEFAULT_GROUP]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_env_parser_forms() {
        let content = r#"
# comment
export BASE_DIR=/srv/netkeep
IDENTITY_NAME="Config Archive"
IDENTITY_EMAIL='ops@example.net'
GROUPS=(valid-1 "bad name!" valid-2)
UNRELATED=whatever
"#;
        let layer = ConfigLayer::from_env(content).unwrap();
        assert_eq!(layer.base_dir.as_deref(), Some("/srv/netkeep"));
        assert_eq!(layer.identity_name.as_deref(), Some("Config Archive"));
        assert_eq!(layer.identity_email.as_deref(), Some("ops@example.net"));
        assert_eq!(
            layer.group_names().unwrap(),
            vec!["valid-1", "bad name!", "valid-2"]
        );
    }

    #[test]
    fn test_env_parser_reports_every_bad_line() {
        let err = ConfigLayer::from_env("GROUPS=(a b\nnot a pair\nBASE_DIR=(x)\nNAME=\"open\n")
            .unwrap_err();
        match err {
            ProvisionError::Validation { problems } => {
                assert_eq!(problems.len(), 3);
                assert!(problems[0].starts_with("line 1"));
                assert!(problems[1].starts_with("line 2"));
                assert!(problems[2].starts_with("line 4"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = ConfigLayer::from_env("BASE_DIR=(x)\n").unwrap_err();
        assert!(err.to_string().contains("does not accept a list"));
    }

    #[test]
    fn test_env_parser_rejects_trailing_comments() {
        for line in [
            "GROUPS=\"core edge\" # sites\n",
            "GROUPS=(a b) # c\n",
            "BASE_DIR=/srv/netkeep # archive\n",
        ] {
            let err = ConfigLayer::from_env(line).unwrap_err();
            assert!(matches!(err, ProvisionError::Validation { .. }), "{line}");
        }

        let err = ConfigLayer::from_env("GROUPS=(a b) # c\n").unwrap_err();
        assert!(err.to_string().contains("trailing comments are not supported"));

        let layer = ConfigLayer::from_env("# sites\nGROUPS=\"core edge\"\n").unwrap();
        assert_eq!(layer.group_names().unwrap(), vec!["core", "edge"]);
    }

    #[test]
    fn test_record_accepts_sequence_or_string_groups() {
        let layer = ConfigLayer::from_toml("groups = [\"core\", \"edge\"]\n").unwrap();
        assert_eq!(layer.group_names().unwrap(), vec!["core", "edge"]);

        let layer = ConfigLayer::from_toml("device_groups = \"core edge\"\nextra = 1\n").unwrap();
        assert_eq!(layer.group_names().unwrap(), vec!["core", "edge"]);

        assert!(ConfigLayer::from_toml("groups = [").is_err());
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let (mut config, _) = merge(&[], Path::new("templates"));
        config.base_dir = PathBuf::from("relative/base");
        config.schedule_line = "a\nb".into();
        config.service_user = "Bad User".into();

        match config.validate().unwrap_err() {
            ProvisionError::Validation { problems } => {
                assert_eq!(problems.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rendered_record_round_trips() {
        let (mut config, _) = merge(&[], Path::new("/opt/netkeep/templates"));
        config.groups = vec!["core".into(), "edge".into()];

        let rendered = render_record(&config).unwrap();
        let layer = ConfigLayer::from_toml(&rendered).unwrap();
        let (reloaded, warnings) = merge(&[&layer], &config.template_dir);

        assert!(warnings.is_empty());
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_resolve_reads_both_sources() {
        let tmp = TempDir::new().unwrap();
        let env_file = tmp.path().join("netkeep.env");
        let record_path = tmp.path().join("netkeep.toml");
        fs::write(&env_file, "GROUPS=\"core edge\"\n").unwrap();
        fs::write(
            &record_path,
            "groups = [\"old\"]\nbase_dir = \"/srv/archive\"\n",
        )
        .unwrap();

        let resolution = resolve(&ConfigSources {
            env_file: Some(env_file),
            record_path,
            template_dir: tmp.path().join("templates"),
        })
        .unwrap();

        assert!(resolution.record_present);
        assert_eq!(resolution.config.groups, vec!["core", "edge"]);
        assert_eq!(resolution.config.base_dir, PathBuf::from("/srv/archive"));
    }

    #[test]
    fn test_resolve_without_any_source_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve(&ConfigSources {
            env_file: Some(tmp.path().join("missing.env")),
            record_path: tmp.path().join("missing.toml"),
            template_dir: tmp.path().join("templates"),
        })
        .unwrap();

        assert!(!resolution.record_present);
        assert_eq!(resolution.config.groups, vec![DEFAULT_GROUP]);
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_resolve_rejects_relative_override_path() {
        let tmp = TempDir::new().unwrap();
        let env_file = tmp.path().join("netkeep.env");
        fs::write(&env_file, "ETC_DIR=etc/netkeep\n").unwrap();

        let err = resolve(&ConfigSources {
            env_file: Some(env_file),
            record_path: tmp.path().join("netkeep.toml"),
            template_dir: tmp.path().join("templates"),
        })
        .unwrap_err();

        assert!(err.to_string().contains("ETC_DIR must be an absolute path"));
    }
}
