use clap::{Parser, Subcommand, ValueEnum};
use teachertask_core::config::ConfigOverrides;
use teachertask_core::model::Importance;

#[derive(Parser, Debug)]
#[command(name = "teachertask", author, version, about = "Turn a brain dump into today's task list", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn free text into tasks for today
    ///
    /// Example: teachertask add grade exams call parents at 3 high priority
    /// Example: teachertask add show history
    Add {
        #[arg(num_args = 1..)]
        text: Vec<String>,
    },
    /// Add a single task without extraction
    ///
    /// Example: teachertask new "Print worksheets" --time 07:30 --importance high
    New {
        description: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, value_enum)]
        importance: Option<ImportanceArg>,
    },
    /// Show today's tasks, priority first
    ///
    /// Example: teachertask list
    List,
    /// Mark a task as completed, or reopen a completed one
    ///
    /// Example: teachertask done task-1a2b3c4d
    #[command(visible_alias = "done")]
    Toggle { id: String },
    /// Change a task's description, time or importance
    ///
    /// Example: teachertask edit task-1a2b3c4d --time 14:00 --importance low
    Edit {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, value_enum)]
        importance: Option<ImportanceArg>,
    },
    /// Delete a task
    ///
    /// Example: teachertask delete task-1a2b3c4d
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: teachertask show task-1a2b3c4d
    Show { id: String },
    /// Remove all of today's tasks
    ///
    /// Example: teachertask clear --yes
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show every archived day
    ///
    /// Example: teachertask history
    History,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportanceArg {
    High,
    Medium,
    Low,
}

impl From<ImportanceArg> for Importance {
    fn from(value: ImportanceArg) -> Self {
        match value {
            ImportanceArg::High => Importance::High,
            ImportanceArg::Medium => Importance::Medium,
            ImportanceArg::Low => Importance::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Model,
    Endpoint,
    FeedbackMs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;
    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "model" => ConfigOverrideTarget::Model,
        "endpoint" => ConfigOverrideTarget::Endpoint,
        "feedback_ms" => ConfigOverrideTarget::FeedbackMs,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `--config-override` flag into one set of overrides; later
/// flags win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Model => overrides.model = Some(parsed.value),
            ConfigOverrideTarget::Endpoint => overrides.endpoint = Some(parsed.value),
            ConfigOverrideTarget::FeedbackMs => {
                let millis = parsed
                    .value
                    .parse::<u64>()
                    .map_err(|_| format!("feedback_ms must be a number, got '{}'", parsed.value))?;
                overrides.feedback_ms = Some(millis);
            }
        }
    }

    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
