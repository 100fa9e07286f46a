//! Shared output formatting for tasklog CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "tasklog.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

/// JSON envelope shared by success and error output
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "no_items")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "no_items")]
    next_steps: &'a [String],
}

fn no_items(items: &&[String]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// Print a command result. `--json` wins over `--quiet`; warnings are
/// still shown on stderr when quiet.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: &HumanOutput,
) -> Result<()> {
    if options.json {
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings: &human.warnings,
            next_steps: &human.next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if options.quiet {
        for warning in &human.warnings {
            eprintln!("warning: {warning}");
        }
    } else {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let payload: Envelope<'_, ()> = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: err.kind(),
                details: err.details(),
            }),
            warnings: &[],
            next_steps: &next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    for hint in &next_steps {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Header, then `Summary`, `Details`, `Warnings` and `Next steps`
/// sections; empty sections are left out.
pub fn format_human(output: &HumanOutput) -> String {
    let mut text = output.header.clone();

    if !output.summary.is_empty() {
        text.push_str("\n\nSummary:");
        for (key, value) in &output.summary {
            if value.is_empty() {
                text.push_str(&format!("\n- {key}"));
            } else {
                text.push_str(&format!("\n- {key}: {value}"));
            }
        }
    }

    let sections = [
        ("Details", &output.details),
        ("Warnings", &output.warnings),
        ("Next steps", &output.next_steps),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        text.push_str(&format!("\n\n{title}:"));
        for item in items {
            text.push_str(&format!("\n- {item}"));
        }
    }

    text
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Command name (with subcommand for `report`) from raw arguments
pub fn infer_command_name<I>(args: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut command = None;
    let mut skip_value = false;

    for arg in args.by_ref() {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg == "--data-dir" {
            skip_value = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "tasklog".to_string(),
    };

    if command == "report" {
        if let Some(sub) = args.find(|arg| !arg.starts_with('-')) {
            return format!("{command} {sub}");
        }
    }

    command
}

/// Suggested follow-ups, one message category per error kind
fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::Validation(_) => vec!["check the arguments and retry".to_string()],
        Error::InvalidTransition { .. } => {
            vec!["tasklog list --status active".to_string()]
        }
        Error::NotFound(_) => vec!["tasklog list".to_string()],
        Error::InvalidConfig(_) => vec!["fix tasklog.toml then retry".to_string()],
        Error::StorageCorrupt { path, .. } => vec![
            format!(
                "inspect {} by hand; a previous copy may exist at {}.bak",
                path.display(),
                path.display()
            ),
            "nothing was changed; tasklog will not repair the file automatically".to_string(),
        ],
        Error::StorageWrite { path, .. } => vec![format!(
            "check free space and permissions for {}, then retry (or choose another --data-dir / --output)",
            path.display()
        )],
        _ => Vec::new(),
    }
}
