use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "pginval.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Init,
    Split,
    Events,
    Plan,
    Apply,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Init(InitArgs),
    Split(RunArgs),
    Events(RunArgs),
    Plan(RunArgs),
    Apply(RunArgs),
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

/// Options shared by every command that reads SQL.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub config: PathBuf,
    pub project: Option<String>,
    pub schema: Option<String>,
    pub json: bool,
    /// `events` only: use the regex classifier instead of the parser.
    pub telemetry: bool,
    /// Paths or glob patterns; stdin when empty.
    pub files: Vec<String>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    let rest = it.map(|s| s.as_str());
    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "init" => parse_init(rest),
        "split" => parse_run(HelpTopic::Split, rest),
        "events" => parse_run(HelpTopic::Events, rest),
        "plan" => parse_run(HelpTopic::Plan, rest),
        "apply" => parse_run(HelpTopic::Apply, rest),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_init<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Init)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Init(InitArgs { config }))
}

fn parse_run<'a>(topic: HelpTopic, mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut project: Option<String> = None;
    let mut schema: Option<String> = None;
    let mut json = false;
    let mut telemetry = false;
    let mut files: Vec<String> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(topic)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--project" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--project requires a value");
                };
                project = Some(non_empty("--project", v)?);
            }
            _ if token.starts_with("--project=") => {
                project = Some(non_empty("--project", token.trim_start_matches("--project="))?);
            }
            "--schema" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--schema requires a value");
                };
                schema = Some(non_empty("--schema", v)?);
            }
            _ if token.starts_with("--schema=") => {
                schema = Some(non_empty("--schema", token.trim_start_matches("--schema="))?);
            }
            "--json" => json = true,
            "--telemetry" => telemetry = true,
            // Explicit stdin marker.
            "-" => {}
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => files.push(other.to_string()),
        }
    }

    if telemetry && topic != HelpTopic::Events {
        anyhow::bail!("--telemetry is only valid for `pginval events`");
    }
    if topic == HelpTopic::Split && (project.is_some() || schema.is_some()) {
        anyhow::bail!("invalid options for `split`: --project/--schema are not used");
    }

    let args = RunArgs {
        config,
        project,
        schema,
        json,
        telemetry,
        files,
    };

    Ok(match topic {
        HelpTopic::Split => Command::Split(args),
        HelpTopic::Events => Command::Events(args),
        HelpTopic::Plan => Command::Plan(args),
        HelpTopic::Apply => Command::Apply(args),
        HelpTopic::Root | HelpTopic::Init => anyhow::bail!("no run arguments for {topic:?}"),
    })
}

fn non_empty(flag: &str, v: &str) -> anyhow::Result<String> {
    let v = v.trim();
    if v.is_empty() {
        anyhow::bail!("{flag} must not be empty");
    }
    Ok(v.to_string())
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
pginval - dry-run granular cache invalidation for SQL scripts

USAGE:
  pginval <COMMAND> [OPTIONS] [FILES...]

COMMANDS:
  init          Write a pginval.toml template
  split         Split SQL into statements
  events        List entity events (or telemetry events with --telemetry)
  plan          Print the cache invalidation plan
  apply         Run the plan against a logging cache and report

Reads stdin when no files are given. FILES may be glob patterns.
Run `pginval <command> --help` for more."
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  pginval init [OPTIONS]

OPTIONS:
  --config <FILE>       Output config path (default: pginval.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Split => {
            println!(
                "\
USAGE:
  pginval split [OPTIONS] [FILES...]

NOTES:
  - Quoted identifiers, string literals and dollar-quoted bodies are never split.

OPTIONS:
  --config <FILE>       Config file path (default: pginval.toml)
  --json                Print JSON instead of a table
  -h, --help            Print help"
            );
        }
        HelpTopic::Events => {
            println!(
                "\
USAGE:
  pginval events [OPTIONS] [FILES...]

OPTIONS:
  --config <FILE>       Config file path (default: pginval.toml)
  --project <REF>       Project ref (overrides project_ref from config)
  --schema <NAME>       Default schema (default: from config or public)
  --telemetry           Use the regex classifier (no project ref needed)
  --json                Print JSON instead of a table
  -h, --help            Print help"
            );
        }
        HelpTopic::Plan => {
            println!(
                "\
USAGE:
  pginval plan [OPTIONS] [FILES...]

NOTES:
  - Exits non-zero if any input fails to parse.

OPTIONS:
  --config <FILE>       Config file path (default: pginval.toml)
  --project <REF>       Project ref (overrides project_ref from config)
  --schema <NAME>       Default schema (default: from config or public)
  --json                Print JSON instead of a table
  -h, --help            Print help"
            );
        }
        HelpTopic::Apply => {
            println!(
                "\
USAGE:
  pginval apply [OPTIONS] [FILES...]

NOTES:
  - Invalidations go to a logging cache; set RUST_LOG=pginval.cache=info to see them.

OPTIONS:
  --config <FILE>       Config file path (default: pginval.toml)
  --project <REF>       Project ref (overrides project_ref from config)
  --schema <NAME>       Default schema (default: from config or public)
  --json                Print JSON instead of a table
  -h, --help            Print help"
            );
        }
    }
}
