mod apply;
mod cli;
mod config;
mod events;
mod init;
mod input;
mod output;
mod plan;
mod split;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Init(args) => init::run(args),
        cli::Command::Split(args) => split::run(args),
        cli::Command::Events(args) => events::run(args),
        cli::Command::Plan(args) => plan::run(args),
        cli::Command::Apply(args) => apply::run(args).await,
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();
}
