//! RustDB - interactive shell

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use rustdb::server::DEFAULT_SNAPSHOT_PATH;
use rustdb::shell::Shell;
use rustdb::Coordinator;

#[derive(Debug, Parser)]
#[clap(name = "rustdb-cli", about = "Interactive SQL shell for RustDB")]
struct Args {
    /// Snapshot file to load from and save to. The file is not locked: do
    /// not point a running server at the same file.
    #[clap(short, long, default_value = DEFAULT_SNAPSHOT_PATH)]
    data: PathBuf,
}

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
 RustDB - an in-memory relational database
 Type '.help' for help, 'exit' to save and quit
"#
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let coordinator = Coordinator::open(&args.data)
        .with_context(|| format!("failed to load {}", args.data.display()))?;

    print_banner();
    Shell::new(Arc::new(coordinator))
        .run()
        .context("shell error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args() {
        Args::command().debug_assert();

        let args = Args::parse_from(["rustdb-cli"]);
        assert_eq!(args.data, PathBuf::from(DEFAULT_SNAPSHOT_PATH));
    }

    #[test]
    fn test_data_help_warns_about_sharing() {
        let command = Args::command();
        let data = command
            .get_arguments()
            .find(|arg| arg.get_id() == "data")
            .unwrap();
        assert!(data.get_help().unwrap().contains("not locked"));
    }
}
