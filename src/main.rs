use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use git_restyle::tools::Tools;
use git_restyle::{Config, Workflow, WorkflowMode};

/// Check and fix code style on the lines a commit range touched.
///
/// Needs uncrustify installed.
#[derive(Parser)]
#[command(name = "git-restyle", version, about)]
struct Cli {
    /// SHA of the commit to compare HEAD with (defaults to HEAD^)
    #[arg(long, value_name = "SHA")]
    sha: Option<String>,

    /// Only print changes to stdout, do not change code
    #[arg(short = 'd', long, overrides_with = "no_dry_run")]
    dry_run: bool,
    #[arg(long, hide = true)]
    no_dry_run: bool,

    /// Amend the applied changes to the last commit as a squash commit
    /// (e.g. 'git rebase --exec "git-restyle -r"')
    #[arg(short = 'r', long, overrides_with = "no_rewrite")]
    rewrite: bool,
    #[arg(long, hide = true)]
    no_rewrite: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config {
        base_revision: cli.sha.unwrap_or_else(|| "HEAD^".to_string()),
        mode: if cli.dry_run {
            WorkflowMode::Preview
        } else {
            WorkflowMode::Apply
        },
        rewrite: cli.rewrite,
        ..Config::default()
    };

    let root = Path::new(".");
    let tools = Tools::system(root);
    match Workflow::new(&config, root, tools.as_refs()).run() {
        Ok(report) => ExitCode::from(report.exit_code(config.mode)),
        Err(err) => {
            eprintln!("git-restyle: {err}");
            ExitCode::from(1)
        }
    }
}
