//! CLI argument parsing for tack.
//!
//! Uses clap derive macros for declarative argument definitions.
//! Implementations live in the `commands` module.

use clap::{Parser, Subcommand, ValueEnum};

/// Tack: hands backlog tasks to autonomous agents, one task per agent.
///
/// State lives in a `.tack/` directory:
/// - task files under `tasks/` (markdown with YAML frontmatter)
/// - live assignments in `state/assignments.json`
/// - an audit trail in `events/events.ndjson`
#[derive(Parser, Debug)]
#[command(name = "tack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a tack workspace in the current directory.
    ///
    /// Creates `.tack/` with a default config and empty task directory.
    /// Safe to run again on an existing workspace.
    Init,

    /// Assign the next task to an agent.
    ///
    /// Prints the agent's current assignment if it already holds one.
    ///
    /// Each command holds the workspace's coordinator lock while it runs and
    /// does not wait for it. A concurrent `assign` from another process fails
    /// at once with exit code 4; retry after a short delay.
    Assign(AssignArgs),

    /// Report the outcome of an agent's task and release it.
    Report(ReportArgs),

    /// Show agents, live assignments, and backlog counts.
    Status,

    /// Show how the free tasks rank for an agent, without assigning.
    Rank(RankArgs),

    /// Coordinator lock management.
    Lock(LockCommand),
}

#[derive(Parser, Debug)]
pub struct AssignArgs {
    /// Agent id as declared in config.yaml.
    pub agent: String,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// How an agent finished with its task.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeArg {
    Completed,
    Blocked,
    Released,
}

#[derive(Parser, Debug)]
pub struct ReportArgs {
    pub agent: String,

    pub task: String,

    #[arg(long, value_enum)]
    pub outcome: OutcomeArg,

    /// Why the task is blocked. Required with `--outcome blocked`.
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RankArgs {
    pub agent: String,

    /// Print the ranking as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show who holds the coordinator lock.
    Show,

    /// Remove a stale coordinator lock.
    ///
    /// Requires --force, since clearing a live lock lets two coordinators
    /// hand out the same task.
    Clear(LockClearArgs),
}

#[derive(Parser, Debug)]
pub struct LockClearArgs {
    #[arg(long)]
    pub force: bool,
}
