mod commands;
mod error;
mod exec;
mod gcloud;
mod kubectl;
mod models;
mod session;
pub mod utils;

use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::logs::LogOptions;
use gcloud::Gcloud;
use kubectl::Kubectl;
use models::{LogLevel, PodRef};
use session::Session;

#[derive(Parser)]
#[command(
    name = "gcpeasy",
    author,
    version,
    about = "A CLI tool to make GCP and Kubernetes workflows easy",
    long_about = "gcpeasy streamlines working with Google Cloud Platform and Kubernetes by wrapping \
                  common gcloud and kubectl workflows: switching projects, picking clusters, \
                  and getting into running pods."
)]
struct Cli {
    /// gcloud binary to invoke
    #[arg(long, global = true, value_name = "PATH", default_value = "gcloud")]
    gcloud: String,
    /// kubectl binary to invoke
    #[arg(long, global = true, value_name = "PATH", default_value = "kubectl")]
    kubectl: String,
    /// Log external commands to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Google Cloud (opens a browser)
    Login,
    /// Revoke the active Google Cloud credentials
    Logout,
    /// Environment (GCP project) management
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// GKE cluster management
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
    /// List application pods with status
    Pods,
    /// Pod management
    Pod {
        #[command(subcommand)]
        command: PodCommands,
    },
    /// View pod logs (shortcut for 'pod logs')
    Logs(LogArgs),
    /// Open a shell on a selected pod (shortcut for 'pod shell')
    Shell(TargetArgs),
    /// Rails application commands
    Rails {
        #[command(subcommand)]
        command: RailsCommands,
    },
}

#[derive(Subcommand)]
enum EnvCommands {
    /// List available environments
    List {
        /// Include connectivity status (slower)
        #[arg(long)]
        status: bool,
    },
    /// Switch environment by number, project ID or name; prompts when omitted
    Select {
        #[arg(value_name = "PROJECT_ID|NUMBER")]
        identifier: Option<String>,
    },
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// List clusters in the current project
    List,
    /// Switch cluster by number or name; prompts when omitted
    Select {
        #[arg(value_name = "CLUSTER_NAME|NUMBER")]
        identifier: Option<String>,
    },
}

#[derive(Subcommand)]
enum PodCommands {
    /// List application pods
    List {
        /// Show detailed status information
        #[arg(short, long)]
        status: bool,
    },
    /// View pod logs
    Logs(LogArgs),
    /// Open a shell on a selected pod; tries bash, zsh, then sh
    Shell(TargetArgs),
}

#[derive(Subcommand)]
enum RailsCommands {
    /// Open a Rails console on a selected pod
    #[command(visible_alias = "c")]
    Console(TargetArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Act on this pod instead of choosing from a menu
    #[arg(short, long, value_name = "NAMESPACE/NAME")]
    pod: Option<PodRef>,
}

#[derive(Args)]
struct LogArgs {
    /// Follow logs in real-time
    #[arg(short, long)]
    follow: bool,
    /// Show only error logs
    #[arg(short, long)]
    error: bool,
    /// Show only warning logs
    #[arg(short, long)]
    warn: bool,
    /// Show only info logs
    #[arg(short, long)]
    info: bool,
    /// Show only debug logs
    #[arg(short, long)]
    debug: bool,
    /// View logs for all application pods
    #[arg(short, long, conflicts_with = "pod")]
    all: bool,
    #[command(flatten)]
    target: TargetArgs,
}

impl LogArgs {
    fn options(&self) -> LogOptions {
        LogOptions {
            follow: self.follow,
            level: LogLevel::from_flags(self.error, self.warn, self.info, self.debug),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Prints a command failure and carries on: only auth failures change the exit code.
fn report(action: &str, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => {}
        Err(e) if error::is_cancelled(&e) => println!("Cancelled."),
        Err(e) => println!("Error {}: {:#}", action, e),
    }
    ExitCode::SUCCESS
}

fn fatal(action: &str, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error during {}: {:#}", action, e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session::new(Gcloud::new(cli.gcloud), Kubectl::new(cli.kubectl));

    match cli.command {
        Commands::Login => fatal("login", commands::auth::login(&session.gcloud).await),
        Commands::Logout => fatal("logout", commands::auth::logout(&session.gcloud).await),
        Commands::Env { command } => match command {
            EnvCommands::List { status } => report(
                "listing environments",
                commands::env::list(&session, status).await,
            ),
            EnvCommands::Select { identifier } => report(
                "selecting environment",
                commands::env::select(&session, identifier).await,
            ),
        },
        Commands::Cluster { command } => match command {
            ClusterCommands::List => {
                report("listing clusters", commands::cluster::list(&session).await)
            }
            ClusterCommands::Select { identifier } => report(
                "selecting cluster",
                commands::cluster::select(&session, identifier).await,
            ),
        },
        Commands::Pods => report("listing pods", commands::pod::list(&session, true).await),
        Commands::Pod { command } => match command {
            PodCommands::List { status } => {
                report("listing pods", commands::pod::list(&session, status).await)
            }
            PodCommands::Logs(args) => report(
                "viewing logs",
                commands::logs::run(&session, args.options(), args.all, args.target.pod).await,
            ),
            PodCommands::Shell(target) => report(
                "accessing shell",
                commands::shell::run(&session, target.pod).await,
            ),
        },
        Commands::Logs(args) => report(
            "viewing logs",
            commands::logs::run(&session, args.options(), args.all, args.target.pod).await,
        ),
        Commands::Shell(target) => report(
            "accessing shell",
            commands::shell::run(&session, target.pod).await,
        ),
        Commands::Rails { command } => match command {
            RailsCommands::Console(target) => report(
                "accessing Rails console",
                commands::rails::console(&session, target.pod).await,
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_flags_map_to_options() {
        let cli = Cli::try_parse_from(["gcpeasy", "pod", "logs", "-f", "-w", "-d", "-a"]).unwrap();
        let Commands::Pod {
            command: PodCommands::Logs(args),
        } = cli.command
        else {
            panic!("expected pod logs");
        };
        let options = args.options();
        assert!(options.follow);
        assert!(args.all);
        assert_eq!(options.level, Some(LogLevel::Warn));
    }

    #[test]
    fn rails_console_has_short_alias() {
        let cli = Cli::try_parse_from(["gcpeasy", "rails", "c"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Rails {
                command: RailsCommands::Console(TargetArgs { pod: None })
            }
        ));
    }

    #[test]
    fn pod_target_is_parsed() {
        let cli = Cli::try_parse_from(["gcpeasy", "shell", "--pod", "payments/api-1"]).unwrap();
        let Commands::Shell(target) = cli.command else {
            panic!("expected shell");
        };
        assert_eq!(target.pod.unwrap().to_string(), "payments/api-1");

        assert!(Cli::try_parse_from(["gcpeasy", "shell", "--pod", "api-1"]).is_err());
        assert!(Cli::try_parse_from(["gcpeasy", "logs", "-a", "-p", "default/web-1"]).is_err());
    }

    #[test]
    fn tool_paths_and_verbosity_are_global() {
        let cli = Cli::try_parse_from([
            "gcpeasy",
            "env",
            "select",
            "2",
            "--gcloud",
            "/opt/sdk/bin/gcloud",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.gcloud, "/opt/sdk/bin/gcloud");
        assert_eq!(cli.kubectl, "kubectl");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Env {
                command: EnvCommands::Select { identifier: Some(ref id) }
            } if id == "2"
        ));
    }

    #[test]
    fn select_takes_at_most_one_identifier() {
        assert!(Cli::try_parse_from(["gcpeasy", "cluster", "select", "a", "b"]).is_err());
    }
}
