//! hydra-supervisor - command assembly and process supervision for
//! THC-Hydra runs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hydra_supervisor::command;
use hydra_supervisor::config::{self, AttackConfig, ProxyConfig, ProxyKind, TargetMode};
use hydra_supervisor::display;
use hydra_supervisor::report;
use hydra_supervisor::supervisor::{AttackEvent, AttackSupervisor};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProxyTypeArg {
    Http,
    Socks4,
    Socks5,
}

impl From<ProxyTypeArg> for ProxyKind {
    fn from(arg: ProxyTypeArg) -> Self {
        match arg {
            ProxyTypeArg::Http => ProxyKind::Http,
            ProxyTypeArg::Socks4 => ProxyKind::Socks4,
            ProxyTypeArg::Socks5 => ProxyKind::Socks5,
        }
    }
}

/// Attack parameters shared by `run` and `preview`.
#[derive(Args, Debug)]
struct AttackArgs {
    /// Target host or domain; a list file with --target-list.
    target: String,

    /// Protocol identifier (see the `protocols` subcommand).
    protocol: String,

    /// Username list file.
    #[arg(short = 'L', long)]
    user_list: String,

    /// Password list file.
    #[arg(short = 'P', long)]
    pass_list: String,

    /// Treat TARGET as a file listing one target per line.
    #[arg(long)]
    target_list: bool,

    /// Parallel tasks (1-64).
    #[arg(short = 't', long, default_value = "16")]
    tasks: String,

    /// Form spec for form-based protocols,
    /// e.g. "/login:user=^USER^&pass=^PASS^:F=failed".
    #[arg(long)]
    form: Option<String>,

    /// Proxy host.
    #[arg(long)]
    proxy_host: Option<String>,

    /// Proxy port.
    #[arg(long)]
    proxy_port: Option<String>,

    /// Proxy flavor.
    #[arg(long, value_enum, default_value_t = ProxyTypeArg::Http)]
    proxy_type: ProxyTypeArg,

    /// Proxy username (requires --proxy-pass to take effect).
    #[arg(long)]
    proxy_user: Option<String>,

    /// Proxy password.
    #[arg(long)]
    proxy_pass: Option<String>,

    /// Extra hydra arguments; shell-tokenized, never shell-interpreted.
    #[arg(long)]
    extra: Option<String>,
}

impl AttackArgs {
    fn into_config(self) -> AttackConfig {
        let proxy = match (&self.proxy_host, &self.proxy_port) {
            (None, None) => None,
            (host, port) => Some(ProxyConfig {
                kind: self.proxy_type.into(),
                host: host.clone().unwrap_or_default(),
                port: port.clone().unwrap_or_default(),
                user: self.proxy_user,
                pass: self.proxy_pass,
            }),
        };
        AttackConfig {
            target_mode: if self.target_list {
                TargetMode::ListFile
            } else {
                TargetMode::Single
            },
            target: self.target,
            user_list: self.user_list,
            pass_list: self.pass_list,
            protocol: self.protocol,
            tasks: self.tasks,
            http_form: self.form,
            proxy,
            extra_args: self.extra,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "hydra-supervisor",
    about = "Command assembly and process supervision for THC-Hydra runs",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch an attack run and stream its output.
    Run {
        #[command(flatten)]
        attack: AttackArgs,
        /// Directory the findings report is written into.
        #[arg(long, default_value = ".")]
        report_dir: PathBuf,
        /// Skip writing the findings report.
        #[arg(long)]
        no_report: bool,
    },
    /// Print the command that would be launched, without running anything.
    Preview {
        #[command(flatten)]
        attack: AttackArgs,
    },
    /// List the supported protocol identifiers.
    Protocols,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            attack,
            report_dir,
            no_report,
        } => {
            let config = attack.into_config();
            if let Err(errors) = config::validate(&config) {
                for error in &errors {
                    display::print_error(&error.to_string());
                }
                std::process::exit(2);
            }
            run_attack(&config, &report_dir, no_report).await;
        }
        Commands::Preview { attack } => {
            let command = command::build(&attack.into_config());
            for warning in &command.warnings {
                display::print_warning(&warning.to_string());
            }
            println!("$ {}", command.preview);
        }
        Commands::Protocols => {
            for proto in command::protocol::names() {
                let description = command::protocol::description(proto).unwrap_or("");
                println!("{proto:<16} {description}");
            }
        }
    }
}

async fn run_attack(config: &AttackConfig, report_dir: &std::path::Path, no_report: bool) {
    let command = command::build(config);
    for warning in &command.warnings {
        display::print_warning(&warning.to_string());
    }
    display::print_launch(&command.preview);

    let supervisor = AttackSupervisor::new();
    let mut events = match supervisor.start(command) {
        Ok(events) => events,
        Err(err) => {
            display::print_error(&err.to_string());
            std::process::exit(1);
        }
    };

    // Ctrl-C maps to an operator stop; the run then winds down through the
    // normal Finished path.
    let stopped = Arc::new(AtomicBool::new(false));
    {
        let supervisor = supervisor.clone();
        let stopped = Arc::clone(&stopped);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stopped.store(true, Ordering::SeqCst);
                supervisor.stop();
            }
        });
    }

    let mut found = 0usize;
    while let Some(event) = events.recv().await {
        match event {
            AttackEvent::OutputLine(line) => display::print_output_line(&line),
            AttackEvent::AttemptCount(count) => {
                tracing::debug!(attempts = count, "attempt count updated");
            }
            AttackEvent::CredentialFound(line) => {
                found += 1;
                display::print_credential(&line);
            }
            AttackEvent::Stats(snapshot) => display::print_stats(&snapshot),
            AttackEvent::Finished => break,
        }
    }

    display::print_finished(found, stopped.load(Ordering::SeqCst));

    if found > 0 && !no_report {
        if let Some(findings) = supervisor.last_findings() {
            match report::write_report(report_dir, &findings.preview, &findings.credentials) {
                Ok(path) => display::print_report_saved(&path),
                Err(err) => display::print_error(&format!("failed to save results: {err}")),
            }
        }
    }
}
