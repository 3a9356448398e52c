use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use git_courier::config::CourierConfig;
use git_courier::{logger, FileState, SecretKind, Session, StatusEntry, Workspace};

#[derive(Parser)]
#[command(name = "git-courier")]
#[command(about = "Simple git sessions: init, clone, commit, tag, and push", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the session configuration (URL, identity, host-key policy)
    Setup {
        /// Remote repository URL
        #[arg(long)]
        url: String,

        /// Committer name
        #[arg(long)]
        name: String,

        /// Committer email
        #[arg(long)]
        email: String,

        /// Accept any SSH host key (verification is on by default)
        #[arg(long)]
        allow_unknown_hosts: bool,
    },

    /// Create a new repository
    Init {
        /// Repository root
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Clone the configured URL
    Clone {
        /// Destination directory
        dest: PathBuf,

        /// Username for remote authentication (secret read from GIT_COURIER_SECRET)
        #[arg(long)]
        username: Option<String>,

        /// Secret kind: password or pubkey
        #[arg(long, default_value = "password")]
        secret_kind: String,
    },

    /// Show working tree status
    Status {
        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Print machine-readable JSON instead of the colored listing
        #[arg(long)]
        json: bool,
    },

    /// Stage a path for the next commit
    Add {
        /// Path relative to the repository root
        path: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Remove a path from the index (the working tree is untouched)
    Rm {
        /// Path relative to the repository root
        path: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Move the working tree to an exact commit id, detaching HEAD
    Checkout {
        /// Full hex commit id
        revision: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Commit the staged index
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Create an annotated tag at HEAD
    Tag {
        /// Tag name
        name: String,

        /// Tag message
        #[arg(short, long)]
        message: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Manage named remotes (each maps to the configured URL)
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },

    /// Push the current branch or a tag to a named remote
    Push {
        /// Remote name (defaults to the configured default remote)
        #[arg(long)]
        remote: Option<String>,

        /// Push refs/tags/<tag> instead of the current branch
        #[arg(long)]
        tag: Option<String>,

        /// Permit non-fast-forward updates
        #[arg(long)]
        force: bool,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Username for remote authentication (secret read from GIT_COURIER_SECRET)
        #[arg(long)]
        username: Option<String>,

        /// Secret kind: password or pubkey
        #[arg(long, default_value = "password")]
        secret_kind: String,
    },

    /// List the references advertised at the configured URL
    LsRemote {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Username for remote authentication (secret read from GIT_COURIER_SECRET)
        #[arg(long)]
        username: Option<String>,

        /// Secret kind: password or pubkey
        #[arg(long, default_value = "password")]
        secret_kind: String,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    /// Register the configured URL under a remote name
    Add {
        name: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Delete a named remote
    Rm {
        name: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

/// Build a session from the stored configuration, attaching credentials when
/// a username was given. The secret itself is only ever read from
/// GIT_COURIER_SECRET so it stays out of argv.
fn configured_session(
    config: &CourierConfig,
    username: Option<&String>,
    secret_kind: &str,
) -> Result<Session> {
    let mut session = Session::new(config.url.clone());
    session.set_identity(&config.name, &config.email);
    session.set_verify_host_keys(config.verify_host_keys);

    if let Some(username) = username {
        let secret = std::env::var("GIT_COURIER_SECRET").context(
            "GIT_COURIER_SECRET must carry the password or key material when --username is set",
        )?;
        let kind: SecretKind = secret_kind.parse()?;
        session.set_auth(username, kind, &secret)?;
    }

    Ok(session)
}

fn open_workspace(repo: &Path) -> Result<Workspace> {
    let config = CourierConfig::load()?;
    let session = configured_session(&config, None, "password")?;
    Ok(session.open(repo)?)
}

fn print_status(entries: &[StatusEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "working tree clean".green());
        return Ok(());
    }

    for entry in entries {
        let line = match entry.state {
            FileState::Added => format!("A  {}", entry.path).green(),
            FileState::Modified => format!("M  {}", entry.path).yellow(),
            FileState::Deleted => format!("D  {}", entry.path).red(),
            FileState::Untracked => format!("?  {}", entry.path).cyan(),
        };
        println!("{line}");
    }

    Ok(())
}

fn main() -> Result<()> {
    logger::init_logger();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup {
            url,
            name,
            email,
            allow_unknown_hosts,
        } => {
            let config = CourierConfig {
                url,
                name,
                email,
                default_remote: "origin".to_string(),
                verify_host_keys: !allow_unknown_hosts,
            };
            config.save()?;
            println!("Configuration written for {}", config.url.bold());
            if allow_unknown_hosts {
                eprintln!(
                    "{}",
                    "warning: SSH host-key verification is disabled".yellow()
                );
            }
        }

        Commands::Init { path } => {
            let config = CourierConfig::load()?;
            let session = configured_session(&config, None, "password")?;
            let workspace = session.init(&path)?;
            println!("Initialized repository at {}", workspace.path().display());
        }

        Commands::Clone {
            dest,
            username,
            secret_kind,
        } => {
            let config = CourierConfig::load()?;
            let session = configured_session(&config, username.as_ref(), &secret_kind)?;
            let workspace = session.clone_into(&dest)?;
            logger::log_to_file(&format!(
                "cloned {} into {}",
                config.url,
                workspace.path().display()
            ))?;
            println!(
                "Cloned {} into {}",
                config.url.bold(),
                workspace.path().display()
            );
        }

        Commands::Status { repo, json } => {
            let workspace = open_workspace(&repo)?;
            let entries = workspace.status()?;
            print_status(&entries, json)?;
        }

        Commands::Add { path, repo } => {
            let workspace = open_workspace(&repo)?;
            workspace.stage_path(&path)?;
            println!("Staged {path}");
        }

        Commands::Rm { path, repo } => {
            let workspace = open_workspace(&repo)?;
            workspace.unstage_path(&path)?;
            println!("Unstaged {path}");
        }

        Commands::Checkout { revision, repo } => {
            let workspace = open_workspace(&repo)?;
            workspace.checkout(&revision)?;
            println!("HEAD detached at {revision}");
        }

        Commands::Commit { message, repo } => {
            let workspace = open_workspace(&repo)?;
            let oid = workspace.commit(&message)?;
            println!("Created commit {}", oid.bold());
        }

        Commands::Tag {
            name,
            message,
            repo,
        } => {
            let workspace = open_workspace(&repo)?;
            workspace.create_tag(&name, &message)?;
            println!("Created tag {}", name.bold());
        }

        Commands::Remote { command } => match command {
            RemoteCommands::Add { name, repo } => {
                let workspace = open_workspace(&repo)?;
                workspace.add_remote(&name)?;
                println!("Added remote {} -> {}", name.bold(), workspace.url());
            }
            RemoteCommands::Rm { name, repo } => {
                let workspace = open_workspace(&repo)?;
                workspace.remove_remote(&name)?;
                println!("Removed remote {}", name.bold());
            }
        },

        Commands::Push {
            remote,
            tag,
            force,
            repo,
            username,
            secret_kind,
        } => {
            let config = CourierConfig::load()?;
            let session = configured_session(&config, username.as_ref(), &secret_kind)?;
            let workspace = session.open(&repo)?;

            let remote = remote.unwrap_or_else(|| config.default_remote.clone());
            workspace.push(&remote, tag.as_deref(), force)?;
            logger::log_to_file(&format!("pushed to {remote}"))?;

            match tag {
                Some(tag) => println!("Pushed tag {} to {}", tag.bold(), remote),
                None => println!("Pushed to {}", remote.bold()),
            }
        }

        Commands::LsRemote {
            json,
            username,
            secret_kind,
        } => {
            let config = CourierConfig::load()?;
            let session = configured_session(&config, username.as_ref(), &secret_kind)?;
            let refs = session.list_remote_refs()?;
            logger::log_to_file(&format!("listed {} refs at {}", refs.len(), config.url))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&refs)?);
            } else {
                for r in &refs {
                    match &r.symref_target {
                        Some(target) => println!("{}\t{} -> {}", r.target, r.name, target),
                        None => println!("{}\t{}", r.target, r.name),
                    }
                }
            }
        }
    }

    Ok(())
}
