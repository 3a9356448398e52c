//! # git-courier
//!
//! A small convenience layer over libgit2 for driving a repository session:
//! point it at a URL, configure a committer identity and an authentication
//! method, then init, clone, or open a repository and run the usual worktree
//! and remote operations against it.
//!
//! ## Overview
//!
//! The session model is linear. A [`Session`] holds the target URL and the
//! configuration applied to it; exactly one of [`Session::init`],
//! [`Session::clone_into`], or [`Session::open`] consumes it and yields a
//! [`Workspace`], which owns the opened repository and exposes staging,
//! status, checkout, commit, tag, remote management, and push. Remote
//! references can also be listed straight from the URL, without a local
//! clone.
//!
//! Authentication is resolved from the URL scheme: `http`/`https` URLs take
//! basic-auth credentials, `ssh` URLs take a password or private key.
//! Unknown schemes and secret kinds are rejected outright rather than
//! silently proceeding unauthenticated, and SSH host-key verification is on
//! unless explicitly disabled.
//!
//! All object storage, pack transfer, and protocol work is libgit2's; this
//! crate adds no retries, no timeouts, and no background work. Every call
//! blocks until the engine returns and every engine failure surfaces to the
//! caller, classified into [`Error`] where the cause is distinguishable.

/// Platform-agnostic configuration directory management for the CLI.
///
/// Locates and manages the config file and log file following platform
/// conventions (XDG on Linux, Application Support on macOS, AppData on
/// Windows).
pub mod config;

/// Error taxonomy for session operations.
///
/// Distinguishable underlying causes get their own variant; everything else
/// passes through as the raw libgit2 error. Nothing is retried or recovered
/// locally.
pub mod error;

/// Logging configuration and utilities.
///
/// Console logging via `RUST_LOG` plus a persistent operation log in the
/// config directory. Installed by the CLI; the library itself only talks to
/// the `log` facade.
pub mod logger;

/// Repository session operations.
///
/// The [`Session`]/[`Workspace`] façade over libgit2: lifecycle
/// (init/clone/open), staging and status, checkout by commit id, commit and
/// annotated tag creation, remote management, push, and remote ref listing
/// with authentication per URL scheme.
pub mod session;

pub use error::{Error, Result};
pub use session::{
    AuthMethod, FileState, Identity, RemoteRef, SecretKind, Session, StatusEntry, Workspace,
};
