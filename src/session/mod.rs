//! Repository session operations.
//!
//! Provides the two-phase session façade over libgit2: a [`Session`] carries a
//! target URL with authentication and identity configuration, and turns into a
//! [`Workspace`] through exactly one of init, clone, or open. The workspace
//! exposes the worktree, commit, tag, and remote operations. Authentication
//! covers HTTP basic auth, SSH passwords, and SSH private keys, with host-key
//! verification on by default.

mod branches;
mod credentials;
mod manager;
mod operations;
mod remote;
mod tags;

pub use credentials::{AuthMethod, SecretKind};
pub use manager::{Identity, Session, Workspace};
pub use operations::{FileState, StatusEntry};
pub use remote::RemoteRef;
