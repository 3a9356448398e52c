use std::path::PathBuf;

use git2::{ErrorClass, ErrorCode};
use thiserror::Error;

/// Convenience alias used throughout the session API.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the session façade.
///
/// Every variant corresponds to a distinct underlying cause; anything libgit2
/// reports that has no dedicated variant passes through [`Error::Git`]
/// unchanged. The façade performs no retries or local recovery.
#[derive(Debug, Error)]
pub enum Error {
    /// The session URL could not be parsed.
    #[error("invalid repository URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The session URL carries a scheme no authentication method exists for.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    /// The secret kind is unknown, or does not apply to the URL scheme.
    #[error("unsupported secret kind '{0}'")]
    UnsupportedSecretKind(String),

    /// The supplied private key material could not be decoded.
    #[error("invalid private key material: {0}")]
    InvalidKey(russh_keys::Error),

    /// A repository is already present at the init path.
    #[error("a repository already exists at {0}")]
    AlreadyExists(PathBuf),

    /// The open path does not contain a repository.
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    /// The remote demanded credentials the session does not have.
    #[error("authentication required by '{0}'")]
    AuthRequired(String),

    /// The remote rejected the session's credentials.
    #[error("authentication failed for '{0}'")]
    AuthFailed(String),

    /// The remote could not be reached at all.
    #[error("remote '{0}' is unreachable")]
    RemoteUnreachable(String, #[source] git2::Error),

    /// The remote answered but does not serve a repository.
    #[error("invalid remote '{0}'")]
    InvalidRemote(String, #[source] git2::Error),

    /// A remote with this name is already configured.
    #[error("remote '{0}' already exists")]
    RemoteExists(String),

    /// No remote with this name is configured.
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// The revision is malformed or names no commit in the object database.
    #[error("revision '{0}' not found")]
    RevisionNotFound(String),

    /// The path is absent from the worktree (staging) or the index
    /// (unstaging).
    #[error("path '{0}' not found")]
    PathNotFound(String),

    /// The staged index is identical to the last commit.
    #[error("nothing to commit")]
    NothingToCommit,

    /// A commit or tag was requested before an identity was configured.
    #[error("committer identity not configured")]
    IdentityNotConfigured,

    /// An annotated tag with this name already exists.
    #[error("tag '{0}' already exists")]
    TagExists(String),

    /// The remote rejected a non-fast-forward update and force was off.
    #[error("push rejected: non-fast-forward update of '{0}'")]
    NonFastForward(String),

    /// Passthrough for everything the taxonomy does not name.
    #[error(transparent)]
    Git(#[from] git2::Error),
}

impl Error {
    /// Classify a clone failure against `url`.
    ///
    /// Missing credentials surface as [`Error::AuthRequired`]; a dead host as
    /// [`Error::RemoteUnreachable`]; an HTTP endpoint that answers but serves
    /// no repository as [`Error::InvalidRemote`].
    pub(crate) fn from_clone(url: &str, err: git2::Error) -> Error {
        match (err.class(), err.code()) {
            (_, ErrorCode::Auth) => Error::AuthRequired(url.to_string()),
            (ErrorClass::Net, _) => Error::RemoteUnreachable(url.to_string(), err),
            (ErrorClass::Ssh, _) => Error::RemoteUnreachable(url.to_string(), err),
            (ErrorClass::Http, _) => Error::InvalidRemote(url.to_string(), err),
            _ => Error::Git(err),
        }
    }

    /// Classify a failure while connecting to or listing `url` directly.
    pub(crate) fn from_listing(url: &str, err: git2::Error) -> Error {
        match (err.class(), err.code()) {
            (_, ErrorCode::Auth) => Error::AuthFailed(url.to_string()),
            (ErrorClass::Ssh, _) | (ErrorClass::Net, _) | (ErrorClass::Http, _) => {
                Error::RemoteUnreachable(url.to_string(), err)
            }
            _ => Error::Git(err),
        }
    }

    /// Classify a push failure against the remote named `remote_name`.
    pub(crate) fn from_push(remote_name: &str, err: git2::Error) -> Error {
        match (err.class(), err.code()) {
            (_, ErrorCode::NotFastForward) => Error::NonFastForward(remote_name.to_string()),
            (_, ErrorCode::Auth) => Error::AuthFailed(remote_name.to_string()),
            (ErrorClass::Net, _) | (ErrorClass::Ssh, _) | (ErrorClass::Http, _) => {
                Error::RemoteUnreachable(remote_name.to_string(), err)
            }
            _ => Error::Git(err),
        }
    }
}
