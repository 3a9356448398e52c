use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{FetchOptions, Repository, RepositoryInitOptions};
use log::{debug, info};

use super::credentials::{self, AuthMethod, SecretKind};
use crate::error::{Error, Result};

/// Committer and tagger identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// An unopened repository session: a target URL plus the authentication,
/// identity, and host-key configuration to apply to it.
///
/// A session becomes a [`Workspace`] through exactly one of [`Session::init`],
/// [`Session::clone_into`], or [`Session::open`]. Each consumes the session,
/// so a second lifecycle call on the same configuration does not compile; the
/// configuration travels into the workspace.
pub struct Session {
    pub(super) url: String,
    pub(super) auth: AuthMethod,
    pub(super) identity: Option<Identity>,
    pub(super) verify_host_keys: bool,
}

/// An opened repository together with the session configuration that produced
/// it. All worktree, commit, tag, and remote operations live here.
///
/// The repository handle is exclusively owned; sharing a workspace across
/// threads must be serialized externally.
pub struct Workspace {
    pub(super) repo: Repository,
    pub(super) url: String,
    pub(super) auth: AuthMethod,
    pub(super) identity: Option<Identity>,
    pub(super) verify_host_keys: bool,
}

impl Session {
    /// Create a session for `url` with no credentials and no identity.
    pub fn new(url: impl Into<String>) -> Self {
        Session {
            url: url.into(),
            auth: AuthMethod::None,
            identity: None,
            verify_host_keys: true,
        }
    }

    /// Target URL of this session.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the identity used for subsequent commits and tags.
    pub fn set_identity(&mut self, name: impl Into<String>, email: impl Into<String>) {
        self.identity = Some(Identity {
            name: name.into(),
            email: email.into(),
        });
    }

    /// Resolve credentials for the session URL.
    ///
    /// See [`AuthMethod::resolve`] for the scheme/kind mapping. Fails with
    /// [`Error::InvalidUrl`] when the URL does not parse, with
    /// [`Error::InvalidKey`] on malformed key material, and with
    /// [`Error::UnsupportedScheme`]/[`Error::UnsupportedSecretKind`] instead
    /// of silently proceeding unauthenticated.
    pub fn set_auth(&mut self, username: &str, kind: SecretKind, secret: &str) -> Result<()> {
        self.auth = AuthMethod::resolve(&self.url, username, kind, secret)?;
        Ok(())
    }

    /// Control SSH host-key verification. Verification is on by default;
    /// turning it off accepts any host key and leaves the transfer open to
    /// interception, so it must be an explicit caller decision.
    pub fn set_verify_host_keys(&mut self, verify: bool) {
        self.verify_host_keys = verify;
    }

    /// Create a new repository rooted at `root`.
    pub fn init(self, root: impl AsRef<Path>) -> Result<Workspace> {
        let root = root.as_ref();

        let mut opts = RepositoryInitOptions::new();
        opts.no_reinit(true);

        debug!("initializing repository at {}", root.display());
        let repo = Repository::init_opts(root, &opts).map_err(|err| {
            if err.code() == git2::ErrorCode::Exists {
                Error::AlreadyExists(root.to_path_buf())
            } else {
                Error::Git(err)
            }
        })?;

        Ok(self.into_workspace(repo))
    }

    /// Clone the full history at the session URL into `dest`.
    ///
    /// The destination is mandatory and is created by the clone. Network and
    /// credential failures classify as [`Error::AuthRequired`],
    /// [`Error::RemoteUnreachable`], or [`Error::InvalidRemote`].
    pub fn clone_into(self, dest: impl AsRef<Path>) -> Result<Workspace> {
        let dest = dest.as_ref();

        info!("cloning {} into {}", self.url, dest.display());
        let repo = {
            let mut fetch_options = FetchOptions::new();
            fetch_options.remote_callbacks(credentials::remote_callbacks(
                &self.auth,
                self.verify_host_keys,
            ));

            let mut builder = RepoBuilder::new();
            builder.fetch_options(fetch_options);
            builder
                .clone(&self.url, dest)
                .map_err(|err| Error::from_clone(&self.url, err))?
        };

        Ok(self.into_workspace(repo))
    }

    /// Open the existing repository rooted at `root`.
    pub fn open(self, root: impl AsRef<Path>) -> Result<Workspace> {
        let root = root.as_ref();

        let repo = Repository::open(root).map_err(|err| {
            if err.code() == git2::ErrorCode::NotFound {
                Error::NotARepository(root.to_path_buf())
            } else {
                Error::Git(err)
            }
        })?;

        debug!("opened repository at {}", root.display());
        Ok(self.into_workspace(repo))
    }

    fn into_workspace(self, repo: Repository) -> Workspace {
        Workspace {
            repo,
            url: self.url,
            auth: self.auth,
            identity: self.identity,
            verify_host_keys: self.verify_host_keys,
        }
    }
}

impl Workspace {
    /// Working directory of the opened repository (the `.git` directory for a
    /// bare one).
    pub fn path(&self) -> PathBuf {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
            .to_path_buf()
    }

    /// URL the originating session was configured with.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(super) fn signature(&self) -> Result<git2::Signature<'static>> {
        let identity = self.identity.as_ref().ok_or(Error::IdentityNotConfigured)?;
        Ok(git2::Signature::now(&identity.name, &identity.email)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_new_repository() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Session::new("https://example.com/repo.git")
            .init(temp_dir.path())
            .unwrap();

        assert!(workspace.path().exists());
        let git_dir = temp_dir.path().join(".git");
        assert!(git_dir.exists());
        assert!(git_dir.is_dir());
    }

    #[test]
    fn test_init_fails_when_repository_present() {
        let temp_dir = TempDir::new().unwrap();
        Session::new("https://example.com/repo.git")
            .init(temp_dir.path())
            .unwrap();

        let result = Session::new("https://example.com/repo.git").init(temp_dir.path());
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn test_open_existing_repository() {
        let temp_dir = TempDir::new().unwrap();
        Session::new("https://example.com/repo.git")
            .init(temp_dir.path())
            .unwrap();

        let workspace = Session::new("https://example.com/repo.git")
            .open(temp_dir.path())
            .unwrap();
        assert_eq!(workspace.path(), temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_open_non_repository_fails() {
        let temp_dir = TempDir::new().unwrap();

        let result = Session::new("https://example.com/repo.git").open(temp_dir.path());
        assert!(matches!(result, Err(Error::NotARepository(_))));
    }

    #[test]
    fn test_open_nonexistent_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = Session::new("https://example.com/repo.git").open(&missing);
        assert!(matches!(result, Err(Error::NotARepository(_))));
    }

    #[test]
    fn test_identity_travels_into_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new("https://example.com/repo.git");
        session.set_identity("Test User", "test@example.com");

        let workspace = session.init(temp_dir.path()).unwrap();
        let signature = workspace.signature().unwrap();
        assert_eq!(signature.name(), Some("Test User"));
        assert_eq!(signature.email(), Some("test@example.com"));
    }

    #[test]
    fn test_signature_without_identity_fails() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Session::new("https://example.com/repo.git")
            .init(temp_dir.path())
            .unwrap();

        assert!(matches!(
            workspace.signature(),
            Err(Error::IdentityNotConfigured)
        ));
    }

    #[test]
    fn test_host_key_verification_defaults_on() {
        let session = Session::new("ssh://git@example.com/repo.git");
        assert!(session.verify_host_keys);
    }
}
