use std::cell::RefCell;

use git2::{Direction, ErrorCode, PushOptions, Remote};
use log::{debug, info};
use serde::Serialize;

use super::credentials;
use super::manager::{Session, Workspace};
use crate::error::{Error, Result};

/// One reference advertised by a remote.
///
/// Produced per [`Session::list_remote_refs`] call from a detached in-memory
/// remote; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRef {
    /// Full ref name, e.g. `refs/heads/main` or `HEAD`.
    pub name: String,
    /// Hex id of the object the ref points at.
    pub target: String,
    /// Symbolic target, when the server advertises one (typically for
    /// `HEAD`).
    pub symref_target: Option<String>,
}

impl Session {
    /// List the references advertised at the session URL without a local
    /// clone.
    pub fn list_remote_refs(&self) -> Result<Vec<RemoteRef>> {
        let mut remote = Remote::create_detached(self.url.as_str())?;

        debug!("listing references advertised at {}", self.url);
        let callbacks = credentials::remote_callbacks(&self.auth, self.verify_host_keys);
        let connection = remote
            .connect_auth(Direction::Fetch, Some(callbacks), None)
            .map_err(|err| Error::from_listing(&self.url, err))?;

        let refs = connection
            .list()?
            .iter()
            .map(|head| RemoteRef {
                name: head.name().to_string(),
                target: head.oid().to_string(),
                symref_target: head.symref_target().map(str::to_string),
            })
            .collect();

        Ok(refs)
    }
}

impl Workspace {
    /// Register the session URL as the remote named `name`.
    pub fn add_remote(&self, name: &str) -> Result<()> {
        self.repo.remote(name, &self.url).map_err(|err| {
            if err.code() == ErrorCode::Exists {
                Error::RemoteExists(name.to_string())
            } else {
                Error::Git(err)
            }
        })?;

        debug!("added remote {name} -> {}", self.url);
        Ok(())
    }

    /// Delete the remote named `name`.
    ///
    /// An absent remote reports [`Error::RemoteNotFound`]; storage failures
    /// pass through unchanged.
    pub fn remove_remote(&self, name: &str) -> Result<()> {
        self.repo.remote_delete(name).map_err(|err| {
            if err.code() == ErrorCode::NotFound {
                Error::RemoteNotFound(name.to_string())
            } else {
                Error::Git(err)
            }
        })
    }

    /// Whether a remote named `name` is configured.
    pub fn has_remote(&self, name: &str) -> bool {
        self.repo.find_remote(name).is_ok()
    }

    /// Push to the remote named `remote_name`.
    ///
    /// Pushes the current branch, or `refs/tags/<tag>` on both sides when
    /// `tag` is given. `force` permits non-fast-forward updates; without it a
    /// diverged remote rejects the push with [`Error::NonFastForward`].
    pub fn push(&self, remote_name: &str, tag: Option<&str>, force: bool) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|err| {
            if err.code() == ErrorCode::NotFound {
                Error::RemoteNotFound(remote_name.to_string())
            } else {
                Error::Git(err)
            }
        })?;

        let target = match tag {
            Some(tag) => format!("refs/tags/{tag}:refs/tags/{tag}"),
            None => {
                let branch = self.current_branch()?;
                format!("refs/heads/{branch}:refs/heads/{branch}")
            }
        };
        let refspec = if force { format!("+{target}") } else { target };

        // Smart transports report per-ref rejections through the
        // update-reference callback rather than the push call itself.
        let rejected: RefCell<Option<(String, String)>> = RefCell::new(None);

        let mut callbacks = credentials::remote_callbacks(&self.auth, self.verify_host_keys);
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                *rejected.borrow_mut() = Some((refname.to_string(), message.to_string()));
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        info!("pushing {refspec} to {remote_name}");
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|err| Error::from_push(remote_name, err))?;

        let rejection = rejected.borrow_mut().take();
        if let Some((refname, message)) = rejection {
            if message.contains("fast-forward") {
                return Err(Error::NonFastForward(refname));
            }
            return Err(Error::Git(git2::Error::from_str(&format!(
                "push of '{refname}' rejected: {message}"
            ))));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::fs;
    use tempfile::TempDir;

    fn committed_workspace(temp_dir: &TempDir, url: &str) -> Workspace {
        let mut session = Session::new(url);
        session.set_identity("Test User", "test@example.com");
        let ws = session.init(temp_dir.path()).unwrap();

        fs::write(temp_dir.path().join("a.txt"), "one").unwrap();
        ws.stage_path("a.txt").unwrap();
        ws.commit("first").unwrap();
        ws
    }

    #[test]
    fn test_add_remote_registers_session_url() {
        let temp_dir = TempDir::new().unwrap();
        let ws = committed_workspace(&temp_dir, "https://example.com/repo.git");

        ws.add_remote("origin").unwrap();
        assert!(ws.has_remote("origin"));
    }

    #[test]
    fn test_add_remote_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let ws = committed_workspace(&temp_dir, "https://example.com/repo.git");

        ws.add_remote("origin").unwrap();
        let result = ws.add_remote("origin");
        assert!(matches!(result, Err(Error::RemoteExists(_))));
    }

    #[test]
    fn test_remove_remote() {
        let temp_dir = TempDir::new().unwrap();
        let ws = committed_workspace(&temp_dir, "https://example.com/repo.git");

        ws.add_remote("origin").unwrap();
        ws.remove_remote("origin").unwrap();
        assert!(!ws.has_remote("origin"));
    }

    #[test]
    fn test_remove_missing_remote_fails() {
        let temp_dir = TempDir::new().unwrap();
        let ws = committed_workspace(&temp_dir, "https://example.com/repo.git");

        let result = ws.remove_remote("origin");
        assert!(matches!(result, Err(Error::RemoteNotFound(_))));
    }

    #[test]
    fn test_push_to_unknown_remote_fails() {
        let temp_dir = TempDir::new().unwrap();
        let ws = committed_workspace(&temp_dir, "https://example.com/repo.git");

        let result = ws.push("origin", None, false);
        assert!(matches!(result, Err(Error::RemoteNotFound(_))));
    }

    #[test]
    fn test_push_branch_to_local_bare_remote() {
        let remote_dir = TempDir::new().unwrap();
        git2::Repository::init_bare(remote_dir.path()).unwrap();

        let work_dir = TempDir::new().unwrap();
        let url = remote_dir.path().to_str().unwrap().to_string();
        let ws = committed_workspace(&work_dir, &url);

        ws.add_remote("origin").unwrap();
        ws.push("origin", None, false).unwrap();

        let bare = git2::Repository::open_bare(remote_dir.path()).unwrap();
        let branch = format!("refs/heads/{}", ws.current_branch().unwrap());
        let pushed = bare.find_reference(&branch).unwrap();
        assert_eq!(
            pushed.target().unwrap().to_string(),
            ws.head_commit_id().unwrap()
        );
    }

    #[test]
    fn test_push_tag_to_local_bare_remote() {
        let remote_dir = TempDir::new().unwrap();
        git2::Repository::init_bare(remote_dir.path()).unwrap();

        let work_dir = TempDir::new().unwrap();
        let url = remote_dir.path().to_str().unwrap().to_string();
        let ws = committed_workspace(&work_dir, &url);

        ws.create_tag("v0.1.0", "first release").unwrap();
        ws.add_remote("origin").unwrap();
        ws.push("origin", Some("v0.1.0"), false).unwrap();

        let bare = git2::Repository::open_bare(remote_dir.path()).unwrap();
        assert!(bare.find_reference("refs/tags/v0.1.0").is_ok());
    }

    #[test]
    fn test_list_remote_refs_of_local_repository() {
        let src_dir = TempDir::new().unwrap();
        let src = committed_workspace(&src_dir, "https://example.com/unused.git");
        let head = src.head_commit_id().unwrap();

        let session = Session::new(src_dir.path().to_str().unwrap());
        let refs = session.list_remote_refs().unwrap();

        let advertised_head = refs.iter().find(|r| r.name == "HEAD").unwrap();
        assert_eq!(advertised_head.target, head);
    }
}
