use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{ErrorCode, Oid, Status, StatusOptions};
use log::debug;
use serde::Serialize;

use super::manager::Workspace;
use crate::error::{Error, Result};

/// Change state of a single path relative to the index and the last commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Added,
    Modified,
    Deleted,
    Untracked,
}

impl FileState {
    fn from_status(status: Status) -> Option<FileState> {
        if status.contains(Status::INDEX_NEW) {
            Some(FileState::Added)
        } else if status.contains(Status::WT_NEW) {
            Some(FileState::Untracked)
        } else if status.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
            Some(FileState::Deleted)
        } else if status.intersects(
            Status::INDEX_MODIFIED
                | Status::WT_MODIFIED
                | Status::INDEX_TYPECHANGE
                | Status::WT_TYPECHANGE
                | Status::INDEX_RENAMED
                | Status::WT_RENAMED,
        ) {
            Some(FileState::Modified)
        } else {
            None
        }
    }
}

/// One entry of [`Workspace::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub path: String,
    pub state: FileState,
}

impl Workspace {
    /// Stage `path` (relative to the repository root) for the next commit.
    pub fn stage_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut index = self.repo.index()?;

        index.add_path(path).map_err(|err| {
            if err.code() == ErrorCode::NotFound || err.class() == git2::ErrorClass::Os {
                Error::PathNotFound(path.display().to_string())
            } else {
                Error::Git(err)
            }
        })?;
        index.write()?;

        debug!("staged {}", path.display());
        Ok(())
    }

    /// Remove `path` from the index, leaving the working tree untouched.
    ///
    /// A path with no index entry is reported as [`Error::PathNotFound`];
    /// index storage failures pass through unchanged.
    pub fn unstage_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut index = self.repo.index()?;

        if index.get_path(path, 0).is_none() {
            return Err(Error::PathNotFound(path.display().to_string()));
        }

        index.remove_path(path)?;
        index.write()?;

        debug!("unstaged {}", path.display());
        Ok(())
    }

    /// Report every path that differs between the working tree, the index,
    /// and HEAD. Untracked files are included; ignored files are not.
    pub fn status(&self) -> Result<Vec<StatusEntry>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let mut entries = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let Some(state) = FileState::from_status(entry.status()) else {
                continue;
            };
            entries.push(StatusEntry {
                path: path.to_string(),
                state,
            });
        }

        Ok(entries)
    }

    /// Move the working tree to the commit named by `revision` (an exact hex
    /// object id, not a symbolic ref) and detach HEAD there.
    pub fn checkout(&self, revision: &str) -> Result<()> {
        let oid = Oid::from_str(revision)
            .map_err(|_| Error::RevisionNotFound(revision.to_string()))?;

        let commit = self.repo.find_commit(oid).map_err(|err| {
            if err.code() == ErrorCode::NotFound {
                Error::RevisionNotFound(revision.to_string())
            } else {
                Error::Git(err)
            }
        })?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))?;
        self.repo.set_head_detached(oid)?;

        debug!("checked out {revision} (detached)");
        Ok(())
    }

    /// Commit the staged index on the current branch with the configured
    /// identity and the current timestamp.
    ///
    /// Returns the id of the new commit. Fails with
    /// [`Error::IdentityNotConfigured`] when no identity was set and with
    /// [`Error::NothingToCommit`] when the index matches the last commit.
    pub fn commit(&self, message: &str) -> Result<String> {
        let signature = self.signature()?;

        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(err)
                if err.code() == ErrorCode::UnbornBranch
                    || err.code() == ErrorCode::NotFound =>
            {
                None
            }
            Err(err) => return Err(Error::Git(err)),
        };

        // An index tree identical to HEAD's, or an empty index on an unborn
        // branch, means nothing is staged.
        match &parent {
            Some(commit) if commit.tree_id() == tree_oid => return Err(Error::NothingToCommit),
            None if index.len() == 0 => return Err(Error::NothingToCommit),
            _ => {}
        }

        let tree = self.repo.find_tree(tree_oid)?;
        let parents: Vec<_> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        debug!("created commit {oid}");
        Ok(oid.to_string())
    }
}
