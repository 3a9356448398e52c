use git2::ErrorCode;

use super::manager::Workspace;
use crate::error::{Error, Result};

impl Workspace {
    /// Short name of the branch HEAD points at.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if !head.is_branch() {
            return Err(Error::Git(git2::Error::from_str(
                "HEAD is detached and names no branch",
            )));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| Error::Git(git2::Error::from_str("branch name is not valid UTF-8")))
    }

    /// Full hex id of the commit HEAD points at.
    pub fn head_commit_id(&self) -> Result<String> {
        let head = self.repo.head()?;
        let commit = head.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    pub(super) fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head()?;
        Ok(head.peel_to_commit()?)
    }

    /// Whether HEAD currently points at a born branch or commit.
    pub fn has_head(&self) -> bool {
        match self.repo.head() {
            Ok(_) => true,
            Err(err) => {
                err.code() != ErrorCode::UnbornBranch && err.code() != ErrorCode::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::fs;
    use tempfile::TempDir;

    fn workspace(temp_dir: &TempDir) -> Workspace {
        let mut session = Session::new("https://example.com/repo.git");
        session.set_identity("Test User", "test@example.com");
        session.init(temp_dir.path()).unwrap()
    }

    #[test]
    fn test_current_branch_after_first_commit() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        fs::write(temp_dir.path().join("a.txt"), "one").unwrap();
        ws.stage_path("a.txt").unwrap();
        ws.commit("first").unwrap();

        let branch = ws.current_branch().unwrap();
        assert!(branch == "master" || branch == "main");
    }

    #[test]
    fn test_current_branch_fails_on_empty_repo() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        assert!(ws.current_branch().is_err());
        assert!(!ws.has_head());
    }

    #[test]
    fn test_head_commit_id_is_full_hex() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        fs::write(temp_dir.path().join("a.txt"), "one").unwrap();
        ws.stage_path("a.txt").unwrap();
        ws.commit("first").unwrap();

        let id = ws.head_commit_id().unwrap();
        assert_eq!(id.len(), 40);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(ws.has_head());
    }

    #[test]
    fn test_current_branch_fails_when_detached() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);

        fs::write(temp_dir.path().join("a.txt"), "one").unwrap();
        ws.stage_path("a.txt").unwrap();
        let first = ws.commit("first").unwrap();

        ws.checkout(&first).unwrap();
        assert!(ws.current_branch().is_err());
    }
}
