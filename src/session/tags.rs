use git2::ErrorCode;
use log::debug;

use super::manager::Workspace;
use crate::error::{Error, Result};

impl Workspace {
    /// Create an annotated tag named `name` pointing at the current HEAD
    /// commit, with the configured identity as tagger.
    ///
    /// Returns the id of the tag object. With zero commits there is no HEAD
    /// to tag and the underlying unborn-branch error propagates unchanged.
    pub fn create_tag(&self, name: &str, message: &str) -> Result<String> {
        let tagger = self.signature()?;
        let commit = self.head_commit()?;

        let oid = self
            .repo
            .tag(name, commit.as_object(), &tagger, message, false)
            .map_err(|err| {
                if err.code() == ErrorCode::Exists {
                    Error::TagExists(name.to_string())
                } else {
                    Error::Git(err)
                }
            })?;

        debug!("created tag {name} at {}", commit.id());
        Ok(oid.to_string())
    }
}
