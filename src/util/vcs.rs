//! Git queries.

use std::path::Path;

use git2::Repository;

/// Whether `file_name` inside `dir` is ignored by the enclosing git repository.
///
/// Anything that prevents answering (no repository, a bare repository, a
/// path outside the work tree) counts as not ignored.
pub fn is_ignored(dir: &Path, file_name: &str) -> bool {
    let repo = match Repository::discover(dir) {
        Ok(repo) => repo,
        Err(e) => {
            tracing::debug!("no git repository at {}: {}", dir.display(), e);
            return false;
        }
    };
    let Some(workdir) = repo.workdir() else {
        return false;
    };

    let (Ok(workdir), Ok(dir)) = (workdir.canonicalize(), dir.canonicalize()) else {
        return false;
    };
    let Ok(rel) = dir.strip_prefix(&workdir) else {
        return false;
    };

    match repo.is_path_ignored(rel.join(file_name)) {
        Ok(ignored) => ignored,
        Err(e) => {
            tracing::debug!("git ignore check failed in {}: {}", dir.display(), e);
            false
        }
    }
}
