//! Implementation of `m64prs-stage clean`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::{self, msbuild, MakeStrategy, NativeTree};
use crate::core::{HostOs, Profile, BUILD_TARGETS};
use crate::util::context::GlobalContext;
use crate::util::fs::{relative_path, remove_dir_all_if_exists};
use crate::util::process::ProcessRunner;
use crate::util::shell::Status;

/// What a clean removed.
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Directories that existed and were deleted
    pub removed: Vec<PathBuf>,
}

/// Remove the cargo output and install tree for `profile`, and clean the
/// native subprojects.
///
/// Directories that do not exist are skipped.
pub fn clean(ctx: &GlobalContext, runner: &dyn ProcessRunner, profile: Profile) -> Result<CleanResult> {
    let mut result = CleanResult::default();
    let tree = NativeTree::new(ctx.native_dir(), ctx.native_target_dir(), ctx.host());

    match ctx.host() {
        HostOs::Windows => {
            for target in &BUILD_TARGETS {
                let out = msbuild::out_dir(&tree, target);
                if msbuild::clean_output(&tree, target)? {
                    ctx.shell()
                        .status(Status::Removed, relative_path(ctx.root(), &out).display());
                    result.removed.push(out);
                }
            }
        }
        HostOs::Darwin | HostOs::Unix | HostOs::Other => {
            ctx.shell().note("running `make clean` in native subprojects");
            builder::clean_all(&MakeStrategy::new(false), runner, &tree, &BUILD_TARGETS)?;
        }
    }

    for dir in [
        tree.target_dir.clone(),
        ctx.target_dir(profile),
        ctx.install_dir(profile),
    ] {
        remove(ctx, &dir, &mut result)?;
    }

    Ok(result)
}

fn remove(ctx: &GlobalContext, dir: &Path, result: &mut CleanResult) -> Result<()> {
    if remove_dir_all_if_exists(dir)? {
        ctx.shell()
            .status(Status::Removed, relative_path(ctx.root(), dir).display());
        result.removed.push(dir.to_path_buf());
    } else {
        tracing::debug!("nothing to remove at {}", dir.display());
    }
    Ok(())
}
