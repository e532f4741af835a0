//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod git_setup;
pub mod run;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;

use m64prs_stage::util::shell::Shell;
use m64prs_stage::util::{GlobalContext, SystemRunner};

/// State shared by every command: global flags plus the interrupt flag.
pub struct Session {
    pub root: Option<PathBuf>,
    pub shell: Arc<Shell>,
    pub interrupted: Arc<AtomicBool>,
}

impl Session {
    /// Open the checkout named by `--root`, or search upward from the cwd.
    pub fn context(&self) -> Result<GlobalContext> {
        match &self.root {
            Some(root) => GlobalContext::new(root.clone(), Arc::clone(&self.shell)),
            None => GlobalContext::discover(Arc::clone(&self.shell)),
        }
    }

    pub fn runner(&self) -> SystemRunner {
        SystemRunner::with_interrupt_flag(Arc::clone(&self.interrupted))
    }
}
