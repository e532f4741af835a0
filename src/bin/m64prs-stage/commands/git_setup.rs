//! `m64prs-stage git-setup` command
//!
//! Kept so existing scripts that call it keep working. It does nothing.

use anyhow::Result;

pub fn execute() -> Result<()> {
    tracing::info!("git-setup has nothing to do");
    Ok(())
}
