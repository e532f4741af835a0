//! Build profiles.

use std::fmt;

/// Debug or release build of the whole bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    /// Pick the profile from the `--release` flag, falling back to the
    /// build-profile hint (`PROFILE`) when the flag is absent.
    pub fn select(release: bool, hint: Option<&str>) -> Self {
        if release {
            return Profile::Release;
        }
        match hint.map(str::trim) {
            Some(h) if h.eq_ignore_ascii_case("release") => Profile::Release,
            Some(h) if !h.is_empty() && !h.eq_ignore_ascii_case("debug") => {
                tracing::warn!("ignoring unrecognized build profile hint `{}`", h);
                Profile::Debug
            }
            _ => Profile::Debug,
        }
    }

    pub fn is_release(self) -> bool {
        matches!(self, Profile::Release)
    }

    /// Directory name under `target/` and `install/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }

    /// MSBuild `Configuration` property value.
    pub fn msbuild_config(self) -> &'static str {
        match self {
            Profile::Debug => "Debug",
            Profile::Release => "Release",
        }
    }

    /// Build-variant flag understood by the mupen64plus Makefiles.
    pub fn make_flag(self) -> &'static str {
        match self {
            Profile::Debug => "DEBUG=1",
            Profile::Release => "DEBUG=0",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
