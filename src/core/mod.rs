//! Core data types: hosts, artifacts, profiles, install schemes, and the
//! bundle description.

pub mod artifact;
pub mod bundle;
pub mod host;
pub mod profile;
pub mod scheme;

pub use artifact::ArtifactKind;
pub use bundle::{BuildTarget, BUILD_TARGETS};
pub use host::HostOs;
pub use profile::Profile;
pub use scheme::{InstallDirs, InstallRole, InstallScheme};
