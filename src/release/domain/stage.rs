//! Discrete phases of a publish or preview run.

use std::fmt;

/// One phase of a run, recorded in the journal when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resource initialization and run preparation.
    Init,
    /// Fetching the project source into the working directory.
    Fetching,
    /// Installing dependencies and running the build command.
    Building,
    /// Uploading the build to the platform.
    Uploading,
    /// Generating the preview QR code.
    Previewing,
}

impl Stage {
    /// Returns the journal message recorded when the stage completes.
    #[must_use]
    pub const fn completion_message(self) -> &'static str {
        match self {
            Self::Init => "initialized process and resources",
            Self::Fetching => "fetched project source",
            Self::Building => "built project",
            Self::Uploading => "uploaded build",
            Self::Previewing => "generated preview QR code",
        }
    }

    /// Returns the journal message recorded when the stage fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Init => "run preparation failed",
            Self::Fetching => "fetching project source failed",
            Self::Building => "building project failed",
            Self::Uploading => "uploading build failed",
            Self::Previewing => "generating preview QR code failed",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetching => "fetching",
            Self::Building => "building",
            Self::Uploading => "uploading",
            Self::Previewing => "previewing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
