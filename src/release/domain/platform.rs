//! Closed set of supported mini-program platforms.

use super::UnknownPlatform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mini-program platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// `WeChat` mini-programs.
    Wechat,
    /// Alipay mini-programs.
    Alipay,
    /// Toutiao (`ByteDance`) mini-programs.
    Toutiao,
}

impl Platform {
    /// All platforms in resolution priority order.
    pub const ALL: [Self; 3] = [Self::Wechat, Self::Alipay, Self::Toutiao];

    /// Returns the token searched for in free-form platform types.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Wechat => "wechat",
            Self::Alipay => "alipay",
            Self::Toutiao => "toutiao",
        }
    }

    /// Resolves a free-form platform type by token containment.
    ///
    /// The first platform in [`Platform::ALL`] whose token occurs in the
    /// input wins, so `"wechat-alipay"` resolves to [`Platform::Wechat`].
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPlatform`] when no token occurs in the input.
    pub fn resolve(platform_type: &str) -> Result<Self, UnknownPlatform> {
        Self::ALL
            .into_iter()
            .find(|platform| platform_type.contains(platform.token()))
            .ok_or_else(|| UnknownPlatform(platform_type.to_owned()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
