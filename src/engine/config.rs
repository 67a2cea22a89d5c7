//! ### English
//! Shared-library names used by the dynamic loader.
//!
//! Each name can be overridden through an environment variable so that distributions shipping
//! unversioned or relocated libraries do not need a rebuild.
//!
//! ### 中文
//! 动态加载器使用的共享库名称。
//!
//! 每个名称都可以通过环境变量覆盖，发行版使用无版本号或重定位的库时无需重新编译。

use std::env;

pub const EGL_LIBRARY_ENV: &str = "WPE_VIEW_BRIDGE_EGL_LIBRARY";
pub const WPE_LIBRARY_ENV: &str = "WPE_VIEW_BRIDGE_WPE_LIBRARY";
pub const FDO_LIBRARY_ENV: &str = "WPE_VIEW_BRIDGE_FDO_LIBRARY";

const DEFAULT_EGL_LIBRARY: &str = "libEGL.so.1";
const DEFAULT_WPE_LIBRARY: &str = "libwpe-1.0.so.1";
const DEFAULT_FDO_LIBRARY: &str = "libWPEBackend-fdo-1.0.so.1";

/// ### English
/// Sonames of the three libraries the backend talks to.
///
/// `fdo` is also handed to `wpe_loader_init` so libwpe picks the same backend implementation.
///
/// ### 中文
/// 后端依赖的三个库的 soname。
///
/// `fdo` 同时传给 `wpe_loader_init`，使 libwpe 选用同一个后端实现。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryNames {
    pub egl: String,
    pub wpe: String,
    pub fdo: String,
}

impl Default for LibraryNames {
    fn default() -> Self {
        Self {
            egl: DEFAULT_EGL_LIBRARY.to_string(),
            wpe: DEFAULT_WPE_LIBRARY.to_string(),
            fdo: DEFAULT_FDO_LIBRARY.to_string(),
        }
    }
}

impl LibraryNames {
    /// ### English
    /// Defaults, with any non-empty `WPE_VIEW_BRIDGE_*_LIBRARY` variable taking precedence.
    ///
    /// ### 中文
    /// 默认值；若设置了非空的 `WPE_VIEW_BRIDGE_*_LIBRARY` 环境变量则优先使用。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, fallback: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            egl: pick(EGL_LIBRARY_ENV, defaults.egl),
            wpe: pick(WPE_LIBRARY_ENV, defaults.wpe),
            fdo: pick(FDO_LIBRARY_ENV, defaults.fdo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_the_named_library() {
        let names = LibraryNames::from_lookup(|key| {
            (key == FDO_LIBRARY_ENV).then(|| "/opt/wpe/libWPEBackend-fdo-1.0.so".to_string())
        });
        assert_eq!(names.fdo, "/opt/wpe/libWPEBackend-fdo-1.0.so");
        assert_eq!(names.egl, DEFAULT_EGL_LIBRARY);
        assert_eq!(names.wpe, DEFAULT_WPE_LIBRARY);
    }

    #[test]
    fn blank_override_falls_back_to_default() {
        let names = LibraryNames::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(names, LibraryNames::default());
    }
}
