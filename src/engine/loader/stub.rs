//! ### English
//! Non-Unix placeholder for the dynamic loader. WPE only ships for Unix-like systems.
//!
//! ### 中文
//! 非 Unix 平台的动态加载器占位实现。WPE 仅在类 Unix 系统上提供。

use std::ffi::CStr;

use crate::engine::error::{BridgeError, BridgeResult};

/// ### English
/// Placeholder library handle; never constructed.
///
/// ### 中文
/// 占位库句柄；永远不会被构造。
pub struct DynamicLibrary {
    name: String,
}

impl DynamicLibrary {
    /// ### English
    /// Always returns an error on non-Unix builds.
    ///
    /// ### 中文
    /// 非 Unix 构建下总是返回错误。
    pub fn open(name: &str) -> BridgeResult<Self> {
        Err(BridgeError::LibraryLoad {
            library: name.to_string(),
            reason: "dynamic loading is only implemented for Unix targets".to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// ### English
    /// Always returns an error on non-Unix builds.
    ///
    /// # Safety
    /// Trivially safe; kept `unsafe` to match the Unix signature.
    ///
    /// ### 中文
    /// 非 Unix 构建下总是返回错误。
    ///
    /// # Safety
    /// 实际上是安全的；保留 `unsafe` 以与 Unix 签名一致。
    pub unsafe fn symbol<T: Copy>(&self, symbol: &'static CStr) -> BridgeResult<T> {
        Err(BridgeError::MissingSymbol(
            symbol.to_str().unwrap_or("<non-utf8 symbol>"),
        ))
    }
}
