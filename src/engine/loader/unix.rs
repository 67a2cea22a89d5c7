//! ### English
//! `dlopen`-based loader.
//!
//! ### 中文
//! 基于 `dlopen` 的加载器。

use std::ffi::{CStr, CString, c_void};

use crate::engine::error::{BridgeError, BridgeResult};

/// ### English
/// Handle to one shared library. Libraries are never unloaded: function pointers resolved from
/// them are copied into API tables that may outlive this handle.
///
/// ### 中文
/// 单个共享库句柄。库永不卸载：从中解析的函数指针会被复制进 API 表，生命周期可能长于该句柄。
pub struct DynamicLibrary {
    name: String,
    handle: *mut c_void,
}

unsafe impl Send for DynamicLibrary {}
unsafe impl Sync for DynamicLibrary {}

fn last_dl_error() -> String {
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        return "unknown dlopen error".to_string();
    }
    unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .into_owned()
}

impl DynamicLibrary {
    /// ### English
    /// Opens `name`, reusing the copy already mapped into the process when the host (Qt's EGL
    /// integration, for example) has loaded it, and falling back to a fresh `dlopen`.
    ///
    /// ### 中文
    /// 打开 `name`：若宿主（例如 Qt 的 EGL 集成）已将其加载进进程则复用该副本，否则重新 `dlopen`。
    pub fn open(name: &str) -> BridgeResult<Self> {
        let c_name = CString::new(name).map_err(|_| BridgeError::LibraryLoad {
            library: name.to_string(),
            reason: "library name contains NUL".to_string(),
        })?;

        let mut handle = unsafe { libc::dlopen(c_name.as_ptr(), libc::RTLD_NOW | libc::RTLD_NOLOAD) };
        if handle.is_null() {
            handle = unsafe { libc::dlopen(c_name.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
        }
        if handle.is_null() {
            return Err(BridgeError::LibraryLoad {
                library: name.to_string(),
                reason: last_dl_error(),
            });
        }

        log::debug!("loaded {name}");
        Ok(Self {
            name: name.to_string(),
            handle,
        })
    }

    /// ### English
    /// Library name as passed to [`DynamicLibrary::open`].
    ///
    /// ### 中文
    /// 传给 [`DynamicLibrary::open`] 的库名。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ### English
    /// Resolves `symbol` as a function pointer of type `T`.
    ///
    /// # Safety
    /// `T` must be a pointer-sized `extern "C"` function pointer type whose signature matches
    /// the C declaration of `symbol`.
    ///
    /// ### 中文
    /// 将 `symbol` 解析为类型 `T` 的函数指针。
    ///
    /// # Safety
    /// `T` 必须是指针大小的 `extern "C"` 函数指针类型，且签名与 `symbol` 的 C 声明一致。
    pub unsafe fn symbol<T: Copy>(&self, symbol: &'static CStr) -> BridgeResult<T> {
        debug_assert_eq!(size_of::<T>(), size_of::<*mut c_void>());
        let address = unsafe { libc::dlsym(self.handle, symbol.as_ptr()) };
        if address.is_null() {
            return Err(BridgeError::MissingSymbol(
                symbol.to_str().unwrap_or("<non-utf8 symbol>"),
            ));
        }
        Ok(unsafe { std::mem::transmute_copy(&address) })
    }
}
