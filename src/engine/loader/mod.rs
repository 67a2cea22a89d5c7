//! ### English
//! Minimal dynamic library loader (`dlopen`/`dlsym` on Unix).
//! EGL, libwpe and WPEBackend-fdo are all resolved at runtime, so the crate links against none
//! of them and a missing library surfaces as a construction error instead of a load failure.
//!
//! ### 中文
//! 最小化的动态库加载器（Unix 上使用 `dlopen`/`dlsym`）。
//! EGL、libwpe 与 WPEBackend-fdo 均在运行时解析，crate 本身不链接任何一个；
//! 缺失的库会表现为构造错误，而不是进程加载失败。
#[cfg(unix)]
mod unix;

#[cfg(not(unix))]
mod stub;

#[cfg(unix)]
pub use unix::DynamicLibrary;

#[cfg(not(unix))]
pub use stub::DynamicLibrary;
