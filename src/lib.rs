/// ### English
/// `wpe_view_bridge` cdylib crate root.
/// Exposes the C ABI via `ffi` for the Qt Quick item shim; core implementation lives under
/// `engine`.
///
/// ### 中文
/// `wpe_view_bridge` 的 cdylib crate 根。
/// 通过 `ffi` 为 Qt Quick item 垫片导出 C ABI；核心实现位于 `engine` 模块。
pub mod engine;
mod ffi;
