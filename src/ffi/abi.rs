#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn wpe_view_bridge_abi_version() -> u32 {
    super::WPE_VIEW_BRIDGE_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Installs the `env_logger` backend for the `log` facade (filter from `RUST_LOG`).
///
/// Safe to call more than once; later calls and calls after another logger was installed do
/// nothing.
///
/// ### 中文
/// 为 `log` 门面安装 `env_logger` 后端（过滤规则取自 `RUST_LOG`）。
///
/// 可重复调用；后续调用或已安装其它 logger 时不做任何事。
pub extern "C" fn wpe_view_bridge_init_logging() {
    if env_logger::try_init().is_ok() {
        log::debug!("wpe_view_bridge logging initialized");
    }
}
