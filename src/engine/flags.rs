//! ### English
//! Bitflags controlling optional view behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask.
//!
//! ### 中文
//! 控制 view 可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。

/// ### English
/// Do not announce `visible | focused | in_window` to the web engine when the backend is built.
///
/// Useful for hosts that drive activity state themselves (e.g. off-screen thumbnails).
///
/// ### 中文
/// 构造后端时不向 web 引擎声明 `visible | focused | in_window` 活动状态。
///
/// 适用于自行管理活动状态的宿主（例如离屏缩略图）。
pub const WPE_VIEW_BRIDGE_VIEW_FLAG_NO_ACTIVITY_STATE: u32 = 1 << 0;

/// ### English
/// Translate input coordinates with a scale of `1.0`.
///
/// Set this when the host already delivers pointer/touch positions in device pixels.
///
/// ### 中文
/// 输入坐标按 `1.0` 缩放转换。
///
/// 当宿主传入的指针/触摸坐标已经是设备像素时设置此标志。
pub const WPE_VIEW_BRIDGE_VIEW_FLAG_IGNORE_SCALE_FOR_INPUT: u32 = 1 << 1;

#[inline]
pub(crate) fn has_flag(flags: u32, flag: u32) -> bool {
    flags & flag != 0
}
