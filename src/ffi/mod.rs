//! ### English
//! C ABI surface for `wpe_view_bridge`, consumed by the C++ Qt Quick item shim.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! Strings passed in must be NUL-terminated UTF-8 (C string); invalid UTF-8 is treated as
//! absent. Every function is a no-op (or returns a neutral value) on a NULL view.
//!
//! Threading: every `wpe_view_bridge_view_*` call must come from the thread that owns the
//! item (the scene graph render thread for `update_paint_node`, the GUI thread otherwise, with
//! the host's usual GUI/render synchronization in between). Only the repaint callback may be
//! invoked from another thread.
//!
//! ### 中文
//! `wpe_view_bridge` 的 C ABI 接口层，由 C++ Qt Quick item 垫片调用。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 传入的字符串必须是以 NUL 结尾的 UTF-8（C 字符串）；非法 UTF-8 视为未提供。
//! view 为 NULL 时所有函数均为空操作（或返回中性值）。
//!
//! 线程：所有 `wpe_view_bridge_view_*` 调用都必须来自持有该 item 的线程
//! （`update_paint_node` 在场景图渲染线程，其余在 GUI 线程，二者之间由宿主按常规方式同步）。
//! 只有重绘回调可能在其它线程被调用。
mod abi;
mod events;
mod file_chooser;
mod input;
mod view;

use std::ffi::{CStr, CString, c_char, c_void};

use crate::engine::frame::RepaintRequest;
use crate::engine::item::{PaintNode, SceneItem};

/// ### English
/// C ABI version for `wpe_view_bridge`.
///
/// ### 中文
/// `wpe_view_bridge` 的 C ABI 版本号。
const WPE_VIEW_BRIDGE_ABI_VERSION: u32 = 1;

/// ### English
/// Repaint hook: the shim calls `QQuickItem::update()` (queued to the GUI thread) from it.
///
/// ### 中文
/// 重绘钩子：垫片在其中调用 `QQuickItem::update()`（排队到 GUI 线程）。
pub type WpeViewBridgeRepaintCallback = unsafe extern "C" fn(user_data: *mut c_void);

struct CallbackRepaint {
    callback: WpeViewBridgeRepaintCallback,
    user_data: *mut c_void,
}

// The shim guarantees `user_data` outlives the view and that the callback is thread-safe.
unsafe impl Send for CallbackRepaint {}
unsafe impl Sync for CallbackRepaint {}

impl RepaintRequest for CallbackRepaint {
    fn request_repaint(&self) {
        unsafe { (self.callback)(self.user_data) }
    }
}

/// ### English
/// Opaque view handle owning one scene item.
///
/// ### 中文
/// 不透明 view 句柄，持有一个场景 item。
pub struct WpeViewBridgeView {
    item: SceneItem,
    /// ### English
    /// Backing storage for the strings of the last polled event.
    ///
    /// ### 中文
    /// 最近一次轮询到的事件中字符串的存储。
    event_strings: Vec<CString>,
    event_string_ptrs: Vec<*const c_char>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
/// ### English
/// Texture node description for the current paint pass.
///
/// The rect is in item coordinates; the texture is owned by the view and stays valid until the
/// view is destroyed (it is resized in place).
///
/// ### 中文
/// 当前绘制的纹理节点描述。
///
/// 矩形使用 item 坐标；纹理归 view 所有，在 view 销毁前一直有效（尺寸变化时原地重新分配）。
pub struct WpeViewBridgePaintNode {
    pub texture_id: u32,
    pub texture_width: u32,
    pub texture_height: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub has_alpha: bool,
}

impl From<PaintNode> for WpeViewBridgePaintNode {
    fn from(value: PaintNode) -> Self {
        Self {
            texture_id: value.texture,
            texture_width: value.texture_size.width,
            texture_height: value.texture_size.height,
            x: 0.0,
            y: 0.0,
            width: value.item_size.width,
            height: value.item_size.height,
            has_alpha: value.has_alpha,
        }
    }
}

/// ### English
/// Borrows an optional NUL-terminated UTF-8 C string.
///
/// Returns `None` for NULL pointers or invalid UTF-8.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string valid for `'a`.
///
/// ### 中文
/// 借用一个可选的 NUL 结尾 UTF-8 C 字符串。
///
/// 对 NULL 指针或 UTF-8 非法返回 `None`。
///
/// # Safety
/// `ptr` 必须为 NULL，或指向在 `'a` 期间有效的 NUL 结尾字符串。
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// ### English
/// Collects `count` C strings, skipping NULL and invalid entries.
///
/// # Safety
/// `ptr` must be NULL or point to `count` valid string pointers.
///
/// ### 中文
/// 收集 `count` 个 C 字符串，跳过 NULL 与非法项。
///
/// # Safety
/// `ptr` 必须为 NULL，或指向 `count` 个有效的字符串指针。
unsafe fn cstr_array(ptr: *const *const c_char, count: u32) -> Vec<String> {
    if ptr.is_null() || count == 0 {
        return Vec::new();
    }
    let entries = unsafe { std::slice::from_raw_parts(ptr, count as usize) };
    entries
        .iter()
        .filter_map(|&entry| unsafe { cstr_to_str(entry) })
        .map(str::to_string)
        .collect()
}

/// ### English
/// Converts to a C string, dropping interior NUL bytes.
///
/// ### 中文
/// 转换为 C 字符串，丢弃内部的 NUL 字节。
fn to_cstring(value: String) -> CString {
    CString::new(value).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

/// ### English
/// Resolves a view pointer for the duration of one call.
///
/// # Safety
/// `view` must be NULL or a live pointer from `wpe_view_bridge_view_create`, not aliased
/// during the call.
///
/// ### 中文
/// 在单次调用期间解析 view 指针。
///
/// # Safety
/// `view` 必须为 NULL，或是来自 `wpe_view_bridge_view_create` 且仍存活的指针，调用期间不得被别名访问。
unsafe fn view_mut<'a>(view: *mut WpeViewBridgeView) -> Option<&'a mut WpeViewBridgeView> {
    unsafe { view.as_mut() }
}
