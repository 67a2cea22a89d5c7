//! ### English
//! C ABI bindings for view lifecycle, window readiness, geometry and painting.
//!
//! ### 中文
//! view 生命周期、窗口就绪、几何与绘制相关的 C ABI 绑定。

use std::ffi::c_void;
use std::sync::Arc;

use dpi::LogicalSize;

use super::{
    CallbackRepaint, WpeViewBridgePaintNode, WpeViewBridgeRepaintCallback, WpeViewBridgeView,
    view_mut,
};
use crate::engine::backend::{HostWindow, WpeBackendFactory};
use crate::engine::config::LibraryNames;
use crate::engine::flags::{WPE_VIEW_BRIDGE_VIEW_FLAG_NO_ACTIVITY_STATE, has_flag};
use crate::engine::item::SceneItem;

#[unsafe(no_mangle)]
/// ### English
/// Creates one view in the Uninitialized state.
///
/// `repaint` is called (possibly from the web engine's thread) whenever a new frame is staged;
/// `user_data` is passed back unchanged and must outlive the view.
/// `view_flags` is a `WPE_VIEW_BRIDGE_VIEW_FLAG_*` bitmask.
///
/// Returns NULL when `repaint` is NULL.
///
/// ### 中文
/// 创建一个处于 Uninitialized 状态的 view。
///
/// 每当有新帧暂存时会调用 `repaint`（可能在 web 引擎线程）；`user_data` 原样传回，
/// 其生命周期必须长于 view。`view_flags` 为 `WPE_VIEW_BRIDGE_VIEW_FLAG_*` 位掩码。
///
/// `repaint` 为 NULL 时返回 NULL。
pub extern "C" fn wpe_view_bridge_view_create(
    repaint: Option<WpeViewBridgeRepaintCallback>,
    user_data: *mut c_void,
    view_flags: u32,
) -> *mut WpeViewBridgeView {
    let Some(callback) = repaint else {
        return std::ptr::null_mut();
    };

    let factory = WpeBackendFactory {
        libraries: LibraryNames::from_env(),
        announce_activity: !has_flag(view_flags, WPE_VIEW_BRIDGE_VIEW_FLAG_NO_ACTIVITY_STATE),
    };
    let repaint = Arc::new(CallbackRepaint {
        callback,
        user_data,
    });
    let item = SceneItem::new(Box::new(factory), repaint, view_flags);

    Box::into_raw(Box::new(WpeViewBridgeView {
        item,
        event_strings: Vec::new(),
        event_string_ptrs: Vec::new(),
    }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a view created by `wpe_view_bridge_view_create`.
///
/// Must be called on the render thread with the scene graph context still alive: the backend
/// releases its held frames, destroys the producer and then its private GPU context. A pending
/// file selection is cancelled. The view's texture must not be sampled afterwards.
///
/// ### 中文
/// 销毁由 `wpe_view_bridge_view_create` 创建的 view。
///
/// 必须在渲染线程且场景图上下文仍存活时调用：后端依次释放持有的帧、销毁生产者、
/// 销毁私有 GPU 上下文。未完成的文件选择会被取消。之后不得再采样该 view 的纹理。
pub unsafe extern "C" fn wpe_view_bridge_view_destroy(view: *mut WpeViewBridgeView) {
    if view.is_null() {
        return;
    }
    let mut view = unsafe { Box::from_raw(view) };
    view.item.destroy();
}

#[unsafe(no_mangle)]
/// ### English
/// Assigns the host window. If `scene_graph_initialized` is true the backend is created now.
///
/// Returns `false` only when backend creation failed; the item then stays Uninitialized and the
/// shim should abort view creation.
///
/// ### 中文
/// 设置宿主窗口。若 `scene_graph_initialized` 为 true，则立即创建后端。
///
/// 仅当后端创建失败时返回 `false`；此时 item 保持 Uninitialized，垫片应中止 view 的创建。
pub unsafe extern "C" fn wpe_view_bridge_view_set_window(
    view: *mut WpeViewBridgeView,
    egl_display: *mut c_void,
    egl_context: *mut c_void,
    device_pixel_ratio: f64,
    scene_graph_initialized: bool,
) -> bool {
    let Some(view) = (unsafe { view_mut(view) }) else {
        return false;
    };
    let window = HostWindow {
        egl_display,
        egl_context,
        device_pixel_ratio,
        scene_graph_initialized,
    };
    view.item.set_window(Some(window)).is_ok()
}

#[unsafe(no_mangle)]
/// ### English
/// Detaches the item from its window. An existing backend is kept.
///
/// ### 中文
/// 将 item 与窗口分离。已存在的后端会保留。
pub unsafe extern "C" fn wpe_view_bridge_view_clear_window(view: *mut WpeViewBridgeView) {
    if let Some(view) = unsafe { view_mut(view) } {
        let _ = view.item.set_window(None);
    }
}

#[unsafe(no_mangle)]
/// ### English
/// The window's scene graph finished initializing (`QQuickWindow::sceneGraphInitialized`).
///
/// Returns `false` only when backend creation failed.
///
/// ### 中文
/// 窗口场景图初始化完成（`QQuickWindow::sceneGraphInitialized`）。
///
/// 仅当后端创建失败时返回 `false`。
pub unsafe extern "C" fn wpe_view_bridge_view_scene_graph_initialized(
    view: *mut WpeViewBridgeView,
) -> bool {
    let Some(view) = (unsafe { view_mut(view) }) else {
        return false;
    };
    view.item.scene_graph_initialized().is_ok()
}

#[unsafe(no_mangle)]
/// ### English
/// Item geometry changed (logical pixels).
///
/// ### 中文
/// item 几何变化（逻辑像素）。
pub unsafe extern "C" fn wpe_view_bridge_view_geometry_changed(
    view: *mut WpeViewBridgeView,
    width: f64,
    height: f64,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.geometry_changed(LogicalSize::new(width, height));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Window device pixel ratio changed.
///
/// ### 中文
/// 窗口设备像素比变化。
pub unsafe extern "C" fn wpe_view_bridge_view_set_device_pixel_ratio(
    view: *mut WpeViewBridgeView,
    ratio: f64,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.set_device_pixel_ratio(ratio);
    }
}

#[unsafe(no_mangle)]
/// ### English
/// One paint pass (`QQuickItem::updatePaintNode`, render thread, GUI thread blocked).
///
/// Returns `true` and writes `out_node` when there is a texture to show; returns `false` (node
/// untouched) before the backend exists or before the first frame arrived.
///
/// ### 中文
/// 一次绘制（`QQuickItem::updatePaintNode`，渲染线程，GUI 线程被阻塞）。
///
/// 有可显示纹理时返回 `true` 并写入 `out_node`；后端尚不存在或首帧尚未到达时返回 `false`
/// （不修改 node）。
pub unsafe extern "C" fn wpe_view_bridge_view_update_paint_node(
    view: *mut WpeViewBridgeView,
    out_node: *mut WpeViewBridgePaintNode,
) -> bool {
    if out_node.is_null() {
        return false;
    }
    let Some(view) = (unsafe { view_mut(view) }) else {
        return false;
    };
    let Some(node) = view.item.update_paint_node() else {
        return false;
    };
    unsafe { out_node.write(node.into()) };
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the engine-side `struct wpe_view_backend*` to create the `WebKitWebView` with, or
/// NULL before the backend exists.
///
/// ### 中文
/// 返回用于创建 `WebKitWebView` 的引擎侧 `struct wpe_view_backend*`；后端尚不存在时返回 NULL。
pub unsafe extern "C" fn wpe_view_bridge_view_native_backend(
    view: *mut WpeViewBridgeView,
) -> *mut c_void {
    match unsafe { view_mut(view) } {
        Some(view) => view.item.native_handle(),
        None => std::ptr::null_mut(),
    }
}
