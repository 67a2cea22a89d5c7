//! ### English
//! C ABI bindings for host input events.
//!
//! Enumerations use Qt's numeric values (`Qt::MouseButton`, `Qt::Key`,
//! `Qt::KeyboardModifiers`, `Qt::TouchPointState`) so the shim can forward event fields as-is.
//! Positions are in item-local logical pixels.
//!
//! ### 中文
//! 宿主输入事件的 C ABI 绑定。
//!
//! 枚举值使用 Qt 的数值定义（`Qt::MouseButton`、`Qt::Key`、`Qt::KeyboardModifiers`、
//! `Qt::TouchPointState`），垫片可直接转发事件字段。坐标为 item 本地的逻辑像素。

use std::ffi::c_char;

use dpi::LogicalPosition;

use super::{WpeViewBridgeView, cstr_to_str, view_mut};
use crate::engine::input::{
    AngleDelta, HostKey, HostKeyEvent, HostTouchPoint, KeyboardModifiers, PointerButton,
    TouchPointState,
};
use crate::engine::item::KeyDispatch;

/// ### English
/// Key event dispatched to the engine as a keyboard event.
///
/// ### 中文
/// 按键事件已作为键盘事件派发给引擎。
pub const WPE_VIEW_BRIDGE_KEY_DISPATCHED: u32 = 0;
/// ### English
/// Key event carried input-method text; poll the matching `TEXT_COMMITTED` event.
///
/// ### 中文
/// 按键事件携带输入法文本；请轮询对应的 `TEXT_COMMITTED` 事件。
pub const WPE_VIEW_BRIDGE_KEY_COMMITTED: u32 = 1;
pub const WPE_VIEW_BRIDGE_KEY_IGNORED: u32 = 2;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// One `QKeyEvent`.
///
/// `text` is optional (NULL means empty) and only needs to live for the call.
///
/// ### 中文
/// 一个 `QKeyEvent`。
///
/// `text` 可选（NULL 表示空），只需在调用期间有效。
pub struct WpeViewBridgeKeyEvent {
    pub timestamp: u64,
    pub key: i32,
    pub native_virtual_key: u32,
    pub native_scan_code: u32,
    pub modifiers: u32,
    pub text: *const c_char,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct WpeViewBridgeTouchPoint {
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub state: u32,
}

#[unsafe(no_mangle)]
/// ### English
/// Opens a hover session (`hoverEnterEvent`).
///
/// ### 中文
/// 开始悬停会话（`hoverEnterEvent`）。
pub unsafe extern "C" fn wpe_view_bridge_view_hover_enter(view: *mut WpeViewBridgeView) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.hover_enter();
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Closes the hover session (`hoverLeaveEvent`).
///
/// ### 中文
/// 结束悬停会话（`hoverLeaveEvent`）。
pub unsafe extern "C" fn wpe_view_bridge_view_hover_leave(view: *mut WpeViewBridgeView) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.hover_leave();
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Hover motion; dropped outside a hover session.
///
/// ### 中文
/// 悬停移动；不在悬停会话中时丢弃。
pub unsafe extern "C" fn wpe_view_bridge_view_hover_move(
    view: *mut WpeViewBridgeView,
    timestamp: u64,
    x: f64,
    y: f64,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.hover_move(timestamp, LogicalPosition::new(x, y));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn wpe_view_bridge_view_mouse_move(
    view: *mut WpeViewBridgeView,
    timestamp: u64,
    x: f64,
    y: f64,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.mouse_move(timestamp, LogicalPosition::new(x, y));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Mouse press; `button` is a single `Qt::MouseButton` value.
///
/// ### 中文
/// 鼠标按下；`button` 为单个 `Qt::MouseButton` 值。
pub unsafe extern "C" fn wpe_view_bridge_view_mouse_press(
    view: *mut WpeViewBridgeView,
    timestamp: u64,
    x: f64,
    y: f64,
    button: u32,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.mouse_press(
            timestamp,
            LogicalPosition::new(x, y),
            PointerButton::from_qt(button),
        );
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn wpe_view_bridge_view_mouse_release(
    view: *mut WpeViewBridgeView,
    timestamp: u64,
    x: f64,
    y: f64,
    button: u32,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.mouse_release(
            timestamp,
            LogicalPosition::new(x, y),
            PointerButton::from_qt(button),
        );
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Wheel event; `angle_x`/`angle_y` are `QWheelEvent::angleDelta()` (eighths of a degree).
///
/// ### 中文
/// 滚轮事件；`angle_x`/`angle_y` 为 `QWheelEvent::angleDelta()`（1/8 度）。
pub unsafe extern "C" fn wpe_view_bridge_view_wheel(
    view: *mut WpeViewBridgeView,
    timestamp: u64,
    x: f64,
    y: f64,
    angle_x: i32,
    angle_y: i32,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.wheel(
            timestamp,
            LogicalPosition::new(x, y),
            AngleDelta {
                x: angle_x,
                y: angle_y,
            },
        );
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Key press or release.
///
/// `global_modifiers` is `QGuiApplication::keyboardModifiers()`, used when the event itself
/// reports no modifiers.
///
/// Returns one of `WPE_VIEW_BRIDGE_KEY_*`.
///
/// ### 中文
/// 按键按下或抬起。
///
/// `global_modifiers` 为 `QGuiApplication::keyboardModifiers()`，在事件本身未报告修饰键时使用。
///
/// 返回 `WPE_VIEW_BRIDGE_KEY_*` 之一。
pub unsafe extern "C" fn wpe_view_bridge_view_key(
    view: *mut WpeViewBridgeView,
    event: *const WpeViewBridgeKeyEvent,
    pressed: bool,
    global_modifiers: u32,
) -> u32 {
    let Some(view) = (unsafe { view_mut(view) }) else {
        return WPE_VIEW_BRIDGE_KEY_IGNORED;
    };
    let Some(event) = (unsafe { event.as_ref() }) else {
        return WPE_VIEW_BRIDGE_KEY_IGNORED;
    };

    let event = HostKeyEvent {
        timestamp: event.timestamp,
        key: HostKey::from_qt_code(event.key),
        native_virtual_key: event.native_virtual_key,
        native_scan_code: event.native_scan_code,
        modifiers: KeyboardModifiers::from_bits_truncate(event.modifiers),
        text: unsafe { cstr_to_str(event.text) }
            .unwrap_or_default()
            .to_string(),
    };
    let global_modifiers = KeyboardModifiers::from_bits_truncate(global_modifiers);

    match view.item.key(&event, pressed, global_modifiers) {
        KeyDispatch::Dispatched => WPE_VIEW_BRIDGE_KEY_DISPATCHED,
        KeyDispatch::Committed => WPE_VIEW_BRIDGE_KEY_COMMITTED,
        KeyDispatch::Ignored => WPE_VIEW_BRIDGE_KEY_IGNORED,
    }
}

#[unsafe(no_mangle)]
/// ### English
/// One `QTouchEvent`: `count` points sharing `timestamp`, dispatched as a single batch.
///
/// `count == 0` (with `points` possibly NULL) still dispatches an empty batch, as for a touch
/// cancel.
///
/// ### 中文
/// 一个 `QTouchEvent`：`count` 个共享 `timestamp` 的触摸点，作为一个批次派发。
///
/// `count == 0`（`points` 可为 NULL）时仍派发一个空批次，例如触摸取消。
pub unsafe extern "C" fn wpe_view_bridge_view_touch(
    view: *mut WpeViewBridgeView,
    points: *const WpeViewBridgeTouchPoint,
    count: u32,
    timestamp: u64,
) {
    if points.is_null() && count != 0 {
        return;
    }
    let Some(view) = (unsafe { view_mut(view) }) else {
        return;
    };

    let points = if count == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(points, count as usize) }
    };
    let points: Vec<HostTouchPoint> = points
        .iter()
        .map(|point| HostTouchPoint {
            id: point.id,
            position: LogicalPosition::new(point.x, point.y),
            state: TouchPointState::from_qt(point.state),
        })
        .collect();
    view.item.touch(timestamp, &points);
}
