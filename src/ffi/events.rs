//! ### English
//! C ABI bindings for engine notifications: the shim reports WebKit signals in, and polls
//! translated view events out.
//!
//! ### 中文
//! 引擎通知相关的 C ABI 绑定：垫片上报 WebKit 信号，并轮询取出转换后的 view 事件。

use std::ffi::c_char;

use super::{WpeViewBridgeView, cstr_to_str, to_cstring, view_mut};
use crate::engine::item::{LoadStatus, ViewEvent};

pub const WPE_VIEW_BRIDGE_EVENT_LOADING_CHANGED: u32 = 1;
pub const WPE_VIEW_BRIDGE_EVENT_WEB_PROCESS_CRASHED: u32 = 2;
pub const WPE_VIEW_BRIDGE_EVENT_TEXT_COMMITTED: u32 = 3;
pub const WPE_VIEW_BRIDGE_EVENT_FILE_SELECTION_REQUESTED: u32 = 4;

pub const WPE_VIEW_BRIDGE_LOAD_STARTED: u32 = 0;
pub const WPE_VIEW_BRIDGE_LOAD_SUCCEEDED: u32 = 1;
pub const WPE_VIEW_BRIDGE_LOAD_STOPPED: u32 = 2;
pub const WPE_VIEW_BRIDGE_LOAD_FAILED: u32 = 3;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// One polled view event.
///
/// Which fields are meaningful depends on `kind`:
/// - `LOADING_CHANGED`: `load_status`, `url`, and `text` (error message, or NULL).
/// - `TEXT_COMMITTED`: `text`.
/// - `FILE_SELECTION_REQUESTED`: `multiple`, `mime_types`/`mime_type_count`.
///
/// Strings are owned by the view and stay valid until the next poll or until the view is
/// destroyed.
///
/// ### 中文
/// 一个轮询得到的 view 事件。
///
/// 各字段是否有意义取决于 `kind`：
/// - `LOADING_CHANGED`：`load_status`、`url`，以及 `text`（错误信息，或 NULL）。
/// - `TEXT_COMMITTED`：`text`。
/// - `FILE_SELECTION_REQUESTED`：`multiple`、`mime_types`/`mime_type_count`。
///
/// 字符串归 view 所有，在下一次轮询或 view 销毁之前保持有效。
pub struct WpeViewBridgeEvent {
    pub kind: u32,
    pub load_status: u32,
    pub url: *const c_char,
    pub text: *const c_char,
    pub multiple: bool,
    pub mime_types: *const *const c_char,
    pub mime_type_count: u32,
}

impl Default for WpeViewBridgeEvent {
    fn default() -> Self {
        Self {
            kind: 0,
            load_status: 0,
            url: std::ptr::null(),
            text: std::ptr::null(),
            multiple: false,
            mime_types: std::ptr::null(),
            mime_type_count: 0,
        }
    }
}

fn load_status_code(status: LoadStatus) -> u32 {
    match status {
        LoadStatus::Started => WPE_VIEW_BRIDGE_LOAD_STARTED,
        LoadStatus::Succeeded => WPE_VIEW_BRIDGE_LOAD_SUCCEEDED,
        LoadStatus::Stopped => WPE_VIEW_BRIDGE_LOAD_STOPPED,
        LoadStatus::Failed => WPE_VIEW_BRIDGE_LOAD_FAILED,
    }
}

impl WpeViewBridgeView {
    /// ### English
    /// Stores `value` until the next poll and returns its C pointer.
    ///
    /// ### 中文
    /// 保存 `value` 直到下一次轮询，并返回其 C 指针。
    fn keep_string(&mut self, value: String) -> *const c_char {
        let value = to_cstring(value);
        let ptr = value.as_ptr();
        self.event_strings.push(value);
        ptr
    }

    fn lower_event(&mut self, event: ViewEvent) -> WpeViewBridgeEvent {
        self.event_strings.clear();
        self.event_string_ptrs.clear();

        match event {
            ViewEvent::LoadingChanged(request) => WpeViewBridgeEvent {
                kind: WPE_VIEW_BRIDGE_EVENT_LOADING_CHANGED,
                load_status: load_status_code(request.status),
                url: self.keep_string(request.url),
                text: match request.error {
                    Some(message) => self.keep_string(message),
                    None => std::ptr::null(),
                },
                ..Default::default()
            },
            ViewEvent::WebProcessCrashed => WpeViewBridgeEvent {
                kind: WPE_VIEW_BRIDGE_EVENT_WEB_PROCESS_CRASHED,
                ..Default::default()
            },
            ViewEvent::TextCommitted(text) => WpeViewBridgeEvent {
                kind: WPE_VIEW_BRIDGE_EVENT_TEXT_COMMITTED,
                text: self.keep_string(text),
                ..Default::default()
            },
            ViewEvent::FileSelectionRequested {
                multiple,
                mime_types,
            } => {
                for mime_type in mime_types {
                    let ptr = self.keep_string(mime_type);
                    self.event_string_ptrs.push(ptr);
                }
                WpeViewBridgeEvent {
                    kind: WPE_VIEW_BRIDGE_EVENT_FILE_SELECTION_REQUESTED,
                    multiple,
                    mime_types: self.event_string_ptrs.as_ptr(),
                    mime_type_count: self.event_string_ptrs.len() as u32,
                    ..Default::default()
                }
            }
        }
    }
}

#[unsafe(no_mangle)]
/// ### English
/// `WebKitWebView::load-changed` with `WEBKIT_LOAD_STARTED`.
///
/// ### 中文
/// `WebKitWebView::load-changed`，阶段为 `WEBKIT_LOAD_STARTED`。
pub unsafe extern "C" fn wpe_view_bridge_view_notify_load_started(
    view: *mut WpeViewBridgeView,
    url: *const c_char,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        let url = unsafe { cstr_to_str(url) }.unwrap_or_default();
        view.item.notify_load_started(url);
    }
}

#[unsafe(no_mangle)]
/// ### English
/// `WebKitWebView::load-changed` with `WEBKIT_LOAD_FINISHED`. Reported as succeeded unless a
/// failure was notified since the previous finish.
///
/// ### 中文
/// `WebKitWebView::load-changed`，阶段为 `WEBKIT_LOAD_FINISHED`。除非自上次 finish 以来报告过
/// 失败，否则上报为成功。
pub unsafe extern "C" fn wpe_view_bridge_view_notify_load_finished(
    view: *mut WpeViewBridgeView,
    url: *const c_char,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        let url = unsafe { cstr_to_str(url) }.unwrap_or_default();
        view.item.notify_load_finished(url);
    }
}

#[unsafe(no_mangle)]
/// ### English
/// `WebKitWebView::load-failed`. `cancelled` is true for `WEBKIT_NETWORK_ERROR_CANCELLED`.
///
/// ### 中文
/// `WebKitWebView::load-failed`。错误为 `WEBKIT_NETWORK_ERROR_CANCELLED` 时 `cancelled` 为 true。
pub unsafe extern "C" fn wpe_view_bridge_view_notify_load_failed(
    view: *mut WpeViewBridgeView,
    failing_url: *const c_char,
    cancelled: bool,
    message: *const c_char,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        let failing_url = unsafe { cstr_to_str(failing_url) }.unwrap_or_default();
        let message = unsafe { cstr_to_str(message) }.unwrap_or_default();
        view.item.notify_load_failed(failing_url, cancelled, message);
    }
}

#[unsafe(no_mangle)]
/// ### English
/// `WebKitWebView::web-process-terminated`.
///
/// ### 中文
/// `WebKitWebView::web-process-terminated`。
pub unsafe extern "C" fn wpe_view_bridge_view_notify_web_process_terminated(
    view: *mut WpeViewBridgeView,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.notify_web_process_terminated();
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Pops the oldest queued view event into `out_event`.
///
/// Returns `false` (event untouched) when the queue is empty. Strings from the previous poll
/// are invalidated by every call that returns `true`.
///
/// ### 中文
/// 将队列中最早的 view 事件弹出到 `out_event`。
///
/// 队列为空时返回 `false`（不修改 event）。每次返回 `true` 的调用都会使上一次轮询的字符串失效。
pub unsafe extern "C" fn wpe_view_bridge_view_poll_event(
    view: *mut WpeViewBridgeView,
    out_event: *mut WpeViewBridgeEvent,
) -> bool {
    if out_event.is_null() {
        return false;
    }
    let Some(view) = (unsafe { view_mut(view) }) else {
        return false;
    };
    let Some(event) = view.item.poll_event() else {
        return false;
    };
    let lowered = view.lower_event(event);
    unsafe { out_event.write(lowered) };
    true
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, c_void};

    use super::*;
    use crate::ffi::view::{wpe_view_bridge_view_create, wpe_view_bridge_view_destroy};

    unsafe extern "C" fn ignore_repaint(_user_data: *mut c_void) {}

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_str().expect("utf-8")
    }

    #[test]
    fn load_failure_is_polled_with_owned_strings() {
        let view = wpe_view_bridge_view_create(Some(ignore_repaint), std::ptr::null_mut(), 0);
        assert!(!view.is_null());

        unsafe {
            wpe_view_bridge_view_notify_load_started(view, c"https://example.org/".as_ptr());
            wpe_view_bridge_view_notify_load_failed(
                view,
                c"https://example.org/".as_ptr(),
                true,
                c"Load cancelled".as_ptr(),
            );
            wpe_view_bridge_view_notify_load_finished(view, c"https://example.org/".as_ptr());
        }

        let mut event = WpeViewBridgeEvent::default();
        assert!(unsafe { wpe_view_bridge_view_poll_event(view, &mut event) });
        assert_eq!(event.kind, WPE_VIEW_BRIDGE_EVENT_LOADING_CHANGED);
        assert_eq!(event.load_status, WPE_VIEW_BRIDGE_LOAD_STARTED);
        assert_eq!(c_str(event.url), "https://example.org/");
        assert!(event.text.is_null());

        assert!(unsafe { wpe_view_bridge_view_poll_event(view, &mut event) });
        assert_eq!(event.load_status, WPE_VIEW_BRIDGE_LOAD_STOPPED);
        assert_eq!(c_str(event.text), "Load cancelled");

        assert!(!unsafe { wpe_view_bridge_view_poll_event(view, &mut event) });
        unsafe { wpe_view_bridge_view_destroy(view) };
    }

    #[test]
    fn null_view_is_ignored() {
        let mut event = WpeViewBridgeEvent::default();
        unsafe {
            wpe_view_bridge_view_notify_web_process_terminated(std::ptr::null_mut());
            assert!(!wpe_view_bridge_view_poll_event(std::ptr::null_mut(), &mut event));
        }
        assert_eq!(event.kind, 0);
    }
}
