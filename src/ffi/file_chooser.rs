//! ### English
//! C ABI bindings for the engine's "choose files" requests (`WebKitWebView::run-file-chooser`).
//!
//! ### 中文
//! 引擎 “选择文件” 请求（`WebKitWebView::run-file-chooser`）的 C ABI 绑定。

use std::ffi::{c_char, c_void};
use std::path::PathBuf;

use super::{WpeViewBridgeView, cstr_array, to_cstring, view_mut};
use crate::engine::item::FileChooserRequest;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// Callbacks answering one `WebKitFileChooserRequest`. Exactly one of them is called, once;
/// the shim releases its request reference there.
///
/// ### 中文
/// 应答一个 `WebKitFileChooserRequest` 的回调。二者恰好只会被调用一个且只调用一次；
/// 垫片应在其中释放对请求的引用。
pub struct WpeViewBridgeFileChooser {
    pub user_data: *mut c_void,
    /// ### English
    /// `files` holds `count` local paths valid for the duration of the call.
    ///
    /// ### 中文
    /// `files` 含 `count` 个本地路径，仅在调用期间有效。
    pub select_files: Option<
        unsafe extern "C" fn(user_data: *mut c_void, files: *const *const c_char, count: u32),
    >,
    pub cancel: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

struct ForeignFileChooser(WpeViewBridgeFileChooser);

impl FileChooserRequest for ForeignFileChooser {
    fn select_files(self: Box<Self>, files: &[PathBuf]) {
        let Some(select_files) = self.0.select_files else {
            return;
        };
        let files: Vec<_> = files
            .iter()
            .map(|path| to_cstring(path.to_string_lossy().into_owned()))
            .collect();
        let ptrs: Vec<*const c_char> = files.iter().map(|file| file.as_ptr()).collect();
        unsafe { select_files(self.0.user_data, ptrs.as_ptr(), ptrs.len() as u32) };
    }

    fn cancel(self: Box<Self>) {
        if let Some(cancel) = self.0.cancel {
            unsafe { cancel(self.0.user_data) };
        }
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Registers a file chooser request and queues a `FILE_SELECTION_REQUESTED` event.
///
/// A request still outstanding is cancelled first. An empty MIME list means any file.
/// Returns `false` (and calls nothing) when `view` is NULL or either callback is missing.
///
/// ### 中文
/// 登记一个文件选择请求，并排队一个 `FILE_SELECTION_REQUESTED` 事件。
///
/// 仍未完成的请求会先被取消。MIME 列表为空表示任意文件。
/// `view` 为 NULL 或任一回调缺失时返回 `false`（且不调用任何回调）。
pub unsafe extern "C" fn wpe_view_bridge_view_begin_file_selection(
    view: *mut WpeViewBridgeView,
    chooser: WpeViewBridgeFileChooser,
    multiple: bool,
    mime_types: *const *const c_char,
    mime_type_count: u32,
) -> bool {
    if chooser.select_files.is_none() || chooser.cancel.is_none() {
        return false;
    }
    let Some(view) = (unsafe { view_mut(view) }) else {
        return false;
    };
    let mime_types = unsafe { cstr_array(mime_types, mime_type_count) };
    view.item
        .begin_file_selection(Box::new(ForeignFileChooser(chooser)), multiple, mime_types);
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Answers the pending request with `count` entries, each a `file://` URL or a local path.
/// Only the first entry is kept for single-selection requests. No-op without a request.
///
/// ### 中文
/// 用 `count` 个条目应答待处理请求，每项为 `file://` URL 或本地路径。
/// 单选请求只保留第一项。没有待处理请求时为空操作。
pub unsafe extern "C" fn wpe_view_bridge_view_confirm_file_selection(
    view: *mut WpeViewBridgeView,
    files: *const *const c_char,
    count: u32,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        let entries = unsafe { cstr_array(files, count) };
        view.item.confirm_file_selection(&entries);
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Cancels the pending request. No-op without a request.
///
/// ### 中文
/// 取消待处理请求。没有待处理请求时为空操作。
pub unsafe extern "C" fn wpe_view_bridge_view_cancel_file_selection(
    view: *mut WpeViewBridgeView,
) {
    if let Some(view) = unsafe { view_mut(view) } {
        view.item.cancel_file_selection();
    }
}
