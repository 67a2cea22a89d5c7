//! ### English
//! libwpe + WPEBackend-fdo entry points, resolved at runtime.
//!
//! ### 中文
//! 运行时解析的 libwpe 与 WPEBackend-fdo 入口点。

use std::ffi::{CString, c_char, c_void};

use crate::engine::config::LibraryNames;
use crate::engine::egl::{EGLDisplay, EGLImageKHR};
use crate::engine::error::{BridgeError, BridgeResult};
use crate::engine::input::wire::{
    WpeInputAxisEvent, WpeInputKeyboardEvent, WpeInputPointerEvent, WpeInputTouchEvent,
};
use crate::engine::loader::DynamicLibrary;

#[repr(C)]
/// ### English
/// Opaque `struct wpe_view_backend`.
///
/// ### 中文
/// 不透明 `struct wpe_view_backend`。
pub struct WpeViewBackend {
    _private: [u8; 0],
}

#[repr(C)]
/// ### English
/// Opaque `struct wpe_view_backend_exportable_fdo`.
///
/// ### 中文
/// 不透明 `struct wpe_view_backend_exportable_fdo`。
pub struct WpeViewBackendExportableFdo {
    _private: [u8; 0],
}

/// ### English
/// `struct wpe_view_backend_exportable_fdo_egl_client`. Only `export_fdo_egl_image` is used.
///
/// ### 中文
/// `struct wpe_view_backend_exportable_fdo_egl_client`。只使用 `export_fdo_egl_image`。
#[repr(C)]
pub struct WpeViewBackendExportableFdoEglClient {
    pub export_egl_image: Option<unsafe extern "C" fn(data: *mut c_void, image: EGLImageKHR)>,
    pub export_fdo_egl_image: Option<unsafe extern "C" fn(data: *mut c_void, image: *mut c_void)>,
    pub export_shm_buffer: Option<unsafe extern "C" fn(data: *mut c_void, buffer: *mut c_void)>,
    pub _wpe_reserved0: Option<unsafe extern "C" fn()>,
    pub _wpe_reserved1: Option<unsafe extern "C" fn()>,
}

type WpeLoaderInit = unsafe extern "C" fn(*const c_char) -> bool;
type WpeDispatchSetSize = unsafe extern "C" fn(*mut WpeViewBackend, u32, u32);
type WpeDispatchSetDeviceScaleFactor = unsafe extern "C" fn(*mut WpeViewBackend, f32);
type WpeAddActivityState = unsafe extern "C" fn(*mut WpeViewBackend, u32);
type WpeDispatchPointerEvent =
    unsafe extern "C" fn(*mut WpeViewBackend, *mut WpeInputPointerEvent);
type WpeDispatchAxisEvent = unsafe extern "C" fn(*mut WpeViewBackend, *mut WpeInputAxisEvent);
type WpeDispatchKeyboardEvent =
    unsafe extern "C" fn(*mut WpeViewBackend, *mut WpeInputKeyboardEvent);
type WpeDispatchTouchEvent = unsafe extern "C" fn(*mut WpeViewBackend, *mut WpeInputTouchEvent);

type FdoInitializeForEglDisplay = unsafe extern "C" fn(EGLDisplay) -> bool;
type FdoExportableEglCreate = unsafe extern "C" fn(
    *const WpeViewBackendExportableFdoEglClient,
    *mut c_void,
    u32,
    u32,
) -> *mut WpeViewBackendExportableFdo;
type FdoExportableDestroy = unsafe extern "C" fn(*mut WpeViewBackendExportableFdo);
type FdoExportableGetViewBackend =
    unsafe extern "C" fn(*mut WpeViewBackendExportableFdo) -> *mut WpeViewBackend;
type FdoDispatchFrameComplete = unsafe extern "C" fn(*mut WpeViewBackendExportableFdo);
type FdoDispatchReleaseExportedImage =
    unsafe extern "C" fn(*mut WpeViewBackendExportableFdo, *mut c_void);
type FdoExportedImageGetEglImage = unsafe extern "C" fn(*mut c_void) -> EGLImageKHR;

/// ### English
/// Function table over libwpe and WPEBackend-fdo. Fields are called directly by the
/// exportable wrapper.
///
/// ### 中文
/// libwpe 与 WPEBackend-fdo 的函数表。字段由 exportable 封装直接调用。
pub struct WpeApi {
    _wpe: DynamicLibrary,
    _fdo: DynamicLibrary,
    pub(super) dispatch_set_size: WpeDispatchSetSize,
    pub(super) dispatch_set_device_scale_factor: WpeDispatchSetDeviceScaleFactor,
    pub(super) add_activity_state: WpeAddActivityState,
    pub(super) dispatch_pointer_event: WpeDispatchPointerEvent,
    pub(super) dispatch_axis_event: WpeDispatchAxisEvent,
    pub(super) dispatch_keyboard_event: WpeDispatchKeyboardEvent,
    pub(super) dispatch_touch_event: WpeDispatchTouchEvent,
    initialize_for_egl_display: FdoInitializeForEglDisplay,
    pub(super) exportable_create: FdoExportableEglCreate,
    pub(super) exportable_destroy: FdoExportableDestroy,
    pub(super) exportable_get_view_backend: FdoExportableGetViewBackend,
    pub(super) dispatch_frame_complete: FdoDispatchFrameComplete,
    pub(super) dispatch_release_exported_image: FdoDispatchReleaseExportedImage,
    pub(super) exported_image_get_egl_image: FdoExportedImageGetEglImage,
}

impl WpeApi {
    /// ### English
    /// Loads both libraries and points libwpe's backend loader at the fdo implementation.
    ///
    /// ### 中文
    /// 加载两个库，并让 libwpe 的后端加载器指向 fdo 实现。
    pub fn load(names: &LibraryNames) -> BridgeResult<Self> {
        let wpe = DynamicLibrary::open(&names.wpe)?;
        let fdo = DynamicLibrary::open(&names.fdo)?;

        let api = unsafe {
            let loader_init: WpeLoaderInit = wpe.symbol(c"wpe_loader_init")?;
            let backend_name = CString::new(names.fdo.as_str()).map_err(|_| {
                BridgeError::LibraryLoad {
                    library: names.fdo.clone(),
                    reason: "library name contains NUL".to_string(),
                }
            })?;
            if !loader_init(backend_name.as_ptr()) {
                log::debug!("wpe_loader_init({}) refused, a backend is already loaded", names.fdo);
            }

            Self {
                dispatch_set_size: wpe.symbol(c"wpe_view_backend_dispatch_set_size")?,
                dispatch_set_device_scale_factor: wpe
                    .symbol(c"wpe_view_backend_dispatch_set_device_scale_factor")?,
                add_activity_state: wpe.symbol(c"wpe_view_backend_add_activity_state")?,
                dispatch_pointer_event: wpe.symbol(c"wpe_view_backend_dispatch_pointer_event")?,
                dispatch_axis_event: wpe.symbol(c"wpe_view_backend_dispatch_axis_event")?,
                dispatch_keyboard_event: wpe
                    .symbol(c"wpe_view_backend_dispatch_keyboard_event")?,
                dispatch_touch_event: wpe.symbol(c"wpe_view_backend_dispatch_touch_event")?,
                initialize_for_egl_display: fdo.symbol(c"wpe_fdo_initialize_for_egl_display")?,
                exportable_create: fdo.symbol(c"wpe_view_backend_exportable_fdo_egl_create")?,
                exportable_destroy: fdo.symbol(c"wpe_view_backend_exportable_fdo_destroy")?,
                exportable_get_view_backend: fdo
                    .symbol(c"wpe_view_backend_exportable_fdo_get_view_backend")?,
                dispatch_frame_complete: fdo
                    .symbol(c"wpe_view_backend_exportable_fdo_dispatch_frame_complete")?,
                dispatch_release_exported_image: fdo
                    .symbol(c"wpe_view_backend_exportable_fdo_egl_dispatch_release_exported_image")?,
                exported_image_get_egl_image: fdo
                    .symbol(c"wpe_fdo_egl_exported_image_get_egl_image")?,
                _wpe: wpe,
                _fdo: fdo,
            }
        };
        Ok(api)
    }

    /// ### English
    /// `wpe_fdo_initialize_for_egl_display`.
    ///
    /// ### 中文
    /// `wpe_fdo_initialize_for_egl_display`。
    ///
    /// # Safety
    /// `display` must be an initialized `EGLDisplay`.
    pub unsafe fn initialize_for_egl_display(&self, display: EGLDisplay) -> BridgeResult<()> {
        if unsafe { (self.initialize_for_egl_display)(display) } {
            Ok(())
        } else {
            Err(BridgeError::ImageExportInit)
        }
    }
}
