//! ### English
//! Minimal EGL function table resolved from `libEGL` at runtime.
//!
//! Only the entry points needed to create a private pbuffer context, save/restore the caller's
//! binding and resolve GL extension functions are loaded.
//!
//! ### 中文
//! 运行时从 `libEGL` 解析的最小 EGL 函数表。
//!
//! 只加载创建私有 pbuffer 上下文、保存/恢复调用方绑定以及解析 GL 扩展函数所需的入口点。

use std::ffi::{CStr, c_char, c_void};
use std::ptr;

use crate::engine::error::{BridgeError, BridgeResult};
use crate::engine::loader::DynamicLibrary;

pub type EGLDisplay = *mut c_void;
pub type EGLContext = *mut c_void;
pub type EGLSurface = *mut c_void;
pub type EGLConfig = *mut c_void;
pub type EGLImageKHR = *mut c_void;
pub type EGLint = i32;
pub type EGLBoolean = u32;
pub type EGLenum = u32;

pub const EGL_FALSE: EGLBoolean = 0;
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_SURFACE_TYPE: EGLint = 0x3033;
pub const EGL_PBUFFER_BIT: EGLint = 0x0001;
pub const EGL_RED_SIZE: EGLint = 0x3024;
pub const EGL_GREEN_SIZE: EGLint = 0x3023;
pub const EGL_BLUE_SIZE: EGLint = 0x3022;
pub const EGL_ALPHA_SIZE: EGLint = 0x3021;
pub const EGL_RENDERABLE_TYPE: EGLint = 0x3040;
pub const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;
pub const EGL_CONTEXT_CLIENT_VERSION: EGLint = 0x3098;
pub const EGL_OPENGL_ES_API: EGLenum = 0x30A0;
pub const EGL_WIDTH: EGLint = 0x3057;
pub const EGL_HEIGHT: EGLint = 0x3056;
pub const EGL_DRAW: EGLint = 0x3059;
pub const EGL_READ: EGLint = 0x305A;

pub const EGL_NO_DISPLAY: EGLDisplay = ptr::null_mut();
pub const EGL_NO_CONTEXT: EGLContext = ptr::null_mut();
pub const EGL_NO_SURFACE: EGLSurface = ptr::null_mut();

type EglGetError = unsafe extern "C" fn() -> EGLint;
type EglInitialize = unsafe extern "C" fn(EGLDisplay, *mut EGLint, *mut EGLint) -> EGLBoolean;
type EglBindApi = unsafe extern "C" fn(EGLenum) -> EGLBoolean;
type EglGetConfigs =
    unsafe extern "C" fn(EGLDisplay, *mut EGLConfig, EGLint, *mut EGLint) -> EGLBoolean;
type EglChooseConfig = unsafe extern "C" fn(
    EGLDisplay,
    *const EGLint,
    *mut EGLConfig,
    EGLint,
    *mut EGLint,
) -> EGLBoolean;
type EglCreateContext =
    unsafe extern "C" fn(EGLDisplay, EGLConfig, EGLContext, *const EGLint) -> EGLContext;
type EglDestroyContext = unsafe extern "C" fn(EGLDisplay, EGLContext) -> EGLBoolean;
type EglCreatePbufferSurface =
    unsafe extern "C" fn(EGLDisplay, EGLConfig, *const EGLint) -> EGLSurface;
type EglDestroySurface = unsafe extern "C" fn(EGLDisplay, EGLSurface) -> EGLBoolean;
type EglMakeCurrent =
    unsafe extern "C" fn(EGLDisplay, EGLSurface, EGLSurface, EGLContext) -> EGLBoolean;
type EglGetCurrentDisplay = unsafe extern "C" fn() -> EGLDisplay;
type EglGetCurrentSurface = unsafe extern "C" fn(EGLint) -> EGLSurface;
type EglGetCurrentContext = unsafe extern "C" fn() -> EGLContext;
type EglGetProcAddress = unsafe extern "C" fn(*const c_char) -> *mut c_void;

/// ### English
/// The EGL binding that was current on the calling thread before the backend switched to its
/// private context. Restored verbatim once the blit is done.
///
/// ### 中文
/// 后端切换到私有上下文之前，调用线程上处于 current 的 EGL 绑定。blit 结束后原样恢复。
#[derive(Clone, Copy, Debug)]
pub struct SavedBinding {
    display: EGLDisplay,
    draw: EGLSurface,
    read: EGLSurface,
    context: EGLContext,
}

impl SavedBinding {
    pub fn context(&self) -> EGLContext {
        self.context
    }
}

/// ### English
/// Loaded EGL entry points.
///
/// ### 中文
/// 已加载的 EGL 入口点。
pub struct EglApi {
    library: DynamicLibrary,
    get_error: EglGetError,
    initialize: EglInitialize,
    bind_api: EglBindApi,
    get_configs: EglGetConfigs,
    choose_config: EglChooseConfig,
    create_context: EglCreateContext,
    destroy_context: EglDestroyContext,
    create_pbuffer_surface: EglCreatePbufferSurface,
    destroy_surface: EglDestroySurface,
    make_current: EglMakeCurrent,
    get_current_display: EglGetCurrentDisplay,
    get_current_surface: EglGetCurrentSurface,
    get_current_context: EglGetCurrentContext,
    get_proc_address: EglGetProcAddress,
}

impl EglApi {
    /// ### English
    /// Opens `library` and resolves every entry point. A single missing symbol fails the load.
    ///
    /// ### 中文
    /// 打开 `library` 并解析全部入口点。任一符号缺失都会导致加载失败。
    pub fn load(library: &str) -> BridgeResult<Self> {
        let library = DynamicLibrary::open(library)?;
        unsafe {
            Ok(Self {
                get_error: library.symbol(c"eglGetError")?,
                initialize: library.symbol(c"eglInitialize")?,
                bind_api: library.symbol(c"eglBindAPI")?,
                get_configs: library.symbol(c"eglGetConfigs")?,
                choose_config: library.symbol(c"eglChooseConfig")?,
                create_context: library.symbol(c"eglCreateContext")?,
                destroy_context: library.symbol(c"eglDestroyContext")?,
                create_pbuffer_surface: library.symbol(c"eglCreatePbufferSurface")?,
                destroy_surface: library.symbol(c"eglDestroySurface")?,
                make_current: library.symbol(c"eglMakeCurrent")?,
                get_current_display: library.symbol(c"eglGetCurrentDisplay")?,
                get_current_surface: library.symbol(c"eglGetCurrentSurface")?,
                get_current_context: library.symbol(c"eglGetCurrentContext")?,
                get_proc_address: library.symbol(c"eglGetProcAddress")?,
                library,
            })
        }
    }

    pub fn library_name(&self) -> &str {
        self.library.name()
    }

    pub fn last_error(&self) -> EGLint {
        unsafe { (self.get_error)() }
    }

    /// ### English
    /// `eglInitialize` on the host display. Initializing an already-initialized display is
    /// allowed by EGL and only bumps its reference count.
    ///
    /// ### 中文
    /// 在宿主 display 上调用 `eglInitialize`。EGL 允许重复初始化，仅增加引用计数。
    ///
    /// # Safety
    /// `display` must be a valid `EGLDisplay`.
    pub unsafe fn initialize(&self, display: EGLDisplay) -> BridgeResult<(EGLint, EGLint)> {
        let (mut major, mut minor) = (0, 0);
        if unsafe { (self.initialize)(display, &mut major, &mut minor) } == EGL_FALSE {
            return Err(BridgeError::EglInitialize(self.last_error()));
        }
        Ok((major, minor))
    }

    pub fn bind_gles_api(&self) -> BridgeResult<()> {
        if unsafe { (self.bind_api)(EGL_OPENGL_ES_API) } == EGL_FALSE {
            return Err(BridgeError::BindApi);
        }
        Ok(())
    }

    /// ### English
    /// Number of configs exposed by `display`, `0` on failure.
    ///
    /// ### 中文
    /// `display` 暴露的 config 数量，失败时为 `0`。
    ///
    /// # Safety
    /// `display` must be an initialized `EGLDisplay`.
    pub unsafe fn config_count(&self, display: EGLDisplay) -> EGLint {
        let mut count = 0;
        if unsafe { (self.get_configs)(display, ptr::null_mut(), 0, &mut count) } == EGL_FALSE {
            return 0;
        }
        count
    }

    /// ### English
    /// First config matching the `EGL_NONE`-terminated `attributes`.
    ///
    /// ### 中文
    /// 返回匹配以 `EGL_NONE` 结尾的 `attributes` 的第一个 config。
    ///
    /// # Safety
    /// `display` must be an initialized `EGLDisplay`; `attributes` must end with `EGL_NONE`.
    pub unsafe fn choose_config(
        &self,
        display: EGLDisplay,
        attributes: &[EGLint],
    ) -> Option<EGLConfig> {
        debug_assert_eq!(attributes.last(), Some(&EGL_NONE));
        let mut config: EGLConfig = ptr::null_mut();
        let mut matched = 0;
        let ok = unsafe {
            (self.choose_config)(display, attributes.as_ptr(), &mut config, 1, &mut matched)
        };
        (ok != EGL_FALSE && matched >= 1 && !config.is_null()).then_some(config)
    }

    /// # Safety
    /// All handles must belong to `display`; `attributes` must end with `EGL_NONE`.
    pub unsafe fn create_context(
        &self,
        display: EGLDisplay,
        config: EGLConfig,
        share: EGLContext,
        attributes: &[EGLint],
    ) -> BridgeResult<EGLContext> {
        let context = unsafe { (self.create_context)(display, config, share, attributes.as_ptr()) };
        if context.is_null() {
            return Err(BridgeError::ContextCreation(self.last_error()));
        }
        Ok(context)
    }

    /// # Safety
    /// `context` must have been created on `display` and not yet destroyed.
    pub unsafe fn destroy_context(&self, display: EGLDisplay, context: EGLContext) {
        unsafe { (self.destroy_context)(display, context) };
    }

    /// # Safety
    /// `config` must belong to `display`; `attributes` must end with `EGL_NONE`.
    pub unsafe fn create_pbuffer_surface(
        &self,
        display: EGLDisplay,
        config: EGLConfig,
        attributes: &[EGLint],
    ) -> BridgeResult<EGLSurface> {
        let surface =
            unsafe { (self.create_pbuffer_surface)(display, config, attributes.as_ptr()) };
        if surface.is_null() {
            return Err(BridgeError::SurfaceCreation(self.last_error()));
        }
        Ok(surface)
    }

    /// # Safety
    /// `surface` must have been created on `display` and not yet destroyed.
    pub unsafe fn destroy_surface(&self, display: EGLDisplay, surface: EGLSurface) {
        unsafe { (self.destroy_surface)(display, surface) };
    }

    /// # Safety
    /// All handles must be valid for `display` (or the `EGL_NO_*` sentinels).
    pub unsafe fn make_current(
        &self,
        display: EGLDisplay,
        draw: EGLSurface,
        read: EGLSurface,
        context: EGLContext,
    ) -> bool {
        unsafe { (self.make_current)(display, draw, read, context) != EGL_FALSE }
    }

    /// ### English
    /// Snapshot of the calling thread's current display/surfaces/context.
    ///
    /// ### 中文
    /// 调用线程当前 display/surface/context 的快照。
    pub fn save_binding(&self) -> SavedBinding {
        unsafe {
            SavedBinding {
                display: (self.get_current_display)(),
                draw: (self.get_current_surface)(EGL_DRAW),
                read: (self.get_current_surface)(EGL_READ),
                context: (self.get_current_context)(),
            }
        }
    }

    /// ### English
    /// Re-binds `saved`. When nothing was current before, releases the private context from
    /// the thread on `fallback_display` instead.
    ///
    /// ### 中文
    /// 重新绑定 `saved`。若之前没有任何 current 绑定，则在 `fallback_display` 上释放私有上下文。
    ///
    /// # Safety
    /// `saved` must come from [`EglApi::save_binding`] on the same thread.
    pub unsafe fn restore_binding(&self, saved: SavedBinding, fallback_display: EGLDisplay) {
        let restored = if saved.display.is_null() {
            unsafe {
                self.make_current(fallback_display, EGL_NO_SURFACE, EGL_NO_SURFACE, EGL_NO_CONTEXT)
            }
        } else {
            unsafe { self.make_current(saved.display, saved.draw, saved.read, saved.context) }
        };
        if !restored {
            log::warn!(
                "failed to restore caller EGL binding (EGL error {:#x})",
                self.last_error()
            );
        }
    }

    /// ### English
    /// `eglGetProcAddress`; null when the function is unknown.
    ///
    /// ### 中文
    /// `eglGetProcAddress`；函数未知时返回 null。
    pub fn proc_address(&self, name: &CStr) -> *const c_void {
        unsafe { (self.get_proc_address)(name.as_ptr()) as *const c_void }
    }
}
