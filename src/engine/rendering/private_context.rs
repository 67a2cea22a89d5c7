//! ### English
//! Private EGL context + 1x1 pbuffer surface used only for the import/blit.
//!
//! The context shares objects with the host's context, so texture names created here are valid
//! on the host's render thread.
//!
//! ### 中文
//! 仅用于导入/blit 的私有 EGL 上下文 + 1x1 pbuffer surface。
//!
//! 该上下文与宿主上下文共享对象，因此这里创建的纹理名在宿主渲染线程上同样有效。

use std::ffi::{CString, c_void};
use std::ptr;
use std::sync::Arc;

use crate::engine::egl::{
    EGL_ALPHA_SIZE, EGL_BLUE_SIZE, EGL_CONTEXT_CLIENT_VERSION, EGL_GREEN_SIZE, EGL_HEIGHT,
    EGL_NO_CONTEXT, EGL_NO_SURFACE, EGL_NONE, EGL_OPENGL_ES2_BIT, EGL_PBUFFER_BIT, EGL_RED_SIZE,
    EGL_RENDERABLE_TYPE, EGL_SURFACE_TYPE, EGL_WIDTH, EGLConfig, EGLContext, EGLDisplay,
    EGLSurface, EglApi, SavedBinding,
};
use crate::engine::error::{BridgeError, BridgeResult};

const CONFIG_ATTRIBUTES: [i32; 13] = [
    EGL_SURFACE_TYPE,
    EGL_PBUFFER_BIT,
    EGL_RED_SIZE,
    1,
    EGL_GREEN_SIZE,
    1,
    EGL_BLUE_SIZE,
    1,
    EGL_ALPHA_SIZE,
    1,
    EGL_RENDERABLE_TYPE,
    EGL_OPENGL_ES2_BIT,
    EGL_NONE,
];

const CONTEXT_ATTRIBUTES: [i32; 3] = [EGL_CONTEXT_CLIENT_VERSION, 2, EGL_NONE];

const PBUFFER_ATTRIBUTES: [i32; 5] = [EGL_WIDTH, 1, EGL_HEIGHT, 1, EGL_NONE];

pub(super) struct EglPrivateContext {
    egl: Arc<EglApi>,
    display: EGLDisplay,
    config: EGLConfig,
    context: EGLContext,
    surface: EGLSurface,
}

impl EglPrivateContext {
    /// ### English
    /// Picks a pbuffer-capable GLES2 RGBA config on `display` and creates a context sharing
    /// objects with `share_context`, plus a 1x1 pbuffer surface to make it current on.
    ///
    /// #### Parameters
    /// - `egl`: Loaded EGL entry points.
    /// - `display`: Host `EGLDisplay`, already initialized.
    /// - `share_context`: Host context whose objects must be visible to the private context.
    ///
    /// ### 中文
    /// 在 `display` 上选择支持 pbuffer 的 GLES2 RGBA config，创建与 `share_context` 共享对象的
    /// 上下文，以及用于 make-current 的 1x1 pbuffer surface。
    ///
    /// #### 参数
    /// - `egl`：已加载的 EGL 入口点。
    /// - `display`：已初始化的宿主 `EGLDisplay`。
    /// - `share_context`：其对象需对私有上下文可见的宿主上下文。
    pub(super) fn new(
        egl: Arc<EglApi>,
        display: EGLDisplay,
        share_context: EGLContext,
    ) -> BridgeResult<Self> {
        if unsafe { egl.config_count(display) } < 1 {
            return Err(BridgeError::NoMatchingConfig);
        }
        let config = unsafe { egl.choose_config(display, &CONFIG_ATTRIBUTES) }
            .ok_or(BridgeError::NoMatchingConfig)?;

        let context =
            unsafe { egl.create_context(display, config, share_context, &CONTEXT_ATTRIBUTES)? };

        let mut this = Self {
            egl,
            display,
            config,
            context,
            surface: EGL_NO_SURFACE,
        };
        this.surface = unsafe {
            this.egl
                .create_pbuffer_surface(display, this.config, &PBUFFER_ATTRIBUTES)?
        };

        log::debug!(
            "created private EGL context {:p} sharing with {share_context:p}",
            this.context
        );
        Ok(this)
    }

    pub(super) fn egl(&self) -> &EglApi {
        &self.egl
    }

    pub(super) fn has_surface(&self) -> bool {
        !self.surface.is_null() && !self.context.is_null()
    }

    /// ### English
    /// Saves the caller's binding and makes the private context current.
    ///
    /// On `eglMakeCurrent` failure the caller's binding is put back and the EGL error code is
    /// returned.
    ///
    /// ### 中文
    /// 保存调用方绑定并使私有上下文成为 current。
    ///
    /// `eglMakeCurrent` 失败时恢复调用方的绑定，并返回 EGL 错误码。
    pub(super) fn make_current(&self) -> Result<SavedBinding, i32> {
        let saved = self.egl.save_binding();
        let ok = unsafe {
            self.egl
                .make_current(self.display, self.surface, self.surface, self.context)
        };
        if ok {
            return Ok(saved);
        }
        let error = self.egl.last_error();
        log::warn!("eglMakeCurrent on private context failed (EGL error {error:#x})");
        self.restore(saved);
        Err(error)
    }

    pub(super) fn restore(&self, saved: SavedBinding) {
        unsafe { self.egl.restore_binding(saved, self.display) };
    }

    /// ### English
    /// GL loader callback shared by gleam and glow.
    ///
    /// ### 中文
    /// gleam 与 glow 共用的 GL 加载回调。
    pub(super) fn proc_address(&self, name: &str) -> *const c_void {
        match CString::new(name) {
            Ok(name) => self.egl.proc_address(&name),
            Err(_) => ptr::null(),
        }
    }
}

impl Drop for EglPrivateContext {
    fn drop(&mut self) {
        unsafe {
            if self.egl.save_binding().context() == self.context {
                self.egl
                    .make_current(self.display, EGL_NO_SURFACE, EGL_NO_SURFACE, EGL_NO_CONTEXT);
            }
            if !self.surface.is_null() {
                self.egl.destroy_surface(self.display, self.surface);
                self.surface = EGL_NO_SURFACE;
            }
            if !self.context.is_null() {
                self.egl.destroy_context(self.display, self.context);
                self.context = EGL_NO_CONTEXT;
            }
        }
        log::debug!("destroyed private EGL context");
    }
}
