use std::rc::Rc;
use std::sync::Arc;

use dpi::PhysicalSize;
use gleam::gl::{self, Gl};
use glow::HasContext as _;

use super::FrameCompositor;
use super::blit::{self, BlitProgram, ImageTargetTexture2dOes};
use super::parse_gl_version;
use super::private_context::EglPrivateContext;
use crate::engine::egl::{EGLContext, EGLDisplay, EglApi, SavedBinding};
use crate::engine::error::{BridgeError, BridgeResult};
use crate::engine::frame::{EglImage, TextureId};

/// ### English
/// Upper bound for the CPU wait on the copy fence: one frame at 60 Hz.
///
/// ### 中文
/// 复制 fence 的 CPU 等待上限：60 Hz 下的一帧。
const COPY_FENCE_TIMEOUT_NS: i32 = 16_666_666;

/// ### English
/// [`FrameCompositor`] backed by a private EGL context sharing objects with the host.
///
/// ### 中文
/// 基于与宿主共享对象的私有 EGL 上下文的 [`FrameCompositor`]。
pub struct EglCompositor {
    /// ### English
    /// gleam GL API used for the blit and texture management.
    ///
    /// ### 中文
    /// 用于 blit 与纹理管理的 gleam GL API。
    gl: Rc<dyn Gl>,
    /// ### English
    /// glow GL API used for fence/sync and version queries.
    ///
    /// ### 中文
    /// 用于 fence/sync 与版本查询的 glow GL API。
    glow: glow::Context,
    blit: BlitProgram,
    /// ### English
    /// `glEGLImageTargetTexture2DOES`, resolved once per instance.
    ///
    /// ### 中文
    /// `glEGLImageTargetTexture2DOES`，每个实例解析一次。
    image_target: ImageTargetTexture2dOes,
    /// ### English
    /// GLES 3.0+ fence sync is available; otherwise the copy is completed with `glFinish`.
    ///
    /// ### 中文
    /// 是否可用 GLES 3.0+ 的 fence sync；否则用 `glFinish` 完成复制。
    fence_sync: bool,
    textures: Vec<TextureId>,
    context: EglPrivateContext,
}

impl EglCompositor {
    /// ### English
    /// Creates the private context on `display` (sharing with `host_context`), resolves the
    /// image-import extension and builds the blit program.
    ///
    /// The caller's EGL binding is restored before returning, on success and on failure.
    ///
    /// ### 中文
    /// 在 `display` 上创建私有上下文（与 `host_context` 共享），解析图像导入扩展并构建 blit
    /// 程序。
    ///
    /// 无论成功与否，返回前都会恢复调用方的 EGL 绑定。
    pub fn new(
        egl: Arc<EglApi>,
        display: EGLDisplay,
        host_context: EGLContext,
    ) -> BridgeResult<Self> {
        let context = EglPrivateContext::new(egl, display, host_context)?;

        let address = context
            .egl()
            .proc_address(c"glEGLImageTargetTexture2DOES");
        if address.is_null() {
            return Err(BridgeError::MissingExtension("glEGLImageTargetTexture2DOES"));
        }
        let image_target: ImageTargetTexture2dOes = unsafe { std::mem::transmute(address) };

        let saved = context
            .make_current()
            .map_err(BridgeError::ContextCreation)?;

        let gl = unsafe { gl::GlesFns::load_with(|name| context.proc_address(name)) };
        let glow = unsafe { glow::Context::from_loader_function(|name| context.proc_address(name)) };

        let version = unsafe { glow.get_parameter_string(glow::VERSION) };
        let (major, _) = parse_gl_version(&version);
        log::debug!("private context GL version: {version}");

        let blit = BlitProgram::new(&gl);
        context.restore(saved);

        Ok(Self {
            gl,
            glow,
            blit: blit?,
            image_target,
            fence_sync: major >= 3,
            textures: Vec::new(),
            context,
        })
    }

    fn wait_for_copy(&self) {
        if self.fence_sync {
            if let Ok(fence) =
                unsafe { self.glow.fence_sync(glow::SYNC_GPU_COMMANDS_COMPLETE, 0) }
            {
                let status = unsafe {
                    self.glow.client_wait_sync(
                        fence,
                        glow::SYNC_FLUSH_COMMANDS_BIT,
                        COPY_FENCE_TIMEOUT_NS,
                    )
                };
                unsafe { self.glow.delete_sync(fence) };
                if status == glow::ALREADY_SIGNALED || status == glow::CONDITION_SATISFIED {
                    return;
                }
                log::trace!("copy fence not signalled within one frame ({status:#x})");
            }
        }
        self.gl.finish();
    }
}

impl FrameCompositor for EglCompositor {
    type Binding = SavedBinding;

    fn is_ready(&self) -> bool {
        self.context.has_surface()
    }

    fn bind(&mut self) -> Option<SavedBinding> {
        self.context.make_current().ok()
    }

    fn unbind(&mut self, saved: SavedBinding) {
        self.context.restore(saved);
    }

    fn create_texture(&mut self, size: PhysicalSize<u32>) -> TextureId {
        let texture = blit::create_target_texture(&self.gl, size);
        self.textures.push(texture);
        log::debug!(
            "created persistent texture {texture} ({}x{})",
            size.width,
            size.height
        );
        texture
    }

    fn resize_texture(&mut self, texture: TextureId, size: PhysicalSize<u32>) {
        blit::resize_target_texture(&self.gl, texture, size);
    }

    fn draw_image(&mut self, texture: TextureId, image: EglImage, viewport: PhysicalSize<u32>) {
        self.blit
            .draw(&self.gl, self.image_target, texture, image, viewport);
        self.wait_for_copy();
    }
}

impl Drop for EglCompositor {
    /// ### English
    /// Deletes GL objects with the private context current; the context itself is destroyed
    /// afterwards when the `context` field drops.
    ///
    /// ### 中文
    /// 在私有上下文为 current 时删除 GL 对象；随后 `context` 字段 drop 时销毁上下文本身。
    fn drop(&mut self) {
        let Ok(saved) = self.context.make_current() else {
            log::warn!("leaking blit objects: private context could not be made current");
            return;
        };
        self.blit.delete(&self.gl);
        if !self.textures.is_empty() {
            self.gl.delete_textures(&self.textures);
        }
        self.context.restore(saved);
    }
}
