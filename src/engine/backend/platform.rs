//! ### English
//! Real backend construction over EGL + WPEBackend-fdo.
//!
//! ### 中文
//! 基于 EGL + WPEBackend-fdo 的真实后端构造。

use std::sync::{Arc, Weak};

use dpi::LogicalSize;

use super::{BackendFactory, FrameExchangeBackend, HostWindow, ViewBackend, viewport_for};
use crate::engine::config::LibraryNames;
use crate::engine::egl::EglApi;
use crate::engine::error::{BridgeError, BridgeResult};
use crate::engine::frame::{FrameMailbox, RepaintRequest};
use crate::engine::rendering::EglCompositor;
use crate::engine::wpe::{
    FdoExportable, WPE_VIEW_ACTIVITY_STATE_FOCUSED, WPE_VIEW_ACTIVITY_STATE_IN_WINDOW,
    WPE_VIEW_ACTIVITY_STATE_VISIBLE, WpeApi,
};

pub type WpeFrameExchangeBackend = FrameExchangeBackend<FdoExportable, EglCompositor>;

/// ### English
/// Builds the platform backend for `window`.
///
/// Fails without constructing anything if the display is `EGL_NO_DISPLAY`, a library or
/// symbol is missing, the fdo image export cannot be initialized for the display, no
/// pbuffer-capable GLES2 config exists, the private context or surface cannot be created, or
/// `glEGLImageTargetTexture2DOES` cannot be resolved.
///
/// #### Parameters
/// - `size`: Initial logical item size.
/// - `window`: Host display and scene graph context.
/// - `repaint`: Weak link back to the owning item.
/// - `libraries`: Sonames to load.
/// - `announce_activity`: Add `visible | focused | in_window` once built.
///
/// ### 中文
/// 为 `window` 构造平台后端。
///
/// 以下任一情况都会失败且不构造任何对象：display 为 `EGL_NO_DISPLAY`、库或符号缺失、
/// 无法为该 display 初始化 fdo 图像导出、不存在支持 pbuffer 的 GLES2 config、
/// 私有上下文或 surface 创建失败、无法解析 `glEGLImageTargetTexture2DOES`。
///
/// #### 参数
/// - `size`：初始逻辑尺寸。
/// - `window`：宿主 display 与场景图上下文。
/// - `repaint`：指回所属 item 的弱引用。
/// - `libraries`：需要加载的 soname。
/// - `announce_activity`：构造完成后是否添加 `visible | focused | in_window`。
pub fn create_wpe_backend(
    size: LogicalSize<f64>,
    window: &HostWindow,
    repaint: Weak<dyn RepaintRequest>,
    libraries: &LibraryNames,
    announce_activity: bool,
) -> BridgeResult<WpeFrameExchangeBackend> {
    let display = window.egl_display;
    if display.is_null() {
        return Err(BridgeError::InvalidDisplay);
    }

    let egl = Arc::new(EglApi::load(&libraries.egl)?);
    let (major, minor) = unsafe { egl.initialize(display)? };
    log::debug!("EGL {major}.{minor} initialized from {}", egl.library_name());
    egl.bind_gles_api()?;

    let wpe = Arc::new(WpeApi::load(libraries)?);
    unsafe { wpe.initialize_for_egl_display(display)? };

    let compositor = EglCompositor::new(egl, display, window.egl_context)?;

    let mailbox = Arc::new(FrameMailbox::new(repaint));
    let mut exportable = FdoExportable::new(wpe, Arc::clone(&mailbox), viewport_for(size))?;
    if announce_activity {
        exportable.add_activity_state(
            WPE_VIEW_ACTIVITY_STATE_VISIBLE
                | WPE_VIEW_ACTIVITY_STATE_FOCUSED
                | WPE_VIEW_ACTIVITY_STATE_IN_WINDOW,
        );
    }

    Ok(FrameExchangeBackend::from_parts(
        mailbox, exportable, compositor, size,
    ))
}

/// ### English
/// [`BackendFactory`] producing [`WpeFrameExchangeBackend`]s.
///
/// ### 中文
/// 生成 [`WpeFrameExchangeBackend`] 的 [`BackendFactory`]。
#[derive(Clone, Debug)]
pub struct WpeBackendFactory {
    pub libraries: LibraryNames,
    pub announce_activity: bool,
}

impl Default for WpeBackendFactory {
    fn default() -> Self {
        Self {
            libraries: LibraryNames::from_env(),
            announce_activity: true,
        }
    }
}

impl BackendFactory for WpeBackendFactory {
    fn create(
        &self,
        size: LogicalSize<f64>,
        window: &HostWindow,
        repaint: Weak<dyn RepaintRequest>,
    ) -> BridgeResult<Box<dyn ViewBackend>> {
        let backend = create_wpe_backend(
            size,
            window,
            repaint,
            &self.libraries,
            self.announce_activity,
        )?;
        Ok(Box::new(backend))
    }
}
