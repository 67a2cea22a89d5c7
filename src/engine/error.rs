//! ### English
//! Construction errors for the frame exchange backend.
//!
//! Every variant is fatal for view creation: the backend is either fully built or not built at
//! all, there is no half-initialized state to recover from.
//!
//! ### 中文
//! 帧交换后端的构造错误。
//!
//! 每个变体对 view 创建都是致命的：后端要么完整构造，要么不构造，不存在可恢复的半初始化状态。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host EGL display is EGL_NO_DISPLAY")]
    InvalidDisplay,

    #[error("failed to load {library}: {reason}")]
    LibraryLoad { library: String, reason: String },

    #[error("symbol {0} not found")]
    MissingSymbol(&'static str),

    #[error("eglInitialize failed (EGL error {0:#x})")]
    EglInitialize(i32),

    #[error("eglBindAPI(EGL_OPENGL_ES_API) failed")]
    BindApi,

    #[error("wpe_fdo_initialize_for_egl_display failed")]
    ImageExportInit,

    #[error("no EGL config matches the requested attributes")]
    NoMatchingConfig,

    #[error("eglCreateContext failed (EGL error {0:#x})")]
    ContextCreation(i32),

    #[error("eglCreatePbufferSurface failed (EGL error {0:#x})")]
    SurfaceCreation(i32),

    #[error("required GL extension function {0} is unavailable")]
    MissingExtension(&'static str),

    #[error("wpe_view_backend_exportable_fdo_egl_create returned NULL")]
    ExportableCreation,

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("program link failed: {0}")]
    ProgramLink(String),
}

/// ### English
/// Result alias used by every fallible constructor in the engine.
///
/// ### 中文
/// 引擎中所有可失败构造函数使用的 Result 别名。
pub type BridgeResult<T> = Result<T, BridgeError>;
