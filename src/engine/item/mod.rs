//! ### English
//! Scene item: the scene-graph-visible node embedding one web view.
//!
//! Owns the backend's lifecycle (Uninitialized → BackendReady → Destroyed), forwards geometry
//! and input, pulls one texture per paint and queues engine notifications for its owner.
//!
//! ### 中文
//! 场景 item：在场景图中可见、嵌入一个 web view 的节点。
//!
//! 管理后端生命周期（Uninitialized → BackendReady → Destroyed），转发几何变化与输入，
//! 每次绘制拉取一次纹理，并为所有者排队引擎通知。
mod events;
mod file_chooser;

use std::ffi::c_void;
use std::sync::Arc;

use crossbeam_channel as channel;
use dpi::{LogicalPosition, LogicalSize, PhysicalSize};

use crate::engine::backend::{BackendFactory, HostWindow, ViewBackend};
use crate::engine::error::BridgeResult;
use crate::engine::flags::{WPE_VIEW_BRIDGE_VIEW_FLAG_IGNORE_SCALE_FOR_INPUT, has_flag};
use crate::engine::frame::{RepaintRequest, TextureId};
use crate::engine::input::{
    AngleDelta, HostKeyEvent, HostTouchPoint, InputTranslator, KeyTranslation, KeyboardModifiers,
    PointerButton,
};

pub use events::{LoadRequest, LoadStatus, LoadTracker, ViewEvent};
pub use file_chooser::{FileChooser, FileChooserRequest};

/// ### English
/// Description of the texture node the host should display this paint pass.
///
/// ### 中文
/// 本次绘制中宿主应显示的纹理节点描述。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintNode {
    pub texture: TextureId,
    pub texture_size: PhysicalSize<u32>,
    /// ### English
    /// Item bounding rect size; the rect's origin is the item's own `(0, 0)`.
    ///
    /// ### 中文
    /// item 包围矩形的尺寸；矩形原点为 item 自身的 `(0, 0)`。
    pub item_size: LogicalSize<f64>,
    pub has_alpha: bool,
}

/// ### English
/// What happened to one key event.
///
/// ### 中文
/// 单个按键事件的处理结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDispatch {
    Dispatched,
    Committed,
    Ignored,
}

enum ItemState {
    Uninitialized,
    BackendReady(Box<dyn ViewBackend>),
    Destroyed,
}

pub struct SceneItem {
    state: ItemState,
    /// ### English
    /// Latest geometry; the backend's initial size when it is created.
    ///
    /// ### 中文
    /// 最新几何尺寸；后端创建时作为其初始尺寸。
    size: LogicalSize<f64>,
    window: Option<HostWindow>,
    factory: Box<dyn BackendFactory>,
    /// ### English
    /// Strong end of the backend's weak repaint link.
    ///
    /// ### 中文
    /// 后端弱重绘链接的强引用端。
    repaint: Arc<dyn RepaintRequest>,
    translator: InputTranslator,
    ignore_scale_for_input: bool,
    events_tx: channel::Sender<ViewEvent>,
    events_rx: channel::Receiver<ViewEvent>,
    load_tracker: LoadTracker,
    file_chooser: FileChooser,
}

impl SceneItem {
    /// ### English
    /// Creates an item in the Uninitialized state.
    ///
    /// #### Parameters
    /// - `factory`: Builds the backend once the window is ready.
    /// - `repaint`: Called (from any thread) when a new frame is staged.
    /// - `flags`: `WPE_VIEW_BRIDGE_VIEW_FLAG_*` bitmask.
    ///
    /// ### 中文
    /// 创建处于 Uninitialized 状态的 item。
    ///
    /// #### 参数
    /// - `factory`：窗口就绪后用于构造后端。
    /// - `repaint`：有新帧暂存时（可能在任意线程）调用。
    /// - `flags`：`WPE_VIEW_BRIDGE_VIEW_FLAG_*` 位掩码。
    pub fn new(
        factory: Box<dyn BackendFactory>,
        repaint: Arc<dyn RepaintRequest>,
        flags: u32,
    ) -> Self {
        let (events_tx, events_rx) = channel::unbounded();
        Self {
            state: ItemState::Uninitialized,
            size: LogicalSize::new(0.0, 0.0),
            window: None,
            factory,
            repaint,
            translator: InputTranslator::default(),
            ignore_scale_for_input: has_flag(flags, WPE_VIEW_BRIDGE_VIEW_FLAG_IGNORE_SCALE_FOR_INPUT),
            events_tx,
            events_rx,
            load_tracker: LoadTracker::default(),
            file_chooser: FileChooser::default(),
        }
    }

    pub fn is_backend_ready(&self) -> bool {
        matches!(self.state, ItemState::BackendReady(_))
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, ItemState::Destroyed)
    }

    pub fn size(&self) -> LogicalSize<f64> {
        self.size
    }

    fn backend_mut(&mut self) -> Option<&mut (dyn ViewBackend + 'static)> {
        match &mut self.state {
            ItemState::BackendReady(backend) => Some(backend.as_mut()),
            _ => None,
        }
    }

    fn emit(&self, event: ViewEvent) {
        // Receiver lives as long as the item.
        let _ = self.events_tx.send(event);
    }

    /// ### English
    /// Assigns (or clears) the host window. If the window's scene graph is already
    /// initialized the backend is created right away.
    ///
    /// ### 中文
    /// 设置（或清除）宿主窗口。若该窗口的场景图已初始化，则立即创建后端。
    pub fn set_window(&mut self, window: Option<HostWindow>) -> BridgeResult<()> {
        self.window = window;
        match window {
            Some(window) if window.scene_graph_initialized => self.create_backend(),
            _ => Ok(()),
        }
    }

    /// ### English
    /// The assigned window's scene graph became ready.
    ///
    /// ### 中文
    /// 已设置窗口的场景图已就绪。
    pub fn scene_graph_initialized(&mut self) -> BridgeResult<()> {
        match self.window.as_mut() {
            Some(window) => {
                window.scene_graph_initialized = true;
                self.create_backend()
            }
            None => Ok(()),
        }
    }

    fn create_backend(&mut self) -> BridgeResult<()> {
        if !matches!(self.state, ItemState::Uninitialized) {
            return Ok(());
        }
        let Some(window) = self.window else {
            return Ok(());
        };

        let mut backend = match self.factory.create(
            self.size,
            &window,
            Arc::downgrade(&self.repaint),
        ) {
            Ok(backend) => backend,
            Err(err) => {
                log::error!("web view backend creation failed: {err}");
                return Err(err);
            }
        };
        backend.set_scale_factor(window.device_pixel_ratio as f32);
        self.apply_input_scale(window.device_pixel_ratio);
        self.state = ItemState::BackendReady(backend);
        log::debug!(
            "web view backend ready ({}x{} @ {})",
            self.size.width,
            self.size.height,
            window.device_pixel_ratio
        );
        Ok(())
    }

    fn apply_input_scale(&mut self, device_pixel_ratio: f64) {
        let scale = if self.ignore_scale_for_input {
            1.0
        } else {
            device_pixel_ratio
        };
        self.translator.set_scale(scale);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        if let Some(window) = self.window.as_mut() {
            window.device_pixel_ratio = ratio;
        }
        if let Some(backend) = self.backend_mut() {
            backend.set_scale_factor(ratio as f32);
            self.apply_input_scale(ratio);
        }
    }

    pub fn geometry_changed(&mut self, size: LogicalSize<f64>) {
        self.size = size;
        if let Some(backend) = self.backend_mut() {
            backend.resize(size);
        }
    }

    /// ### English
    /// One paint pass: acquires the backend texture. `None` before the backend exists or
    /// while no frame has been presented yet.
    ///
    /// ### 中文
    /// 一次绘制：获取后端纹理。后端尚不存在或尚未呈现过任何帧时返回 `None`。
    pub fn update_paint_node(&mut self) -> Option<PaintNode> {
        let item_size = self.size;
        let backend = self.backend_mut()?;
        let texture = backend.acquire_texture();
        if texture == 0 {
            return None;
        }
        Some(PaintNode {
            texture,
            texture_size: backend.texture_size(),
            item_size,
            has_alpha: true,
        })
    }

    /// ### English
    /// Engine-side view backend handle for attaching the web view; null before BackendReady.
    ///
    /// ### 中文
    /// 用于挂接 web view 的引擎侧 view backend 句柄；BackendReady 之前为 null。
    pub fn native_handle(&self) -> *mut c_void {
        match &self.state {
            ItemState::BackendReady(backend) => backend.native_handle(),
            _ => std::ptr::null_mut(),
        }
    }

    pub fn hover_enter(&mut self) {
        self.translator.hover_enter();
    }

    pub fn hover_leave(&mut self) {
        self.translator.hover_leave();
    }

    pub fn hover_move(&mut self, timestamp: u64, position: LogicalPosition<f64>) {
        let Some(event) = self.translator.hover_move(timestamp, position) else {
            return;
        };
        if let Some(backend) = self.backend_mut() {
            backend.input().dispatch_pointer_event(&event);
        }
    }

    pub fn mouse_move(&mut self, timestamp: u64, position: LogicalPosition<f64>) {
        let event = self.translator.mouse_move(timestamp, position);
        if let Some(backend) = self.backend_mut() {
            backend.input().dispatch_pointer_event(&event);
        }
    }

    pub fn mouse_press(
        &mut self,
        timestamp: u64,
        position: LogicalPosition<f64>,
        button: PointerButton,
    ) {
        let event = self.translator.mouse_press(timestamp, position, button);
        if let Some(backend) = self.backend_mut() {
            backend.input().dispatch_pointer_event(&event);
        }
    }

    pub fn mouse_release(
        &mut self,
        timestamp: u64,
        position: LogicalPosition<f64>,
        button: PointerButton,
    ) {
        let event = self.translator.mouse_release(timestamp, position, button);
        if let Some(backend) = self.backend_mut() {
            backend.input().dispatch_pointer_event(&event);
        }
    }

    pub fn wheel(&mut self, timestamp: u64, position: LogicalPosition<f64>, delta: AngleDelta) {
        let event = self.translator.wheel(timestamp, position, delta);
        if let Some(backend) = self.backend_mut() {
            backend.input().dispatch_axis_event(&event);
        }
    }

    /// ### English
    /// Translates and dispatches a key event. IME commits are surfaced as
    /// [`ViewEvent::TextCommitted`].
    ///
    /// ### 中文
    /// 转换并派发按键事件。输入法提交以 [`ViewEvent::TextCommitted`] 上报。
    pub fn key(
        &mut self,
        event: &HostKeyEvent,
        pressed: bool,
        global_modifiers: KeyboardModifiers,
    ) -> KeyDispatch {
        let translation = self.translator.key(event, pressed, global_modifiers);
        if !self.is_backend_ready() {
            return KeyDispatch::Ignored;
        }
        match translation {
            KeyTranslation::Key(wire) => {
                if let Some(backend) = self.backend_mut() {
                    backend.input().dispatch_keyboard_event(&wire);
                }
                KeyDispatch::Dispatched
            }
            KeyTranslation::Commit(text) => {
                self.emit(ViewEvent::TextCommitted(text));
                KeyDispatch::Committed
            }
            KeyTranslation::Swallowed => KeyDispatch::Ignored,
        }
    }

    pub fn touch(&mut self, timestamp: u64, points: &[HostTouchPoint]) {
        let batch = self.translator.touch(timestamp, points);
        if let Some(backend) = self.backend_mut() {
            backend.input().dispatch_touch_event(&batch);
        }
    }

    pub fn notify_load_started(&mut self, url: &str) {
        let request = self.load_tracker.started(url);
        self.emit(ViewEvent::LoadingChanged(request));
    }

    pub fn notify_load_finished(&mut self, url: &str) {
        if let Some(request) = self.load_tracker.finished(url) {
            self.emit(ViewEvent::LoadingChanged(request));
        }
    }

    pub fn notify_load_failed(&mut self, failing_url: &str, cancelled: bool, message: &str) {
        let request = self.load_tracker.failed(failing_url, cancelled, message);
        log::debug!("load of {failing_url} failed: {message}");
        self.emit(ViewEvent::LoadingChanged(request));
    }

    pub fn notify_web_process_terminated(&mut self) {
        log::warn!("web process terminated");
        self.emit(ViewEvent::WebProcessCrashed);
    }

    pub fn poll_event(&self) -> Option<ViewEvent> {
        self.events_rx.try_recv().ok()
    }

    pub fn begin_file_selection(
        &mut self,
        request: Box<dyn FileChooserRequest>,
        multiple: bool,
        mime_types: Vec<String>,
    ) {
        let event = self.file_chooser.begin(request, multiple, mime_types);
        self.emit(event);
    }

    pub fn confirm_file_selection<S: AsRef<str>>(&mut self, entries: &[S]) {
        self.file_chooser.confirm(entries);
    }

    pub fn cancel_file_selection(&mut self) {
        self.file_chooser.cancel();
    }

    /// ### English
    /// Terminal transition: drops the backend (releasing held frames, then the producer, then
    /// the GPU context) and cancels any outstanding file request. Idempotent.
    ///
    /// ### 中文
    /// 终止状态迁移：销毁后端（依次释放持有的帧、生产者、GPU 上下文），并取消未完成的文件请求。
    /// 可重复调用。
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.file_chooser.cancel();
        self.state = ItemState::Destroyed;
        log::debug!("scene item destroyed");
    }
}

impl Drop for SceneItem {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests;
