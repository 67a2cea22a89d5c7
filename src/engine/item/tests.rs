use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dpi::{LogicalPosition, LogicalSize, PhysicalSize};

use super::*;
use crate::engine::error::BridgeError;
use crate::engine::flags::WPE_VIEW_BRIDGE_VIEW_FLAG_IGNORE_SCALE_FOR_INPUT;
use crate::engine::input::{
    HostKey, InputSink, TouchBatch, TouchPointState, WpeInputAxis2dEvent, WpeInputKeyboardEvent,
    WpeInputPointerEvent,
};

#[derive(Clone, Debug, PartialEq)]
enum Seen {
    Created(LogicalSize<f64>, f64),
    Scale(f32),
    Resize(LogicalSize<f64>),
    Pointer(WpeInputPointerEvent),
    Axis(WpeInputAxis2dEvent),
    Key(WpeInputKeyboardEvent),
    Touch(usize),
    Dropped,
}

type SeenLog = Rc<RefCell<Vec<Seen>>>;

struct FakeBackend {
    log: SeenLog,
    texture: Rc<Cell<TextureId>>,
}

impl InputSink for FakeBackend {
    fn dispatch_pointer_event(&mut self, event: &WpeInputPointerEvent) {
        self.log.borrow_mut().push(Seen::Pointer(*event));
    }

    fn dispatch_axis_event(&mut self, event: &WpeInputAxis2dEvent) {
        self.log.borrow_mut().push(Seen::Axis(*event));
    }

    fn dispatch_keyboard_event(&mut self, event: &WpeInputKeyboardEvent) {
        self.log.borrow_mut().push(Seen::Key(*event));
    }

    fn dispatch_touch_event(&mut self, batch: &TouchBatch) {
        self.log.borrow_mut().push(Seen::Touch(batch.points.len()));
    }
}

impl ViewBackend for FakeBackend {
    fn acquire_texture(&mut self) -> TextureId {
        self.texture.get()
    }

    fn texture_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(640, 360)
    }

    fn resize(&mut self, size: LogicalSize<f64>) {
        self.log.borrow_mut().push(Seen::Resize(size));
    }

    fn set_scale_factor(&mut self, factor: f32) {
        self.log.borrow_mut().push(Seen::Scale(factor));
    }

    fn input(&mut self) -> &mut dyn InputSink {
        self
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Seen::Dropped);
    }
}

struct FakeFactory {
    log: SeenLog,
    texture: Rc<Cell<TextureId>>,
    fail: bool,
}

impl BackendFactory for FakeFactory {
    fn create(
        &self,
        size: LogicalSize<f64>,
        window: &HostWindow,
        _repaint: Weak<dyn RepaintRequest>,
    ) -> BridgeResult<Box<dyn ViewBackend>> {
        if self.fail {
            return Err(BridgeError::InvalidDisplay);
        }
        self.log
            .borrow_mut()
            .push(Seen::Created(size, window.device_pixel_ratio));
        Ok(Box::new(FakeBackend {
            log: self.log.clone(),
            texture: self.texture.clone(),
        }))
    }
}

#[derive(Default)]
struct CountingRepaint(AtomicUsize);

impl RepaintRequest for CountingRepaint {
    fn request_repaint(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    item: SceneItem,
    log: SeenLog,
    texture: Rc<Cell<TextureId>>,
}

fn harness_with(flags: u32, fail: bool) -> Harness {
    let log = SeenLog::default();
    let texture = Rc::new(Cell::new(0));
    let factory = FakeFactory {
        log: log.clone(),
        texture: texture.clone(),
        fail,
    };
    let item = SceneItem::new(
        Box::new(factory),
        Arc::new(CountingRepaint::default()),
        flags,
    );
    Harness { item, log, texture }
}

fn harness() -> Harness {
    harness_with(0, false)
}

fn window(ready: bool) -> HostWindow {
    HostWindow {
        egl_display: std::ptr::without_provenance_mut(0x10),
        egl_context: std::ptr::without_provenance_mut(0x20),
        device_pixel_ratio: 2.0,
        scene_graph_initialized: ready,
    }
}

fn at(x: f64, y: f64) -> LogicalPosition<f64> {
    LogicalPosition::new(x, y)
}

fn created_count(log: &SeenLog) -> usize {
    log.borrow()
        .iter()
        .filter(|seen| matches!(seen, Seen::Created(..)))
        .count()
}

#[test]
fn backend_is_created_once_the_scene_graph_is_ready() {
    let mut h = harness();
    h.item.geometry_changed(LogicalSize::new(320.0, 180.0));
    h.item.set_window(Some(window(false))).expect("window");
    assert!(!h.item.is_backend_ready());
    assert_eq!(created_count(&h.log), 0);

    h.item.scene_graph_initialized().expect("backend");
    assert!(h.item.is_backend_ready());
    assert_eq!(
        *h.log.borrow(),
        vec![
            Seen::Created(LogicalSize::new(320.0, 180.0), 2.0),
            Seen::Scale(2.0)
        ]
    );

    h.item.scene_graph_initialized().expect("second signal");
    h.item.set_window(Some(window(true))).expect("same window");
    assert_eq!(created_count(&h.log), 1);
}

#[test]
fn window_with_initialized_scene_graph_creates_immediately() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    assert!(h.item.is_backend_ready());
}

#[test]
fn scene_graph_signal_without_window_does_nothing() {
    let mut h = harness();
    h.item.scene_graph_initialized().expect("no window");
    assert!(!h.item.is_backend_ready());
    assert!(h.log.borrow().is_empty());
}

#[test]
fn failed_creation_stays_uninitialized() {
    let mut h = harness_with(0, true);
    let result = h.item.set_window(Some(window(true)));
    assert!(matches!(result, Err(BridgeError::InvalidDisplay)));
    assert!(!h.item.is_backend_ready());
    assert!(!h.item.is_destroyed());
    assert_eq!(h.item.update_paint_node(), None);
}

#[test]
fn paint_node_needs_a_backend_and_a_presented_frame() {
    let mut h = harness();
    h.item.geometry_changed(LogicalSize::new(320.0, 180.0));
    assert_eq!(h.item.update_paint_node(), None);

    h.item.set_window(Some(window(true))).expect("backend");
    assert_eq!(h.item.update_paint_node(), None);

    h.texture.set(5);
    assert_eq!(
        h.item.update_paint_node(),
        Some(PaintNode {
            texture: 5,
            texture_size: PhysicalSize::new(640, 360),
            item_size: LogicalSize::new(320.0, 180.0),
            has_alpha: true,
        })
    );
}

#[test]
fn geometry_and_scale_reach_the_backend_after_creation() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    h.log.borrow_mut().clear();

    h.item.geometry_changed(LogicalSize::new(100.0, 50.0));
    h.item.set_device_pixel_ratio(1.5);
    assert_eq!(
        *h.log.borrow(),
        vec![Seen::Resize(LogicalSize::new(100.0, 50.0)), Seen::Scale(1.5)]
    );
    assert_eq!(h.item.size(), LogicalSize::new(100.0, 50.0));
}

#[test]
fn input_before_the_backend_is_dropped() {
    let mut h = harness();
    h.item.mouse_press(1, at(1.0, 1.0), PointerButton::Left);
    h.item.wheel(2, at(1.0, 1.0), AngleDelta { x: 0, y: 120 });
    h.item.touch(3, &[]);
    assert!(h.log.borrow().is_empty());
}

#[test]
fn pointer_input_is_scaled_by_the_device_pixel_ratio() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    h.log.borrow_mut().clear();

    h.item.mouse_press(1, at(10.0, 20.0), PointerButton::Left);
    let log = h.log.borrow();
    let Some(Seen::Pointer(event)) = log.first() else {
        panic!("expected a pointer event, got {log:?}");
    };
    assert_eq!((event.x, event.y, event.button), (20, 40, 1));
}

#[test]
fn empty_touch_batch_is_still_dispatched() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    h.log.borrow_mut().clear();

    h.item.touch(5, &[]);
    h.item.touch(
        6,
        &[HostTouchPoint {
            id: 1,
            position: at(2.0, 3.0),
            state: TouchPointState::Pressed,
        }],
    );
    assert_eq!(*h.log.borrow(), vec![Seen::Touch(0), Seen::Touch(1)]);
}

#[test]
fn ignore_scale_flag_keeps_input_in_logical_units() {
    let mut h = harness_with(WPE_VIEW_BRIDGE_VIEW_FLAG_IGNORE_SCALE_FOR_INPUT, false);
    h.item.set_window(Some(window(true))).expect("backend");
    h.log.borrow_mut().clear();

    h.item.mouse_move(1, at(10.0, 20.0));
    let log = h.log.borrow();
    let Some(Seen::Pointer(event)) = log.first() else {
        panic!("expected a pointer event, got {log:?}");
    };
    assert_eq!((event.x, event.y), (10, 20));
}

#[test]
fn hover_moves_outside_a_hover_session_are_not_dispatched() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    h.log.borrow_mut().clear();

    h.item.hover_move(1, at(1.0, 1.0));
    assert!(h.log.borrow().is_empty());

    h.item.hover_enter();
    h.item.hover_move(2, at(1.0, 1.0));
    h.item.hover_leave();
    h.item.hover_move(3, at(1.0, 1.0));
    assert_eq!(h.log.borrow().len(), 1);
}

#[test]
fn ime_text_becomes_a_commit_event() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    h.log.borrow_mut().clear();

    let mut event = HostKeyEvent {
        timestamp: 9,
        key: HostKey::Other(0),
        native_virtual_key: 0,
        native_scan_code: 0,
        modifiers: KeyboardModifiers::empty(),
        text: "你好".to_string(),
    };
    assert_eq!(
        h.item.key(&event, true, KeyboardModifiers::empty()),
        KeyDispatch::Committed
    );
    assert_eq!(
        h.item.key(&event, false, KeyboardModifiers::empty()),
        KeyDispatch::Ignored
    );
    assert_eq!(
        h.item.poll_event(),
        Some(ViewEvent::TextCommitted("你好".to_string()))
    );
    assert!(h.log.borrow().is_empty());

    event.native_virtual_key = 0x61;
    event.native_scan_code = 38;
    assert_eq!(
        h.item.key(&event, true, KeyboardModifiers::empty()),
        KeyDispatch::Dispatched
    );
    assert!(matches!(h.log.borrow().as_slice(), [Seen::Key(_)]));
    assert_eq!(h.item.poll_event(), None);
}

#[test]
fn keys_are_ignored_without_a_backend() {
    let mut h = harness();
    let event = HostKeyEvent {
        timestamp: 1,
        key: HostKey::Return,
        native_virtual_key: 0,
        native_scan_code: 36,
        modifiers: KeyboardModifiers::empty(),
        text: String::new(),
    };
    assert_eq!(
        h.item.key(&event, true, KeyboardModifiers::empty()),
        KeyDispatch::Ignored
    );
}

#[test]
fn load_notifications_are_queued_in_order() {
    let mut h = harness();
    h.item.notify_load_started("https://example.org/");
    h.item.notify_load_failed("https://example.org/", false, "boom");
    h.item.notify_load_finished("https://example.org/");
    h.item.notify_web_process_terminated();

    let statuses: Vec<_> = std::iter::from_fn(|| h.item.poll_event())
        .map(|event| match event {
            ViewEvent::LoadingChanged(request) => Some(request.status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![Some(LoadStatus::Started), Some(LoadStatus::Failed), None]
    );
}

#[derive(Default)]
struct RecordingRequest {
    answer: Rc<RefCell<Option<Result<Vec<PathBuf>, ()>>>>,
}

impl FileChooserRequest for RecordingRequest {
    fn select_files(self: Box<Self>, files: &[PathBuf]) {
        *self.answer.borrow_mut() = Some(Ok(files.to_vec()));
    }

    fn cancel(self: Box<Self>) {
        *self.answer.borrow_mut() = Some(Err(()));
    }
}

#[test]
fn file_selection_round_trip_through_the_item() {
    let mut h = harness();
    let request = RecordingRequest::default();
    let answer = request.answer.clone();

    h.item
        .begin_file_selection(Box::new(request), false, vec!["image/png".to_string()]);
    assert_eq!(
        h.item.poll_event(),
        Some(ViewEvent::FileSelectionRequested {
            multiple: false,
            mime_types: vec!["image/png".to_string()],
        })
    );

    h.item.confirm_file_selection(&["file:///tmp/a.png", "file:///tmp/b.png"]);
    assert_eq!(
        *answer.borrow(),
        Some(Ok(vec![PathBuf::from("/tmp/a.png")]))
    );
}

#[test]
fn destroy_drops_the_backend_and_cancels_pending_selection() {
    let mut h = harness();
    h.item.set_window(Some(window(true))).expect("backend");
    let request = RecordingRequest::default();
    let answer = request.answer.clone();
    h.item.begin_file_selection(Box::new(request), true, Vec::new());

    h.item.destroy();
    assert!(h.item.is_destroyed());
    assert_eq!(h.log.borrow().last(), Some(&Seen::Dropped));
    assert_eq!(*answer.borrow(), Some(Err(())));
    assert!(h.item.native_handle().is_null());

    h.item.destroy();
    h.item.scene_graph_initialized().expect("destroyed item ignores signals");
    assert_eq!(created_count(&h.log), 1);
}
