use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Weak};

use dpi::{LogicalSize, PhysicalSize};

use super::{FrameExchangeBackend, ViewBackend, viewport_for};
use crate::engine::frame::{
    EglImage, ExportedImage, FrameMailbox, FrameProducer, RepaintRequest, TextureId,
};
use crate::engine::input::wire::WPE_INPUT_POINTER_EVENT_TYPE_MOTION;
use crate::engine::input::{
    InputSink, TouchBatch, WpeInputAxis2dEvent, WpeInputKeyboardEvent, WpeInputPointerEvent,
};
use crate::engine::rendering::FrameCompositor;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Bind,
    Unbind(u32),
    CreateTexture(PhysicalSize<u32>),
    ResizeTexture(TextureId, PhysicalSize<u32>),
    Draw(TextureId, EglImage, PhysicalSize<u32>),
    FrameComplete,
    Release(ExportedImage),
    SetSize(PhysicalSize<u32>),
    Scale(f32),
    Pointer(WpeInputPointerEvent),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

struct FakeProducer {
    log: CallLog,
}

impl FrameProducer for FakeProducer {
    fn egl_image(&self, image: ExportedImage) -> EglImage {
        EglImage(image.as_raw())
    }

    fn dispatch_frame_complete(&mut self) {
        self.log.borrow_mut().push(Call::FrameComplete);
    }

    fn release_exported_image(&mut self, image: ExportedImage) {
        self.log.borrow_mut().push(Call::Release(image));
    }

    fn dispatch_set_size(&mut self, size: PhysicalSize<u32>) {
        self.log.borrow_mut().push(Call::SetSize(size));
    }

    fn dispatch_device_scale_factor(&mut self, factor: f32) {
        self.log.borrow_mut().push(Call::Scale(factor));
    }
}

impl InputSink for FakeProducer {
    fn dispatch_pointer_event(&mut self, event: &WpeInputPointerEvent) {
        self.log.borrow_mut().push(Call::Pointer(*event));
    }

    fn dispatch_axis_event(&mut self, _event: &WpeInputAxis2dEvent) {}

    fn dispatch_keyboard_event(&mut self, _event: &WpeInputKeyboardEvent) {}

    fn dispatch_touch_event(&mut self, _batch: &TouchBatch) {}
}

struct FakeCompositor {
    log: CallLog,
    ready: bool,
    bindable: bool,
    next_texture: TextureId,
    binding_depth: u32,
}

impl FrameCompositor for FakeCompositor {
    type Binding = u32;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn bind(&mut self) -> Option<u32> {
        if !self.bindable {
            return None;
        }
        self.log.borrow_mut().push(Call::Bind);
        self.binding_depth += 1;
        Some(self.binding_depth)
    }

    fn unbind(&mut self, saved: u32) {
        assert_eq!(saved, self.binding_depth, "unbind must hand back the saved binding");
        self.binding_depth -= 1;
        self.log.borrow_mut().push(Call::Unbind(saved));
    }

    fn create_texture(&mut self, size: PhysicalSize<u32>) -> TextureId {
        self.log.borrow_mut().push(Call::CreateTexture(size));
        let texture = self.next_texture;
        self.next_texture += 1;
        texture
    }

    fn resize_texture(&mut self, texture: TextureId, size: PhysicalSize<u32>) {
        self.log.borrow_mut().push(Call::ResizeTexture(texture, size));
    }

    fn draw_image(&mut self, texture: TextureId, image: EglImage, viewport: PhysicalSize<u32>) {
        self.log
            .borrow_mut()
            .push(Call::Draw(texture, image, viewport));
    }
}

struct NoRepaint;

impl RepaintRequest for NoRepaint {
    fn request_repaint(&self) {}
}

type TestBackend = FrameExchangeBackend<FakeProducer, FakeCompositor>;

fn backend_with(width: f64, height: f64, ready: bool) -> (CallLog, TestBackend) {
    let log = CallLog::default();
    let repaint: Weak<dyn RepaintRequest> = Weak::<NoRepaint>::new();
    let mailbox = Arc::new(FrameMailbox::new(repaint));
    let backend = FrameExchangeBackend::from_parts(
        mailbox,
        FakeProducer { log: log.clone() },
        FakeCompositor {
            log: log.clone(),
            ready,
            bindable: true,
            next_texture: 1,
            binding_depth: 0,
        },
        LogicalSize::new(width, height),
    );
    (log, backend)
}

fn backend(width: f64, height: f64) -> (CallLog, TestBackend) {
    backend_with(width, height, true)
}

fn image(n: usize) -> ExportedImage {
    ExportedImage::from_addr(0x1000 * n)
}

fn releases(log: &CallLog) -> Vec<ExportedImage> {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Release(image) => Some(*image),
            _ => None,
        })
        .collect()
}

#[test]
fn end_to_end_two_frames_at_800x480() {
    let (log, mut backend) = backend(800.0, 480.0);
    assert_eq!(backend.acquire_texture(), 0);

    backend.mailbox().on_frame_ready(image(1));
    let texture = backend.acquire_texture();
    assert_ne!(texture, 0);
    assert_eq!(
        *log.borrow(),
        vec![
            Call::Bind,
            Call::CreateTexture(PhysicalSize::new(800, 480)),
            Call::Draw(texture, EglImage(image(1).as_raw()), PhysicalSize::new(800, 480)),
            Call::FrameComplete,
            Call::Unbind(1),
        ]
    );
    assert!(releases(&log).is_empty(), "frame A is still held");

    backend.mailbox().on_frame_ready(image(2));
    assert_eq!(backend.acquire_texture(), texture);
    assert_eq!(releases(&log), vec![image(1)]);

    assert_eq!(backend.acquire_texture(), texture);
    assert_eq!(releases(&log), vec![image(1)], "frame B is held until the next frame");

    drop(backend);
    assert_eq!(releases(&log), vec![image(1), image(2)]);
}

#[test]
fn superseded_frame_is_released_after_frame_complete() {
    let (log, mut backend) = backend(64.0, 64.0);
    backend.mailbox().on_frame_ready(image(1));
    backend.acquire_texture();
    log.borrow_mut().clear();

    backend.mailbox().on_frame_ready(image(2));
    backend.acquire_texture();

    let calls = log.borrow();
    let complete = calls.iter().position(|c| *c == Call::FrameComplete);
    let release = calls.iter().position(|c| *c == Call::Release(image(1)));
    assert!(complete < release);
    assert_eq!(calls.last(), Some(&Call::Unbind(1)));
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateTexture(_))));
}

#[test]
fn acquire_without_new_frame_is_idempotent() {
    let (log, mut backend) = backend(320.0, 200.0);
    backend.mailbox().on_frame_ready(image(1));
    let first = backend.acquire_texture();
    let calls_after_first = log.borrow().len();

    assert_eq!(backend.acquire_texture(), first);
    assert_eq!(backend.acquire_texture(), first);
    assert_eq!(log.borrow().len(), calls_after_first);
}

#[test]
fn every_frame_is_released_exactly_once() {
    let (log, mut backend) = backend(100.0, 100.0);
    for n in 1..=10 {
        backend.mailbox().on_frame_ready(image(n));
        backend.acquire_texture();
        if n % 3 == 0 {
            backend.acquire_texture();
        }
    }
    backend.mailbox().on_frame_ready(image(11));
    drop(backend);

    let mut released = releases(&log);
    released.sort_by_key(|image| image.as_raw() as usize);
    let expected: Vec<_> = (1..=11).map(image).collect();
    assert_eq!(released, expected);
}

#[test]
fn drop_releases_a_frame_that_was_never_acquired() {
    let (log, backend) = backend(10.0, 10.0);
    backend.mailbox().on_frame_ready(image(7));
    drop(backend);
    assert_eq!(releases(&log), vec![image(7)]);
}

#[test]
fn valid_resize_updates_viewport_and_reallocates_in_place() {
    let (log, mut backend) = backend(800.0, 480.0);
    backend.mailbox().on_frame_ready(image(1));
    let texture = backend.acquire_texture();

    backend.resize(LogicalSize::new(1024.0, 768.0));
    assert_eq!(backend.viewport(), PhysicalSize::new(1024, 768));
    assert!(log.borrow().contains(&Call::SetSize(PhysicalSize::new(1024, 768))));

    backend.mailbox().on_frame_ready(image(2));
    assert_eq!(backend.acquire_texture(), texture);
    let calls = log.borrow();
    assert!(calls.contains(&Call::ResizeTexture(texture, PhysicalSize::new(1024, 768))));
    assert!(calls.contains(&Call::Draw(
        texture,
        EglImage(image(2).as_raw()),
        PhysicalSize::new(1024, 768)
    )));
}

#[test]
fn invalid_resize_changes_nothing() {
    let (log, mut backend) = backend(800.0, 480.0);
    for (width, height) in [(0.0, 480.0), (800.0, 0.0), (-5.0, 10.0), (f64::NAN, 10.0)] {
        backend.resize(LogicalSize::new(width, height));
    }
    assert_eq!(backend.viewport(), PhysicalSize::new(800, 480));
    assert!(log.borrow().is_empty());
}

#[test]
fn scale_factor_is_stored_and_forwarded() {
    let (log, mut backend) = backend(1.0, 1.0);
    backend.set_scale_factor(2.0);
    assert_eq!(backend.scale(), 2.0);
    assert_eq!(*log.borrow(), vec![Call::Scale(2.0)]);
}

#[test]
fn compositor_not_ready_leaves_frame_staged() {
    let (log, mut backend) = backend_with(100.0, 100.0, false);
    backend.mailbox().on_frame_ready(image(1));
    assert_eq!(backend.acquire_texture(), 0);
    assert!(backend.mailbox().is_staged());
    assert!(log.borrow().is_empty());
}

#[test]
fn unbindable_context_leaves_frame_staged_and_texture_unchanged() {
    let (log, mut backend) = backend(100.0, 100.0);
    backend.mailbox().on_frame_ready(image(1));
    let texture = backend.acquire_texture();
    log.borrow_mut().clear();

    backend.compositor.bindable = false;
    backend.mailbox().on_frame_ready(image(2));
    assert_eq!(backend.acquire_texture(), texture);
    assert!(backend.mailbox().is_staged());
    assert!(log.borrow().is_empty(), "nothing may be drawn or signalled");

    backend.compositor.bindable = true;
    assert_eq!(backend.acquire_texture(), texture);
    assert!(!backend.mailbox().is_staged());
    assert_eq!(releases(&log), vec![image(1)]);
    assert!(log.borrow().contains(&Call::FrameComplete));
}

#[test]
fn unbindable_context_before_first_frame_returns_zero() {
    let (log, mut backend) = backend(100.0, 100.0);
    backend.compositor.bindable = false;
    backend.mailbox().on_frame_ready(image(1));
    assert_eq!(backend.acquire_texture(), 0);
    assert!(backend.mailbox().is_staged());
    assert!(log.borrow().is_empty());

    drop(backend);
    assert_eq!(releases(&log), vec![image(1)]);
}

#[test]
#[should_panic(expected = "still staged")]
fn second_frame_before_acquire_is_fatal() {
    let (_log, backend) = backend(100.0, 100.0);
    backend.mailbox().on_frame_ready(image(1));
    backend.mailbox().on_frame_ready(image(2));
}

#[test]
fn input_is_forwarded_to_the_producer() {
    let (log, mut backend) = backend(100.0, 100.0);
    let event = WpeInputPointerEvent {
        r#type: WPE_INPUT_POINTER_EVENT_TYPE_MOTION,
        x: 3,
        y: 4,
        ..Default::default()
    };
    ViewBackend::input(&mut backend).dispatch_pointer_event(&event);
    assert_eq!(*log.borrow(), vec![Call::Pointer(event)]);
}

#[test]
fn viewport_rounds_logical_size() {
    assert_eq!(
        viewport_for(LogicalSize::new(800.4, 479.6)),
        PhysicalSize::new(800, 480)
    );
    assert_eq!(viewport_for(LogicalSize::new(-3.0, f64::NAN)), PhysicalSize::new(0, 0));
}
