use std::ffi::c_void;
use std::sync::Arc;

use dpi::PhysicalSize;

use super::api::{
    WpeApi, WpeViewBackend, WpeViewBackendExportableFdo, WpeViewBackendExportableFdoEglClient,
};
use crate::engine::error::{BridgeError, BridgeResult};
use crate::engine::frame::{EglImage, ExportedImage, FrameMailbox, FrameProducer};
use crate::engine::input::wire::{
    TouchBatch, WpeInputAxis2dEvent, WpeInputKeyboardEvent, WpeInputPointerEvent,
};
use crate::engine::input::InputSink;

/// ### English
/// Producer callback: a new frame was exported. Runs on the producer's thread.
///
/// A panic here (double-staged frame) cannot unwind through C and aborts the process.
///
/// ### 中文
/// 生产者回调：有新帧导出。运行在生产者线程上。
///
/// 此处的 panic（重复暂存帧）无法跨 C 栈展开，会直接终止进程。
unsafe extern "C" fn export_fdo_egl_image(data: *mut c_void, image: *mut c_void) {
    if data.is_null() {
        return;
    }
    let Some(image) = ExportedImage::from_raw(image) else {
        log::warn!("producer exported a NULL image");
        return;
    };
    let mailbox = unsafe { &*data.cast::<FrameMailbox>() };
    mailbox.on_frame_ready(image);
}

static EXPORTABLE_CLIENT: WpeViewBackendExportableFdoEglClient =
    WpeViewBackendExportableFdoEglClient {
        export_egl_image: None,
        export_fdo_egl_image: Some(export_fdo_egl_image),
        export_shm_buffer: None,
        _wpe_reserved0: None,
        _wpe_reserved1: None,
    };

/// ### English
/// Owning wrapper around `wpe_view_backend_exportable_fdo`, the engine-side producer.
///
/// ### 中文
/// `wpe_view_backend_exportable_fdo`（引擎侧生产者）的所有权封装。
pub struct FdoExportable {
    api: Arc<WpeApi>,
    exportable: *mut WpeViewBackendExportableFdo,
    backend: *mut WpeViewBackend,
    /// ### English
    /// Callback `data`; must outlive `exportable`.
    ///
    /// ### 中文
    /// 回调的 `data`；生命周期必须长于 `exportable`。
    _mailbox: Arc<FrameMailbox>,
}

impl FdoExportable {
    pub fn new(
        api: Arc<WpeApi>,
        mailbox: Arc<FrameMailbox>,
        size: PhysicalSize<u32>,
    ) -> BridgeResult<Self> {
        let data = Arc::as_ptr(&mailbox).cast::<c_void>().cast_mut();
        let exportable =
            unsafe { (api.exportable_create)(&EXPORTABLE_CLIENT, data, size.width, size.height) };
        if exportable.is_null() {
            return Err(BridgeError::ExportableCreation);
        }
        let backend = unsafe { (api.exportable_get_view_backend)(exportable) };
        log::debug!(
            "created fdo exportable {exportable:p} ({}x{})",
            size.width,
            size.height
        );

        Ok(Self {
            api,
            exportable,
            backend,
            _mailbox: mailbox,
        })
    }

    pub fn add_activity_state(&mut self, state: u32) {
        unsafe { (self.api.add_activity_state)(self.backend, state) };
    }
}

impl FrameProducer for FdoExportable {
    fn egl_image(&self, image: ExportedImage) -> EglImage {
        EglImage(unsafe { (self.api.exported_image_get_egl_image)(image.as_raw()) })
    }

    fn dispatch_frame_complete(&mut self) {
        unsafe { (self.api.dispatch_frame_complete)(self.exportable) };
    }

    fn release_exported_image(&mut self, image: ExportedImage) {
        unsafe { (self.api.dispatch_release_exported_image)(self.exportable, image.as_raw()) };
    }

    fn dispatch_set_size(&mut self, size: PhysicalSize<u32>) {
        unsafe { (self.api.dispatch_set_size)(self.backend, size.width, size.height) };
    }

    fn dispatch_device_scale_factor(&mut self, factor: f32) {
        unsafe { (self.api.dispatch_set_device_scale_factor)(self.backend, factor) };
    }

    fn native_handle(&self) -> *mut c_void {
        self.backend.cast()
    }
}

impl InputSink for FdoExportable {
    fn dispatch_pointer_event(&mut self, event: &WpeInputPointerEvent) {
        let mut event = *event;
        unsafe { (self.api.dispatch_pointer_event)(self.backend, &mut event) };
    }

    fn dispatch_axis_event(&mut self, event: &WpeInputAxis2dEvent) {
        let mut event = *event;
        unsafe { (self.api.dispatch_axis_event)(self.backend, &mut event.base) };
    }

    fn dispatch_keyboard_event(&mut self, event: &WpeInputKeyboardEvent) {
        let mut event = *event;
        unsafe { (self.api.dispatch_keyboard_event)(self.backend, &mut event) };
    }

    fn dispatch_touch_event(&mut self, batch: &TouchBatch) {
        let mut event = batch.as_wire();
        unsafe { (self.api.dispatch_touch_event)(self.backend, &mut event) };
    }
}

impl Drop for FdoExportable {
    fn drop(&mut self) {
        if self.exportable.is_null() {
            return;
        }
        unsafe { (self.api.exportable_destroy)(self.exportable) };
        self.exportable = std::ptr::null_mut();
        self.backend = std::ptr::null_mut();
        log::debug!("destroyed fdo exportable");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::engine::frame::RepaintRequest;

    #[derive(Default)]
    struct CountingRepaint(AtomicUsize);

    impl RepaintRequest for CountingRepaint {
        fn request_repaint(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn mailbox_with_counter() -> (Arc<CountingRepaint>, Arc<FrameMailbox>) {
        let repaint = Arc::new(CountingRepaint::default());
        let weak = Arc::downgrade(&repaint);
        (repaint, Arc::new(FrameMailbox::new(weak)))
    }

    fn callback_data(mailbox: &Arc<FrameMailbox>) -> *mut c_void {
        Arc::as_ptr(mailbox).cast::<c_void>().cast_mut()
    }

    #[test]
    fn exported_image_is_staged_through_the_callback_data() {
        let (repaint, mailbox) = mailbox_with_counter();
        let image = ExportedImage::from_addr(0x4000);

        unsafe { export_fdo_egl_image(callback_data(&mailbox), image.as_raw()) };

        assert!(mailbox.is_staged());
        assert_eq!(repaint.0.load(Ordering::SeqCst), 1);
        assert_eq!(mailbox.take(), Some(image));
    }

    #[test]
    fn null_image_is_ignored() {
        let (repaint, mailbox) = mailbox_with_counter();

        unsafe { export_fdo_egl_image(callback_data(&mailbox), std::ptr::null_mut()) };

        assert!(!mailbox.is_staged());
        assert_eq!(repaint.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn null_callback_data_is_ignored() {
        let (repaint, mailbox) = mailbox_with_counter();
        let image = ExportedImage::from_addr(0x5000);

        unsafe { export_fdo_egl_image(std::ptr::null_mut(), image.as_raw()) };

        assert!(!mailbox.is_staged());
        assert_eq!(repaint.0.load(Ordering::SeqCst), 0);
    }
}
