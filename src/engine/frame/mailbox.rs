use std::ffi::c_void;
use std::ptr;
use std::sync::Weak;
use std::sync::atomic::{AtomicPtr, Ordering};

use super::{ExportedImage, RepaintRequest};

/// ### English
/// Single-item staging slot for frames arriving from the producer thread.
///
/// - Publish: compare-exchange from empty. A second frame before the first was consumed is a
///   protocol violation and panics.
/// - Consume: atomic swap to empty.
///
/// ### 中文
/// 来自生产者线程的帧的单元素暂存槽。
///
/// - 发布：从空状态 compare-exchange。上一帧尚未被消费时再次发布属于协议违规，直接 panic。
/// - 消费：原子 swap 为空。
pub struct FrameMailbox {
    staged: AtomicPtr<c_void>,
    repaint: Weak<dyn RepaintRequest>,
}

impl FrameMailbox {
    pub fn new(repaint: Weak<dyn RepaintRequest>) -> Self {
        Self {
            staged: AtomicPtr::new(ptr::null_mut()),
            repaint,
        }
    }

    /// ### English
    /// Stages `image` and asks the owning item for a repaint if it is still alive.
    ///
    /// # Panics
    /// If another image is already staged.
    ///
    /// ### 中文
    /// 暂存 `image`，若所属 item 仍存活则请求重绘。
    ///
    /// # Panics
    /// 已有图像处于暂存状态时 panic。
    pub fn on_frame_ready(&self, image: ExportedImage) {
        if let Err(staged) = self.staged.compare_exchange(
            ptr::null_mut(),
            image.as_raw(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            panic!(
                "frame {:p} exported while frame {staged:p} is still staged; the producer must wait for frame-complete",
                image.as_raw()
            );
        }
        log::trace!("staged exported image {:p}", image.as_raw());

        if let Some(item) = self.repaint.upgrade() {
            item.request_repaint();
        }
    }

    #[inline]
    pub fn is_staged(&self) -> bool {
        !self.staged.load(Ordering::Acquire).is_null()
    }

    #[inline]
    pub fn take(&self) -> Option<ExportedImage> {
        ExportedImage::from_raw(self.staged.swap(ptr::null_mut(), Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[derive(Default)]
    struct CountingRepaint(AtomicUsize);

    impl RepaintRequest for CountingRepaint {
        fn request_repaint(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn mailbox() -> (Arc<CountingRepaint>, FrameMailbox) {
        let repaint = Arc::new(CountingRepaint::default());
        let weak: Weak<dyn RepaintRequest> = Arc::downgrade(&repaint) as _;
        (repaint, FrameMailbox::new(weak))
    }

    #[test]
    fn publish_then_take_empties_the_slot() {
        let (repaint, mailbox) = mailbox();
        let image = ExportedImage::from_addr(0x10);

        mailbox.on_frame_ready(image);
        assert!(mailbox.is_staged());
        assert_eq!(repaint.0.load(Ordering::SeqCst), 1);

        assert_eq!(mailbox.take(), Some(image));
        assert!(!mailbox.is_staged());
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn slot_accepts_a_new_frame_after_consumption() {
        let (repaint, mailbox) = mailbox();
        mailbox.on_frame_ready(ExportedImage::from_addr(0x10));
        mailbox.take();
        mailbox.on_frame_ready(ExportedImage::from_addr(0x20));
        assert_eq!(mailbox.take(), Some(ExportedImage::from_addr(0x20)));
        assert_eq!(repaint.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[should_panic(expected = "still staged")]
    fn second_frame_before_consumption_is_fatal() {
        let (_repaint, mailbox) = mailbox();
        mailbox.on_frame_ready(ExportedImage::from_addr(0x10));
        mailbox.on_frame_ready(ExportedImage::from_addr(0x20));
    }

    #[test]
    fn dropped_item_is_not_asked_to_repaint() {
        let (repaint, mailbox) = mailbox();
        drop(repaint);
        mailbox.on_frame_ready(ExportedImage::from_addr(0x10));
        assert!(mailbox.is_staged());
    }

    #[test]
    fn publish_from_another_thread_is_visible_to_the_consumer() {
        let (repaint, mailbox) = mailbox();
        let mailbox = Arc::new(mailbox);
        let producer = Arc::clone(&mailbox);
        std::thread::spawn(move || producer.on_frame_ready(ExportedImage::from_addr(0x30)))
            .join()
            .unwrap();
        assert_eq!(mailbox.take(), Some(ExportedImage::from_addr(0x30)));
        assert_eq!(repaint.0.load(Ordering::SeqCst), 1);
    }
}
