use super::ExportedImage;

/// ### English
/// The two images the consumer may hold: `current` (being texture-bound during a consume step)
/// and `previous` (last displayed frame, waiting to be released).
///
/// ### 中文
/// 消费者可持有的两张图像：`current`（本次消费步骤中正在绑定为纹理）与 `previous`
/// （上一次显示的帧，等待释放）。
#[derive(Debug, Default)]
pub struct FrameSlots {
    current: Option<ExportedImage>,
    previous: Option<ExportedImage>,
}

impl FrameSlots {
    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<ExportedImage> {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn previous(&self) -> Option<ExportedImage> {
        self.previous
    }

    /// ### English
    /// Moves a freshly consumed image into `current`. Returns an image that was still sitting
    /// in `current` (only possible if a previous consume step never retired), which the caller
    /// must release.
    ///
    /// ### 中文
    /// 将刚消费的图像放入 `current`。若 `current` 中仍残留图像（仅当上一轮消费未执行 retire
    /// 时可能发生）则将其返回，由调用方负责释放。
    pub fn promote(&mut self, image: ExportedImage) -> Option<ExportedImage> {
        self.current.replace(image)
    }

    /// ### English
    /// Ends a consume step: `current` becomes `previous`, and the image it supersedes is
    /// returned for release.
    ///
    /// ### 中文
    /// 结束一次消费步骤：`current` 变为 `previous`，被替换下来的图像返回给调用方释放。
    pub fn retire(&mut self) -> Option<ExportedImage> {
        let superseded = self.previous.take();
        self.previous = self.current.take();
        superseded
    }

    /// ### English
    /// Empties both slots, yielding every held image once.
    ///
    /// ### 中文
    /// 清空两个槽位，每张持有的图像恰好产出一次。
    pub fn drain(&mut self) -> impl Iterator<Item = ExportedImage> + use<> {
        [self.current.take(), self.previous.take()].into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_and_retire_keep_at_most_two_images() {
        let a = ExportedImage::from_addr(0xa0);
        let b = ExportedImage::from_addr(0xb0);
        let c = ExportedImage::from_addr(0xc0);
        let mut slots = FrameSlots::default();

        assert_eq!(slots.promote(a), None);
        assert_eq!(slots.retire(), None);
        assert_eq!((slots.current(), slots.previous()), (None, Some(a)));

        assert_eq!(slots.promote(b), None);
        assert_eq!((slots.current(), slots.previous()), (Some(b), Some(a)));
        assert_eq!(slots.retire(), Some(a));

        slots.promote(c);
        assert_eq!(slots.retire(), Some(b));
        assert_eq!((slots.current(), slots.previous()), (None, Some(c)));
    }

    #[test]
    fn promote_over_unretired_current_hands_back_the_old_image() {
        let mut slots = FrameSlots::default();
        slots.promote(ExportedImage::from_addr(0x1));
        assert_eq!(
            slots.promote(ExportedImage::from_addr(0x2)),
            Some(ExportedImage::from_addr(0x1))
        );
    }

    #[test]
    fn drain_yields_each_held_image_once() {
        let mut slots = FrameSlots::default();
        slots.promote(ExportedImage::from_addr(0x1));
        slots.retire();
        slots.promote(ExportedImage::from_addr(0x2));

        let drained: Vec<_> = slots.drain().collect();
        assert_eq!(
            drained,
            vec![ExportedImage::from_addr(0x2), ExportedImage::from_addr(0x1)]
        );
        assert_eq!(slots.drain().count(), 0);
    }
}
