use crate::traits::EffectLayer;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Mask opacities for the park reveal, from just below opaque down to exactly zero.
#[derive(Debug, Clone)]
pub struct FadeAnimation {
    step: f32,
    frame: u32,
    frames: u32,
}

impl FadeAnimation {
    pub fn new(step: f32) -> Self {
        // epsilon keeps 1/0.1 from rounding up to an extra frame
        let frames = if step > 0.0 {
            (1.0 / step - 1e-4).ceil().max(1.0) as u32
        } else {
            1
        };
        FadeAnimation {
            step,
            frame: 0,
            frames,
        }
    }

    /// Plays one opacity per frame until finished or `cancel` fires.
    pub async fn play(
        self,
        effects: Arc<dyn EffectLayer>,
        frame: Duration,
        cancel: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(frame);
        for opacity in self {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = interval.tick() => effects.set_mask_opacity(opacity),
            }
        }
    }
}

impl Iterator for FadeAnimation {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.frame >= self.frames {
            return None;
        }
        self.frame += 1;
        if self.frame == self.frames {
            return Some(0.0);
        }
        Some((1.0 - self.frame as f32 * self.step).max(0.0))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.frames - self.frame) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for FadeAnimation {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::MemoryMap;

    #[test]
    fn test_default_step_takes_ten_frames() {
        let frames: Vec<f32> = FadeAnimation::new(0.1).collect();
        assert_eq!(frames.len(), 10);
        assert!((frames[0] - 0.9).abs() < 1e-6);
        assert_eq!(*frames.last().unwrap(), 0.0);
        assert!(frames.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_uneven_step_still_ends_at_zero() {
        let frames: Vec<f32> = FadeAnimation::new(0.3).collect();
        assert_eq!(frames.len(), 4);
        assert!((frames[2] - 0.1).abs() < 1e-6);
        assert_eq!(frames[3], 0.0);
    }

    #[test]
    fn test_non_positive_step_is_finite() {
        assert_eq!(FadeAnimation::new(0.0).collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(FadeAnimation::new(-1.0).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_reaches_transparent() {
        let map = Arc::new(MemoryMap::new(Vec::new()));
        FadeAnimation::new(0.25)
            .play(map.clone(), Duration::from_millis(16), CancellationToken::new())
            .await;
        assert_eq!(map.snapshot().mask_opacity, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_play_stops_early() {
        let map = Arc::new(MemoryMap::new(Vec::new()));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(FadeAnimation::new(0.1).play(
            map.clone(),
            Duration::from_millis(16),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        task.await.unwrap();

        let opacity = map.snapshot().mask_opacity;
        assert!(opacity > 0.5, "fade should stop after a couple of frames, got {}", opacity);
    }
}
