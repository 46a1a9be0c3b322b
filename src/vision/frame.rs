//! Captured frames and the capture seam.

use super::error::{AssetError, CaptureError};
use image::{GrayImage, Luma};
use std::path::Path;
use tracing::debug;

/// A single grayscale capture of the display.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    image: GrayImage,
}

impl Frame {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }

    /// A uniformly filled frame.
    pub fn blank(width: u32, height: u32, level: u8) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([level])),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }
}

impl From<GrayImage> for Frame {
    fn from(image: GrayImage) -> Self {
        Self::new(image)
    }
}

/// Anything that can produce the current display image on demand.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

/// Plays back stored screenshots, one per capture, looping at the end.
///
/// Useful for replaying a recorded session against a state graph without
/// touching the real display.
pub struct ReplayFrameSource {
    frames: Vec<Frame>,
    cursor: usize,
}

impl ReplayFrameSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }

    /// Load screenshots from image files, in order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, AssetError> {
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                return Err(AssetError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let image = image::open(path).map_err(|e| AssetError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            debug!(path = %path.display(), "loaded replay frame");
            frames.push(Frame::new(image.to_luma8()));
        }
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplayFrameSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        if self.frames.is_empty() {
            return Err(CaptureError::Unavailable(
                "replay source has no frames".to_string(),
            ));
        }
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_frame_has_requested_size() {
        let frame = Frame::blank(64, 48, 10);
        assert_eq!((frame.width(), frame.height()), (64, 48));
        assert_eq!(frame.image().get_pixel(5, 5)[0], 10);
    }

    #[test]
    fn replay_cycles_through_frames() {
        let mut source = ReplayFrameSource::new(vec![
            Frame::blank(4, 4, 1),
            Frame::blank(4, 4, 2),
        ]);

        let levels: Vec<u8> = (0..3)
            .map(|_| source.capture().unwrap().image().get_pixel(0, 0)[0])
            .collect();

        assert_eq!(levels, vec![1, 2, 1]);
    }

    #[test]
    fn empty_replay_reports_unavailable() {
        let mut source = ReplayFrameSource::new(Vec::new());
        assert!(matches!(
            source.capture(),
            Err(CaptureError::Unavailable(_))
        ));
    }

    #[test]
    fn replay_from_missing_file_fails() {
        let result = ReplayFrameSource::from_files(&["/definitely/not/here.png"]);
        assert!(matches!(result, Err(AssetError::FileNotFound { .. })));
    }

    #[test]
    fn replay_loads_saved_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        GrayImage::from_pixel(8, 6, Luma([77])).save(&path).unwrap();

        let mut source = ReplayFrameSource::from_files(&[&path]).unwrap();
        let frame = source.capture().unwrap();

        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.image().get_pixel(3, 3)[0], 77);
    }
}
