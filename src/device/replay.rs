// Capture provider that replays PNG frames from a directory
use super::types::CaptureProvider;
use crate::error::{BotError, BotResult};
use crate::vision::Frame;
use std::path::{Path, PathBuf};

/// Replays `*.png` files from a directory in file-name order.
///
/// Sequence numbers keep increasing across loops so consumers never see a
/// frame number twice.
pub struct DirectoryCapture {
    dir: PathBuf,
    files: Vec<PathBuf>,
    index: usize,
    seq: u64,
    loop_replay: bool,
    expected_size: Option<(u32, u32)>,
}

impl DirectoryCapture {
    pub fn new(dir: impl Into<PathBuf>, loop_replay: bool) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            index: 0,
            seq: 0,
            loop_replay,
            expected_size: None,
        }
    }

    /// Reject frames that do not match the configured capture geometry
    pub fn with_expected_size(mut self, width: u32, height: u32) -> Self {
        self.expected_size = Some((width, height));
        self
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn scan(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl CaptureProvider for DirectoryCapture {
    async fn connect(&mut self) -> BotResult<()> {
        let files = Self::scan(&self.dir).map_err(|e| BotError::CaptureUnavailable {
            attempts: 1,
            description: format!("cannot read {}: {e}", self.dir.display()),
        })?;
        if files.is_empty() {
            return Err(BotError::CaptureUnavailable {
                attempts: 1,
                description: format!("no PNG frames in {}", self.dir.display()),
            });
        }

        log::info!("📼 Replaying {} frames from {}", files.len(), self.dir.display());
        self.files = files;
        self.index = 0;
        Ok(())
    }

    async fn next_frame(&mut self) -> BotResult<Option<Frame>> {
        if self.index >= self.files.len() {
            if !self.loop_replay || self.files.is_empty() {
                return Ok(None);
            }
            self.index = 0;
        }

        let path = self.files[self.index].clone();
        self.index += 1;
        self.seq += 1;

        if !path.exists() {
            return Err(BotError::CaptureConnectionLost {
                description: format!("frame {} disappeared", path.display()),
            });
        }

        let image = image::open(&path)
            .map_err(|source| BotError::FrameDecode {
                path: path.clone(),
                source,
            })?
            .to_rgb8();

        if let Some((width, height)) = self.expected_size
            && image.dimensions() != (width, height)
        {
            return Err(BotError::FrameSizeMismatch {
                seq: self.seq,
                width: image.width(),
                height: image.height(),
                expected_width: width,
                expected_height: height,
            });
        }

        Ok(Some(Frame::new(self.seq, image)))
    }

    fn is_exhausted(&self) -> bool {
        !self.loop_replay && self.index >= self.files.len()
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.dir.display())
    }
}
