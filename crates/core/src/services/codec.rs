//! External media codec seam.
//!
//! HEIC conversion and video frame extraction go through ffmpeg/ffprobe
//! subprocesses. The trait keeps the rest of the crate testable without the
//! binaries installed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use galerie_common::{AppError, AppResult, MediaConfig};

/// Operations delegated to an external codec.
#[async_trait]
pub trait MediaCodec: Send + Sync {
    /// Convert a HEIC image into a JPEG at `dest`.
    async fn heic_to_jpeg(&self, source: &Path, dest: &Path) -> AppResult<()>;

    /// Duration of a video in seconds.
    async fn video_duration_secs(&self, source: &Path) -> AppResult<f64>;

    /// Extract a single frame at the given offset, returned as PNG bytes.
    async fn extract_frame(&self, source: &Path, at_secs: f64) -> AppResult<Vec<u8>>;
}

/// Codec shelling out to ffmpeg and ffprobe.
pub struct FfmpegCodec {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

impl FfmpegCodec {
    #[must_use]
    pub fn new(media: &MediaConfig) -> Self {
        Self {
            ffmpeg: media.ffmpeg_path.clone(),
            ffprobe: media.ffprobe_path.clone(),
            timeout: Duration::from_secs(media.codec_timeout_secs),
        }
    }

    /// Run a prepared command to completion, enforcing the timeout and a
    /// zero exit status. Returns captured stdout.
    async fn run(&self, program: &str, command: &mut Command) -> AppResult<Vec<u8>> {
        command.stdin(Stdio::null()).kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| AppError::Codec(format!("{program} timed out")))?
            .map_err(|e| AppError::Codec(format!("{program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Codec(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaCodec for FfmpegCodec {
    async fn heic_to_jpeg(&self, source: &Path, dest: &Path) -> AppResult<()> {
        debug!(source = %source.display(), dest = %dest.display(), "converting heic");

        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(source)
            .arg("-y")
            .arg(dest);

        self.run(&self.ffmpeg, &mut command).await?;
        Ok(())
    }

    async fn video_duration_secs(&self, source: &Path) -> AppResult<f64> {
        let mut command = Command::new(&self.ffprobe);
        command
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(source);

        let stdout = self.run(&self.ffprobe, &mut command).await?;
        let text = String::from_utf8_lossy(&stdout);
        text.trim()
            .parse::<f64>()
            .map_err(|_| AppError::Codec(format!("unparseable duration `{}`", text.trim())))
    }

    async fn extract_frame(&self, source: &Path, at_secs: f64) -> AppResult<Vec<u8>> {
        debug!(source = %source.display(), at_secs, "extracting video frame");

        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-v")
            .arg("error")
            .arg("-ss")
            .arg(format!("{at_secs:.3}"))
            .arg("-i")
            .arg(source)
            .arg("-frames:v")
            .arg("1")
            .arg("-f")
            .arg("image2pipe")
            .arg("-vcodec")
            .arg("png")
            .arg("-");

        let stdout = self.run(&self.ffmpeg, &mut command).await?;
        if stdout.is_empty() {
            return Err(AppError::Codec("no frame produced".to_string()));
        }
        Ok(stdout)
    }
}
