use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::{Context, Result};
use raylib::prelude::*;
use tracing::{info, warn};

/// Encodes rendered frames to an H.264 MP4 through an `ffmpeg` child process.
pub struct Ffmpeg {
    process: Child,
    stdin: Option<ChildStdin>,
}

impl Ffmpeg {
    pub fn new(width: i32, height: i32, fps: u32, video_path: &Path) -> Result<Ffmpeg> {
        let mut process = Command::new("ffmpeg")
            .stdin(Stdio::piped())
            .args(["-loglevel", "error"])
            .arg("-y")
            .args(["-f", "rawvideo"])
            .args(["-pixel_format", "rgba"])
            .args(["-video_size", &format!("{width}x{height}")])
            .args(["-framerate", &fps.to_string()])
            .args(["-i", "-"])
            .args(["-c:v", "libx264"])
            .args(["-pix_fmt", "yuv420p"])
            .arg(video_path)
            .spawn()
            .context("failed to start ffmpeg")?;
        let stdin = process.stdin.take().context("failed to open ffmpeg stdin")?;
        info!(path = %video_path.display(), width, height, fps, "recording");
        Ok(Ffmpeg {
            process,
            stdin: Some(stdin),
        })
    }

    /// Writes one RGBA frame. Render textures are stored bottom-up, so rows
    /// are sent in reverse order.
    pub fn write(&mut self, image: &Image) -> Result<()> {
        let stdin = self.stdin.as_mut().context("ffmpeg stdin already closed")?;
        let row_len = image.width() as usize * 4;
        let height = image.height() as usize;
        let colors = image.get_image_data();
        let pixels: Vec<u8> = colors.iter().flat_map(|c| [c.r, c.g, c.b, c.a]).collect();

        for y in (0..height).rev() {
            let row = &pixels[y * row_len..(y + 1) * row_len];
            stdin.write_all(row).context("failed to write frame to ffmpeg")?;
        }
        Ok(())
    }
}

impl Drop for Ffmpeg {
    fn drop(&mut self) {
        // closing stdin lets ffmpeg finish the file
        self.stdin = None;
        if let Err(e) = self.process.wait() {
            warn!(error = %e, "failed to wait for ffmpeg");
        }
    }
}
