//! Frame capture: recording a reveal run to a downloadable artifact.
//!
//! The controller owns the recording flag and an active sink. Sinks consume
//! frames in order and either stream them into an encoder ([`FfmpegSink`]),
//! spool them to disk ([`PngDirSink`]), or hold them in memory for tests
//! ([`MemorySink`]). A recording interrupted by a new generation cycle is
//! discarded, never saved.

use crate::raster;
use crate::surface::Frame;
use anyhow::{anyhow, bail, Context, Result};
use std::cell::RefCell;
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Stream parameters handed to a sink when recording starts.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Consumer of an ordered frame stream.
pub trait FrameSink {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: &SinkConfig) -> Result<()>;

    /// Push one frame. Indices arrive in increasing order starting at 0.
    fn push_frame(&mut self, index: u64, frame: &Frame) -> Result<()>;

    /// Finalize the stream and return the artifact location, if the sink
    /// produced a file.
    fn end(&mut self) -> Result<Option<PathBuf>>;

    /// Abandon the stream and remove any partial output.
    fn discard(&mut self) -> Result<()>;
}

/// Owns the recording flag and the active sink for one session.
#[derive(Default)]
pub struct CaptureController {
    recording: bool,
    sink: Option<Box<dyn FrameSink>>,
    frames: u64,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Frames pushed since recording started.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Begin recording into `sink`. A start while already recording is a
    /// no-op guarded by the flag, not an error.
    pub fn start(&mut self, mut sink: Box<dyn FrameSink>, cfg: &SinkConfig) -> Result<()> {
        if self.recording {
            debug!("capture already active, ignoring start");
            return Ok(());
        }
        sink.begin(cfg)?;
        self.sink = Some(sink);
        self.recording = true;
        self.frames = 0;
        info!(fps = cfg.fps, "capture started");
        Ok(())
    }

    /// Push one frame into the active recording; does nothing when idle.
    pub fn push(&mut self, frame: &Frame) -> Result<()> {
        if !self.recording {
            return Ok(());
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.push_frame(self.frames, frame)?;
            self.frames += 1;
        }
        Ok(())
    }

    /// Stop recording and keep the artifact. A recording that never saw a
    /// frame produces no artifact and its partial output is removed.
    pub fn finish(&mut self) -> Result<Option<PathBuf>> {
        if !self.recording {
            return Ok(None);
        }
        self.recording = false;
        let mut sink = self
            .sink
            .take()
            .ok_or_else(|| anyhow!("recording flag set without a sink"))?;

        if self.frames == 0 {
            debug!("empty recording, skipping artifact");
            sink.discard()?;
            return Ok(None);
        }

        let artifact = sink.end()?;
        info!(frames = self.frames, artifact = ?artifact, "capture finished");
        Ok(artifact)
    }

    /// Throw away an in-progress recording, partial output included.
    pub fn discard(&mut self) -> Result<()> {
        if !self.recording {
            return Ok(());
        }
        self.recording = false;
        if let Some(mut sink) = self.sink.take() {
            sink.discard()?;
        }
        info!(frames = self.frames, "capture discarded");
        Ok(())
    }

    /// Start or finish depending on the flag, returning the artifact when a
    /// recording was finished.
    pub fn toggle(
        &mut self,
        make_sink: impl FnOnce() -> Box<dyn FrameSink>,
        cfg: &SinkConfig,
    ) -> Result<Option<PathBuf>> {
        if self.recording {
            self.finish()
        } else {
            self.start(make_sink(), cfg)?;
            Ok(None)
        }
    }
}

/// Streams PNG-encoded frames into a spawned `ffmpeg`, producing an MP4.
pub struct FfmpegSink {
    out_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            child: None,
            stdin: None,
            stderr_drain: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: &SinkConfig) -> Result<()> {
        if cfg.width == 0 || cfg.height == 0 || cfg.fps == 0 {
            bail!("capture dimensions and fps must be non-zero");
        }
        if cfg.width % 2 != 0 || cfg.height % 2 != 0 {
            bail!("capture dimensions must be even for yuv420p mp4 output");
        }
        if !is_ffmpeg_on_path() {
            bail!("ffmpeg is required for mp4 capture, but was not found on PATH");
        }
        if let Some(parent) = self.out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let mut child = Command::new("ffmpeg")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(["-y", "-loglevel", "error"])
            .args(["-f", "image2pipe", "-framerate", &cfg.fps.to_string()])
            .args(["-c:v", "png", "-i", "pipe:0"])
            .args(["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .args(["-movflags", "+faststart"])
            .arg(&self.out_path)
            .spawn()
            .context("failed to spawn ffmpeg (is it installed and on PATH?)")?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn push_frame(&mut self, _index: u64, frame: &Frame) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("ffmpeg sink is not started"))?;
        let png = raster::png_bytes(frame)?;
        stdin
            .write_all(&png)
            .context("failed to write frame to ffmpeg stdin")?;
        Ok(())
    }

    fn end(&mut self) -> Result<Option<PathBuf>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| anyhow!("ffmpeg sink is not started"))?;

        let status = child.wait().context("failed to wait for ffmpeg")?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("ffmpeg stderr drain thread panicked"))?
                .context("failed to read ffmpeg stderr")?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            bail!("ffmpeg exited with {}: {}", status, stderr.trim());
        }

        Ok(Some(self.out_path.clone()))
    }

    fn discard(&mut self) -> Result<()> {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        if self.out_path.exists() {
            fs::remove_file(&self.out_path)
                .with_context(|| format!("failed to remove {}", self.out_path.display()))?;
            debug!(path = %self.out_path.display(), "removed partial recording");
        }
        Ok(())
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Writes each frame as a numbered PNG in a directory.
pub struct PngDirSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", index))
    }
}

impl FrameSink for PngDirSink {
    fn begin(&mut self, _cfg: &SinkConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &Frame) -> Result<()> {
        let path = self.frame_path(index);
        raster::write_png(frame, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> Result<Option<PathBuf>> {
        Ok(Some(self.dir.clone()))
    }

    fn discard(&mut self) -> Result<()> {
        for path in self.written.drain(..) {
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), %err, "failed to remove frame");
            }
        }
        Ok(())
    }
}

/// Shared view into a [`MemorySink`]'s captured frames.
pub type FrameStore = Rc<RefCell<Vec<Frame>>>;

/// In-memory sink for tests and debugging.
#[derive(Default)]
pub struct MemorySink {
    frames: FrameStore,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stays readable after the sink moves into the controller.
    pub fn store(&self) -> FrameStore {
        Rc::clone(&self.frames)
    }
}

impl FrameSink for MemorySink {
    fn begin(&mut self, _cfg: &SinkConfig) -> Result<()> {
        self.frames.borrow_mut().clear();
        Ok(())
    }

    fn push_frame(&mut self, _index: u64, frame: &Frame) -> Result<()> {
        self.frames.borrow_mut().push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn discard(&mut self) -> Result<()> {
        self.frames.borrow_mut().clear();
        Ok(())
    }
}
