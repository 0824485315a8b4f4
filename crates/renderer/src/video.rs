use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, TrySendError};

/// Metadata reported by `ffprobe`, used for startup diagnostics only; the
/// feeds always decode at the configured texture resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_secs: f64,
}

/// Checks whether ffmpeg is reachable on PATH.
pub(crate) fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Probes a video file with `ffprobe`.
pub(crate) fn probe(path: &Path) -> Result<VideoInfo> {
    if !path.exists() {
        anyhow::bail!("video file not found: {}", path.display());
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context("failed to run ffprobe")?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Extracts the video stream description from ffprobe's JSON output.
fn parse_probe_output(json: &str) -> Result<VideoInfo> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("failed to parse ffprobe output")?;

    let streams = value["streams"]
        .as_array()
        .ok_or_else(|| anyhow!("no streams reported"))?;
    let video_stream = streams
        .iter()
        .find(|stream| stream["codec_type"].as_str() == Some("video"))
        .ok_or_else(|| anyhow!("no video stream found"))?;

    let width = video_stream["width"]
        .as_u64()
        .ok_or_else(|| anyhow!("missing width in video stream"))? as u32;
    let height = video_stream["height"]
        .as_u64()
        .ok_or_else(|| anyhow!("missing height in video stream"))? as u32;

    let fps = parse_rational(video_stream["r_frame_rate"].as_str().unwrap_or("30/1"));
    let duration_secs = value["format"]["duration"]
        .as_str()
        .and_then(|raw| raw.parse::<f64>().ok())
        .or_else(|| {
            video_stream["duration"]
                .as_str()
                .and_then(|raw| raw.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width,
        height,
        fps,
        duration_secs,
    })
}

/// Parses an ffprobe rate string like "30/1" or "24000/1001".
fn parse_rational(raw: &str) -> f64 {
    if let Some((numerator, denominator)) = raw.split_once('/') {
        let numerator: f64 = numerator.parse().unwrap_or(30.0);
        let denominator: f64 = denominator.parse().unwrap_or(1.0);
        if denominator > 0.0 {
            numerator / denominator
        } else {
            30.0
        }
    } else {
        raw.parse().unwrap_or(30.0)
    }
}

/// A live, looping video texture source.
///
/// One ffmpeg child per clip decodes in an endless loop at the clip's
/// native pacing, scaled to the slot resolution, writing raw RGBA frames
/// to stdout. A reader thread forwards complete frames over a small
/// bounded channel; the render loop drains it and keeps the freshest one.
/// If the channel is full the decoder simply drops frames; the GPU never
/// waits on a video.
pub(crate) struct VideoFeed {
    child: Child,
    frames: Receiver<Vec<u8>>,
}

impl VideoFeed {
    pub(crate) fn spawn(path: &Path, width: u32, height: u32) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("video file not found: {}", path.display());
        }

        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error"])
            .args(["-stream_loop", "-1", "-re", "-i"])
            .arg(path)
            .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", &format!("{width}x{height}"), "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn ffmpeg for {}", path.display()))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("ffmpeg child has no stdout"))?;

        let frame_len = (width as usize) * (height as usize) * 4;
        let (sender, receiver) = bounded::<Vec<u8>>(2);
        let label = path.display().to_string();
        thread::Builder::new()
            .name("video-feed".into())
            .spawn(move || loop {
                let mut frame = vec![0u8; frame_len];
                if let Err(error) = stdout.read_exact(&mut frame) {
                    tracing::debug!(video = %label, %error, "video feed ended");
                    break;
                }
                match sender.try_send(frame) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }
            })
            .context("failed to spawn video reader thread")?;

        Ok(Self {
            child,
            frames: receiver,
        })
    }

    /// Drains the channel and returns the freshest decoded frame, if any
    /// arrived since the last call.
    pub(crate) fn latest_frame(&mut self) -> Option<Vec<u8>> {
        let mut latest = None;
        while let Ok(frame) = self.frames.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for VideoFeed {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_rates_parse() {
        assert!((parse_rational("30/1") - 30.0).abs() < 1e-3);
        assert!((parse_rational("24000/1001") - 23.976).abs() < 1e-2);
        assert!((parse_rational("25") - 25.0).abs() < 1e-3);
        assert!((parse_rational("garbage") - 30.0).abs() < 1e-3);
        assert!((parse_rational("30/0") - 30.0).abs() < 1e-3);
    }

    #[test]
    fn probe_output_parses() {
        let json = r#"{
            "streams": [
                {"codec_type": "audio", "sample_rate": "48000"},
                {"codec_type": "video", "width": 2048, "height": 1024,
                 "r_frame_rate": "30000/1001", "duration": "12.5"}
            ],
            "format": {"duration": "12.512"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.width, 2048);
        assert_eq!(info.height, 1024);
        assert!((info.fps - 29.97).abs() < 0.01);
        assert!((info.duration_secs - 12.512).abs() < 1e-6);
    }

    #[test]
    fn probe_output_without_video_stream_errors() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        assert!(parse_probe_output(json).is_err());
    }

    #[test]
    fn probe_rejects_missing_file() {
        assert!(probe(Path::new("/nonexistent/clip.mp4")).is_err());
    }

    #[test]
    fn spawn_rejects_missing_file() {
        assert!(VideoFeed::spawn(Path::new("/nonexistent/clip.mp4"), 64, 64).is_err());
    }
}
