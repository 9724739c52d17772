//! FFmpeg-based media tool implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::MediaConfig;
use super::error::MediaError;
use super::traits::MediaTool;

/// Sample rate expected by the transcription service.
const AUDIO_SAMPLE_RATE: u32 = 16_000;
const AUDIO_CHANNELS: u32 = 1;

/// FFmpeg-based media tool.
pub struct FfmpegMediaTool {
    config: MediaConfig,
}

impl FfmpegMediaTool {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Creates a media tool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MediaConfig::default())
    }

    fn build_probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffmpeg arguments for the mono 16 kHz MP3 track.
    fn build_audio_args(&self, video_path: &Path, audio_path: &Path) -> Vec<String> {
        vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            video_path.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            "libmp3lame".to_string(),
            "-ar".to_string(),
            AUDIO_SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            AUDIO_CHANNELS.to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            audio_path.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffmpeg arguments for a single frame grab.
    ///
    /// `-ss` goes before `-i` so ffmpeg seeks on the input instead of decoding
    /// everything up to the timestamp.
    fn build_frame_args(&self, video_path: &Path, timestamp: f64, output_path: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            format_timestamp(timestamp),
            "-i".to_string(),
            video_path.to_string_lossy().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            output_path.to_string_lossy().to_string(),
        ]
    }

    /// Parses ffprobe JSON output into a duration in seconds.
    fn parse_probe_output(output: &str) -> Result<f64, MediaError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| MediaError::probe_failed(format!("Failed to parse ffprobe output: {}", e)))?;

        let raw = probe
            .format
            .duration
            .ok_or_else(|| MediaError::probe_failed("ffprobe reported no duration"))?;

        let duration = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| MediaError::probe_failed(format!("Invalid duration: {}", raw)))?;

        if !duration.is_finite() || duration < 0.0 {
            return Err(MediaError::probe_failed(format!("Invalid duration: {}", raw)));
        }

        Ok(duration)
    }

    /// Runs a binary to completion under the configured timeout.
    ///
    /// The child is killed if the timeout elapses.
    async fn run(&self, program: &Path, args: &[String]) -> Result<Output, MediaError> {
        debug!(program = %program.display(), ?args, "Running media tool");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::ToolNotFound {
                        path: program.to_path_buf(),
                    }
                } else {
                    MediaError::Io(e)
                }
            })?;

        match timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(MediaError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }),
        }
    }
}

fn format_timestamp(timestamp: f64) -> String {
    format!("{:.3}", timestamp)
}

fn stderr_text(output: &Output) -> Option<String> {
    let text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Reason string when `path` is missing.
fn missing_input(path: &Path) -> Option<String> {
    if path.exists() {
        None
    } else {
        Some(format!("Input file not found: {}", path.display()))
    }
}

#[async_trait]
impl MediaTool for FfmpegMediaTool {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaError> {
        if let Some(reason) = missing_input(path) {
            return Err(MediaError::probe_failed(reason));
        }

        let output = self
            .run(&self.config.ffprobe_path, &Self::build_probe_args(path))
            .await
            .map_err(|e| MediaError::probe_failed(e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::probe_failed(format!(
                "ffprobe exited with code: {:?}",
                output.status.code()
            )));
        }

        Self::parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<(), MediaError> {
        if let Some(reason) = missing_input(video_path) {
            return Err(MediaError::transcode_failed(reason, None));
        }

        let args = self.build_audio_args(video_path, audio_path);
        let output = self
            .run(&self.config.ffmpeg_path, &args)
            .await
            .map_err(|e| MediaError::transcode_failed(e.to_string(), None))?;

        if !output.status.success() {
            return Err(MediaError::transcode_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                stderr_text(&output),
            ));
        }

        if !audio_path.exists() {
            return Err(MediaError::transcode_failed("Output file not created", None));
        }

        Ok(())
    }

    async fn extract_frame(
        &self,
        video_path: &Path,
        timestamp: f64,
        output_path: &Path,
    ) -> Result<(), MediaError> {
        let args = self.build_frame_args(video_path, timestamp, output_path);
        let output = self
            .run(&self.config.ffmpeg_path, &args)
            .await
            .map_err(|e| MediaError::frame_failed(timestamp, e.to_string()))?;

        if !output.status.success() {
            let reason = stderr_text(&output).unwrap_or_else(|| {
                format!("FFmpeg exited with code: {:?}", output.status.code())
            });
            return Err(MediaError::frame_failed(timestamp, reason));
        }

        // ffmpeg exits 0 without writing anything when seeking past the end.
        if !output_path.exists() {
            return Err(MediaError::frame_failed(timestamp, "No frame written"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_audio_args() {
        let tool = FfmpegMediaTool::with_defaults();
        let args = tool.build_audio_args(Path::new("/task/video.mp4"), Path::new("/task/audio.mp3"));

        assert_eq!(args[0], "-y");
        assert!(args.contains(&"libmp3lame".to_string()));
        let ar = args.iter().position(|a| a == "-ar").unwrap();
        assert_eq!(args[ar + 1], "16000");
        let ac = args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(args[ac + 1], "1");
        assert_eq!(args.last().unwrap(), "/task/audio.mp3");
    }

    #[test]
    fn test_build_frame_args_seeks_before_input() {
        let tool = FfmpegMediaTool::with_defaults();
        let args = tool.build_frame_args(
            Path::new("/task/video.mp4"),
            15.0,
            Path::new("/task/frames/frame_2.jpg"),
        );

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "15.000");
        let frames = args.iter().position(|a| a == "-frames:v").unwrap();
        assert_eq!(args[frames + 1], "1");
        assert_eq!(args.last().unwrap(), "/task/frames/frame_2.jpg");
    }

    #[test]
    fn test_build_probe_args() {
        let args = FfmpegMediaTool::build_probe_args(Path::new("/task/video.mp4"));
        assert!(args.contains(&"-show_format".to_string()));
        assert!(args.contains(&"json".to_string()));
        assert_eq!(args.last().unwrap(), "/task/video.mp4");
    }

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "format": {
                "filename": "video.mp4",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "30.033333",
                "size": "2400000"
            }
        }"#;

        let duration = FfmpegMediaTool::parse_probe_output(json).unwrap();
        assert!((duration - 30.033333).abs() < 1e-6);
    }

    #[test]
    fn test_parse_probe_output_missing_duration() {
        let json = r#"{"format": {"filename": "still.png"}}"#;
        let result = FfmpegMediaTool::parse_probe_output(json);
        assert!(matches!(result, Err(MediaError::ProbeFailed { .. })));
    }

    #[test]
    fn test_parse_probe_output_garbage() {
        assert!(matches!(
            FfmpegMediaTool::parse_probe_output("not json"),
            Err(MediaError::ProbeFailed { .. })
        ));
        assert!(matches!(
            FfmpegMediaTool::parse_probe_output(r#"{"format": {"duration": "N/A"}}"#),
            Err(MediaError::ProbeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_missing_input() {
        let tool = FfmpegMediaTool::with_defaults();
        let result = tool
            .probe_duration(Path::new("/nonexistent/video.mp4"))
            .await;
        assert!(matches!(result, Err(MediaError::ProbeFailed { .. })));
    }

    #[tokio::test]
    async fn test_missing_binary_maps_to_operation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video.mp4");
        tokio::fs::write(&video, b"not really a video").await.unwrap();

        let tool = FfmpegMediaTool::new(MediaConfig::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        ));

        match tool.probe_duration(&video).await {
            Err(MediaError::ProbeFailed { reason }) => {
                assert!(reason.contains("/nonexistent/ffprobe"), "{}", reason)
            }
            other => panic!("expected probe failure, got {:?}", other),
        }

        match tool.extract_audio(&video, &dir.path().join("audio.mp3")).await {
            Err(MediaError::TranscodeFailed { reason, .. }) => {
                assert!(reason.contains("/nonexistent/ffmpeg"), "{}", reason)
            }
            other => panic!("expected transcode failure, got {:?}", other),
        }

        let frame = dir.path().join("frame_1.jpg");
        match tool.extract_frame(&video, 12.5, &frame).await {
            Err(err @ MediaError::FrameExtractFailed { timestamp, .. }) => {
                assert_eq!(timestamp, 12.5);
                assert!(err.to_string().contains("12.5s"));
                assert!(err.to_string().contains("not found"));
            }
            other => panic!("expected frame failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_input_is_transcode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FfmpegMediaTool::with_defaults();

        let result = tool
            .extract_audio(&dir.path().join("missing.mp4"), &dir.path().join("audio.mp3"))
            .await;
        assert!(matches!(result, Err(MediaError::TranscodeFailed { .. })));
    }
}
