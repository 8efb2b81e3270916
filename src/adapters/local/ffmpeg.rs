//! ffmpeg-backed transcode jobs.
//!
//! Mirrors the managed-service contract: `submit_job` returns immediately
//! with a job id while the encode runs on a spawned task, and `poll_job`
//! reports the tracked status.

use crate::domain::transcode::{TranscodeJobSpec, TranscodeJobStatus, TranscodeProfile};
use crate::ports::transcoder::TranscodePort;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;
use tokio::process::Command as TokioCommand;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Runs the actual encode command.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscodeCommandRunner: Send + Sync {
    async fn run_hls_transcode(
        &self,
        input: &Path,
        out_dir: &Path,
        base_name: &str,
        profile: &TranscodeProfile,
    ) -> io::Result<Output>;
}

pub struct FfmpegRunner;

#[async_trait]
impl TranscodeCommandRunner for FfmpegRunner {
    async fn run_hls_transcode(
        &self,
        input: &Path,
        out_dir: &Path,
        base_name: &str,
        profile: &TranscodeProfile,
    ) -> io::Result<Output> {
        let mut command = TokioCommand::new("ffmpeg");
        command.arg("-y").arg("-i").arg(input);
        for arg in hls_args(out_dir, base_name, profile) {
            command.arg(arg);
        }
        command.output().await
    }
}

/// Encoder arguments for the fixed training profile, input and `-y` aside.
pub fn hls_args(out_dir: &Path, base_name: &str, profile: &TranscodeProfile) -> Vec<String> {
    vec![
        String::from("-vf"),
        format!("scale={}:{}", profile.width, profile.height),
        String::from("-c:v"),
        String::from("libx264"),
        String::from("-maxrate"),
        format!("{}", profile.max_bitrate),
        String::from("-bufsize"),
        format!("{}", profile.max_bitrate * 2),
        String::from("-c:a"),
        String::from("aac"),
        String::from("-b:a"),
        format!("{}", profile.audio_bitrate),
        String::from("-ar"),
        format!("{}", profile.audio_sample_rate),
        String::from("-ac"),
        String::from("2"),
        String::from("-hls_time"),
        format!("{}", profile.segment_seconds),
        String::from("-hls_playlist_type"),
        String::from("vod"),
        String::from("-hls_segment_filename"),
        out_dir
            .join(format!("{}_%03d.ts", base_name))
            .to_string_lossy()
            .to_string(),
        out_dir
            .join(format!("{}.m3u8", base_name))
            .to_string_lossy()
            .to_string(),
    ]
}

pub struct FfmpegTranscoder<C = FfmpegRunner> {
    runner: Arc<C>,
    serving_dir: PathBuf,
    jobs: Arc<Mutex<HashMap<String, TranscodeJobStatus>>>,
}

impl<C> Clone for FfmpegTranscoder<C> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            serving_dir: self.serving_dir.clone(),
            jobs: self.jobs.clone(),
        }
    }
}

impl<C> FfmpegTranscoder<C>
where
    C: TranscodeCommandRunner + 'static,
{
    pub fn new(runner: C, serving_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner: Arc::new(runner),
            serving_dir: serving_dir.into(),
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn run_job(
        runner: Arc<C>,
        serving_dir: PathBuf,
        spec: TranscodeJobSpec,
    ) -> TranscodeJobStatus {
        // The spec's bucket is the staging directory locally
        let input = PathBuf::from(&spec.source.bucket).join(&spec.source.key);
        if !input.exists() {
            return TranscodeJobStatus::Error(format!(
                "source object missing: {}",
                input.display()
            ));
        }

        // destination_prefix is "{video_prefix}/{id}/{id}"
        let destination = serving_dir.join(&spec.destination_prefix);
        let (out_dir, base_name) = match (destination.parent(), destination.file_name()) {
            (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_string_lossy().to_string()),
            _ => {
                return TranscodeJobStatus::Error(format!(
                    "bad destination prefix: {}",
                    spec.destination_prefix
                ))
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&out_dir).await {
            return TranscodeJobStatus::Error(format!("could not create output dir: {}", e));
        }

        match runner
            .run_hls_transcode(&input, &out_dir, &base_name, &spec.profile)
            .await
        {
            Ok(output) if output.status.success() => TranscodeJobStatus::Complete,
            Ok(output) => {
                TranscodeJobStatus::Error(String::from_utf8_lossy(&output.stderr).to_string())
            }
            Err(e) => TranscodeJobStatus::Error(format!("could not run ffmpeg: {}", e)),
        }
    }
}

#[async_trait]
impl<C> TranscodePort for FfmpegTranscoder<C>
where
    C: TranscodeCommandRunner + 'static,
{
    async fn submit_job(
        &self,
        spec: &TranscodeJobSpec,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .lock()
            .await
            .insert(job_id.clone(), TranscodeJobStatus::InProgress);

        let runner = self.runner.clone();
        let serving_dir = self.serving_dir.clone();
        let jobs = self.jobs.clone();
        let spec = spec.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            let result = Self::run_job(runner, serving_dir, spec).await;
            match &result {
                TranscodeJobStatus::Complete => info!(job_id = %id, "transcode job complete"),
                TranscodeJobStatus::Error(message) => {
                    error!(job_id = %id, error = %message, "transcode job failed")
                }
                TranscodeJobStatus::InProgress => {}
            }
            jobs.lock().await.insert(id, result);
        });

        Ok(job_id)
    }

    async fn poll_job(
        &self,
        job_id: &str,
    ) -> Result<TranscodeJobStatus, Box<dyn std::error::Error + Send + Sync>> {
        self.jobs
            .lock()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| format!("unknown transcode job: {}", job_id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transcode::SourceLocation;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::time::Duration;
    use tempfile::tempdir;

    fn spec(staging: &Path) -> TranscodeJobSpec {
        TranscodeJobSpec {
            source: SourceLocation::new(staging.to_string_lossy(), "abc"),
            destination_bucket: String::from("serving"),
            destination_prefix: String::from("video/T1/T1"),
            profile: TranscodeProfile::default(),
        }
    }

    fn ok_output() -> Output {
        Output {
            status: ExitStatus::from_raw(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    async fn poll_until_terminal<C: TranscodeCommandRunner + 'static>(
        transcoder: &FfmpegTranscoder<C>,
        job_id: &str,
    ) -> TranscodeJobStatus {
        for _ in 0..200 {
            match transcoder.poll_job(job_id).await.unwrap() {
                TranscodeJobStatus::InProgress => {
                    tokio::time::sleep(Duration::from_millis(1)).await
                }
                terminal => return terminal,
            }
        }
        panic!("job {} never finished", job_id);
    }

    #[test]
    fn args_encode_the_fixed_profile() {
        let args = hls_args(Path::new("/srv/video/T1"), "T1", &TranscodeProfile::default());
        let joined = args.join(" ");
        assert!(joined.contains("scale=640:360"));
        assert!(joined.contains("-hls_time 10"));
        assert!(joined.contains("-b:a 96000"));
        assert!(joined.contains("-ar 48000"));
        assert!(joined.ends_with("/srv/video/T1/T1.m3u8"));
        assert!(joined.contains("/srv/video/T1/T1_%03d.ts"));
    }

    #[tokio::test]
    async fn successful_encode_reports_complete() {
        let staging = tempdir().unwrap();
        let serving = tempdir().unwrap();
        tokio::fs::write(staging.path().join("abc"), b"raw video")
            .await
            .unwrap();

        let mut runner = MockTranscodeCommandRunner::new();
        runner
            .expect_run_hls_transcode()
            .withf(|_, out_dir, base_name, _| {
                out_dir.ends_with("video/T1") && base_name == "T1"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(ok_output()));

        let transcoder = FfmpegTranscoder::new(runner, serving.path());
        let job_id = transcoder.submit_job(&spec(staging.path())).await.unwrap();
        assert_eq!(
            poll_until_terminal(&transcoder, &job_id).await,
            TranscodeJobStatus::Complete
        );
        // Output directory was prepared for the encoder
        assert!(serving.path().join("video/T1").is_dir());
    }

    #[tokio::test]
    async fn missing_source_fails_the_job_not_the_submission() {
        let staging = tempdir().unwrap();
        let serving = tempdir().unwrap();

        let mut runner = MockTranscodeCommandRunner::new();
        runner.expect_run_hls_transcode().times(0);

        let transcoder = FfmpegTranscoder::new(runner, serving.path());
        let job_id = transcoder.submit_job(&spec(staging.path())).await.unwrap();
        match poll_until_terminal(&transcoder, &job_id).await {
            TranscodeJobStatus::Error(message) => {
                assert!(message.contains("source object missing"))
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn encoder_failure_carries_stderr() {
        let staging = tempdir().unwrap();
        let serving = tempdir().unwrap();
        tokio::fs::write(staging.path().join("abc"), b"raw video")
            .await
            .unwrap();

        let mut runner = MockTranscodeCommandRunner::new();
        runner.expect_run_hls_transcode().returning(|_, _, _, _| {
            Ok(Output {
                status: ExitStatus::from_raw(256),
                stdout: Vec::new(),
                stderr: b"Invalid data found when processing input".to_vec(),
            })
        });

        let transcoder = FfmpegTranscoder::new(runner, serving.path());
        let job_id = transcoder.submit_job(&spec(staging.path())).await.unwrap();
        match poll_until_terminal(&transcoder, &job_id).await {
            TranscodeJobStatus::Error(message) => {
                assert!(message.contains("Invalid data found"))
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_job_is_an_error() {
        let transcoder = FfmpegTranscoder::new(MockTranscodeCommandRunner::new(), "/tmp");
        assert!(transcoder.poll_job("nope").await.is_err());
    }
}
