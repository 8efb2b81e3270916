//! Elemental MediaConvert transcode jobs.
//!
//! One Apple HLS output group per job, built from the fixed training
//! profile. The encode itself runs inside the managed service; this
//! adapter only submits and polls.

use crate::domain::transcode::{TranscodeJobSpec, TranscodeJobStatus};
use crate::ports::transcoder::TranscodePort;
use async_trait::async_trait;
use aws_sdk_mediaconvert::types::{
    AacCodingMode, AacSettings, AudioCodec, AudioCodecSettings, AudioDefaultSelection,
    AudioDescription, AudioSelector, ContainerSettings, ContainerType, H264RateControlMode,
    H264SceneChangeDetect, H264Settings, HlsGroupSettings, Input, InputTimecodeSource,
    JobSettings, JobStatus, Output, OutputGroup, OutputGroupSettings, OutputGroupType,
    TimecodeConfig, TimecodeSource, VideoCodec, VideoCodecSettings, VideoDescription,
    VideoSelector,
};
use aws_sdk_mediaconvert::Client;
use std::error::Error;

/// MediaConvertAdapter implements TranscodePort for AWS Elemental
/// MediaConvert.
#[derive(Clone)]
pub struct MediaConvertAdapter {
    client: Client,
    role_arn: String,
    queue_arn: Option<String>,
}

impl MediaConvertAdapter {
    pub fn new(client: Client, role_arn: String, queue_arn: Option<String>) -> Self {
        Self {
            client,
            role_arn,
            queue_arn,
        }
    }

    fn job_settings(spec: &TranscodeJobSpec) -> Result<JobSettings, Box<dyn Error + Send + Sync>> {
        let profile = &spec.profile;

        let input = Input::builder()
            .file_input(format!("s3://{}/{}", spec.source.bucket, spec.source.key))
            .audio_selectors(
                "Audio Selector 1",
                AudioSelector::builder()
                    .default_selection(AudioDefaultSelection::Default)
                    .build(),
            )
            .video_selector(VideoSelector::builder().build())
            .timecode_source(InputTimecodeSource::Zerobased)
            .build();

        let video = VideoDescription::builder()
            .width(profile.width)
            .height(profile.height)
            .codec_settings(
                VideoCodecSettings::builder()
                    .codec(VideoCodec::H264)
                    .h264_settings(
                        H264Settings::builder()
                            .max_bitrate(profile.max_bitrate)
                            .rate_control_mode(H264RateControlMode::Qvbr)
                            .scene_change_detect(H264SceneChangeDetect::TransitionDetection)
                            .build(),
                    )
                    .build(),
            )
            .build();

        let audio = AudioDescription::builder()
            .audio_source_name("Audio Selector 1")
            .codec_settings(
                AudioCodecSettings::builder()
                    .codec(AudioCodec::Aac)
                    .aac_settings(
                        AacSettings::builder()
                            .bitrate(profile.audio_bitrate)
                            .coding_mode(AacCodingMode::CodingMode20)
                            .sample_rate(profile.audio_sample_rate)
                            .build(),
                    )
                    .build(),
            )
            .build();

        let output_group = OutputGroup::builder()
            .name("Apple HLS")
            .output_group_settings(
                OutputGroupSettings::builder()
                    .r#type(OutputGroupType::HlsGroupSettings)
                    .hls_group_settings(
                        HlsGroupSettings::builder()
                            .segment_length(profile.segment_seconds)
                            .min_segment_length(0)
                            .destination(format!(
                                "s3://{}/{}",
                                spec.destination_bucket, spec.destination_prefix
                            ))
                            .build(),
                    )
                    .build(),
            )
            .outputs(
                Output::builder()
                    .container_settings(
                        ContainerSettings::builder()
                            .container(ContainerType::M3u8)
                            .build(),
                    )
                    .video_description(video)
                    .audio_descriptions(audio)
                    .build(),
            )
            .build();

        Ok(JobSettings::builder()
            .timecode_config(
                TimecodeConfig::builder()
                    .source(TimecodeSource::Zerobased)
                    .build(),
            )
            .inputs(input)
            .output_groups(output_group)
            .build())
    }
}

#[async_trait]
impl TranscodePort for MediaConvertAdapter {
    async fn submit_job(
        &self,
        spec: &TranscodeJobSpec,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut request = self
            .client
            .create_job()
            .role(&self.role_arn)
            .settings(Self::job_settings(spec)?);
        if let Some(queue_arn) = &self.queue_arn {
            request = request.queue(queue_arn);
        }

        let resp = request.send().await?;
        let job_id = resp
            .job
            .and_then(|job| job.id)
            .ok_or("MediaConvert returned no job id")?;
        Ok(job_id)
    }

    async fn poll_job(
        &self,
        job_id: &str,
    ) -> Result<TranscodeJobStatus, Box<dyn Error + Send + Sync>> {
        let resp = self.client.get_job().id(job_id).send().await?;
        let job = resp.job.ok_or("MediaConvert returned no job")?;

        let status = match job.status {
            Some(JobStatus::Complete) => TranscodeJobStatus::Complete,
            Some(JobStatus::Error) | Some(JobStatus::Canceled) => TranscodeJobStatus::Error(
                job.error_message
                    .unwrap_or_else(|| String::from("transcode job failed")),
            ),
            _ => TranscodeJobStatus::InProgress,
        };
        Ok(status)
    }
}
