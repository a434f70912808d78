use cpal::{
    OutputCallbackInfo,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::{error, info};

use super::AudioDeviceManager;
use crate::device_manager::{AudioDeviceError, AudioSource, AudioSourceBufferKind};

pub struct CpalAudioDeviceManager {
    stream: Option<cpal::Stream>,
}

impl CpalAudioDeviceManager {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn default_output() -> Result<(cpal::Device, cpal::SupportedStreamConfig), AudioDeviceError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioDeviceError::DeviceNotFound)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        Ok((device, config))
    }

    fn build_output_stream<T, C>(
        device: &cpal::Device,
        config: cpal::SupportedStreamConfig,
        mut cb: C,
    ) -> Result<cpal::Stream, AudioDeviceError>
    where
        T: cpal::SizedSample,
        C: FnMut(&mut [T], usize) + Send + 'static,
    {
        let error_cb = move |err| {
            error!("Stream error: {err}");
        };

        let channels = usize::from(config.channels());
        let data_cb = move |data: &mut [T], _: &OutputCallbackInfo| {
            cb(data, channels);
        };

        let stream = device
            .build_output_stream(&config.into(), data_cb, error_cb, None)
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        Ok(stream)
    }
}

impl Default for CpalAudioDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDeviceManager for CpalAudioDeviceManager {
    fn output_frequency(&self) -> Result<u32, AudioDeviceError> {
        let (_, config) = Self::default_output()?;
        Ok(config.sample_rate().0)
    }

    fn start_output_stream(
        &mut self,
        mut audio_source: Box<dyn AudioSource>,
    ) -> Result<(), AudioDeviceError> {
        let (device, config) = Self::default_output()?;
        info!(
            "Opening output: {} channel(s) at {} Hz, {}",
            config.channels(),
            config.sample_rate().0,
            config.sample_format()
        );

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_output_stream(&device, config, move |data, channels| {
                    audio_source.fill_buffer(AudioSourceBufferKind::F32(data), channels);
                })?
            }
            cpal::SampleFormat::I16 => {
                Self::build_output_stream(&device, config, move |data, channels| {
                    audio_source.fill_buffer(AudioSourceBufferKind::I16(data), channels);
                })?
            }
            cpal::SampleFormat::U16 => {
                Self::build_output_stream(&device, config, move |data, channels| {
                    audio_source.fill_buffer(AudioSourceBufferKind::U16(data), channels);
                })?
            }
            format => {
                return Err(AudioDeviceError::StreamBuildFailed(format!(
                    "Unsupported sample format '{format}'"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AudioDeviceError::StreamStartFailed(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }
}
