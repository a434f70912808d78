use std::{collections::VecDeque, fmt};

use cpal::Sample as _;
use log::{debug, warn};
use transport::position::Position;

use crate::{
    audio::{format::AudioFormat, resample::StreamResampler},
    constants::MAX_EMPTY_PULLS,
    device_manager::{AudioSource, AudioSourceBufferKind},
    error::ProducerError,
    frame::AudioRequest,
    playback::command::{PlayerCommand, PlayerCommandConsumer},
    producer::FrameSource,
    profile::Profile,
};

pub mod command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Pulls frames from a source and turns their audio into a continuous
/// stereo stream at the output device's rate.
///
/// Frame audio is resampled from whatever frequency the frame reports, so a
/// producer that scales frequency with speed is heard faster or slower.
pub struct Player {
    source: Box<dyn FrameSource>,
    commands: PlayerCommandConsumer,
    profile: Profile,
    output_frequency: u32,
    state: PlaybackState,
    /// Resampled audio not yet handed to the device
    pending: VecDeque<(f32, f32)>,
    resampler: StreamResampler,
}

impl Player {
    pub fn new(
        source: Box<dyn FrameSource>,
        commands: PlayerCommandConsumer,
        profile: Profile,
        output_frequency: u32,
    ) -> Self {
        // One frame of input per resampler chunk
        let chunk_size = profile.frame_rate.frame_samples(0, profile.frequency);
        Self {
            source,
            commands,
            profile,
            output_frequency,
            state: PlaybackState::Playing,
            pending: VecDeque::new(),
            resampler: StreamResampler::new(chunk_size),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.source.position()
    }

    pub fn process_command(&mut self, cmd: PlayerCommand) {
        match cmd {
            PlayerCommand::Play => self.state = PlaybackState::Playing,
            PlayerCommand::Pause => self.state = PlaybackState::Paused,
            PlayerCommand::Seek(position) => {
                if let Err(e) = self.source.seek(position) {
                    warn!("Seek to {position} failed: {e}");
                }
                self.pending.clear();
                self.resampler.reset();
            }
            PlayerCommand::ParamChange { target_id, change } => {
                debug!("Applying {change:?} to {target_id}");
                self.source.apply_param_change(&target_id, &change);
            }
        }
    }

    pub fn next_samples(&mut self, frame_size: usize) -> Vec<(f32, f32)> {
        while let Ok(cmd) = self.commands.pop() {
            self.process_command(cmd);
        }

        let mut buffer = vec![(0.0f32, 0.0f32); frame_size];
        if self.state == PlaybackState::Paused {
            return buffer;
        }

        // Frames may legitimately yield no audio (zero speed), so give up after
        // a run of pulls that added nothing
        let mut empty_pulls = 0;
        while self.pending.len() < frame_size && empty_pulls < MAX_EMPTY_PULLS {
            let before = self.pending.len();
            if let Err(e) = self.pull_frame() {
                warn!("Dropping audio of frame at {}: {e}", self.source.position());
            }
            if self.pending.len() > before {
                empty_pulls = 0;
            } else {
                empty_pulls += 1;
            }
        }

        let available = frame_size.min(self.pending.len());
        for (slot, sample) in buffer.iter_mut().zip(self.pending.drain(..available)) {
            *slot = sample;
        }
        buffer
    }

    fn pull_frame(&mut self) -> Result<(), ProducerError> {
        let mut frame = self.source.get_frame(0)?;
        let samples = self
            .profile
            .frame_rate
            .frame_samples(frame.position(), self.profile.frequency);
        let request = AudioRequest::new(
            AudioFormat::F32Le,
            self.profile.frequency,
            self.profile.channels,
            samples,
        );

        let audio = frame.get_audio(request)?;
        self.resampler.process(
            &audio.to_stereo(),
            audio.frequency(),
            self.output_frequency,
            &mut self.pending,
        )?;
        Ok(())
    }

    fn fill_sample<T>(data: &mut [T], samples: &[(f32, f32)], channels: usize)
    where
        T: cpal::Sample + cpal::FromSample<f32>,
    {
        for (frame, &(l, r)) in data.chunks_mut(channels).zip(samples) {
            for (channel, sample) in frame.iter_mut().enumerate() {
                let raw_sample = match channel {
                    0 => l,
                    1 => r,
                    _ => 0.0,
                };
                *sample = raw_sample.to_sample::<T>();
            }
        }
    }
}

impl AudioSource for Player {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, channels: usize) {
        let channels = channels.max(1);
        let frame_size = buffer.len() / channels;
        let stereo_samples = self.next_samples(frame_size);

        match buffer {
            AudioSourceBufferKind::F32(data) => Self::fill_sample(data, &stereo_samples, channels),
            AudioSourceBufferKind::I16(data) => Self::fill_sample(data, &stereo_samples, channels),
            AudioSourceBufferKind::U16(data) => Self::fill_sample(data, &stereo_samples, channels),
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("source", &self.source)
            .field("profile", &self.profile)
            .field("output_frequency", &self.output_frequency)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("resampler", &self.resampler)
            .finish_non_exhaustive()
    }
}
