use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use log::{debug, error, trace};
use transport::{position::Position, range::FrameRange};

use crate::{
    audio::AudioBuffer,
    constants::INTERNAL_SERVICE,
    error::{AudioError, ProducerError},
    factory::Factory,
    frame::{AudioRequest, AudioStep, Frame},
    producer::{FrameSource, ParameterChange, ProducerId},
    profile::Profile,
};

/// Playback speed shared between a producer and the audio steps it leaves on frames.
///
/// Steps read it when audio is pulled, not when the frame was produced.
#[derive(Debug, Clone)]
pub struct SpeedHandle(Arc<AtomicU64>);

impl SpeedHandle {
    pub fn new(speed: f64) -> Self {
        Self(Arc::new(AtomicU64::new(speed.to_bits())))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, speed: f64) {
        self.0.store(speed.to_bits(), Ordering::Relaxed);
    }
}

impl Default for SpeedHandle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarispeedConfig {
    /// Signed rate multiplier; negative plays audio backwards
    pub speed: f64,
    pub limit_enabled: bool,
    pub start_frame: Position,
    pub end_frame: Position,
}

impl VarispeedConfig {
    pub fn range(&self) -> FrameRange {
        FrameRange::new(self.start_frame, self.end_frame)
    }
}

impl Default for VarispeedConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            limit_enabled: false,
            start_frame: 0,
            end_frame: 0,
        }
    }
}

/// Reported frequency for audio played at `speed`. A speed of zero yields zero.
pub fn scaled_frequency(frequency: u32, speed: f64) -> u32 {
    (f64::from(frequency) * speed.abs()).round() as u32
}

/// Reinterprets `audio` for playback at `speed`.
///
/// The samples are not resampled: only the reported frequency changes, and
/// for negative speeds the sample frames are reversed.
pub fn transform_audio(audio: &mut AudioBuffer, speed: f64) {
    audio.set_frequency(scaled_frequency(audio.frequency(), speed));
    if speed < 0.0 {
        audio.reverse_sample_order();
    }
}

#[derive(Debug)]
struct SpeedTransform {
    speed: SpeedHandle,
}

impl AudioStep for SpeedTransform {
    fn get_audio(
        self: Box<Self>,
        frame: &mut Frame,
        request: AudioRequest,
    ) -> Result<AudioBuffer, AudioError> {
        let mut audio = frame.get_audio(request)?;
        transform_audio(&mut audio, self.speed.get());
        Ok(audio)
    }
}

/// Wraps another source to play it at a variable, signed speed, optionally
/// looping its playhead inside `[start_frame, end_frame]`.
///
/// The wrapped source keeps its own notion of position; this producer only
/// rewrites that position before each request and reshapes the audio of the
/// frames that come back.
#[derive(Debug)]
pub struct VarispeedProducer {
    id: ProducerId,
    resource: String,
    inner: Box<dyn FrameSource>,
    speed: SpeedHandle,
    limit_enabled: bool,
    range: FrameRange,
    closed: bool,
}

impl VarispeedProducer {
    pub fn new(factory: &Factory, profile: &Profile, resource: &str) -> Result<Self, ProducerError> {
        Self::with_config(factory, profile, resource, VarispeedConfig::default())
    }

    /// Loads `resource` through the factory's internal service and wraps it.
    pub fn with_config(
        factory: &Factory,
        profile: &Profile,
        resource: &str,
        config: VarispeedConfig,
    ) -> Result<Self, ProducerError> {
        let inner = factory
            .producer(profile, INTERNAL_SERVICE, resource)
            .inspect_err(|e| error!("Failed to create wrapped producer for '{resource}': {e}"))?;
        Ok(Self::wrap(resource, inner, config))
    }

    pub fn wrap(
        resource: impl Into<String>,
        mut inner: Box<dyn FrameSource>,
        config: VarispeedConfig,
    ) -> Self {
        inner.set_speed(1.0);

        let producer = Self {
            id: ProducerId::new(),
            resource: resource.into(),
            inner,
            speed: SpeedHandle::new(config.speed),
            limit_enabled: config.limit_enabled,
            range: config.range(),
            closed: false,
        };
        debug!(
            "Created varispeed producer {} for '{}' ({:?})",
            producer.id, producer.resource, config
        );
        producer
    }

    /// Factory entry point.
    pub fn create(
        factory: &Factory,
        profile: &Profile,
        resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        Ok(Box::new(Self::new(factory, profile, resource)?))
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn speed(&self) -> f64 {
        self.speed.get()
    }

    /// Handle for changing the speed from another thread.
    pub fn speed_handle(&self) -> SpeedHandle {
        self.speed.clone()
    }

    pub fn config(&self) -> VarispeedConfig {
        VarispeedConfig {
            speed: self.speed(),
            limit_enabled: self.limit_enabled,
            start_frame: self.range.start,
            end_frame: self.range.end,
        }
    }

    pub fn set_limit_enabled(&mut self, enabled: bool) {
        self.limit_enabled = enabled;
    }

    pub fn set_start_frame(&mut self, start: Position) {
        self.range.start = start;
    }

    pub fn set_end_frame(&mut self, end: Position) {
        self.range.end = end;
    }

    /// Sets a property from its textual form, as a host property store would.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ProducerError> {
        let invalid = || ProducerError::InvalidProperty {
            key: key.to_owned(),
            value: value.to_owned(),
        };

        match key {
            "speed" => self.set_speed(value.trim().parse().map_err(|_| invalid())?),
            "limit_enabled" => self.set_limit_enabled(parse_flag(value).ok_or_else(invalid)?),
            "start_frame" => self.set_start_frame(value.trim().parse().map_err(|_| invalid())?),
            "end_frame" => self.set_end_frame(value.trim().parse().map_err(|_| invalid())?),
            "resource" => {
                return Err(ProducerError::ReadOnlyProperty {
                    key: key.to_owned(),
                });
            }
            _ => return Err(ProducerError::UnknownProperty(key.to_owned())),
        }
        Ok(())
    }

    pub fn property(&self, key: &str) -> Option<String> {
        match key {
            "resource" => Some(self.resource.clone()),
            "speed" => Some(self.speed().to_string()),
            "limit_enabled" => Some(u8::from(self.limit_enabled).to_string()),
            "start_frame" => Some(self.range.start.to_string()),
            "end_frame" => Some(self.range.end.to_string()),
            _ => None,
        }
    }

    fn restricted_position(&self, position: Position) -> Option<Position> {
        if !self.limit_enabled {
            return None;
        }
        self.range.restrict(position)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" => Some(true),
        "0" | "false" | "" => Some(false),
        other => other.parse::<i64>().ok().map(|n| n != 0),
    }
}

impl FrameSource for VarispeedProducer {
    fn id(&self) -> ProducerId {
        self.id.clone()
    }

    fn get_frame(&mut self, index: usize) -> Result<Frame, ProducerError> {
        let position = self.inner.position();
        if let Some(restricted) = self.restricted_position(position) {
            trace!("Restricting {position} to {restricted} within {:?}", self.range);
            self.inner.set_position(restricted);
        }

        let mut frame = self.inner.get_frame(index)?;

        if !frame.is_test_audio() {
            frame.push_audio(Box::new(SpeedTransform {
                speed: self.speed.clone(),
            }));
        }

        Ok(frame)
    }

    fn seek(&mut self, position: Position) -> Result<(), ProducerError> {
        self.inner.seek(position)
    }

    fn position(&self) -> Position {
        self.inner.position()
    }

    fn set_position(&mut self, position: Position) {
        self.inner.set_position(position);
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed.set(speed);
    }

    fn apply_param_change(&mut self, id: &ProducerId, change: &ParameterChange) {
        if self.id != *id {
            self.inner.apply_param_change(id, change);
            return;
        }

        match *change {
            ParameterChange::SetSpeed(speed) => self.set_speed(speed),
            ParameterChange::SetLimitEnabled(enabled) => self.set_limit_enabled(enabled),
            ParameterChange::SetStartFrame(start) => self.set_start_frame(start),
            ParameterChange::SetEndFrame(end) => self.set_end_frame(end),
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.inner.close();
        self.closed = true;
        debug!("Closed varispeed producer {}", self.id);
    }
}

impl Drop for VarispeedProducer {
    fn drop(&mut self) {
        self.close();
    }
}


#[cfg(test)]
mod producer_tests {
    use super::*;
    use crate::{
        audio::{SampleData, format::AudioFormat},
        producer::mock::MockSource,
    };

    fn stereo_audio() -> AudioBuffer {
        AudioBuffer::interleaved_f32(vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0], 48000, 2).unwrap()
    }

    fn request() -> AudioRequest {
        AudioRequest::new(AudioFormat::F32Le, 48000, 2, 3)
    }

    fn limited(start: Position, end: Position) -> VarispeedConfig {
        VarispeedConfig {
            limit_enabled: true,
            start_frame: start,
            end_frame: end,
            ..VarispeedConfig::default()
        }
    }

    #[test]
    fn test_wrapping_sets_inner_speed_to_one() {
        let source = MockSource::with_audio(stereo_audio());
        let log = source.log();
        let _producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(0, 1));

        assert_eq!(log.lock().unwrap().speed, Some(1.0));
    }

    #[test]
    fn test_restricts_inner_position_into_loop() {
        let source = MockSource::with_audio(stereo_audio()).at(25);
        let log = source.log();
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(10, 20));

        let frame = producer.get_frame(0).unwrap();

        assert_eq!(frame.position(), 14);
        assert_eq!(log.lock().unwrap().set_positions, vec![14]);
    }

    #[test]
    fn test_loop_follows_inner_playhead() {
        let source = MockSource::with_audio(stereo_audio()).at(19);
        let log = source.log();
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(10, 20));

        for _ in 0..3 {
            producer.get_frame(0).unwrap();
        }

        assert_eq!(log.lock().unwrap().frame_positions, vec![19, 20, 10]);
    }

    #[test]
    fn test_loop_ending_at_max_position_from_property() {
        let source = MockSource::with_audio(stereo_audio()).at(25);
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(0, 1));

        producer
            .set_property("end_frame", &Position::MAX.to_string())
            .unwrap();
        let frame = producer.get_frame(0).unwrap();

        assert_eq!(frame.position(), 25);
    }

    #[test]
    fn test_invalid_range_passes_position_through() {
        let source = MockSource::with_audio(stereo_audio()).at(25);
        let log = source.log();
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(5, 5));

        let frame = producer.get_frame(0).unwrap();

        assert_eq!(frame.position(), 25);
        assert!(log.lock().unwrap().set_positions.is_empty());
    }

    #[test]
    fn test_disabled_limit_passes_position_through() {
        let source = MockSource::with_audio(stereo_audio()).at(25);
        let log = source.log();
        let config = VarispeedConfig {
            limit_enabled: false,
            ..limited(10, 20)
        };
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), config);

        assert_eq!(producer.get_frame(0).unwrap().position(), 25);
        assert!(log.lock().unwrap().set_positions.is_empty());
    }

    #[test]
    fn test_index_is_forwarded_untouched() {
        let source = MockSource::with_audio(stereo_audio()).at(25);
        let log = source.log();
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(10, 20));

        producer.get_frame(3).unwrap();
        assert_eq!(log.lock().unwrap().requested_indices, vec![3]);
    }

    #[test]
    fn test_reverse_speed_transforms_pulled_audio() {
        let config = VarispeedConfig {
            speed: -2.0,
            ..VarispeedConfig::default()
        };
        let source = MockSource::with_audio(stereo_audio());
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), config);

        let mut frame = producer.get_frame(0).unwrap();
        let audio = frame.get_audio(request()).unwrap();

        assert_eq!(audio.frequency(), 96000);
        assert_eq!(
            audio.data(),
            &SampleData::F32(vec![2.0, 12.0, 1.0, 11.0, 0.0, 10.0])
        );
    }

    #[test]
    fn test_unit_speed_leaves_audio_untouched() {
        let source = MockSource::with_audio(stereo_audio());
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());

        let mut frame = producer.get_frame(0).unwrap();
        assert_eq!(frame.get_audio(request()).unwrap(), stereo_audio());
    }

    #[test]
    fn test_speed_is_read_when_audio_is_pulled() {
        let source = MockSource::with_audio(stereo_audio());
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());

        let mut frame = producer.get_frame(0).unwrap();
        producer.set_speed(-0.5);
        let audio = frame.get_audio(request()).unwrap();

        assert_eq!(audio.frequency(), 24000);
        assert_eq!(
            audio.data(),
            &SampleData::F32(vec![2.0, 12.0, 1.0, 11.0, 0.0, 10.0])
        );
    }

    #[test]
    fn test_speed_handle_changes_are_seen_by_frames() {
        let source = MockSource::with_audio(stereo_audio());
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());
        let handle = producer.speed_handle();

        let mut frame = producer.get_frame(0).unwrap();
        handle.set(3.0);

        assert_eq!(frame.get_audio(request()).unwrap().frequency(), 144000);
        assert_eq!(producer.speed(), 3.0);
    }

    #[test]
    fn test_placeholder_frames_are_not_decorated() {
        let source = MockSource::silent();
        let mut producer =
            VarispeedProducer::wrap("blank", Box::new(source), VarispeedConfig::default());

        let frame = producer.get_frame(0).unwrap();
        assert!(frame.is_test_audio());
        assert_eq!(frame.pending_audio_steps(), 0);
    }

    #[test]
    fn test_frame_errors_propagate_verbatim() {
        let mut producer = VarispeedProducer::wrap(
            "broken",
            Box::new(MockSource::failing()),
            VarispeedConfig::default(),
        );

        let result = producer.get_frame(0);
        assert!(matches!(result, Err(ProducerError::Load { .. })));
    }

    #[test]
    fn test_audio_errors_propagate_verbatim() {
        let error = AudioError::Unavailable("codec error".to_owned());
        let source = MockSource::failing_audio(stereo_audio(), error.clone());
        let config = VarispeedConfig {
            speed: -1.0,
            ..VarispeedConfig::default()
        };
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), config);

        let mut frame = producer.get_frame(0).unwrap();
        assert_eq!(frame.get_audio(request()), Err(error));
    }

    #[test]
    fn test_seek_is_delegated_without_restriction() {
        let source = MockSource::with_audio(stereo_audio());
        let log = source.log();
        let mut producer = VarispeedProducer::wrap("clip.wav", Box::new(source), limited(10, 20));

        producer.seek(42).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.seeks, vec![42]);
        assert!(log.set_positions.is_empty());
        assert_eq!(producer.position(), 42);
    }

    #[test]
    fn test_close_closes_inner_once() {
        let source = MockSource::with_audio(stereo_audio());
        let log = source.log();
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());

        producer.close();
        producer.close();
        drop(producer);

        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_drop_closes_inner() {
        let source = MockSource::with_audio(stereo_audio());
        let log = source.log();
        drop(VarispeedProducer::wrap(
            "clip.wav",
            Box::new(source),
            VarispeedConfig::default(),
        ));

        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_param_changes_target_by_id() {
        let source = MockSource::with_audio(stereo_audio());
        let log = source.log();
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());
        let id = producer.id();

        producer.apply_param_change(&id, &ParameterChange::SetSpeed(-1.5));
        producer.apply_param_change(&id, &ParameterChange::SetLimitEnabled(true));
        producer.apply_param_change(&id, &ParameterChange::SetStartFrame(4));
        producer.apply_param_change(&id, &ParameterChange::SetEndFrame(8));
        producer.apply_param_change(&"mock-source".into(), &ParameterChange::SetEndFrame(2));

        assert_eq!(
            producer.config(),
            VarispeedConfig {
                speed: -1.5,
                limit_enabled: true,
                start_frame: 4,
                end_frame: 8,
            }
        );
        assert_eq!(
            log.lock().unwrap().param_changes,
            vec![ParameterChange::SetEndFrame(2)]
        );
    }

    #[test]
    fn test_properties_parse_textual_values() {
        let source = MockSource::with_audio(stereo_audio());
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());

        producer.set_property("speed", "-2").unwrap();
        producer.set_property("limit_enabled", "1").unwrap();
        producer.set_property("start_frame", "10").unwrap();
        producer.set_property("end_frame", " 20 ").unwrap();

        assert_eq!(producer.property("speed").as_deref(), Some("-2"));
        assert_eq!(producer.property("limit_enabled").as_deref(), Some("1"));
        assert_eq!(producer.property("start_frame").as_deref(), Some("10"));
        assert_eq!(producer.property("end_frame").as_deref(), Some("20"));
        assert_eq!(producer.property("resource").as_deref(), Some("clip.wav"));
        assert_eq!(producer.property("volume"), None);
    }

    #[test]
    fn test_property_errors() {
        let source = MockSource::with_audio(stereo_audio());
        let mut producer =
            VarispeedProducer::wrap("clip.wav", Box::new(source), VarispeedConfig::default());

        assert!(matches!(
            producer.set_property("speed", "fast"),
            Err(ProducerError::InvalidProperty { .. })
        ));
        assert!(matches!(
            producer.set_property("resource", "other.wav"),
            Err(ProducerError::ReadOnlyProperty { .. })
        ));
        assert!(matches!(
            producer.set_property("volume", "1"),
            Err(ProducerError::UnknownProperty(_))
        ));
    }
}

#[cfg(test)]
mod construction_tests {
    use super::*;
    use crate::{audio::format::AudioFormat, producer::mock::MockSource};

    fn unavailable(
        _: &Factory,
        _: &Profile,
        resource: &str,
    ) -> Result<Box<dyn FrameSource>, ProducerError> {
        Err(ProducerError::UnsupportedResource(resource.to_owned()))
    }

    fn mock(_: &Factory, _: &Profile, _: &str) -> Result<Box<dyn FrameSource>, ProducerError> {
        Ok(Box::new(MockSource::with_audio(AudioBuffer::silence(
            AudioFormat::F32Le,
            48000,
            2,
            4,
        ))))
    }

    #[test]
    fn test_construction_fails_when_wrapped_source_fails() {
        let mut factory = Factory::new();
        factory.register(INTERNAL_SERVICE, unavailable);

        let result = VarispeedProducer::new(&factory, &Profile::default(), "missing.mov");
        assert!(matches!(
            result,
            Err(ProducerError::UnsupportedResource(resource)) if resource == "missing.mov"
        ));
    }

    #[test]
    fn test_construction_fails_without_internal_service() {
        let factory = Factory::new();
        let result = VarispeedProducer::new(&factory, &Profile::default(), "clip.wav");
        assert!(matches!(result, Err(ProducerError::UnknownService(_))));
    }

    #[test]
    fn test_construction_uses_internal_service() {
        let mut factory = Factory::new();
        factory.register(INTERNAL_SERVICE, mock);

        let producer = VarispeedProducer::new(&factory, &Profile::default(), "clip.wav").unwrap();
        assert_eq!(producer.resource(), "clip.wav");
        assert_eq!(producer.config(), VarispeedConfig::default());
    }
}
