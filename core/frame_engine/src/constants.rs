/// Tolerance when comparing decoded or interpolated samples.
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-4;

/// Service id under which the varispeed decorator is registered.
pub const VARISPEED_SERVICE: &str = "varispeed";

/// Service id used by the decorator to load the source it wraps.
pub const INTERNAL_SERVICE: &str = "abnormal";

pub const FRAMERANGE_SERVICE: &str = "framerange";

pub const DEFAULT_FREQUENCY: u32 = 48000;
pub const DEFAULT_CHANNELS: usize = 2;

/// Consecutive frames that add no audio before an output block is padded with silence.
pub const MAX_EMPTY_PULLS: usize = 16;
