/// How channels are arranged within a sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `L R L R ...`: one sample frame holds every channel
    Interleaved,
    /// `L L ... R R ...`: one contiguous plane per channel
    Planar,
}

/// Sample formats a frame can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Signed 16-bit, interleaved
    S16,
    /// Signed 32-bit, planar
    S32,
    /// 32-bit float, planar
    Float,
    /// Signed 32-bit, interleaved
    S32Le,
    /// 32-bit float, interleaved
    F32Le,
    /// Unsigned 8-bit, interleaved
    U8,
}

impl AudioFormat {
    pub fn layout(self) -> Layout {
        match self {
            Self::S32 | Self::Float => Layout::Planar,
            Self::S16 | Self::S32Le | Self::F32Le | Self::U8 => Layout::Interleaved,
        }
    }
}
