use std::{collections::VecDeque, fmt};

use log::debug;
use rubato::{FastFixedIn, PolynomialDegree, Resampler as _};

use crate::error::AudioError;

/// How far the ratio may drift from the one a resampler was built with
/// before it has to be rebuilt.
const MAX_RELATIVE_RATIO: f64 = 64.0;

/// Streaming stereo resampler over rubato's [`FastFixedIn`].
///
/// Input is buffered until a full chunk is available, so samples left over
/// from one call are resampled together with the next. Each call may use a
/// different input rate, which is how frames whose reported frequency was
/// scaled by the playback speed come out faster or slower at a fixed output
/// rate.
pub struct StreamResampler {
    chunk_size: usize,
    /// Planar left/right input not yet consumed by the resampler
    input: [Vec<f32>; 2],
    resampler: Option<FastFixedIn<f32>>,
}

impl StreamResampler {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            input: [Vec::new(), Vec::new()],
            resampler: None,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Drops buffered input and the resampler's history.
    pub fn reset(&mut self) {
        self.input.iter_mut().for_each(Vec::clear);
        if let Some(resampler) = &mut self.resampler {
            resampler.reset();
        }
    }

    /// Appends `input` converted from `input_rate` to `output_rate` onto `output`.
    ///
    /// Empty input or a zero rate produce nothing. Output lags input by up to
    /// one chunk.
    pub fn process(
        &mut self,
        input: &[(f32, f32)],
        input_rate: u32,
        output_rate: u32,
        output: &mut VecDeque<(f32, f32)>,
    ) -> Result<(), AudioError> {
        if input.is_empty() || input_rate == 0 || output_rate == 0 {
            return Ok(());
        }

        self.set_ratio(f64::from(output_rate) / f64::from(input_rate))?;
        for &(l, r) in input {
            self.input[0].push(l);
            self.input[1].push(r);
        }

        let result = self.drain_chunks(output);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn set_ratio(&mut self, ratio: f64) -> Result<(), AudioError> {
        if let Some(resampler) = &mut self.resampler {
            if resampler.set_resample_ratio(ratio, false).is_ok() {
                return Ok(());
            }
            debug!("Ratio {ratio} out of range, rebuilding resampler");
        }

        let resampler = FastFixedIn::<f32>::new(
            ratio,
            MAX_RELATIVE_RATIO,
            PolynomialDegree::Cubic,
            self.chunk_size,
            2,
        )
        .map_err(|e| AudioError::Resample(e.to_string()))?;
        self.resampler = Some(resampler);
        Ok(())
    }

    fn drain_chunks(&mut self, output: &mut VecDeque<(f32, f32)>) -> Result<(), AudioError> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(());
        };

        let mut consumed = 0;
        loop {
            let needed = resampler.input_frames_next();
            if self.input[0].len() - consumed < needed {
                break;
            }

            let end = consumed + needed;
            let chunk = [
                &self.input[0][consumed..end],
                &self.input[1][consumed..end],
            ];
            let planar = resampler
                .process(&chunk[..], None)
                .map_err(|e| AudioError::Resample(e.to_string()))?;
            output.extend(planar[0].iter().copied().zip(planar[1].iter().copied()));
            consumed = end;
        }

        for channel in &mut self.input {
            channel.drain(..consumed);
        }
        Ok(())
    }
}

impl fmt::Debug for StreamResampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResampler")
            .field("chunk_size", &self.chunk_size)
            .field("buffered", &self.input[0].len())
            .field("active", &self.resampler.is_some())
            .finish()
    }
}
