//! In-memory audio I/O for offline rendering and tests.

use crate::engine::{AudioIo, StreamError};

/// Feeds a fixed buffer through the period loop and collects the output.
///
/// The last partial period is zero-padded to a full one. Reading past the end
/// reports [`StreamError::Closed`].
#[derive(Debug, Clone, Default)]
pub struct OfflineIo {
    input: Vec<f32>,
    position: usize,
    output: Vec<f32>,
}

impl OfflineIo {
    pub fn new(input: Vec<f32>) -> Self {
        Self {
            output: Vec::with_capacity(input.len()),
            input,
            position: 0,
        }
    }

    /// Append `samples` of silence so delay and reverb tails can ring out.
    pub fn with_tail(mut self, samples: usize) -> Self {
        self.input.resize(self.input.len() + samples, 0.0);
        self
    }

    pub fn output(&self) -> &[f32] {
        &self.output
    }

    pub fn into_output(self) -> Vec<f32> {
        self.output
    }
}

impl AudioIo for OfflineIo {
    fn read_period(&mut self, input: &mut [f32]) -> Result<usize, StreamError> {
        if self.position >= self.input.len() {
            return Err(StreamError::Closed);
        }

        let end = (self.position + input.len()).min(self.input.len());
        let available = &self.input[self.position..end];
        input[..available.len()].copy_from_slice(available);
        input[available.len()..].fill(0.0);
        self.position = end;

        Ok(input.len())
    }

    fn write_period(&mut self, output: &[f32]) -> Result<usize, StreamError> {
        self.output.extend_from_slice(output);
        Ok(output.len())
    }

    fn recover(&mut self, _error: &StreamError) -> Result<(), StreamError> {
        Ok(())
    }
}
