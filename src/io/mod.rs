// Purpose - external interfaces, format conversions

pub mod converter;
pub mod offline;
#[cfg(feature = "rtrb")]
pub mod ring;
pub mod wav;

pub use offline::OfflineIo;
#[cfg(feature = "rtrb")]
pub use ring::RingIo;

/// A decoded impulse response as delivered by the file collaborator.
///
/// `samples` are interleaved when `channels > 1`; the convolution engine only
/// accepts mono.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpulseResponse {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl ImpulseResponse {
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: 1,
            samples,
        }
    }
}
