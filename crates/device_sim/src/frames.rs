//! Frame payload synthesis
//!
//! Video payloads are generated once per stream and shared by every frame
//! (`Bytes` clone). Motion samples are encoded per frame as little-endian f32.

use bytes::{BufMut, Bytes, BytesMut};
use contracts::{PixelFormat, ProfileVariant, StreamKind, StreamProfile};

/// Sample units of a profile without geometry
const BASE_PAYLOAD_UNITS: usize = 256;

const GRAVITY: f32 = 9.81;

/// Payload source for one stream
pub(crate) enum PayloadSource {
    /// Same buffer for every frame
    Static(Bytes),
    /// Fresh xyz sample per frame
    Motion {
        stream: StreamKind,
        noise: f32,
    },
}

impl PayloadSource {
    pub(crate) fn for_profile(profile: &StreamProfile) -> Self {
        match profile.variant() {
            ProfileVariant::Video(extent) => {
                let pixels = extent.width as usize * extent.height as usize;
                Self::Static(pattern(profile.format(), pixels))
            }
            ProfileVariant::Motion(intrinsics) if profile.format() == PixelFormat::MotionXyz32f => {
                Self::Motion {
                    stream: profile.stream_type(),
                    noise: intrinsics.noise_variance.max(0.0).sqrt(),
                }
            }
            ProfileVariant::Motion(_) | ProfileVariant::Base => {
                Self::Static(pattern(profile.format(), BASE_PAYLOAD_UNITS))
            }
        }
    }

    pub(crate) fn payload(&self, frame_number: u64) -> Bytes {
        match self {
            Self::Static(data) => data.clone(),
            Self::Motion { stream, noise } => motion_sample(*stream, *noise, frame_number),
        }
    }
}

/// Horizontal ramp, one unit per pixel
fn pattern(format: PixelFormat, units: usize) -> Bytes {
    let unit = format.bytes_per_unit();
    let mut buf = BytesMut::with_capacity(units * unit);
    for i in 0..units {
        let level = (i % 256) as u8;
        match format {
            // depth ramp in millimetres
            PixelFormat::Z16 => buf.put_u16_le(500 + (i % 4096) as u16),
            PixelFormat::Y16 => buf.put_u16_le(u16::from(level) << 8),
            _ => buf.put_bytes(level, unit),
        }
    }
    buf.freeze()
}

/// One xyz sample: angular velocity (rad/s) for gyro, acceleration (m/s^2) otherwise
fn motion_sample(stream: StreamKind, noise: f32, frame_number: u64) -> Bytes {
    let phase = frame_number as f32 * 0.1;
    let jitter = noise * phase.sin();
    let (x, y, z) = match stream {
        StreamKind::Gyro => (0.01 * phase.sin() + jitter, 0.01 * phase.cos(), jitter),
        _ => (jitter, -GRAVITY + jitter, jitter),
    };

    let mut buf = BytesMut::with_capacity(12);
    buf.put_f32_le(x);
    buf.put_f32_le(y);
    buf.put_f32_le(z);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MotionIntrinsics, ProfileId, VideoExtent};

    fn profile(stream: StreamKind, format: PixelFormat, variant: ProfileVariant) -> StreamProfile {
        StreamProfile::new(ProfileId(1), stream, 0, stream.label(), 30, format, variant)
    }

    #[test]
    fn test_video_payload_size() {
        let p = profile(
            StreamKind::Depth,
            PixelFormat::Z16,
            ProfileVariant::Video(VideoExtent {
                width: 640,
                height: 480,
            }),
        );
        let source = PayloadSource::for_profile(&p);
        let a = source.payload(1);
        let b = source.payload(2);
        assert_eq!(a.len(), 640 * 480 * 2);
        // shared buffer
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn test_accel_sample_reads_gravity() {
        let p = profile(
            StreamKind::Accel,
            PixelFormat::MotionXyz32f,
            ProfileVariant::Motion(MotionIntrinsics::default()),
        );
        let data = PayloadSource::for_profile(&p).payload(5);
        assert_eq!(data.len(), 12);
        let y = f32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        assert!((y + GRAVITY).abs() < 1e-4);
    }

    #[test]
    fn test_base_payload() {
        let p = profile(StreamKind::Confidence, PixelFormat::Raw8, ProfileVariant::Base);
        let data = PayloadSource::for_profile(&p).payload(1);
        assert_eq!(data.len(), BASE_PAYLOAD_UNITS);
    }
}
