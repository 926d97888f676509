//! Stream profile description and lookup

use contracts::{ProfileId, Sensor, StreamKind, StreamProfile};

/// One-line identity of a profile
///
/// `Stream #7 is Infrared #1, Named: "Infrared 1"`
pub fn describe(profile: &StreamProfile) -> String {
    format!(
        "Stream #{} is {} #{}, Named: \"{}\"",
        profile.unique_id(),
        profile.stream_type(),
        profile.stream_index(),
        profile.stream_name()
    )
}

/// Kind-specific detail line, `None` for base profiles
pub fn describe_extension(profile: &StreamProfile) -> Option<String> {
    if let Some(video) = profile.video() {
        return Some(format!(
            "This stream is a video stream representing a stream of images with a resolution of {}x{}, \
             a frame rate of {} frames per second, and a pixel format of: {}",
            video.width(),
            video.height(),
            video.fps(),
            video.format()
        ));
    }
    profile.motion().map(|motion| {
        let intrinsics = motion.intrinsics();
        format!(
            "This stream is a motion stream sampled at {} Hz, format {} \
             (noise variance {}, bias variance {})",
            motion.fps(),
            profile.format(),
            intrinsics.noise_variance,
            intrinsics.bias_variance
        )
    })
}

/// The profile a plain walkthrough opens: the sensor's first one
pub fn first_profile(sensor: &dyn Sensor) -> Option<StreamProfile> {
    sensor.stream_profiles().into_iter().next()
}

/// Profile of a given stream kind and index
pub fn find(profiles: &[StreamProfile], stream: StreamKind, index: u32) -> Option<&StreamProfile> {
    profiles
        .iter()
        .find(|p| p.stream_type() == stream && p.stream_index() == index)
}

pub fn find_by_id(profiles: &[StreamProfile], id: ProfileId) -> Option<&StreamProfile> {
    profiles.iter().find(|p| p.unique_id() == id)
}
