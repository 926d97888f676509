//! Stream profiles
//!
//! A `StreamProfile` describes one candidate data stream a sensor can produce.
//! Kind-specific data lives in a closed variant (`ProfileVariant`); callers test
//! the kind first (`is` / `video` / `motion`) and then narrow (`as_video` /
//! `as_motion`). Narrowing without a matching kind is a programming error and
//! panics.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Type of data carried by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Depth,
    Color,
    Infrared,
    Fisheye,
    Gyro,
    Accel,
    Pose,
    Confidence,
}

impl StreamKind {
    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Depth => "Depth",
            Self::Color => "Color",
            Self::Infrared => "Infrared",
            Self::Fisheye => "Fisheye",
            Self::Gyro => "Gyro",
            Self::Accel => "Accel",
            Self::Pose => "Pose",
            Self::Confidence => "Confidence",
        }
    }

    /// Default display name for the `index`-th stream of this kind
    pub fn default_name(&self, index: u32) -> String {
        if index == 0 {
            self.label().to_string()
        } else {
            format!("{} {}", self.label(), index)
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pixel / sample format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Z16,
    Y8,
    Y16,
    Rgb8,
    Bgr8,
    Yuyv,
    Raw8,
    MotionXyz32f,
    SixDof,
}

impl PixelFormat {
    /// Bytes per pixel for image formats, bytes per sample otherwise
    pub fn bytes_per_unit(&self) -> usize {
        match self {
            Self::Y8 | Self::Raw8 => 1,
            Self::Z16 | Self::Y16 | Self::Yuyv => 2,
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::MotionXyz32f => 12,
            Self::SixDof => 64,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Z16 => "Z16",
            Self::Y8 => "Y8",
            Self::Y16 => "Y16",
            Self::Rgb8 => "RGB8",
            Self::Bgr8 => "BGR8",
            Self::Yuyv => "YUYV",
            Self::Raw8 => "RAW8",
            Self::MotionXyz32f => "MOTION_XYZ32F",
            Self::SixDof => "6DOF",
        };
        f.write_str(name)
    }
}

/// Identifier unique across all profiles handed out by one hardware registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub u32);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    Base,
    Video,
    Motion,
}

/// Image geometry of a video profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoExtent {
    pub width: u32,
    pub height: u32,
}

/// Noise model of a motion profile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionIntrinsics {
    #[serde(default)]
    pub noise_variance: f32,
    #[serde(default)]
    pub bias_variance: f32,
}

/// Kind-specific extension of a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileVariant {
    Base,
    Video(VideoExtent),
    Motion(MotionIntrinsics),
}

impl ProfileVariant {
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Base => ProfileKind::Base,
            Self::Video(_) => ProfileKind::Video,
            Self::Motion(_) => ProfileKind::Motion,
        }
    }
}

/// Immutable stream descriptor
///
/// Equality and hashing use `unique_id` only.
#[derive(Debug, Clone, Serialize)]
pub struct StreamProfile {
    unique_id: ProfileId,
    stream: StreamKind,
    index: u32,
    name: String,
    fps: u32,
    format: PixelFormat,
    variant: ProfileVariant,
}

impl StreamProfile {
    pub fn new(
        unique_id: ProfileId,
        stream: StreamKind,
        index: u32,
        name: impl Into<String>,
        fps: u32,
        format: PixelFormat,
        variant: ProfileVariant,
    ) -> Self {
        Self {
            unique_id,
            stream,
            index,
            name: name.into(),
            fps,
            format,
            variant,
        }
    }

    /// Globally unique id
    pub fn unique_id(&self) -> ProfileId {
        self.unique_id
    }

    /// Stream data type
    pub fn stream_type(&self) -> StreamKind {
        self.stream
    }

    /// Per-kind index, distinguishes several streams of the same kind
    pub fn stream_index(&self) -> u32 {
        self.index
    }

    /// Display name (not unique)
    pub fn stream_name(&self) -> &str {
        &self.name
    }

    /// Nominal frame rate
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn variant(&self) -> &ProfileVariant {
        &self.variant
    }

    pub fn kind(&self) -> ProfileKind {
        self.variant.kind()
    }

    /// Capability test for a narrowing projection
    pub fn is(&self, kind: ProfileKind) -> bool {
        self.kind() == kind
    }

    /// Checked video view
    pub fn video(&self) -> Option<VideoStreamProfile<'_>> {
        match &self.variant {
            ProfileVariant::Video(extent) => Some(VideoStreamProfile {
                profile: self,
                extent,
            }),
            _ => None,
        }
    }

    /// Video view of a profile already known to be video.
    ///
    /// # Panics
    /// When the profile is not a video profile.
    pub fn as_video(&self) -> VideoStreamProfile<'_> {
        match self.video() {
            Some(view) => view,
            None => panic!(
                "stream profile #{} ({:?}) is not a video profile",
                self.unique_id,
                self.kind()
            ),
        }
    }

    /// Checked motion view
    pub fn motion(&self) -> Option<MotionStreamProfile<'_>> {
        match &self.variant {
            ProfileVariant::Motion(intrinsics) => Some(MotionStreamProfile {
                profile: self,
                intrinsics,
            }),
            _ => None,
        }
    }

    /// Motion view of a profile already known to be motion.
    ///
    /// # Panics
    /// When the profile is not a motion profile.
    pub fn as_motion(&self) -> MotionStreamProfile<'_> {
        match self.motion() {
            Some(view) => view,
            None => panic!(
                "stream profile #{} ({:?}) is not a motion profile",
                self.unique_id,
                self.kind()
            ),
        }
    }
}

impl PartialEq for StreamProfile {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl Eq for StreamProfile {}

impl Hash for StreamProfile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_id.hash(state);
    }
}

/// Narrowed view of a video profile
#[derive(Debug, Clone, Copy)]
pub struct VideoStreamProfile<'a> {
    profile: &'a StreamProfile,
    extent: &'a VideoExtent,
}

impl<'a> VideoStreamProfile<'a> {
    pub fn width(&self) -> u32 {
        self.extent.width
    }

    pub fn height(&self) -> u32 {
        self.extent.height
    }

    pub fn fps(&self) -> u32 {
        self.profile.fps
    }

    pub fn format(&self) -> PixelFormat {
        self.profile.format
    }

    /// The underlying base descriptor
    pub fn profile(&self) -> &'a StreamProfile {
        self.profile
    }
}

/// Narrowed view of a motion profile
#[derive(Debug, Clone, Copy)]
pub struct MotionStreamProfile<'a> {
    profile: &'a StreamProfile,
    intrinsics: &'a MotionIntrinsics,
}

impl<'a> MotionStreamProfile<'a> {
    pub fn intrinsics(&self) -> &'a MotionIntrinsics {
        self.intrinsics
    }

    pub fn fps(&self) -> u32 {
        self.profile.fps
    }

    pub fn profile(&self) -> &'a StreamProfile {
        self.profile
    }
}
