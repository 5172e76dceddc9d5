//! # Configuration System
//!
//! Editor settings grouped per subsystem and loadable from TOML or RON.
//!
//! ## Sections
//!
//! - **camera**: editor camera placement, projection and control tuning
//! - **picking**: mouse picking exclusions and viewport header height
//! - **scene**: naming of the root and of default-named objects

pub use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        Self::from_str_with_format(&contents, ConfigFormat::from_path(path)?)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_with_format(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse configuration text in the given format
    fn from_str_with_format(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render configuration text in the given format
    fn to_string_with_format(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    Toml,
    /// Rusty Object Notation (`.ron`)
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            Ok(Self::Toml)
        } else if path.ends_with(".ron") {
            Ok(Self::Ron)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Editor camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Initial camera position
    pub position: [f32; 3],
    /// Point the camera looks at on startup
    pub look_at: [f32; 3],
    /// Vertical field of view in degrees
    pub vertical_fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Width / height of the viewport
    pub aspect_ratio: f32,
    /// Fly speed in units per second
    pub movement_speed: f32,
    /// Speed multiplier while the boost key is held
    pub boost_multiplier: f32,
    /// Mouse sensitivity for free look and orbit
    pub sensitivity: f32,
    /// Radians per sensitivity-scaled pixel of mouse motion
    pub rotation_step: f32,
    /// Weight of the previous frame's rotation delta (0 disables smoothing)
    pub smoothing: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 10.0, -40.0],
            look_at: [0.0, 0.0, 0.0],
            vertical_fov_degrees: 60.0,
            near: 0.1,
            far: 250.0,
            aspect_ratio: 16.0 / 9.0,
            movement_speed: 10.0,
            boost_multiplier: 4.0,
            sensitivity: 0.5,
            rotation_step: 0.1,
            smoothing: 0.95,
        }
    }
}

impl CameraSettings {
    /// Initial position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Initial look-at target as a vector
    pub fn look_at(&self) -> Vec3 {
        Vec3::from(self.look_at)
    }
}

/// Mouse picking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingSettings {
    /// Nodes with this name never take part in picking
    pub reserved_camera_name: String,
    /// Height of the viewport title bar excluded from the picking area
    pub title_bar_height: f32,
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self {
            reserved_camera_name: "Camera".to_string(),
            title_bar_height: 0.0,
        }
    }
}

/// Scene naming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Name given to the root node
    pub root_name: String,
    /// Name that gets the creation counter appended
    pub default_object_name: String,
    /// Name given to game camera nodes
    pub camera_name: String,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            root_name: "Root".to_string(),
            default_object_name: "GameObject".to_string(),
            camera_name: "Camera".to_string(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor camera section
    pub camera: CameraSettings,
    /// Picking section
    pub picking: PickingSettings,
    /// Scene section
    pub scene: SceneSettings,
}

impl Config for EditorConfig {}
