use foundation::math::Vec3;
use foundation::{Color, ViewerName};
use scene::components::{Light, Transform};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    pub position: [f64; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 35.0,
            near: 1.0,
            far: 3000.0,
            position: [0.0, 0.0, 30.0],
        }
    }
}

/// Hemisphere light colours as packed `0xRRGGBB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub sky: u32,
    pub ground: u32,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            sky: 0xFFFFFF,
            ground: 0x000000,
            intensity: 1.0,
        }
    }
}

impl LightConfig {
    pub fn light(&self) -> Light {
        Light::hemisphere(
            Color::from_hex(self.sky),
            Color::from_hex(self.ground),
            self.intensity,
        )
    }
}

/// Placement applied to the loaded mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshPlacement {
    pub position: [f64; 3],
    /// Euler angles in radians (XYZ order).
    pub rotation: [f64; 3],
    pub scale: f64,
}

impl Default for MeshPlacement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: 0.006,
        }
    }
}

impl MeshPlacement {
    pub fn transform(&self) -> Transform {
        Transform {
            position: Vec3::from_array(self.position),
            rotation: Vec3::from_array(self.rotation),
            ..Transform::identity()
        }
        .scale_uniform(self.scale)
    }
}

/// Fixed presentation settings shared by viewer instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    /// Scene background as packed `0xRRGGBB`.
    pub background: u32,
    pub light: LightConfig,
    pub mesh: MeshPlacement,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            background: 0xFFFFFF,
            light: LightConfig::default(),
            mesh: MeshPlacement::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerEntry {
    pub name: String,
    pub asset_path: String,
    /// Replaces the page defaults for this viewer when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ViewerConfig>,
}

impl ViewerEntry {
    pub fn new(name: impl Into<String>, asset_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_path: asset_path.into(),
            config: None,
        }
    }
}

/// Viewers on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub viewers: Vec<ViewerEntry>,
    #[serde(default)]
    pub defaults: ViewerConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewers: vec![
                ViewerEntry::new("cave", "./meshes/cave_enlarged_rotated.ply"),
                ViewerEntry::new("candyhouse", "./meshes/candyhouse_enlarged_rotated.ply"),
            ],
            defaults: ViewerConfig::default(),
        }
    }
}

impl PageConfig {
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: PageConfig = serde_json::from_str(payload).map_err(ConfigError::Json)?;
        for entry in &config.viewers {
            if ViewerName::new(entry.name.as_str()).is_none() {
                return Err(ConfigError::InvalidViewerName(entry.name.clone()));
            }
        }
        Ok(config)
    }

    pub fn config_for<'a>(&'a self, entry: &'a ViewerEntry) -> &'a ViewerConfig {
        entry.config.as_ref().unwrap_or(&self.defaults)
    }
}
