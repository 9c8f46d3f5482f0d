//! Scenario files: airspace, obstacles and aircraft state as JSON.
//!
//! Layout:
//!
//! ```json
//! {
//!   "environment": { "size_x": 50, "size_y": 50, "size_z": 5,
//!                    "airport": {"x": 5, "y": 25, "z": 0},
//!                    "faf": {"x": 20, "y": 25, "z": 1} },
//!   "cylinders": [ {"x": 32, "y": 25, "radius": 2, "height": 3} ],
//!   "aircraft": { "type": "light", "position": {"x": 40, "y": 10, "z": 3},
//!                 "speed": 180, "heading": 180 }
//! }
//! ```
//!
//! Missing keys fall back to the defaults below.

use std::path::Path;

use anyhow::{Context, Result};
use faf_core::{AircraftProfile, AircraftType, Environment, Obstacle, Point3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl From<Coordinates> for Point3 {
    fn from(c: Coordinates) -> Self {
        Point3::new(c.x, c.y, c.z)
    }
}

impl From<Point3> for Coordinates {
    fn from(p: Point3) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
    pub airport: Coordinates,
    pub faf: Coordinates,
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            size_x: 50.0,
            size_y: 50.0,
            size_z: 5.0,
            airport: Coordinates {
                x: 25.0,
                y: 25.0,
                z: 0.0,
            },
            faf: Coordinates {
                x: 15.0,
                y: 15.0,
                z: 1.5,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftSection {
    /// Type name; unknown names plan as a commercial aircraft.
    #[serde(rename = "type")]
    pub aircraft_type: String,
    pub position: Coordinates,
    pub speed: f64,
    pub heading: f64,
}

impl Default for AircraftSection {
    fn default() -> Self {
        Self {
            aircraft_type: "commercial".to_string(),
            position: Coordinates {
                x: 0.0,
                y: 0.0,
                z: 3.0,
            },
            speed: 250.0,
            heading: 90.0,
        }
    }
}

/// On-disk scenario document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub environment: EnvironmentSection,
    pub cylinders: Vec<Obstacle>,
    pub aircraft: AircraftSection,
}

/// A scenario resolved into planner inputs.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub environment: Environment,
    pub obstacles: Vec<Obstacle>,
    pub aircraft: AircraftProfile,
}

impl ScenarioFile {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse scenario JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn into_scenario(self, name: impl Into<String>) -> Scenario {
        let env = &self.environment;
        let environment = Environment::new(env.size_x, env.size_y, env.size_z)
            .with_points(env.airport.into(), env.faf.into());
        let aircraft = AircraftProfile::new(
            self.aircraft.position.into(),
            self.aircraft.speed,
            self.aircraft.heading,
            AircraftType::from_name(&self.aircraft.aircraft_type),
        );
        Scenario {
            name: name.into(),
            environment,
            obstacles: self.cylinders,
            aircraft,
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario".to_string());
        Ok(ScenarioFile::load(path)?.into_scenario(name))
    }
}
