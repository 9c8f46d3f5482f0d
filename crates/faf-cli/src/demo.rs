//! Built-in demonstration scenarios.
//!
//! All share a 50 x 50 x 5 km airspace with the airport at (5, 25, 0) and
//! the FAF at (20, 25, 1).

use faf_core::{AircraftProfile, AircraftType, Environment, Point3};

use crate::scenario::Scenario;

pub fn demo_environment() -> Environment {
    Environment::new(50.0, 50.0, 5.0)
        .with_points(Point3::new(5.0, 25.0, 0.0), Point3::new(20.0, 25.0, 1.0))
}

fn scenario(name: &str, aircraft: AircraftProfile) -> Scenario {
    Scenario {
        name: name.to_string(),
        environment: demo_environment(),
        obstacles: Vec::new(),
        aircraft,
    }
}

pub fn demo_scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "south-east, heading south",
            AircraftProfile::new(Point3::new(40.0, 10.0, 3.0), 180.0, 180.0, AircraftType::Light),
        ),
        scenario(
            "north, high, heading north",
            AircraftProfile::new(Point3::new(25.0, 40.0, 5.0), 180.0, 0.0, AircraftType::Light),
        ),
        scenario(
            "low, climbing to the FAF",
            AircraftProfile::new(Point3::new(30.0, 15.0, 0.5), 180.0, 90.0, AircraftType::Light),
        ),
        scenario(
            "airliner, north-east",
            AircraftProfile::new(Point3::new(40.0, 35.0, 4.0), 250.0, 45.0, AircraftType::Commercial),
        ),
        scenario(
            "on the axis, heading west",
            AircraftProfile::new(Point3::new(25.0, 25.0, 3.0), 180.0, 270.0, AircraftType::Light),
        ),
    ]
}
