//! Weather parameter bundles and the named conditions used by the tests.
//!
//! The factory functions are pure: the same arguments always produce the
//! same bundle. Fields unrelated to a condition keep fixed baseline values
//! so two runs differ only in what the condition is about.

use serde::{Deserialize, Serialize};

/// Full weather parameter set applied to the simulated world.
///
/// Field names and units follow the simulator's weather API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherParams {
    pub cloudiness: f32,
    pub precipitation: f32,
    pub precipitation_deposits: f32,
    pub wind_intensity: f32,
    pub sun_azimuth_angle: f32,
    pub sun_altitude_angle: f32,
    pub fog_density: f32,
    pub fog_distance: f32,
    pub fog_falloff: f32,
    pub wetness: f32,
    pub scattering_intensity: f32,
    pub mie_scattering_scale: f32,
    pub rayleigh_scattering_scale: f32,
}

/// Heavy rain with full wetness and some fog haze
pub fn heavy_rain() -> WeatherParams {
    WeatherParams {
        cloudiness: 80.0,
        precipitation: 100.0,
        precipitation_deposits: 40.0,
        wind_intensity: 30.0,
        sun_azimuth_angle: 285.0,
        sun_altitude_angle: 25.0,
        fog_density: 10.0,
        fog_distance: 60.0,
        fog_falloff: 1.0,
        wetness: 100.0,
        scattering_intensity: 1.0,
        mie_scattering_scale: 0.03,
        rayleigh_scattering_scale: 0.0331,
    }
}

/// Dense fog starting directly at the camera
pub fn foggy() -> WeatherParams {
    WeatherParams {
        cloudiness: 90.0,
        precipitation: 0.0,
        precipitation_deposits: 40.0,
        wind_intensity: 30.0,
        sun_azimuth_angle: 285.0,
        sun_altitude_angle: 25.0,
        fog_density: 100.0,
        fog_distance: 0.0,
        fog_falloff: 1.0,
        wetness: 0.0,
        scattering_intensity: 1.0,
        mie_scattering_scale: 0.03,
        rayleigh_scattering_scale: 0.0331,
    }
}

/// Low sun for glare and low-light tests.
///
/// `sun_azimuth` points the sun; `sun_altitude` defaults to 1.6 degrees
/// (just above the horizon) when selected from a config file.
pub fn sunset(sun_azimuth: f32, sun_altitude: f32) -> WeatherParams {
    WeatherParams {
        cloudiness: 10.0,
        precipitation: 0.0,
        precipitation_deposits: 40.0,
        wind_intensity: 30.0,
        sun_azimuth_angle: sun_azimuth,
        sun_altitude_angle: sun_altitude,
        fog_density: 10.0,
        fog_distance: 60.0,
        fog_falloff: 1.0,
        wetness: 0.0,
        scattering_intensity: 1.0,
        mie_scattering_scale: 0.03,
        rayleigh_scattering_scale: 0.0331,
    }
}

/// The baseline daylight condition the Town07 sign scenes were tuned for
pub fn town7_default() -> WeatherParams {
    WeatherParams {
        cloudiness: 10.0,
        precipitation: 0.0,
        precipitation_deposits: 40.0,
        wind_intensity: 30.0,
        sun_azimuth_angle: 285.0,
        sun_altitude_angle: 25.0,
        fog_density: 10.0,
        fog_distance: 60.0,
        fog_falloff: 1.0,
        wetness: 0.0,
        scattering_intensity: 1.0,
        mie_scattering_scale: 0.03,
        rayleigh_scattering_scale: 0.0331,
    }
}

/// Named weather condition as written in a run config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum WeatherSelection {
    HeavyRain,
    Foggy,
    Sunset {
        #[serde(default)]
        sun_azimuth: f32,
        #[serde(default = "default_sun_altitude")]
        sun_altitude: f32,
    },
    Town7Default,
}

fn default_sun_altitude() -> f32 {
    1.6
}

impl WeatherSelection {
    /// Resolve the selection to a full parameter bundle
    pub fn to_params(self) -> WeatherParams {
        match self {
            Self::HeavyRain => heavy_rain(),
            Self::Foggy => foggy(),
            Self::Sunset {
                sun_azimuth,
                sun_altitude,
            } => sunset(sun_azimuth, sun_altitude),
            Self::Town7Default => town7_default(),
        }
    }

    /// Short name for logging and summaries
    pub fn name(&self) -> &'static str {
        match self {
            Self::HeavyRain => "heavy_rain",
            Self::Foggy => "foggy",
            Self::Sunset { .. } => "sunset",
            Self::Town7Default => "town7_default",
        }
    }
}
