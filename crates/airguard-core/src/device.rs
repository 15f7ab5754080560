//! Breathing apparatus profiles and the per-type catalog

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum pressure at which work at the fire source may begin,
/// single-cylinder apparatus (Drager/MSA class), in bar.
pub const WORK_START_THRESHOLD_SINGLE_BAR: u16 = 200;

/// Minimum pressure at which work at the fire source may begin,
/// two-cylinder apparatus (ASP-2 class), in bar.
pub const WORK_START_THRESHOLD_TWIN_BAR: u16 = 140;

/// Physical constants of one apparatus type.
///
/// All values are strictly positive; [`DeviceProfile::validate`] enforces
/// this at session creation so the calculator never divides by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Number of cylinders on the apparatus
    pub cylinder_count: u8,

    /// Water volume of a single cylinder, liters
    pub cylinder_volume_l: f64,

    /// Safety reserve, bar. Never planned as usable air.
    pub reserve_pressure_bar: f64,

    /// Rated air consumption at average load, l/min
    pub nominal_consumption_lpm: f64,
}

impl DeviceProfile {
    pub fn new(
        cylinder_count: u8,
        cylinder_volume_l: f64,
        reserve_pressure_bar: f64,
        nominal_consumption_lpm: f64,
    ) -> Result<Self> {
        let profile = Self {
            cylinder_count,
            cylinder_volume_l,
            reserve_pressure_bar,
            nominal_consumption_lpm,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check the all-positive invariant.
    ///
    /// A non-positive constant is a programming error in the catalog, not
    /// an operator mistake: loud in debug builds, an error in release.
    pub fn validate(&self) -> Result<()> {
        let ok = self.cylinder_count > 0
            && self.cylinder_volume_l > 0.0
            && self.reserve_pressure_bar > 0.0
            && self.nominal_consumption_lpm > 0.0;
        debug_assert!(ok, "device profile with non-positive constants: {self:?}");
        if ok {
            Ok(())
        } else {
            Err(Error::invalid_device_profile(format!(
                "all constants must be positive, got {self:?}"
            )))
        }
    }

    /// Pressure below which work at the source must not begin, bar.
    pub fn work_start_threshold_bar(&self) -> u16 {
        if self.cylinder_count >= 2 {
            WORK_START_THRESHOLD_TWIN_BAR
        } else {
            WORK_START_THRESHOLD_SINGLE_BAR
        }
    }
}

/// Apparatus types in service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApparatusKind {
    DragerPss3000,
    DragerPss4000,
    Asp2,
    Msa,
}

impl ApparatusKind {
    pub const ALL: &'static [ApparatusKind] = &[
        ApparatusKind::DragerPss3000,
        ApparatusKind::DragerPss4000,
        ApparatusKind::Asp2,
        ApparatusKind::Msa,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ApparatusKind::DragerPss3000 => "Drager PSS3000",
            ApparatusKind::DragerPss4000 => "Drager PSS4000",
            ApparatusKind::Asp2 => "ASP-2",
            ApparatusKind::Msa => "MSA",
        }
    }

    /// Catalog constants for this apparatus type.
    pub fn profile(&self) -> DeviceProfile {
        match self {
            ApparatusKind::DragerPss3000 => DeviceProfile {
                cylinder_count: 1,
                cylinder_volume_l: 6.0,
                reserve_pressure_bar: 50.0,
                nominal_consumption_lpm: 40.0,
            },
            ApparatusKind::DragerPss4000 => DeviceProfile {
                cylinder_count: 1,
                cylinder_volume_l: 7.0,
                reserve_pressure_bar: 50.0,
                nominal_consumption_lpm: 40.0,
            },
            ApparatusKind::Asp2 => DeviceProfile {
                cylinder_count: 2,
                cylinder_volume_l: 4.5,
                reserve_pressure_bar: 30.0,
                nominal_consumption_lpm: 54.0,
            },
            ApparatusKind::Msa => DeviceProfile {
                cylinder_count: 1,
                cylinder_volume_l: 6.0,
                reserve_pressure_bar: 50.0,
                nominal_consumption_lpm: 45.0,
            },
        }
    }
}
