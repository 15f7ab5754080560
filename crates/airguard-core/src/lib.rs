//! # airguard-core - Core Domain Types
//!
//! Foundation crate for AirGuard. Provides the air-budget physics, apparatus
//! catalog, domain types, alert kinds, and error handling.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Devices (`device`)
//! - [`DeviceProfile`] - Physical constants of one apparatus type
//! - [`ApparatusKind`] - Catalog of apparatus in service
//!
//! ### Physics (`calculator`)
//! - [`work_time_minutes`] - The universal `(N·V·P)/(Q·P_atm)` formula
//! - [`protection_time`], [`critical_pressure`], [`hood_pressure`],
//!   [`exit_start_pressure`], [`actual_air_consumption`],
//!   [`evacuation_time_with_victim`]
//!
//! ### Domain Types (`types`)
//! - [`OperationPhase`] - Team lifecycle phase (Entered, SearchingForSource, ...)
//! - [`WorkMode`], [`TeamMember`], [`TeamRole`], [`OperationContext`]
//! - [`ValidationError`], [`OperationalWarning`] - reportable session data
//!
//! ### Events (`events`)
//! - [`AlertKind`] - Identity of a safety timer / scheduled alert
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use airguard_core::prelude::*;
//! ```

pub mod calculator;
pub mod device;
pub mod error;
pub mod events;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all AirGuard crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use calculator::{
    actual_air_consumption, critical_pressure, evacuation_time_with_victim, exit_start_pressure,
    hood_pressure, protection_time, work_time_minutes, work_time_minutes_floored,
    ConsumptionEstimate, ATMOSPHERIC_PRESSURE_BAR, CONSUMPTION_CEILING_FACTOR,
    CONSUMPTION_FLOOR_FACTOR, EVACUATION_LOAD_FACTOR, MIN_EFFECTIVE_SEARCH_TIME_MIN,
};
pub use device::{
    ApparatusKind, DeviceProfile, WORK_START_THRESHOLD_SINGLE_BAR, WORK_START_THRESHOLD_TWIN_BAR,
};
pub use error::{Error, Result, ResultExt};
pub use events::AlertKind;
pub use types::{
    team_min_pressure, OperationContext, OperationPhase, OperationalWarning, TeamMember, TeamRole,
    ValidationError, WorkMode,
};
