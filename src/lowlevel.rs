//! Low-level building blocks for custom detection and matching pipelines.
//!
//! These expose the individual stages behind the high-level detectors and
//! matcher: interest maps, Förstner stages, correlation kernels and window
//! plans. Most users should prefer [`crate::Moravec`], [`crate::Forstner`]
//! and [`crate::StereoMatcher`].

pub use crate::candidate::nms::suppress_tiles;
pub use crate::detect::forstner::{
    preselect as forstner_preselect, select_candidates as forstner_candidates,
    shape_maps as forstner_shape_maps, GrayCovariance,
};
pub use crate::detect::moravec::{
    directional_minimum, directional_sums, moravec_interest,
    select_candidates as moravec_candidates,
};
pub use crate::disparity::{disparities, Disparity, DEFAULT_OUTLIER_GATE};
pub use crate::kernel::scalar::CcScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::CcSimd;
pub use crate::kernel::{correlation_coefficient, Kernel, WindowPlan};
