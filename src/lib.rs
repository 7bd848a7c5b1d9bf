//! An incremental **active-volume** segmentation engine.
//!
//! A closed seed mesh is placed in the middle of a dense 3D scalar field and grown
//! outward until it conforms to a tissue boundary inferred from intensity statistics,
//! separating a rigid outer shell (e.g. skull) from the soft region it encloses.
//!
//! The work is split into small, bounded steps driven by an explicit state machine
//! ([`engine::DeformationEngine`]), so a host event loop can interleave segmentation
//! with its own work:
//!
//! 1. Gaussian smoothing, one Z-band per step ([`gauss`])
//! 2. local uniformity / gradient statistics, one Z-band per step ([`volume::statistics`])
//! 3. histogram based intensity classification ([`classify`])
//! 4. mesh relaxation, one vertex pass per step ([`engine`])
//!
//! [`driver::run`] wires a [`mesh::MeshProvider`] and the engine together and steps it
//! to a budget.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **image-io**: dump Z-slices of derived volume buffers as `.bmp` for debugging
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to smooth the Z-planes of a band concurrently

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod classify;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod float_types;
pub mod gauss;
pub mod mesh;
pub mod params;
pub mod volume;

#[cfg(feature = "image-io")]
pub mod io;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use driver::{RunOutcome, Segmentation, SegmentationOptions, run};
pub use engine::{DeformationEngine, DeformationPhase, DeformationState, RelaxMethod, StepStatus};
pub use errors::{SegmentationError, SegmentationResult};
pub use mesh::{MeshProvider, SeedMesh, TetraSphereProvider};
pub use params::DeformationParams;
pub use volume::{Intensity, VolumeBuffers, VolumeDims};
