//! The incremental deformation engine.
//!
//! [`DeformationEngine::step`] performs the work of exactly one state and returns:
//! one Gaussian band, one uniformity band (the last one also classifies), or one
//! relaxation pass over the mesh. Only the first step (copying the source) and the
//! last uniformity step (histograms) read the whole volume; relaxation is
//! `O(vertices)`.

pub mod relax;
pub mod state;

pub use relax::{RelaxInputs, RelaxMethod, relax_pass};
pub use state::{DeformationPhase, DeformationState, StageOutcome};

use crate::classify::IntensityClassifier;
use crate::errors::SegmentationResult;
use crate::float_types::{Real, STAGE_BANDS};
use crate::gauss::{GaussianSmoother, band_range};
use crate::mesh::SeedMesh;
use crate::params::DeformationParams;
use crate::volume::{Intensity, VolumeBuffers, VolumeDims, statistics};
use nalgebra::Vector4;
use tracing::{debug, info, warn};

/// Whether the engine has more work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    InProgress,
    Finished,
}

/// Owns every buffer of one segmentation run and the mesh being deformed.
#[derive(Debug)]
pub struct DeformationEngine<'a, T: Intensity> {
    volume: VolumeBuffers<'a, T>,
    mesh: SeedMesh,
    params: DeformationParams,
    state: DeformationState,
    /// Kernel of the smoothing stage, built on entry and dropped once
    /// classification has run.
    smoother: Option<GaussianSmoother>,
    classifier: IntensityClassifier,
    /// New vertex positions of the running pass, allocated on entry to relaxation.
    scratch: Vec<Vector4<Real>>,
    adjacency: Vec<Vec<u32>>,
    last_displacement: Option<Real>,
    /// How relaxation ended, once it has.
    termination: Option<StageOutcome>,
}

impl<'a, T: Intensity> DeformationEngine<'a, T> {
    /// Validate everything up front so that stepping can never fail.
    pub fn new(
        dims: VolumeDims,
        source: &'a [T],
        mesh: SeedMesh,
        params: DeformationParams,
    ) -> SegmentationResult<Self> {
        params.validate()?;
        let volume = VolumeBuffers::create(dims, source)?;
        mesh.validate()?;

        Ok(DeformationEngine {
            volume,
            mesh,
            params,
            state: DeformationState::NotStarted,
            smoother: None,
            classifier: IntensityClassifier::new(),
            scratch: Vec::new(),
            adjacency: Vec::new(),
            last_displacement: None,
            termination: None,
        })
    }

    pub const fn state(&self) -> DeformationState {
        self.state
    }

    pub const fn phase(&self) -> DeformationPhase {
        self.state.phase()
    }

    pub const fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub const fn mesh(&self) -> &SeedMesh {
        &self.mesh
    }

    /// Give the (deformed) mesh back to the caller.
    pub fn into_mesh(self) -> SeedMesh {
        self.mesh
    }

    pub const fn volume(&self) -> &VolumeBuffers<'a, T> {
        &self.volume
    }

    pub const fn classifier(&self) -> &IntensityClassifier {
        &self.classifier
    }

    pub const fn params(&self) -> &DeformationParams {
        &self.params
    }

    /// Number of reals held by the relaxation scratch buffer.
    pub fn scratch_len(&self) -> usize {
        self.scratch.len() * 4
    }

    /// Largest vertex displacement of the most recent relaxation pass.
    pub const fn last_displacement(&self) -> Option<Real> {
        self.last_displacement
    }

    /// `Converged` or `IterationCap` once relaxation has ended, `None` before.
    pub const fn termination(&self) -> Option<StageOutcome> {
        self.termination
    }

    /// Advance by one bounded unit of work. After `Finished` this is a no-op.
    pub fn step(&mut self, method: RelaxMethod) -> StepStatus {
        let dims = self.volume.dims();
        let source = self.volume.source();

        let outcome = match self.state {
            DeformationState::Finished => return StepStatus::Finished,
            DeformationState::NotStarted => {
                self.mesh.compute_vertex_normals();
                // kernel parameters are checked by `new`
                match GaussianSmoother::new(self.params.gauss_radius, self.params.gauss_sigma) {
                    Ok(smoother) => {
                        smoother.prime(source, &mut self.volume.smoothed);
                        self.smoother = Some(smoother);
                    },
                    Err(e) => warn!("Smoothing disabled: {}", e),
                }
                debug!(
                    "Starting deformation of {} vertices in a {}x{}x{} volume",
                    self.mesh.num_vertices(),
                    dims.nx,
                    dims.ny,
                    dims.nz
                );
                StageOutcome::Continue
            },
            DeformationState::PrepareGauss { band } => {
                let z_range = band_range(dims.nz, band, STAGE_BANDS);
                debug!("Smoothing band {} (z {:?})", band, z_range);
                if let Some(smoother) = &self.smoother {
                    smoother.smooth_band(source, dims, &mut self.volume.smoothed, z_range);
                }
                StageOutcome::Continue
            },
            DeformationState::PrepareUniformity { band } => {
                let z_range = band_range(dims.nz, band, STAGE_BANDS);
                debug!("Uniformity band {} (z {:?})", band, z_range);
                statistics::fill_band(
                    &self.volume.smoothed,
                    dims,
                    z_range,
                    &mut self.volume.uniformity,
                    &mut self.volume.gradient,
                );
                if band + 1 >= STAGE_BANDS {
                    self.finish_preparation();
                }
                StageOutcome::Continue
            },
            DeformationState::UpdateGeo { iteration } => self.relax(method, iteration),
        };

        let previous = self.state.phase();
        self.state = self.state.advance(outcome);
        if self.state.phase() != previous {
            debug!("Deformation {:?} -> {:?}", previous, self.state.phase());
        }

        if self.state.is_finished() {
            StepStatus::Finished
        } else {
            StepStatus::InProgress
        }
    }

    /// Classify the smoothed volume and release the smoothing scratch.
    fn finish_preparation(&mut self) {
        match self.classifier.classify(&self.volume.smoothed, self.volume.dims()) {
            Ok(c) => info!(
                "Classified volume: valley at {}, boundary curve over [{}, {}]",
                c.index_min_color, c.ind_black_left, c.ind_black_right
            ),
            Err(e) => warn!("Classification failed, relaxation runs unweighted: {}", e),
        }
        self.smoother = None;
    }

    fn relax(&mut self, method: RelaxMethod, iteration: usize) -> StageOutcome {
        if self.scratch.len() != self.mesh.num_vertices() {
            self.scratch = vec![Vector4::zeros(); self.mesh.num_vertices()];
            self.adjacency = self.mesh.vertex_adjacency();
        }

        let inputs = RelaxInputs {
            dims: self.volume.dims(),
            smoothed: &self.volume.smoothed,
            uniformity: &self.volume.uniformity,
            color_koefs: self.classifier.color_koefs(),
            color_probability: self.classifier.color_probability(),
            params: &self.params,
        };
        let (outcome, displacement) = relax_pass(
            method,
            &mut self.mesh,
            &self.adjacency,
            &mut self.scratch,
            &inputs,
            iteration,
        );
        self.last_displacement = Some(displacement);
        debug!(
            "Relaxation pass {} ({:?}) moved vertices by at most {:.4}",
            iteration, method, displacement
        );
        match outcome {
            StageOutcome::Converged => {
                info!("Relaxation converged after {} passes", iteration + 1)
            },
            StageOutcome::IterationCap => warn!(
                "Relaxation stopped at the cap of {} passes, last move {:.4}",
                self.params.max_iterations, displacement
            ),
            StageOutcome::Continue => {},
        }
        if outcome.ends_relaxation() {
            self.termination = Some(outcome);
        }
        outcome
    }
}
