//! One-call segmentation: acquire a seed mesh, place it in the volume and step the
//! engine to a budget.

use crate::engine::{DeformationEngine, RelaxMethod, StageOutcome, StepStatus};
use crate::errors::SegmentationResult;
use crate::float_types::{Real, STAGE_BANDS};
use crate::mesh::{MeshProvider, SeedMesh};
use crate::params::DeformationParams;
use crate::volume::{Intensity, VolumeDims};
use nalgebra::Vector3;
use tracing::{debug, info, warn};

/// Knobs of [`run`] that are not deformation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOptions {
    pub params: DeformationParams,
    /// Subdivision depth requested from the mesh provider.
    pub subdivisions: u32,
    /// Seed radius in unit-sphere space; `1` spans the whole volume.
    pub seed_radius: Real,
    /// Overrides the default step budget of `max(x, y, z)/2 + 18`.
    pub step_budget: Option<usize>,
    /// Log every step at `info` instead of `debug`.
    pub verbose_log: bool,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            params: DeformationParams::default(),
            subdivisions: 4,
            seed_radius: 1.0,
            step_budget: None,
            verbose_log: false,
        }
    }
}

impl SegmentationOptions {
    pub const fn with_params(mut self, params: DeformationParams) -> Self {
        self.params = params;
        self
    }

    pub const fn with_subdivisions(mut self, subdivisions: u32) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    pub const fn with_seed_radius(mut self, radius: Real) -> Self {
        self.seed_radius = radius;
        self
    }

    pub const fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = Some(budget);
        self
    }

    pub const fn with_verbose_log(mut self, verbose: bool) -> Self {
        self.verbose_log = verbose;
        self
    }

    /// Steps allowed for a volume of `dims`.
    pub fn budget(&self, dims: VolumeDims) -> usize {
        self.step_budget
            .unwrap_or_else(|| dims.max_dim() / 2 + STAGE_BANDS)
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Relaxation settled below the convergence epsilon.
    Converged,
    /// Relaxation ran out of passes (`max_iterations`) before settling.
    IterationCap,
    /// The step budget ran out first; the mesh is partially deformed.
    BudgetExhausted,
}

impl RunOutcome {
    /// Status code of the classic entry point, `1` for any completed run.
    pub const fn status_code(self) -> i32 {
        1
    }
}

/// Result of [`run`].
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub mesh: SeedMesh,
    pub outcome: RunOutcome,
    /// Engine steps taken.
    pub steps: usize,
}

/// Status code for the outcome of [`run`]: `1` on success, negative on error.
pub const fn status_code(result: &SegmentationResult<Segmentation>) -> i32 {
    match result {
        Ok(segmentation) => segmentation.outcome.status_code(),
        Err(e) => e.status_code(),
    }
}

/// Segment `source`, a row-major volume of `nx × ny × nz` samples.
///
/// Dimensions are checked before anything is allocated or the provider is asked
/// for a mesh. The seed mesh is generated around the unit-sphere origin and mapped
/// into voxel space so that the unit cube spans the volume.
pub fn run<T, P>(
    (nx, ny, nz): (usize, usize, usize),
    source: &[T],
    options: &SegmentationOptions,
    provider: &mut P,
) -> SegmentationResult<Segmentation>
where
    T: Intensity,
    P: MeshProvider + ?Sized,
{
    let dims = VolumeDims::new(nx, ny, nz)?;
    options.params.validate()?;

    provider.generate_seed_mesh(Vector3::repeat(options.seed_radius), options.subdivisions)?;
    let mut mesh = provider.build_render_mesh()?;
    mesh.rescale_to_volume(dims);
    debug!(
        "Seed mesh with {} vertices and {} triangles placed in {}x{}x{}",
        mesh.num_vertices(),
        mesh.num_triangles(),
        nx,
        ny,
        nz
    );

    let mut engine = DeformationEngine::new(dims, source, mesh, options.params.clone())?;
    let budget = options.budget(dims);

    let mut steps = 0;
    let mut status = StepStatus::InProgress;
    while status == StepStatus::InProgress && steps < budget {
        status = engine.step(RelaxMethod::FullRelaxation);
        steps += 1;
        if options.verbose_log {
            info!("Step {}/{}: {:?}", steps, budget, engine.state());
        } else {
            debug!("Step {}/{}: {:?}", steps, budget, engine.state());
        }
    }

    let outcome = match status {
        StepStatus::Finished => {
            info!("Segmentation finished after {} steps", steps);
            match engine.termination() {
                Some(StageOutcome::IterationCap) => RunOutcome::IterationCap,
                _ => RunOutcome::Converged,
            }
        },
        StepStatus::InProgress => {
            warn!(
                "Step budget of {} exhausted in {:?}, returning a partial mesh",
                budget,
                engine.phase()
            );
            RunOutcome::BudgetExhausted
        },
    };

    Ok(Segmentation {
        mesh: engine.into_mesh(),
        outcome,
        steps,
    })
}
