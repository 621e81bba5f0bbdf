//! Persistent scratch buffers of the demographics engine
//!
//! Buffers only ever grow. `ensure_capacity` must run before any worker starts
//! on them; the batched updaters and the dominant-category selector call it
//! in their single-threaded prologue.

use crate::world::{PopColumn, World};

/// Running maximum per container for each dominant-category pass
#[derive(Debug, Clone, Default)]
pub struct MaxBuffers {
    /// culture, religion, ideology, issue option
    pub provinces: [Vec<f32>; 4],
    pub states: [Vec<f32>; 4],
    pub nations: [Vec<f32>; 4],
    /// issue option, ideology
    pub pops: [Vec<f32>; 2],
}

/// Per-pop temporaries of one attraction rule
#[derive(Debug, Clone, Default)]
pub struct AttractionBuffers {
    /// Attraction per pop and category, pop-major with `stride` values per pop
    pub amounts: Vec<f32>,
    /// Sum of a pop's attraction over all categories
    pub totals: Vec<f32>,
    /// Blend rate towards the normalized attraction
    pub rates: Vec<f32>,
    /// Row offset per category, `None` for categories that sit out
    pub targets: Vec<Option<usize>>,
    stride: usize,
}

impl AttractionBuffers {
    pub fn stride(&self) -> usize {
        self.stride
    }

    fn reshape(&mut self, capacity: usize, stride: usize) {
        // A new stride invalidates the pop-major layout
        if stride != self.stride {
            self.amounts = vec![0.0; capacity * stride];
            self.stride = stride;
        } else {
            grow(&mut self.amounts, capacity * stride);
        }
        grow(&mut self.totals, capacity);
        grow(&mut self.rates, capacity);
    }
}

/// New values of the scalar pop columns, written by column rules before commit
#[derive(Debug, Clone, Default)]
pub struct StagedColumns {
    pub sizes: Vec<f32>,
    pub militancy: Vec<f32>,
    pub consciousness: Vec<f32>,
    pub literacy: Vec<f32>,
}

impl StagedColumns {
    pub fn column(&self, column: PopColumn) -> &[f32] {
        match column {
            PopColumn::Size => &self.sizes,
            PopColumn::Militancy => &self.militancy,
            PopColumn::Consciousness => &self.consciousness,
            PopColumn::Literacy => &self.literacy,
        }
    }

    pub fn column_mut(&mut self, column: PopColumn) -> &mut Vec<f32> {
        match column {
            PopColumn::Size => &mut self.sizes,
            PopColumn::Militancy => &mut self.militancy,
            PopColumn::Consciousness => &mut self.consciousness,
            PopColumn::Literacy => &mut self.literacy,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DemographicsScratch {
    pub staged: StagedColumns,
    pub ideologies: AttractionBuffers,
    pub issues: AttractionBuffers,
    pub max: MaxBuffers,
    pop_capacity: usize,
    resizes: u32,
}

fn grow(buffer: &mut Vec<f32>, len: usize) {
    if buffer.len() < len {
        buffer.resize(len, 0.0);
    }
}

impl DemographicsScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow every buffer to fit the current entity and category counts
    pub fn ensure_capacity(&mut self, world: &World) {
        let pops = world.pops.count();
        let ideologies = world.keys().ideologies as usize;
        let issue_options = world.keys().issue_options as usize;

        let strides_changed =
            ideologies != self.ideologies.stride || issue_options != self.issues.stride;
        if pops > self.pop_capacity || strides_changed {
            let capacity = pops.max(self.pop_capacity);
            self.ideologies.reshape(capacity, ideologies);
            self.issues.reshape(capacity, issue_options);
            for buffer in &mut self.max.pops {
                grow(buffer, capacity);
            }
            for column in PopColumn::ALL {
                grow(self.staged.column_mut(column), capacity);
            }

            tracing::trace!(capacity, ideologies, issue_options, "grew pop scratch buffers");
            self.pop_capacity = capacity;
            self.resizes += 1;
        }

        let provinces = world.provinces.land_count();
        let states = world.states.count();
        let nations = world.nations.count();
        for buffer in &mut self.max.provinces {
            grow(buffer, provinces);
        }
        for buffer in &mut self.max.states {
            grow(buffer, states);
        }
        for buffer in &mut self.max.nations {
            grow(buffer, nations);
        }
    }

    pub fn pop_capacity(&self) -> usize {
        self.pop_capacity
    }

    /// Number of times the pop buffers were reallocated
    pub fn resizes(&self) -> u32 {
        self.resizes
    }
}
