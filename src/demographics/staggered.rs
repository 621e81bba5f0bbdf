//! Staggered block partitioning of the pop range
//!
//! The pop range is cut into blocks of [`BLOCK_SIZE`] pops. With `divisions`
//! workers, worker `offset` handles blocks `offset`, `offset + divisions`,
//! `offset + 2 * divisions` and so on. Every block is processed in
//! [`EXECUTIONS_PER_BLOCK`] lane batches of [`LANE_WIDTH`] pops.
//!
//! Two drivers share the same block assignment:
//! - [`execute_staggered_blocks`] walks one worker's share sequentially
//! - [`staggered_partition`] splits a mutable per-pop buffer into disjoint
//!   per-worker block lists for rayon

use std::ops::Range;

pub const BLOCK_SIZE: usize = 16;
pub const LANE_WIDTH: usize = 4;
pub const EXECUTIONS_PER_BLOCK: usize = BLOCK_SIZE / LANE_WIDTH;

/// Call `functor` with every lane batch assigned to worker `offset`
///
/// Batches never extend past `max`. Across `offset = 0..divisions` every index
/// in `[0, max)` is passed exactly once.
pub fn execute_staggered_blocks<F>(offset: u32, divisions: u32, max: usize, mut functor: F)
where
    F: FnMut(Range<usize>),
{
    let divisions = divisions.max(1) as usize;
    let offset = offset as usize;
    if offset >= divisions {
        return;
    }

    let block_advance = BLOCK_SIZE * divisions;
    let mut block_index = BLOCK_SIZE * offset;

    while block_index < max {
        for i in 0..EXECUTIONS_PER_BLOCK {
            let start = block_index + i * LANE_WIDTH;
            if start >= max {
                break;
            }
            functor(start..(start + LANE_WIDTH).min(max));
        }
        block_index += block_advance;
    }
}

/// One block of a per-pop buffer: the index of its first pop and its values
pub type Block<'a, T> = (usize, &'a mut [T]);

/// Split a pop-major buffer into the blocks of each worker
///
/// `stride` is the number of values per pop. Worker `w` receives the blocks
/// [`execute_staggered_blocks`] would visit for `offset = w`.
pub fn staggered_partition<T>(data: &mut [T], stride: usize, divisions: u32) -> Vec<Vec<Block<'_, T>>> {
    let divisions = divisions.max(1) as usize;
    let mut workers: Vec<Vec<Block<'_, T>>> = (0..divisions).map(|_| Vec::new()).collect();
    if stride == 0 {
        return workers;
    }

    for (block, values) in data.chunks_mut(BLOCK_SIZE * stride).enumerate() {
        workers[block % divisions].push((block * BLOCK_SIZE, values));
    }
    workers
}

/// Pop indices visited by one worker, in visiting order
pub fn staggered_indices(offset: u32, divisions: u32, max: usize) -> Vec<usize> {
    let mut visited = Vec::new();
    execute_staggered_blocks(offset, divisions, max, |range| visited.extend(range));
    visited
}
