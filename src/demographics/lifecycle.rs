//! Removal of pops that have shrunk away

use crate::core::types::PopId;
use crate::world::World;

/// Pops smaller than this are removed at the end of the day
pub const MIN_POP_SIZE: f32 = 1.0;

/// Delete every pop with size below [`MIN_POP_SIZE`]
///
/// Walks ids in descending order: deletion moves the last pop into the freed
/// slot, and that pop has already been checked. Returns the number removed.
pub fn remove_size_zero_pops(world: &mut World) -> usize {
    let mut removed = 0;
    for index in (0..world.pops.count()).rev() {
        if world.pops.sizes[index] < MIN_POP_SIZE {
            world.delete_pop(PopId::new(index));
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::debug!(removed, remaining = world.pops.count(), "removed empty pops");
    }
    removed
}
