//! Primary/accepted culture flags

use rayon::prelude::*;

use crate::world::World;

/// Recompute `is_primary_or_accepted_culture` for every pop
///
/// A pop's culture counts when it is its owner's primary culture or one of the
/// owner's accepted cultures. Pops in unowned provinces never count.
pub fn regenerate_is_primary_or_accepted(world: &mut World) {
    let provinces = &world.provinces;
    let nations = &world.nations;
    let pops = &mut world.pops;

    pops.is_primary_or_accepted_culture
        .par_iter_mut()
        .zip(pops.locations.par_iter())
        .zip(pops.cultures.par_iter())
        .for_each(|((flag, location), culture)| {
            *flag = provinces.owners[location.index()].is_some_and(|owner| {
                let n = owner.index();
                nations.primary_culture[n] == Some(*culture)
                    || nations.accepted_cultures[n].contains(culture)
            });
        });
}
