//! Cable geometry of the two-cable differential actuator.
//!
//! Lengthening both cables raises the inclination; moving length from the SE
//! cable to the SW cable rotates the panel towards the east.

use log::{debug, warn};

use crate::error::{Result, TrackerError};
use crate::types::{AppliedConstraints, CableLengths, MechanicalConstraints, PanelOrientation};

/// Cable lengths for a target orientation, honouring the length limits and the
/// maximum difference between the cables.
pub fn calculate_cable_lengths(
    target: PanelOrientation,
    constraints: &MechanicalConstraints,
) -> Result<CableLengths> {
    if !target.tilt_x.is_finite() || !target.tilt_z.is_finite() {
        return Err(TrackerError::InvalidInput(format!(
            "non-finite target orientation {target:?}"
        )));
    }
    constraints.validate()?;
    let c = constraints;

    let lift = target.tilt_x * c.tilt_x_factor;
    let twist = target.tilt_z * c.tilt_z_factor;
    let mut se = c.base_cable_length - twist + lift;
    let mut sw = c.base_cable_length + twist + lift;
    let mut applied = AppliedConstraints::default();

    for length in [&mut se, &mut sw] {
        if *length < c.min_length {
            *length = c.min_length;
            applied.min_length = true;
        } else if *length > c.max_length {
            *length = c.max_length;
            applied.max_length = true;
        }
    }

    if (se - sw).abs() > c.max_difference {
        applied.max_difference = true;
        let average = (se + sw) / 2.0;
        let longer = average + c.max_difference / 2.0;
        let shorter = within_difference(longer, longer - c.max_difference, c.max_difference);
        if se > sw {
            (se, sw) = (longer, shorter);
        } else {
            (se, sw) = (shorter, longer);
        }

        // Pin to the violated bound and carry the full difference to the other cable.
        if se < c.min_length {
            se = c.min_length;
            sw = within_difference(se, se + c.max_difference, c.max_difference);
            applied.min_length = true;
        } else if se > c.max_length {
            se = c.max_length;
            sw = within_difference(se, se - c.max_difference, c.max_difference);
            applied.max_length = true;
        }
        if sw < c.min_length {
            sw = c.min_length;
            se = within_difference(sw, sw + c.max_difference, c.max_difference);
            applied.min_length = true;
        } else if sw > c.max_length {
            sw = c.max_length;
            se = within_difference(sw, sw - c.max_difference, c.max_difference);
            applied.max_length = true;
        }
    }

    if applied.any() {
        warn!(
            "cable limits reached for tilt ({:.2}, {:.2}): {:?}",
            target.tilt_x, target.tilt_z, applied
        );
    }
    debug!("cables for {target:?}: se {se:.3}, sw {sw:.3}");

    Ok(CableLengths {
        se_length: se,
        sw_length: sw,
        se_tension: cable_tension(se, c.min_length, c.max_length, c.elasticity),
        sw_tension: cable_tension(sw, c.min_length, c.max_length, c.elasticity),
        constraints: applied,
    })
}

/// Steps `free` towards `anchor` one ulp at a time until the computed gap no
/// longer exceeds `max_difference`. Only rounding in `anchor ± max_difference`
/// moves it, so this runs at most a step or two.
fn within_difference(anchor: f64, mut free: f64, max_difference: f64) -> f64 {
    while (free - anchor).abs() > max_difference {
        free = if free > anchor {
            free.next_down()
        } else {
            free.next_up()
        };
    }
    free
}

/// Relative tension of a cable: `1 - elasticity` at mid-travel, zero at either limit.
pub fn cable_tension(length: f64, min_length: f64, max_length: f64, elasticity: f64) -> f64 {
    let span = max_length - min_length;
    if span <= 0.0 {
        return 1.0 - elasticity;
    }
    let normalized = ((length - min_length) / span).clamp(0.0, 1.0);
    (1.0 - 4.0 * (normalized - 0.5).powi(2)) * (1.0 - elasticity)
}

/// Orientation realised by a pair of cable lengths, inverting the ideal-length
/// model. An axis whose factor is zero cannot be actuated and reads as zero.
pub fn orientation_from_cables(
    se_length: f64,
    sw_length: f64,
    constraints: &MechanicalConstraints,
) -> PanelOrientation {
    let c = constraints;
    let tilt_x = if c.tilt_x_factor > 0.0 {
        ((se_length + sw_length) / 2.0 - c.base_cable_length) / c.tilt_x_factor
    } else {
        0.0
    };
    let tilt_z = if c.tilt_z_factor > 0.0 {
        (sw_length - se_length) / (2.0 * c.tilt_z_factor)
    } else {
        0.0
    };
    PanelOrientation { tilt_x, tilt_z }
}

/// Tensions for lengths imposed from outside the solver, e.g. a stow position.
pub fn forced_cable_lengths(
    se_length: f64,
    sw_length: f64,
    constraints: &MechanicalConstraints,
) -> CableLengths {
    let c = constraints;
    CableLengths {
        se_length,
        sw_length,
        se_tension: cable_tension(se_length, c.min_length, c.max_length, c.elasticity),
        sw_tension: cable_tension(sw_length, c.min_length, c.max_length, c.elasticity),
        constraints: AppliedConstraints::default(),
    }
}
