//! Mixed-radix index arithmetic.
//!
//! Joint actions, joint observations and joint types are all flattened the
//! same way: agent 0 is the most significant digit, so for sizes `[n0, n1, n2]`
//! the step sizes are `[n1*n2, n2, 1]`.

use crate::error::{PlannerError, Result};

/// Product of `sizes`, failing with [`PlannerError::Overflow`] when it does
/// not fit in a `usize`.
pub fn checked_product(sizes: &[usize], what: &str) -> Result<usize> {
    sizes.iter().try_fold(1usize, |acc, &n| {
        acc.checked_mul(n).ok_or_else(|| {
            PlannerError::Overflow(format!("number of {} overflows usize ({:?})", what, sizes))
        })
    })
}

/// Step sizes for the mixed-radix conversion of `sizes`.
pub fn step_sizes(sizes: &[usize]) -> Result<Vec<usize>> {
    let mut steps = vec![1usize; sizes.len()];
    for i in (0..sizes.len().saturating_sub(1)).rev() {
        steps[i] = steps[i + 1].checked_mul(sizes[i + 1]).ok_or_else(|| {
            PlannerError::Overflow(format!("step size overflows usize ({:?})", sizes))
        })?;
    }
    Ok(steps)
}

/// Flatten individual indices into a joint index.
pub fn individual_to_joint(indices: &[usize], steps: &[usize]) -> usize {
    indices.iter().zip(steps).map(|(i, s)| i * s).sum()
}

/// Decompose a joint index into individual indices.
pub fn joint_to_individual(mut joint: usize, steps: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(steps.len());
    for &step in steps {
        out.push(joint / step);
        joint %= step;
    }
    out
}

/// Check that every individual index lies within its size.
pub fn check_individual(indices: &[usize], sizes: &[usize], what: &str) -> Result<()> {
    if indices.len() != sizes.len() {
        return Err(PlannerError::dimension_mismatch(
            format!("{} {} indices", sizes.len(), what),
            format!("{}", indices.len()),
        ));
    }
    for (agent, (&i, &n)) in indices.iter().zip(sizes).enumerate() {
        if i >= n {
            return Err(PlannerError::dimension_mismatch(
                format!("{} index < {} for agent {}", what, n, agent),
                format!("{}", i),
            ));
        }
    }
    Ok(())
}

/// Increment a mixed-radix counter in place, least significant digit last.
///
/// Returns `false` once the counter wraps around to all zeros.
pub fn increment(counter: &mut [usize], radices: &[usize]) -> bool {
    for i in (0..counter.len()).rev() {
        counter[i] += 1;
        if counter[i] < radices[i] {
            return true;
        }
        counter[i] = 0;
    }
    false
}
