//! Type distance: signed hop count along type-alias expansion chains.
//!
//! A positive distance means `to` is reached by expanding `from`'s aliases
//! (forward). A negative distance means `from` is reached by expanding `to`
//! (backward). [`CirTypeDistance::UNREACHABLE`] means neither.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use cir_ir::{CirClassOrTypeAliasType, CirEntityId};
use rustc_hash::FxHashSet;

use crate::resolvers::CirProvidedClassifiers;

/// Signed alias-hop distance with an absorbing `UNREACHABLE` value.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct CirTypeDistance(i32);

/// Largest reachable distance. Reachable arithmetic saturates here so it
/// never lands on the sentinel.
const MAX_REACHABLE: i32 = i32::MAX - 1;

impl CirTypeDistance {
    pub const ZERO: Self = Self(0);
    pub const UNREACHABLE: Self = Self(i32::MAX);

    /// A reachable distance. Values at or above the sentinel are clamped.
    pub const fn new(value: i32) -> Self {
        if value > MAX_REACHABLE {
            Self(MAX_REACHABLE)
        } else {
            Self(value)
        }
    }

    /// The hop count, or `None` if unreachable.
    pub const fn get(self) -> Option<i32> {
        if self.is_reachable() {
            Some(self.0)
        } else {
            None
        }
    }

    pub const fn is_reachable(self) -> bool {
        self.0 != i32::MAX
    }

    pub const fn is_unreachable(self) -> bool {
        !self.is_reachable()
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.is_reachable() && self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn inc(self) -> Self {
        self + 1
    }

    #[must_use]
    pub fn dec(self) -> Self {
        self - 1
    }

    /// Rank for choosing between candidate matches; lower is better.
    pub fn penalty(self) -> CirTypeDistancePenalty {
        let rank = match self.get() {
            None => u64::MAX,
            Some(0) => 0,
            Some(hops) if hops > 0 => u64::from(hops.unsigned_abs()),
            Some(hops) => u64::from(u32::MAX) + u64::from(hops.unsigned_abs()),
        };
        CirTypeDistancePenalty(rank)
    }

    fn combine(self, rhs: i32, op: fn(i32, i32) -> i32) -> Self {
        if self.is_unreachable() {
            Self::UNREACHABLE
        } else {
            Self::new(op(self.0, rhs))
        }
    }
}

impl Default for CirTypeDistance {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add<i32> for CirTypeDistance {
    type Output = Self;

    fn add(self, rhs: i32) -> Self {
        self.combine(rhs, i32::saturating_add)
    }
}

impl Sub<i32> for CirTypeDistance {
    type Output = Self;

    fn sub(self, rhs: i32) -> Self {
        self.combine(rhs, i32::saturating_sub)
    }
}

impl Add for CirTypeDistance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match rhs.get() {
            Some(rhs) => self + rhs,
            None => Self::UNREACHABLE,
        }
    }
}

impl Sub for CirTypeDistance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match rhs.get() {
            Some(rhs) => self - rhs,
            None => Self::UNREACHABLE,
        }
    }
}

impl fmt::Debug for CirTypeDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(hops) => write!(f, "CirTypeDistance({hops})"),
            None => f.write_str("CirTypeDistance(unreachable)"),
        }
    }
}

/// Total order over distances: zero, then forward distances by magnitude,
/// then backward distances by magnitude, then unreachable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CirTypeDistancePenalty(u64);

impl CirTypeDistancePenalty {
    pub const BEST: Self = Self(0);
    pub const WORST: Self = Self(u64::MAX);

    pub fn is_worst(self) -> bool {
        self == Self::WORST
    }
}

impl PartialOrd for CirTypeDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by penalty.
impl Ord for CirTypeDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.penalty().cmp(&other.penalty())
    }
}

/// Distance from the classifier referenced by `from` to the classifier `to`.
///
/// `backward` resolves alias declarations for the backward search: the
/// target's own classifier index, then the common dependencies, then the
/// target's dependencies.
pub fn type_distance(
    backward: &dyn CirProvidedClassifiers,
    from: &CirClassOrTypeAliasType,
    to: &CirEntityId,
) -> CirTypeDistance {
    let from_id = from.classifier_id();
    if from_id == to {
        return CirTypeDistance::ZERO;
    }

    let forward = forward_type_distance(from, to);
    if forward.is_reachable() {
        return forward;
    }

    let backward_distance = backward_type_distance(backward, from_id, to);
    if backward_distance.is_reachable() {
        return backward_distance;
    }

    let expanded_id = &from.expanded_type().class_id;
    if expanded_id == from_id {
        return CirTypeDistance::UNREACHABLE;
    }
    backward_type_distance(backward, expanded_id, to) - forward_type_distance(from, expanded_id)
}

/// Hops from `from` down its own alias chain to `to`.
pub fn forward_type_distance(from: &CirClassOrTypeAliasType, to: &CirEntityId) -> CirTypeDistance {
    from.alias_chain()
        .position(|ty| ty.classifier_id() == to)
        .and_then(|hops| i32::try_from(hops).ok())
        .map_or(CirTypeDistance::UNREACHABLE, CirTypeDistance::new)
}

/// Negated hops from `to` down its alias chain to `from_id`.
pub fn backward_type_distance(
    resolver: &dyn CirProvidedClassifiers,
    from_id: &CirEntityId,
    to: &CirEntityId,
) -> CirTypeDistance {
    let mut visited = FxHashSet::default();
    let mut current = to.clone();
    let mut hops = CirTypeDistance::ZERO;
    while visited.insert(current.clone()) {
        let Some(classifier) = resolver.classifier(&current) else {
            break;
        };
        let Some(alias) = classifier.as_type_alias() else {
            break;
        };
        hops = hops.dec();
        let underlying_id = alias.underlying_type.classifier_id();
        if underlying_id == from_id {
            return hops;
        }
        current = underlying_id.clone();
    }
    CirTypeDistance::UNREACHABLE
}

#[cfg(test)]
mod tests;
