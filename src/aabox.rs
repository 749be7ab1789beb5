use crate::math::*;

/// Axis-aligned bounding box in D dimensions
#[derive(Clone, Copy, Debug)]
pub struct AABox<const D: usize> {
    pub min: Vector<Float, D>,
    pub max: Vector<Float, D>,
}
impl<const D: usize> AABox<D> {
    pub fn empty() -> Self {
        Self {
            min: Vector::fill(Float::INFINITY),
            max: Vector::fill(-Float::INFINITY),
        }
    }
    pub fn from_iter(iter: impl IntoIterator<Item = Vector<Float, D>>) -> Self {
        iter.into_iter().fold(Self::empty(), |b, p| b.append(p))
    }
    pub fn append(&self, other: Vector<Float, D>) -> Self {
        Self {
            min: self.min.zip(other).map(|(a, b)| a.min(b)),
            max: self.max.zip(other).map(|(a, b)| a.max(b)),
        }
    }
    /// Check overlap with another box, boundary contact counts as overlap
    pub fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }
    pub fn is_empty(&self) -> bool {
        (0..D).any(|i| self.min[i] > self.max[i])
    }
}
