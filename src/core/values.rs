//! # Value Containers
//!
//! Rank-bound, runtime-typed multi-dimensional value storage.
//!
//! Two capability variants live behind the same type, chosen at
//! construction:
//!
//! - [`ValueContainer::dynamic`] - sparse and growing; extents are
//!   discovered from writes (the extent at any index prefix is one more
//!   than the largest final index ever written under it).
//! - [`ValueContainer::dense`] - preallocated with a fixed shape; writes
//!   are bounds-checked against the declared capacity.
//!
//! Neither variant is optimized for high performance. Where that matters,
//! build a specialized store instead of extending this one.

use std::collections::HashMap;

use crate::core::error::{Error, Result};
use crate::core::scalar::{Scalar, ScalarKind};

/// Multi-dimensional value store owned by an exchange item.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueContainer {
    kind: ScalarKind,
    storage: Storage,
}

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    /// Sparse map from coordinate tuple to value, extents tracked per
    /// index prefix (the empty prefix included).
    Dynamic {
        rank: usize,
        values: HashMap<Vec<usize>, Scalar>,
        extents: HashMap<Vec<usize>, usize>,
    },
    /// Row-major preallocated cells.
    Dense {
        shape: Vec<usize>,
        cells: Vec<Option<Scalar>>,
    },
}

impl ValueContainer {
    /// Creates a sparse, growing container of the given rank.
    pub fn dynamic(kind: ScalarKind, rank: usize) -> Self {
        Self {
            kind,
            storage: Storage::Dynamic {
                rank,
                values: HashMap::new(),
                extents: HashMap::new(),
            },
        }
    }

    /// Creates a fixed-capacity container; the rank is the shape length.
    pub fn dense(kind: ScalarKind, shape: &[usize]) -> Self {
        let cells = vec![None; shape.iter().product()];
        Self {
            kind,
            storage: Storage::Dense {
                shape: shape.to_vec(),
                cells,
            },
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn rank(&self) -> usize {
        match &self.storage {
            Storage::Dynamic { rank, .. } => *rank,
            Storage::Dense { shape, .. } => shape.len(),
        }
    }

    /// The declared shape of a dense container, `None` for dynamic ones.
    pub fn shape(&self) -> Option<&[usize]> {
        match &self.storage {
            Storage::Dynamic { .. } => None,
            Storage::Dense { shape, .. } => Some(shape),
        }
    }

    /// Changes the scalar kind. A different kind invalidates the content,
    /// so all stored values are cleared first.
    pub fn set_kind(&mut self, kind: ScalarKind) {
        if self.kind != kind {
            self.clear();
            self.kind = kind;
        }
    }

    /// Changes the rank of a dynamic container, clearing all stored
    /// values. Fails on dense containers, whose shape is fixed.
    pub fn set_rank(&mut self, new_rank: usize) -> Result<()> {
        match &mut self.storage {
            Storage::Dynamic {
                rank,
                values,
                extents,
            } => {
                if *rank != new_rank {
                    values.clear();
                    extents.clear();
                    *rank = new_rank;
                }
                Ok(())
            }
            Storage::Dense { .. } => Err(Error::FixedShape),
        }
    }

    /// Discards all values and extent tracking; kind and rank/shape stay.
    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Dynamic {
                values, extents, ..
            } => {
                values.clear();
                extents.clear();
            }
            Storage::Dense { cells, .. } => {
                for cell in cells.iter_mut() {
                    *cell = None;
                }
            }
        }
    }

    /// Stores `value` at the coordinate. Validation (rank, kind, and for
    /// dense containers the shape bounds) happens before any mutation.
    pub fn set(&mut self, indices: &[usize], value: Scalar) -> Result<()> {
        self.check_rank(indices)?;
        if value.kind() != self.kind {
            return Err(Error::KindMismatch {
                expected: self.kind,
                got: value.kind(),
            });
        }

        match &mut self.storage {
            Storage::Dynamic {
                rank,
                values,
                extents,
            } => {
                values.insert(indices.to_vec(), value);
                // grow the extent of every prefix of the coordinate
                for axis in 0..*rank {
                    let extent = extents.entry(indices[..axis].to_vec()).or_insert(0);
                    if indices[axis] + 1 > *extent {
                        *extent = indices[axis] + 1;
                    }
                }
                Ok(())
            }
            Storage::Dense { shape, cells } => {
                check_bounds(shape, indices)?;
                cells[offset(shape, indices)] = Some(value);
                Ok(())
            }
        }
    }

    /// Returns the stored value, or `None` when the coordinate has never
    /// been written. Dense containers reject out-of-range coordinates.
    pub fn get(&self, indices: &[usize]) -> Result<Option<Scalar>> {
        self.check_rank(indices)?;
        match &self.storage {
            Storage::Dynamic { values, .. } => Ok(values.get(indices).cloned()),
            Storage::Dense { shape, cells } => {
                check_bounds(shape, indices)?;
                Ok(cells[offset(shape, indices)].clone())
            }
        }
    }

    /// The tracked extent under an index prefix, `None` when nothing was
    /// ever written there (or the prefix is not shorter than the rank).
    pub fn index_count(&self, prefix: &[usize]) -> Option<usize> {
        match &self.storage {
            Storage::Dynamic { rank, extents, .. } => {
                if prefix.len() >= *rank {
                    return None;
                }
                extents.get(prefix).copied()
            }
            Storage::Dense { shape, .. } => {
                if prefix.len() >= shape.len() {
                    return None;
                }
                for (axis, &index) in prefix.iter().enumerate() {
                    if index >= shape[axis] {
                        return None;
                    }
                }
                Some(shape[prefix.len()])
            }
        }
    }

    /// Depth-first, row-major traversal over every coordinate reachable
    /// from the tracked extents. The operation receives the coordinate and
    /// the value stored there (`None` for gaps in sparse containers); its
    /// first error aborts the traversal.
    ///
    /// The order is deterministic and stable across repeated calls for the
    /// same container state.
    pub fn visit<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&[usize], Option<&Scalar>) -> Result<()>,
    {
        let rank = self.rank();
        if rank == 0 {
            return Ok(());
        }
        let mut indices = vec![0usize; rank];
        self.visit_axis(0, &mut indices, &mut op)
    }

    fn visit_axis<F>(&self, axis: usize, indices: &mut [usize], op: &mut F) -> Result<()>
    where
        F: FnMut(&[usize], Option<&Scalar>) -> Result<()>,
    {
        let extent = match self.index_count(&indices[..axis]) {
            Some(extent) => extent,
            None => return Ok(()),
        };
        let last = axis == indices.len() - 1;
        for i in 0..extent {
            indices[axis] = i;
            if last {
                op(indices, self.peek(indices))?;
            } else {
                self.visit_axis(axis + 1, indices, op)?;
            }
        }
        Ok(())
    }

    /// Borrow the value at a coordinate known to be of the right rank.
    fn peek(&self, indices: &[usize]) -> Option<&Scalar> {
        match &self.storage {
            Storage::Dynamic { values, .. } => values.get(indices),
            Storage::Dense { shape, cells } => cells[offset(shape, indices)].as_ref(),
        }
    }

    /// Deep-copies any container into a dynamic one of the same kind and
    /// rank, preserving all written values.
    pub fn to_dynamic(&self) -> Result<ValueContainer> {
        let mut result = ValueContainer::dynamic(self.kind, self.rank());
        self.visit(|indices, value| {
            if let Some(value) = value {
                result.set(indices, value.clone())?;
            }
            Ok(())
        })?;
        Ok(result)
    }

    fn check_rank(&self, indices: &[usize]) -> Result<()> {
        let rank = self.rank();
        if indices.len() != rank {
            return Err(Error::RankMismatch {
                expected: rank,
                got: indices.len(),
            });
        }
        Ok(())
    }
}

fn check_bounds(shape: &[usize], indices: &[usize]) -> Result<()> {
    for (axis, (&index, &extent)) in indices.iter().zip(shape.iter()).enumerate() {
        if index >= extent {
            return Err(Error::IndexOutOfRange {
                axis,
                index,
                extent,
            });
        }
    }
    Ok(())
}

fn offset(shape: &[usize], indices: &[usize]) -> usize {
    let mut offset = 0;
    for (&index, &extent) in indices.iter().zip(shape.iter()) {
        offset = offset * extent + index;
    }
    offset
}
