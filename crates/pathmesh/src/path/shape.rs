use super::graph::{Island, Loop};
use super::PathError;
use crate::bounds::Bounds2;

/// Collection of loops; the top of the dirty-propagation chain.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    loops: Vec<Loop>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `lp`; returns its index.
    pub fn add_loop(&mut self, lp: Loop) -> usize {
        self.loops.push(lp);
        self.loops.len() - 1
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn loop_mut(&mut self, index: usize) -> Option<&mut Loop> {
        self.loops.get_mut(index)
    }

    pub fn is_dirty(&self) -> bool {
        self.loops.iter().any(Loop::is_dirty)
    }

    /// Flush every dirty loop; returns the number of rebuilt nodes.
    pub fn flush(&mut self) -> usize {
        self.loops.iter_mut().map(Loop::flush).sum()
    }

    /// Deinflect every island of every loop; returns the number of splits.
    pub fn deinflect_all(&mut self) -> Result<usize, PathError> {
        let mut splits = 0;
        for lp in &mut self.loops {
            for island in lp.islands() {
                splits += lp.deinflect_island(island.start)?;
            }
        }
        Ok(splits)
    }

    /// `(loop index, island)` for every island in the shape.
    pub fn islands(&self) -> Vec<(usize, Island)> {
        self.loops
            .iter()
            .enumerate()
            .flat_map(|(i, lp)| lp.islands().into_iter().map(move |isl| (i, isl)))
            .collect()
    }

    pub fn bounds(&self) -> Result<Bounds2, PathError> {
        let mut b = Bounds2::EMPTY;
        for (i, island) in self.islands() {
            b = b.union(self.loops[i].island_bounds(island.start)?);
        }
        Ok(b)
    }
}
