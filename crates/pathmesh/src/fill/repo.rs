use std::collections::HashMap;

use nalgebra::SVector;

/// Deduplicating vertex buffer keyed by exact bit patterns.
///
/// Equal coordinates share one index; `-0.0` and `0.0` are the same key.
/// Indices are dense and follow first insertion order.
#[derive(Clone, Debug, Default)]
pub struct VertexRepo<const D: usize> {
    index: HashMap<[u64; D], u32>,
    positions: Vec<SVector<f64, D>>,
}

pub type VertexRepo2 = VertexRepo<2>;
pub type VertexRepo3 = VertexRepo<3>;

#[inline]
fn bit_key<const D: usize>(p: &SVector<f64, D>) -> [u64; D] {
    std::array::from_fn(|i| {
        let v = p[i];
        if v == 0.0 {
            0u64
        } else {
            v.to_bits()
        }
    })
}

impl<const D: usize> VertexRepo<D> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            positions: Vec::new(),
        }
    }

    /// Index of `p`, appending it on first sight.
    pub fn get_index(&mut self, p: SVector<f64, D>) -> u32 {
        let key = bit_key(&p);
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.positions.len() as u32;
        self.index.insert(key, i);
        self.positions.push(p);
        i
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &[SVector<f64, D>] {
        &self.positions
    }

    pub fn to_vec(&self) -> Vec<SVector<f64, D>> {
        self.positions.clone()
    }

    pub fn into_vec(self) -> Vec<SVector<f64, D>> {
        self.positions
    }
}
