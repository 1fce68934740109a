//! Accessor and index views.

use tracing::debug;

use super::layout::{Element, Layout};
use crate::model::{Accessor, Asset};
use crate::util::{AccessorType, DataType, Error, Result};

/// Sparse overlay: displaced indices and their replacement values.
#[derive(Clone, Copy, Debug)]
struct SparseLayout<'a> {
    count: usize,
    indices: Layout<'a>,
    values: Layout<'a>,
    /// Indices are strictly increasing.
    sorted: bool,
}

impl SparseLayout<'_> {
    #[inline]
    fn index_at(&self, k: usize) -> usize {
        self.indices.read_u32(k) as usize
    }

    /// Slot of the last sparse entry displacing `index`, if any.
    fn find(&self, index: usize) -> Option<usize> {
        if !self.sorted {
            return (0..self.count).rev().find(|&k| self.index_at(k) == index);
        }
        let (mut lo, mut hi) = (0, self.count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.index_at(mid) < index {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        (lo < self.count && self.index_at(lo) == index).then_some(lo)
    }
}

/// Random-access reader of one accessor's elements.
#[derive(Clone, Copy, Debug)]
pub struct AccessorView<'a> {
    index: usize,
    accessor: &'a Accessor,
    base: Option<Layout<'a>>,
    sparse: Option<SparseLayout<'a>>,
}

impl<'a> AccessorView<'a> {
    /// Bind accessor `index` of `asset`.
    ///
    /// Fails when the accessor or a view it uses is out of range, when a
    /// referenced buffer is not loaded, or when any element would fall
    /// outside its view.
    pub fn new(asset: &'a Asset, index: usize) -> Result<Self> {
        let accessor = asset.accessor(index)?;
        let ncomp = accessor.num_components();

        let base = match accessor.buffer_view {
            Some(v) => {
                let view = asset.buffer_view(v)?;
                let bytes = asset.view_bytes(v)?;
                Some(Layout::new(
                    index,
                    bytes,
                    accessor.byte_offset,
                    view.stride(),
                    accessor.component_type,
                    ncomp,
                    accessor.count,
                )?)
            }
            None => None,
        };

        let sparse = match &accessor.sparse {
            Some(s) if s.count > 0 => {
                let ictype = s.indices.component_type;
                if !ictype.is_unsigned_integer() {
                    return Err(Error::InvalidComponentType { value: ictype.into(), context: "sparse.indices" });
                }
                if s.count > accessor.count {
                    return Err(Error::schema(format!(
                        "accessor {index}: sparse count {} exceeds element count {}",
                        s.count, accessor.count
                    )));
                }
                let ibytes = asset.view_bytes(s.indices.buffer_view)?;
                let indices = Layout::new(index, ibytes, s.indices.byte_offset, 0, ictype, 1, s.count)?;
                let vbytes = asset.view_bytes(s.values.buffer_view)?;
                let values = Layout::new(
                    index,
                    vbytes,
                    s.values.byte_offset,
                    0,
                    accessor.component_type,
                    ncomp,
                    s.count,
                )?;
                let mut sorted = true;
                let mut prev = None;
                for k in 0..s.count {
                    let i = indices.read_u32(k) as usize;
                    Error::check_index("sparse index", i, accessor.count)?;
                    sorted &= prev.map_or(true, |p| p < i);
                    prev = Some(i);
                }
                if !sorted {
                    debug!(accessor = index, "sparse indices are not strictly increasing");
                }
                Some(SparseLayout { count: s.count, indices, values, sorted })
            }
            _ => None,
        };

        Ok(Self { index, accessor, base, sparse })
    }

    /// Accessor index this view reads.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of elements.
    #[inline]
    pub fn count(&self) -> usize {
        self.accessor.count
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.accessor.data_type()
    }

    #[inline]
    pub fn shape(&self) -> AccessorType {
        self.accessor.accessor_type
    }

    /// Decode element `i`.
    pub fn read_element(&self, i: usize) -> Result<Element> {
        Error::check_index("accessor element", i, self.count())?;
        Ok(self.read_unchecked(i))
    }

    fn read_unchecked(&self, i: usize) -> Element {
        let normalized = self.accessor.normalized;
        if let Some(sparse) = &self.sparse {
            if let Some(k) = sparse.find(i) {
                return sparse.values.read(k, normalized);
            }
        }
        match &self.base {
            Some(base) => base.read(i, normalized),
            None => Element::zeroed(self.accessor.num_components()),
        }
    }

    /// All elements in order.
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        (0..self.count()).map(move |i| self.read_unchecked(i))
    }

    /// All elements truncated or padded to `N` components.
    pub fn to_arrays<const N: usize>(&self, fill: f32) -> Vec<[f32; N]> {
        self.iter().map(|e| e.to_array::<N>(fill)).collect()
    }

    /// First component of every element.
    pub fn to_scalars(&self) -> Vec<f32> {
        self.iter().map(|e| e.as_slice().first().copied().unwrap_or(0.0)).collect()
    }
}

/// Reader of scalar unsigned integer elements, used for index buffers.
#[derive(Clone, Copy, Debug)]
pub struct IndexView<'a> {
    count: usize,
    base: Option<Layout<'a>>,
    sparse: Option<SparseLayout<'a>>,
}

impl<'a> IndexView<'a> {
    /// Bind accessor `index`, which must be a SCALAR of an unsigned integer type.
    pub fn new(asset: &'a Asset, index: usize) -> Result<Self> {
        let accessor = asset.accessor(index)?;
        if accessor.accessor_type != AccessorType::Scalar {
            return Err(Error::schema(format!(
                "index accessor {index} has type {}, expected SCALAR",
                accessor.accessor_type.name()
            )));
        }
        if !accessor.component_type.is_unsigned_integer() {
            return Err(Error::InvalidComponentType {
                value: accessor.component_type.into(),
                context: "index accessor",
            });
        }
        let view = AccessorView::new(asset, index)?;
        Ok(Self { count: accessor.count, base: view.base, sparse: view.sparse })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Element `i` widened to `u32`.
    pub fn read(&self, i: usize) -> Result<u32> {
        Error::check_index("index element", i, self.count)?;
        Ok(self.read_unchecked(i))
    }

    fn read_unchecked(&self, i: usize) -> u32 {
        if let Some(sparse) = &self.sparse {
            if let Some(k) = sparse.find(i) {
                return sparse.values.read_u32(k);
            }
        }
        self.base.as_ref().map_or(0, |b| b.read_u32(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.count).map(move |i| self.read_unchecked(i))
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}
