//! Strided element layout over a byte slice.

use byteorder::{ByteOrder, LittleEndian};

use crate::util::{ComponentType, Error, Result};

/// Maximum number of components in one element (MAT4).
pub const MAX_COMPONENTS: usize = 16;

/// One decoded element, widened to `f32`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    values: [f32; MAX_COMPONENTS],
    len: usize,
}

impl Element {
    pub(crate) fn zeroed(len: usize) -> Self {
        Self { values: [0.0; MAX_COMPONENTS], len }
    }

    /// Components in storage order (column-major for matrices).
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First `N` components; missing ones are set to `fill`.
    pub fn to_array<const N: usize>(&self, fill: f32) -> [f32; N] {
        let mut out = [fill; N];
        let n = N.min(self.len);
        out[..n].copy_from_slice(&self.values[..n]);
        out
    }
}

/// Where the elements of one accessor sit inside a view's bytes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Layout<'a> {
    bytes: &'a [u8],
    offset: usize,
    stride: usize,
    component: ComponentType,
    num_components: usize,
}

impl<'a> Layout<'a> {
    /// Check that `count` elements fit inside `bytes` and build the layout.
    ///
    /// `stride` of 0 means tightly packed.
    pub fn new(
        accessor: usize,
        bytes: &'a [u8],
        offset: usize,
        stride: usize,
        component: ComponentType,
        num_components: usize,
        count: usize,
    ) -> Result<Self> {
        let elem_size = component.num_bytes() * num_components;
        let stride = if stride == 0 { elem_size } else { stride };
        if stride < elem_size {
            return Err(Error::schema(format!(
                "accessor {accessor}: byteStride {stride} is smaller than element size {elem_size}"
            )));
        }
        if count > 0 {
            let needed = (count - 1)
                .checked_mul(stride)
                .and_then(|n| n.checked_add(offset))
                .and_then(|n| n.checked_add(elem_size))
                .unwrap_or(usize::MAX);
            if needed > bytes.len() {
                return Err(Error::AccessorOutOfBounds { accessor, needed, available: bytes.len() });
            }
        }
        Ok(Self { bytes, offset, stride, component, num_components })
    }

    #[inline]
    fn start(&self, index: usize) -> usize {
        self.offset + index * self.stride
    }

    /// Decode element `index`, normalizing integers when asked.
    pub fn read(&self, index: usize, normalized: bool) -> Element {
        let mut out = Element::zeroed(self.num_components);
        let size = self.component.num_bytes();
        let start = self.start(index);
        for (c, v) in out.values[..self.num_components].iter_mut().enumerate() {
            *v = read_component(&self.bytes[start + c * size..], self.component, normalized);
        }
        out
    }

    /// First component of element `index` as an unsigned integer.
    pub fn read_u32(&self, index: usize) -> u32 {
        let b = &self.bytes[self.start(index)..];
        match self.component {
            ComponentType::UnsignedByte => b[0] as u32,
            ComponentType::UnsignedShort => LittleEndian::read_u16(b) as u32,
            ComponentType::UnsignedInt => LittleEndian::read_u32(b),
            ComponentType::Byte => b[0] as i8 as u32,
            ComponentType::Short => LittleEndian::read_i16(b) as u32,
            ComponentType::Float => LittleEndian::read_f32(b) as u32,
        }
    }
}

/// Decode one scalar. Floats are returned bit-exact.
fn read_component(b: &[u8], component: ComponentType, normalized: bool) -> f32 {
    let raw = match component {
        ComponentType::Float => return LittleEndian::read_f32(b),
        ComponentType::Byte => b[0] as i8 as f64,
        ComponentType::UnsignedByte => b[0] as f64,
        ComponentType::Short => LittleEndian::read_i16(b) as f64,
        ComponentType::UnsignedShort => LittleEndian::read_u16(b) as f64,
        ComponentType::UnsignedInt => LittleEndian::read_u32(b) as f64,
    };
    if !normalized {
        return raw as f32;
    }
    // Signed minimum (-128, -32768) maps below -1 and is clamped.
    (raw / component.max_magnitude()).max(-1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(read_component(&[255], ComponentType::UnsignedByte, true), 1.0);
        assert_eq!(read_component(&[0], ComponentType::UnsignedByte, true), 0.0);
        assert_eq!(read_component(&[127], ComponentType::Byte, true), 1.0);
        assert_eq!(read_component(&[0x80], ComponentType::Byte, true), -1.0);
        assert_eq!(read_component(&[0x81], ComponentType::Byte, true), -1.0);
        assert_eq!(read_component(&0x8000u16.to_le_bytes(), ComponentType::Short, true), -1.0);
        assert_eq!(read_component(&u16::MAX.to_le_bytes(), ComponentType::UnsignedShort, true), 1.0);
        assert_eq!(read_component(&[0x80], ComponentType::Byte, false), -128.0);
    }

    #[test]
    fn test_float_ignores_normalized() {
        let b = 2.5f32.to_le_bytes();
        assert_eq!(read_component(&b, ComponentType::Float, true), 2.5);
    }

    #[test]
    fn test_strided_layout() {
        // Two u16 pairs with 4 bytes of padding between elements.
        let bytes = [1, 0, 2, 0, 9, 9, 9, 9, 3, 0, 4, 0];
        let l = Layout::new(0, &bytes, 0, 8, ComponentType::UnsignedShort, 2, 2).unwrap();
        assert_eq!(l.read(0, false).as_slice(), &[1.0, 2.0]);
        assert_eq!(l.read(1, false).as_slice(), &[3.0, 4.0]);
    }

    #[test]
    fn test_layout_bounds() {
        let bytes = [0u8; 11];
        let err = Layout::new(3, &bytes, 0, 0, ComponentType::Float, 3, 1).unwrap_err();
        assert!(matches!(err, Error::AccessorOutOfBounds { accessor: 3, needed: 12, available: 11 }));
        // Last strided element only needs its own bytes.
        let bytes = [0u8; 20];
        assert!(Layout::new(0, &bytes, 0, 8, ComponentType::Float, 3, 2).is_ok());
        assert!(Layout::new(0, &bytes, 0, 8, ComponentType::Float, 3, 3).is_err());
        assert!(Layout::new(0, &bytes, 0, 4, ComponentType::Float, 3, 1).is_err());
    }

    #[test]
    fn test_layout_offset_overflow() {
        let bytes = [0u8; 16];
        let err = Layout::new(2, &bytes, usize::MAX - 1, 0, ComponentType::Float, 1, 1).unwrap_err();
        assert!(matches!(err, Error::AccessorOutOfBounds { accessor: 2, needed: usize::MAX, available: 16 }));
        let err = Layout::new(2, &bytes, 4, usize::MAX / 2, ComponentType::Float, 1, 3).unwrap_err();
        assert!(matches!(err, Error::AccessorOutOfBounds { needed: usize::MAX, .. }));
    }

    #[test]
    fn test_element_to_array() {
        let mut e = Element::zeroed(3);
        e.values[..3].copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(e.to_array::<4>(1.0), [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(e.to_array::<2>(0.0), [1.0, 2.0]);
    }
}
