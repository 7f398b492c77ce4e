//! Small helper for writing big-endian table data by hand.

/// A 24-bit unsigned integer, used for COLRv1 paint offsets.
#[derive(Clone, Copy, Debug)]
pub struct Uint24(pub u32);

/// Types that can be appended to a [`BeBuffer`].
pub trait BeBytes {
    fn write_be(&self, out: &mut Vec<u8>);
}

macro_rules! impl_be_bytes {
    ($($ty:ty),*) => {
        $(
            impl BeBytes for $ty {
                fn write_be(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_be_bytes!(u8, u16, i16, u32);

impl BeBytes for Uint24 {
    fn write_be(&self, out: &mut Vec<u8>) {
        assert!(self.0 <= 0xFF_FFFF, "{} does not fit in 24 bits", self.0);
        out.extend_from_slice(&self.0.to_be_bytes()[1..]);
    }
}

/// A growable buffer of big-endian encoded values.
#[derive(Clone, Debug, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current length, which is also the offset of the next value.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push(mut self, item: impl BeBytes) -> Self {
        item.write_be(&mut self.data);
        self
    }

    pub fn extend<T: BeBytes>(mut self, items: impl IntoIterator<Item = T>) -> Self {
        for item in items {
            item.write_be(&mut self.data);
        }
        self
    }

    /// Appends the raw contents of another buffer.
    pub fn append(mut self, other: &BeBuffer) -> Self {
        self.data.extend_from_slice(&other.data);
        self
    }

    /// Pads with zeros until the length is a multiple of `align`.
    pub fn align_to(mut self, align: usize) -> Self {
        while self.data.len() % align != 0 {
            self.data.push(0);
        }
        self
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Build a [`BeBuffer`] from a comma separated list of values.
#[macro_export]
macro_rules! be_buffer {
    ( $( $value:expr ),* $(,)? ) => {{
        let buffer = $crate::bebuffer::BeBuffer::new();
        $(
            let buffer = buffer.push($value);
        )*
        buffer
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_big_endian() {
        let buf = be_buffer! { 1_u8, 0x0203_u16, -2_i16, Uint24(0x040506), 0x0708090A_u32 };
        assert_eq!(
            buf.as_slice(),
            &[1, 2, 3, 0xFF, 0xFE, 4, 5, 6, 7, 8, 9, 10]
        );
    }

    #[test]
    fn align() {
        let buf = be_buffer! { 1_u8 }.align_to(4);
        assert_eq!(buf.len(), 4);
        assert_eq!(BeBuffer::new().align_to(4).len(), 0);
    }
}
