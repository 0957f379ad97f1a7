pub trait Buf {
    fn get_u8(&mut self) -> u8;

    fn get_u16(&mut self) -> u16;

    /// Skip `n` bytes that the message does not interpret.
    fn advance(&mut self, n: usize);
}

impl Buf for &[u8] {
    #[inline]
    fn get_u8(&mut self) -> u8 {
        *self.split_off_first().unwrap()
    }

    /// Little-endian, i.e. `(hi << 8) | lo` with `lo` first on the wire.
    ///
    /// ```
    /// # use agri_j1939::Buf;
    /// let mut buf = &[0x10, 0x27][..];
    /// assert_eq!(buf.get_u16(), 10_000);
    /// ```
    #[inline]
    fn get_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.split_off(..2).unwrap().try_into().unwrap())
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.split_off(..n).unwrap();
    }
}

pub trait BufMut {
    fn put_u8(&mut self, value: u8);

    fn put_u16(&mut self, value: u16);

    /// Fill the next `n` bytes with `0xff`, the J1939 "not available" pattern.
    fn put_unavailable(&mut self, n: usize);
}

impl BufMut for &mut [u8] {
    #[inline]
    fn put_u8(&mut self, value: u8) {
        *self.split_off_first_mut().unwrap() = value;
    }

    #[inline]
    fn put_u16(&mut self, value: u16) {
        self.split_off_mut(..2)
            .unwrap()
            .copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    fn put_unavailable(&mut self, n: usize) {
        self.split_off_mut(..n).unwrap().fill(0xff);
    }
}

#[cfg(test)]
mod tests {
    use super::{Buf, BufMut};

    #[test]
    fn reads_little_endian_words() {
        let mut buf = &[0xe8, 0x03, 0x7f][..];
        assert_eq!(buf.get_u16(), 1000);
        assert_eq!(buf.get_u8(), 0x7f);
        assert!(buf.is_empty());
    }

    #[test]
    fn writes_and_pads() {
        let mut out = [0u8; 5];
        {
            let mut buf = &mut out[..];
            buf.put_u16(0x2710);
            buf.put_u8(1);
            buf.put_unavailable(2);
        }
        assert_eq!(out, [0x10, 0x27, 0x01, 0xff, 0xff]);
    }
}
