//! Z-order (Morton) encoding of 2D grid coordinates.
//!
//! `x` occupies the even bits of a code and `y` the odd bits, so each 2-bit
//! group of a code is one quadtree level: the lowest group picks the leaf
//! within its parent, the highest group picks the quadrant under the root.

/// Interleaves a zero bit after every bit of `n`: bit `i` moves to bit `2i`.
#[inline(always)]
pub fn spread(n: u16) -> u32 {
    let mut n = u32::from(n);
    n = (n | (n << 8)) & 0x00ff_00ff;
    n = (n | (n << 4)) & 0x0f0f_0f0f;
    n = (n | (n << 2)) & 0x3333_3333;
    (n | (n << 1)) & 0x5555_5555
}

/// Inverse of [`spread`]: gathers the even bits of `n` back into 16 bits.
#[inline(always)]
pub fn compact(n: u32) -> u16 {
    let mut n = n & 0x5555_5555;
    n = (n | (n >> 1)) & 0x3333_3333;
    n = (n | (n >> 2)) & 0x0f0f_0f0f;
    n = (n | (n >> 4)) & 0x00ff_00ff;
    n = (n | (n >> 8)) & 0x0000_ffff;
    n as u16
}

/// Morton code of grid cell `(x, y)`.
#[inline(always)]
pub fn morton(x: u16, y: u16) -> u32 {
    spread(x) | (spread(y) << 1)
}

#[inline(always)]
pub fn decode(code: u32) -> (u16, u16) {
    (compact(code), compact(code >> 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_moves_bits_to_even_positions() {
        assert_eq!(spread(0), 0);
        assert_eq!(spread(0b0001), 0b0001);
        assert_eq!(spread(0b0010), 0b0100);
        assert_eq!(spread(0b0111), 0b01_0101);
        assert_eq!(spread(0xffff), 0x5555_5555);
    }

    #[test]
    fn morton_interleaves_x_then_y() {
        assert_eq!(morton(3, 6), 45);
        assert_eq!(morton(6, 5), 54);
        assert_eq!(morton(1, 0), 1);
        assert_eq!(morton(0, 1), 2);
        assert_eq!(morton(7, 7), 63);
    }

    #[test]
    fn decode_recovers_coordinates() {
        for (x, y) in [(0u16, 0u16), (3, 6), (1023, 17), (u16::MAX, 1)] {
            assert_eq!(decode(morton(x, y)), (x, y));
        }
        assert_eq!(compact(0x5555_5555), 0xffff);
    }
}
