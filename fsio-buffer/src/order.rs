//! Byte order for multi-byte scalars

use fsio_config::ByteOrderSetting;

/// Byte order used to encode and decode multi-byte values.
///
/// Decoding is done byte by byte, so the result never depends on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// The host's order
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Assemble up to eight bytes into an unsigned value
    pub fn decode(self, bytes: &[u8]) -> u64 {
        debug_assert!(bytes.len() <= 8);
        match self {
            ByteOrder::BigEndian => bytes
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
            ByteOrder::LittleEndian => bytes
                .iter()
                .rev()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        }
    }

    /// Spread the low `out.len()` bytes of `value` into `out`
    pub fn encode(self, value: u64, out: &mut [u8]) {
        debug_assert!(out.len() <= 8);
        let width = out.len();
        for (i, slot) in out.iter_mut().enumerate() {
            let shift = match self {
                ByteOrder::BigEndian => 8 * (width - 1 - i),
                ByteOrder::LittleEndian => 8 * i,
            };
            *slot = (value >> shift) as u8;
        }
    }
}

impl From<ByteOrderSetting> for ByteOrder {
    fn from(setting: ByteOrderSetting) -> Self {
        match setting {
            ByteOrderSetting::Big => ByteOrder::BigEndian,
            ByteOrderSetting::Little => ByteOrder::LittleEndian,
            ByteOrderSetting::Native => ByteOrder::native(),
        }
    }
}
