/// Returns a mask with the low `width` bits set, saturating at 64 bits
#[inline]
fn low_bits_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Shifts right, producing 0 instead of overflowing for shifts of 64 or more
#[inline]
fn shift_right(value: u64, bits: u32) -> u64 {
    value.checked_shr(bits).unwrap_or(0)
}

/// Extracts the set index of an address
///
/// The block offset is discarded and the result is masked to the low `s` bits, so it is always in
/// `[0, 2^s)`
///
/// # Arguments
///
/// * `address`: The raw address
/// * `s`: The number of set index bits
/// * `b`: The number of block offset bits
///
/// returns: u64
pub fn set_index(address: u64, s: u32, b: u32) -> u64 {
    shift_right(address, b) & low_bits_mask(s)
}

/// Extracts the tag of an address, always in `[0, 2^t)`
///
/// Bits above the configured address width are truncated by the mask rather than rejected
pub fn tag(address: u64, t: u32, s: u32, b: u32) -> u64 {
    shift_right(address, s.saturating_add(b)) & low_bits_mask(t)
}

/// Extracts the offset of an address within its block
pub fn block_offset(address: u64, b: u32) -> u64 {
    address & low_bits_mask(b)
}

/// The fields of a decoded address
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DecodedAddress {
    pub tag: u64,
    pub set_index: u64,
    pub block_offset: u64,
}

/// The partition of an address into tag, set index, and block offset bit widths
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AddressLayout {
    set_bits: u32,
    offset_bits: u32,
    tag_bits: u32,
}

impl AddressLayout {
    pub fn new(set_bits: u32, offset_bits: u32, tag_bits: u32) -> Self {
        Self {
            set_bits,
            offset_bits,
            tag_bits,
        }
    }

    /// `s`
    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    /// `b`
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// `t`
    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Converts an address into a set index and a tag
    pub fn set_and_tag(&self, address: u64) -> (u64, u64) {
        (
            set_index(address, self.set_bits, self.offset_bits),
            tag(address, self.tag_bits, self.set_bits, self.offset_bits),
        )
    }

    pub fn decode(&self, address: u64) -> DecodedAddress {
        let (set_index, tag) = self.set_and_tag(address);
        DecodedAddress {
            tag,
            set_index,
            block_offset: block_offset(address, self.offset_bits),
        }
    }
}
