use crate::{
    constants::{SELECTOR_SIZE, WORD_SIZE_IN_BYTES_USIZE},
    utils::{padded_slice, u256_from_big_endian},
};
use bytes::Bytes;
use ethereum_types::U256;

/// Read-only view over the input of a call. Reads past the end are zero padded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalldataView {
    data: Bytes,
}

impl CalldataView {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Returns the 32 bytes starting at `offset` as a big-endian word.
    pub fn load_word(&self, offset: usize) -> U256 {
        u256_from_big_endian(&padded_slice(&self.data, offset, WORD_SIZE_IN_BYTES_USIZE))
    }

    /// First four bytes read as a big-endian integer, if the calldata is long enough to hold them.
    pub fn selector(&self) -> Option<u32> {
        let bytes: [u8; SELECTOR_SIZE] = self.data.get(..SELECTOR_SIZE)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn load_word_zero_pads_past_the_end() {
        let calldata = CalldataView::new(Bytes::from_static(&hex!("e026c017")));
        let word = calldata.load_word(0);
        assert_eq!(word, U256::from(0xe026c017u64) << 224);
        assert_eq!(calldata.load_word(4), U256::zero());
        assert_eq!(calldata.load_word(usize::MAX), U256::zero());
    }

    #[test]
    fn selector_requires_four_bytes() {
        assert_eq!(
            CalldataView::new(Bytes::from_static(&hex!("cdfead2e00"))).selector(),
            Some(0xcdfead2e)
        );
        assert_eq!(
            CalldataView::new(Bytes::from_static(&hex!("cdfead"))).selector(),
            None
        );
    }
}
