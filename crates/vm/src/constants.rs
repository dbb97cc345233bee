use ethereum_types::U256;

pub const WORD_SIZE_IN_BYTES_USIZE: usize = 32;

pub const STACK_LIMIT: usize = 1024;

/// Memory ceiling for a single call. There is no gas to bound expansion, so the host bounds it.
pub const DEFAULT_MEMORY_LIMIT: usize = 32 * 1024 * 1024;

pub const SELECTOR_SIZE: usize = 4;

/// `updateHorseNumber(uint256)`
pub const WRITE_SELECTOR: u32 = 0xcdfead2e;
/// `readNumberOfHorses()`
pub const READ_SELECTOR: u32 = 0xe026c017;

/// Selector plus one ABI encoded word.
pub const WRITE_CALLDATA_SIZE: usize = SELECTOR_SIZE + WORD_SIZE_IN_BYTES_USIZE;

/// The only storage slot the counter contract addresses.
pub const COUNTER_SLOT: U256 = U256::zero();

/// Deployment bytecode of the counter contract, metadata trailer stripped.
///
/// The constructor copies `0xa5` bytes starting at code offset `0x1b` and returns them. The
/// runtime section is shorter than that, so the tail of the installed program is zero padding.
pub const COUNTER_INIT_CODE: [u8; 139] = [
    // constructor
    0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x60, 0x0e, 0x57, 0x5f, 0x80, 0xfd, 0x5b, 0x50,
    0x60, 0xa5, 0x80, 0x61, 0x00, 0x1b, 0x5f, 0x39, 0x5f, 0xf3, 0xfe,
    // runtime
    0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x60, 0x0e, 0x57, 0x5f, 0x80, 0xfd, 0x5b, 0x50,
    0x60, 0x04, 0x36, 0x10, 0x60, 0x30, 0x57, 0x5f, 0x35, 0x60, 0xe0, 0x1c, 0x80, 0x63, 0xcd, 0xfe,
    0xad, 0x2e, 0x14, 0x60, 0x34, 0x57, 0x80, 0x63, 0xe0, 0x26, 0xc0, 0x17, 0x14, 0x60, 0x45, 0x57,
    0x5b, 0x5f, 0x80, 0xfd, 0x5b, 0x60, 0x43, 0x60, 0x3f, 0x36, 0x60, 0x04, 0x60, 0x59, 0x56, 0x5b,
    0x5f, 0x55, 0x56, 0x5b, 0x00, 0x5b, 0x5f, 0x54, 0x60, 0x40, 0x51, 0x90, 0x81, 0x52, 0x60, 0x20,
    0x01, 0x60, 0x40, 0x51, 0x80, 0x91, 0x03, 0x90, 0xf3, 0x5b, 0x5f, 0x60, 0x20, 0x82, 0x84, 0x03,
    0x12, 0x15, 0x60, 0x68, 0x57, 0x5f, 0x80, 0xfd, 0x5b, 0x50, 0x35, 0x91, 0x90, 0x50, 0x56, 0xfe,
];

/// Length of the runtime program installed by [`COUNTER_INIT_CODE`].
pub const COUNTER_RUNTIME_SIZE: usize = 0xa5;
