//! Device-control opcodes for the signal reader driver.
//!
//! Opcodes follow the Linux `_IOC` layout:
//!
//! ```text
//!  31 30 | 29 ........ 16 | 15 ..... 8 | 7 ...... 0
//!   dir  |   arg size     |   magic    |  number
//! ```
//!
//! Any deviation from this layout addresses a different control register on
//! the driver side, so the opcodes are pinned as constants and tested.

/// No data transfer.
pub const IOC_NONE: u32 = 0;
/// Userspace writes the argument to the driver (`_IOW`).
pub const IOC_WRITE: u32 = 1;
/// Userspace reads the argument from the driver (`_IOR`).
pub const IOC_READ: u32 = 2;

const NR_SHIFT: u32 = 0;
const TYPE_SHIFT: u32 = 8;
const SIZE_SHIFT: u32 = 16;
const DIR_SHIFT: u32 = 30;

const SIZE_MASK: u32 = (1 << 14) - 1;

/// Magic byte registered by the signal reader driver.
pub const SIGNAL_READER_MAGIC: u8 = b's';

/// Size of the `int` argument used by the channel commands.
pub const CHANNEL_ARG_SIZE: u32 = 4;

/// Compose an opcode from its four fields.
pub const fn encode_ioc(direction: u32, magic: u8, number: u8, arg_size: u32) -> u32 {
    (direction << DIR_SHIFT)
        | ((arg_size & SIZE_MASK) << SIZE_SHIFT)
        | ((magic as u32) << TYPE_SHIFT)
        | ((number as u32) << NR_SHIFT)
}

/// `_IOW(magic, number, arg)` for the channel-switch command.
pub const fn encode_set_channel_command(magic: u8, number: u8, arg_size: u32) -> u32 {
    encode_ioc(IOC_WRITE, magic, number, arg_size)
}

/// `_IOW('s', 0, int)`: switch the active channel.
pub const SET_CHANNEL: u32 =
    encode_set_channel_command(SIGNAL_READER_MAGIC, 0, CHANNEL_ARG_SIZE);

/// `_IOR('s', 1, int)`: read back the active channel.
pub const GET_CHANNEL: u32 = encode_ioc(IOC_READ, SIGNAL_READER_MAGIC, 1, CHANNEL_ARG_SIZE);
