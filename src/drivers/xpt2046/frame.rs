//! Control byte and conversion reply layout.
//!
//! Control byte, MSB first:
//!
//! | bit | 7 | 6..4    | 3    | 2       | 1..0 |
//! |-----|---|---------|------|---------|------|
//! |     | S | A2..A0  | MODE | SER/DFR | PD   |
//!
//! A conversion is a 3-byte full-duplex exchange. Byte 0 of the reply echoes
//! the command slot and is ignored; bytes 1..=2 form a big-endian word whose
//! top bit is the busy slot, followed by the result MSB first.

pub const FRAME_LEN: usize = 3;

const START_BIT: u8 = 1 << 7;
const ADDRESS_SHIFT: u8 = 4;
const ADDRESS_MASK: u8 = 0b111;
const MODE_BIT: u8 = 1 << 3;
const SER_DFR_BIT: u8 = 1 << 2;
const POWER_MASK: u8 = 0b11;

const RESULT_12_SHIFT: u16 = 3;
const RESULT_12_MASK: u16 = 0x0FFF;
const RESULT_8_SHIFT: u16 = 7;
const RESULT_8_MASK: u16 = 0x00FF;

/// Conversion sources selected by A2..A0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    Temp0 = 0,
    YPosition = 1,
    Battery = 2,
    Z1 = 3,
    /// YN input, read as the second pressure reference.
    Z2 = 4,
    XPosition = 5,
    AuxIn = 6,
    Temp1 = 7,
}

impl Channel {
    pub const fn address(self) -> u8 {
        self as u8
    }
}

/// PD1..PD0 power-down selection applied after the conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    PowerDown = 0,
    ReferenceOff = 1,
    ReferenceOn = 2,
    FullyOn = 3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    Bits12,
    Bits8,
}

impl Resolution {
    pub const fn max_value(self) -> u16 {
        match self {
            Resolution::Bits12 => RESULT_12_MASK,
            Resolution::Bits8 => RESULT_8_MASK,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReferenceMode {
    #[default]
    Differential,
    SingleEnded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub channel: Channel,
    pub power: PowerMode,
    pub reference: ReferenceMode,
    pub resolution: Resolution,
    pub start: bool,
}

impl Command {
    pub const fn conversion(
        channel: Channel,
        power: PowerMode,
        reference: ReferenceMode,
        resolution: Resolution,
    ) -> Self {
        Self {
            channel,
            power,
            reference,
            resolution,
            start: true,
        }
    }

    pub const fn encode(self) -> u8 {
        encode_control(
            self.channel,
            self.power,
            self.reference,
            self.resolution,
            self.start,
        )
    }

    /// Transmit buffer: command byte followed by clocking bytes.
    pub const fn frame(self) -> [u8; FRAME_LEN] {
        [self.encode(), 0x00, 0x00]
    }
}

pub const fn encode_control(
    channel: Channel,
    power: PowerMode,
    reference: ReferenceMode,
    resolution: Resolution,
    start: bool,
) -> u8 {
    let mut control = (channel.address() & ADDRESS_MASK) << ADDRESS_SHIFT;
    if start {
        control |= START_BIT;
    }
    if matches!(resolution, Resolution::Bits8) {
        control |= MODE_BIT;
    }
    if matches!(reference, ReferenceMode::SingleEnded) {
        control |= SER_DFR_BIT;
    }
    control | (power as u8 & POWER_MASK)
}

pub const fn decode_result(reply: &[u8; FRAME_LEN], resolution: Resolution) -> u16 {
    let word = ((reply[1] as u16) << 8) | reply[2] as u16;
    match resolution {
        Resolution::Bits12 => (word >> RESULT_12_SHIFT) & RESULT_12_MASK,
        Resolution::Bits8 => (word >> RESULT_8_SHIFT) & RESULT_8_MASK,
    }
}

/// Reply the chip would clock out for `value`; used by bus fakes.
pub const fn encode_reply(value: u16, resolution: Resolution) -> [u8; FRAME_LEN] {
    let word = match resolution {
        Resolution::Bits12 => (value & RESULT_12_MASK) << RESULT_12_SHIFT,
        Resolution::Bits8 => (value & RESULT_8_MASK) << RESULT_8_SHIFT,
    };
    [0x00, (word >> 8) as u8, word as u8]
}
