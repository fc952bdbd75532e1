//! ES9038Q2M register map
//!
//! Source: ESS Technology ES9038Q2M Datasheet v1.4
//! <https://www.esstech.com/wp-content/uploads/2022/09/ES9038Q2M-Datasheet-v1.4.pdf>
//!
//! Only the registers the link endpoint touches are listed.
//!
//! ## Power-on volume state
//! The chip powers up with REG_VOLUME_LEFT (0x04) and REG_VOLUME_RIGHT (0x05)
//! set to 0x00 (0 dB = loudest). Clearing the format therefore writes
//! VOLUME_MUTE (0xFF) to both, so a stale serial stream is never passed
//! through at full scale.
//!
//! ## REG_INPUT_CONFIG
//! bits \[5:4\] = serial word length, bits \[3:2\] = input_select (0b00 = I²S,
//! required), bits \[1:0\] = serial mode (0b00 = I²S, 0b01 = left-justified).

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// System register: bit 0 = soft reset (self-clearing)
pub const REG_SYSTEM: u8 = 0x00;

/// Input configuration: serial mode, word length, input select
pub const REG_INPUT_CONFIG: u8 = 0x01;

/// Volume attenuation: left channel
///
/// 0x00 = 0 dB (loudest / no attenuation).
/// 0xFF = maximum attenuation (quietest / mute).
pub const REG_VOLUME_LEFT: u8 = 0x04;

/// Volume attenuation: right channel (same encoding as REG_VOLUME_LEFT)
pub const REG_VOLUME_RIGHT: u8 = 0x05;

/// Master mode / sync configuration
///
/// bit 7 = master mode enable (chip drives BCLK / LRCLK from MCLK).
pub const REG_MASTER_MODE: u8 = 0x07;

// ---------------------------------------------------------------------------
// Register field values
// ---------------------------------------------------------------------------

/// System register: initiate soft reset (self-clearing)
pub const SYSTEM_SOFT_RESET: u8 = 0x01;

/// Master mode: I²S slave (the interface drives BCLK/LRCLK)
pub const MASTER_MODE_SLAVE: u8 = 0x00;

/// Master mode: chip generates BCLK/LRCLK
pub const MASTER_MODE_ENABLE: u8 = 0b1000_0000;

/// Input config: 16-bit serial word
pub const INPUT_WORD_16BIT: u8 = 0b0000_0000;

/// Input config: 32-bit serial word
///
/// Bit 4 = 1 selects 32-bit I²S word length.
pub const INPUT_WORD_32BIT: u8 = 0b0001_0000;

/// Input config: 24-bit serial word
pub const INPUT_WORD_24BIT: u8 = 0b0010_0000;

/// Input config: I²S serial mode (bits \[1:0\] = 0b00)
pub const INPUT_MODE_I2S: u8 = 0b0000_0000;

/// Input config: left-justified serial mode (bits \[1:0\] = 0b01)
pub const INPUT_MODE_LEFT_JUSTIFIED: u8 = 0b0000_0001;

/// Volume: mute (maximum attenuation)
pub const VOLUME_MUTE: u8 = 0xFF;

/// Volume: 0 dB (no attenuation, loudest)
pub const VOLUME_0DB: u8 = 0x00;
