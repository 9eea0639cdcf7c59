//! Command word encoding.
//!
//! Every transfer to the DAC is a single 16-bit word. The top nibble selects the mode and, for
//! register writes, the channel. The low 12 bits carry the payload.
//!
//! ```text
//!  B15 B14 B13 B12 B11 .. B0
//!   1   C2  C1  C0  D11 .. D0    write register of channel C (WRM mode)
//!   1   0   1   0   x .. H..A    update outputs of the selected channels
//! ```

use bitflags::bitflags;

/// Number of output channels on the device
pub const CHANNEL_COUNT: u8 = 8;

/// Largest code accepted for a channel register (12 bits)
pub const MAX_VALUE: u16 = 4095;

/// Mode tag selecting "update selected outputs". OR this with the `CH_x_EN` flags to build a
/// word for [`Dac128s085::set_channel_outputs`](crate::Dac128s085::set_channel_outputs).
pub const UPDATE_SELECTED: u16 = Mode::UpdateSelected as u16;

/// Channel A output enable
pub const CH_A_EN: u16 = 1 << 0;
/// Channel B output enable
pub const CH_B_EN: u16 = 1 << 1;
/// Channel C output enable
pub const CH_C_EN: u16 = 1 << 2;
/// Channel D output enable
pub const CH_D_EN: u16 = 1 << 3;
/// Channel E output enable
pub const CH_E_EN: u16 = 1 << 4;
/// Channel F output enable
pub const CH_F_EN: u16 = 1 << 5;
/// Channel G output enable
pub const CH_G_EN: u16 = 1 << 6;
/// Channel H output enable
pub const CH_H_EN: u16 = 1 << 7;

const CHANNEL_MASK: u16 = 0x7;
const CHANNEL_SHIFT: u16 = 12;
const VALUE_MASK: u16 = 0x0FFF;

/// The mode nibble, bits [15:12] of a command word.
///
/// B15 B14 B13 B12  MODE               HEX
///  1   0   0   0   WRM (write reg)    0x8000
///  1   0   1   0   UPDATE SELECT      0xA000
#[repr(u16)]
#[derive(Clone, Copy)]
enum Mode {
    WriteRegister = 0x8000,
    UpdateSelected = 0xA000,
}

bitflags! {
    /// Per-channel output enables for an update-selected command.
    ///
    /// Bit N connects channel N's register to its output pin. Channels left out are not
    /// changed by the command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Outputs: u8 {
        const A = 1 << 0;
        const B = 1 << 1;
        const C = 1 << 2;
        const D = 1 << 3;
        const E = 1 << 4;
        const F = 1 << 5;
        const G = 1 << 6;
        const H = 1 << 7;
    }
}

impl Outputs {
    /// The flag for a single channel index, or `None` if the index is out of range
    pub fn channel(index: u8) -> Option<Self> {
        if index >= CHANNEL_COUNT {
            return None;
        }
        Some(Self::from_bits_retain(1 << index))
    }

    /// The full command word enabling these outputs
    pub fn command(self) -> u16 {
        output_enable(self)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Outputs {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Outputs({=u8:#b})", self.bits())
    }
}

/// Returns true if `channel` and `value` are both in range for a register write
pub(crate) fn is_valid(channel: u8, value: u16) -> bool {
    channel < CHANNEL_COUNT && value <= MAX_VALUE
}

/// Encode a write to the register of `channel`. The output is left untouched.
///
/// The channel selector shares the top nibble with the write tag. Out of range inputs are masked,
/// not rejected; the driver validates before it gets here.
pub fn register_write(channel: u8, value: u16) -> u16 {
    Mode::WriteRegister as u16
        | ((channel as u16 & CHANNEL_MASK) << CHANNEL_SHIFT)
        | (value & VALUE_MASK)
}

/// Encode an update-selected command for `outputs`
pub fn output_enable(outputs: Outputs) -> u16 {
    Mode::UpdateSelected as u16 | outputs.bits() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_write_layout() {
        for channel in 0..CHANNEL_COUNT {
            for value in [0, 1, 0x0555, 0x0AAA, 2048, MAX_VALUE] {
                assert_eq!(
                    register_write(channel, value),
                    0x8000 | (channel as u16) << 12 | value
                );
            }
        }
    }

    #[test]
    fn register_write_known_words() {
        assert_eq!(register_write(0, 4095), 0x8FFF);
        assert_eq!(register_write(7, 2048), 0xF800);
        assert_eq!(register_write(3, 0), 0xB000);
    }

    #[test]
    fn register_write_masks_out_of_range_inputs() {
        // channel 8 folds onto channel 0, value bits above 11 are dropped
        assert_eq!(register_write(8, 0x1001), 0x8001);
    }

    #[test]
    fn validation_bounds() {
        assert!(is_valid(0, 0));
        assert!(is_valid(7, MAX_VALUE));
        assert!(!is_valid(8, 0));
        assert!(!is_valid(0, 4096));
        assert!(!is_valid(u8::MAX, u16::MAX));
    }

    #[test]
    fn enable_flags_match_outputs() {
        let raw = [
            CH_A_EN, CH_B_EN, CH_C_EN, CH_D_EN, CH_E_EN, CH_F_EN, CH_G_EN, CH_H_EN,
        ];
        for (index, flag) in raw.iter().enumerate() {
            let outputs = Outputs::channel(index as u8).unwrap();
            assert_eq!(outputs.bits() as u16, *flag);
            assert_eq!(outputs.command(), UPDATE_SELECTED | flag);
        }
        assert_eq!(Outputs::channel(CHANNEL_COUNT), None);
    }

    #[test]
    fn output_enable_combines_channels() {
        let outputs = Outputs::A | Outputs::B | Outputs::C;
        assert_eq!(output_enable(outputs), 0xA007);
        assert_eq!(output_enable(Outputs::all()), 0xA0FF);
        assert_eq!(output_enable(Outputs::empty()), UPDATE_SELECTED);
    }
}
