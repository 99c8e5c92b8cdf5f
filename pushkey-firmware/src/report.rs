//! Keyboard input report as sent over the interrupt IN endpoint.

/// Report id of the keyboard profile; ids start at 1, 0 is reserved.
pub const REPORT_ID_KEYBOARD: u8 = 1;

/// One past the last report id in use. The report chain stops here.
pub const REPORT_ID_COUNT: u8 = 2;

/// Report id prefix plus the 8-byte boot-compatible layout.
pub const KEYBOARD_REPORT_LEN: usize = 9;

/// Usage id of the Enter key on the Keyboard/Keypad page.
pub const KEY_ENTER: u8 = 0x28;

/// Boot-compatible keyboard report: modifier bitfield, reserved byte and up
/// to six concurrently held key usage ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// All keys released.
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            keycodes: [0; 6],
        }
    }

    /// A single key held in the first slot, no modifiers.
    pub const fn key(keycode: u8) -> Self {
        Self {
            modifiers: 0,
            keycodes: [keycode, 0, 0, 0, 0, 0],
        }
    }

    /// Wire format for the interrupt endpoint, report id first.
    pub fn serialize(&self) -> [u8; KEYBOARD_REPORT_LEN] {
        let k = &self.keycodes;
        [
            REPORT_ID_KEYBOARD,
            self.modifiers,
            0, // reserved
            k[0],
            k[1],
            k[2],
            k[3],
            k[4],
            k[5],
        ]
    }
}
