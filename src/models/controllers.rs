//! MIDI controller registry
//!
//! Control-change messages are validated against this table: controllers
//! 0-119 accept any 7-bit value, channel mode messages (120-127) only the
//! values the MIDI specification defines for them.

/// Name and accepted values of a controller number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controller {
    pub number: u8,
    pub name: &'static str,
    pub values: ControllerValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerValues {
    /// Any value in the inclusive range
    Range(u8, u8),
    /// Only the listed values
    OneOf(&'static [u8]),
}

impl ControllerValues {
    pub fn accepts(&self, value: i64) -> bool {
        match self {
            ControllerValues::Range(lo, hi) => (*lo as i64..=*hi as i64).contains(&value),
            ControllerValues::OneOf(allowed) => allowed.iter().any(|v| *v as i64 == value),
        }
    }
}

const FULL: ControllerValues = ControllerValues::Range(0, 127);

/// Look up a controller number; `None` when the number is not a controller
pub fn controller(number: i64) -> Option<Controller> {
    if !(0..=127).contains(&number) {
        return None;
    }
    let number = number as u8;
    let (name, values) = match number {
        0 => ("Bank Select", FULL),
        1 => ("Modulation Wheel", FULL),
        2 => ("Breath Controller", FULL),
        4 => ("Foot Controller", FULL),
        5 => ("Portamento Time", FULL),
        6 => ("Data Entry MSB", FULL),
        7 => ("Channel Volume", FULL),
        8 => ("Balance", FULL),
        10 => ("Pan", FULL),
        11 => ("Expression Controller", FULL),
        12 => ("Effect Control 1", FULL),
        13 => ("Effect Control 2", FULL),
        32..=63 => ("LSB for Controllers 0-31", FULL),
        64 => ("Damper Pedal (Sustain)", FULL),
        65 => ("Portamento On/Off", FULL),
        66 => ("Sostenuto", FULL),
        67 => ("Soft Pedal", FULL),
        68 => ("Legato Footswitch", FULL),
        69 => ("Hold 2", FULL),
        70..=79 => ("Sound Controller", FULL),
        84 => ("Portamento Control", FULL),
        91..=95 => ("Effects Depth", FULL),
        96 => ("Data Increment", ControllerValues::OneOf(&[0])),
        97 => ("Data Decrement", ControllerValues::OneOf(&[0])),
        98..=101 => ("Parameter Number", FULL),
        120 => ("All Sound Off", ControllerValues::OneOf(&[0])),
        121 => ("Reset All Controllers", ControllerValues::OneOf(&[0])),
        122 => ("Local Control", ControllerValues::OneOf(&[0, 127])),
        123 => ("All Notes Off", ControllerValues::OneOf(&[0])),
        124 => ("Omni Mode Off", ControllerValues::OneOf(&[0])),
        125 => ("Omni Mode On", ControllerValues::OneOf(&[0])),
        126 => ("Mono Mode On", ControllerValues::Range(0, 16)),
        127 => ("Poly Mode On", ControllerValues::OneOf(&[0])),
        _ => ("Undefined", FULL),
    };
    Some(Controller {
        number,
        name,
        values,
    })
}
