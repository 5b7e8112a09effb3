//! Host pads to the Vectrex controller lines.
//!
//! Both controllers share PSG port A: four active-low buttons each, port 0 in
//! the low nibble. Each stick is a pair of 8-bit pots. A host without an
//! analog stick gets digital steering: a centered axis takes full deflection
//! from the d-pad.

use crate::host::{AnalogAxis, Host, InputDescriptor, JoypadButton};
use crate::machine::ControllerState;

/// Number of controller ports
pub const PORTS: usize = 2;

/// Pad button to its bit within a port's nibble
pub fn button_to_bit(button: JoypadButton) -> Option<u8> {
    match button {
        JoypadButton::A => Some(0),
        JoypadButton::B => Some(1),
        JoypadButton::X => Some(2),
        JoypadButton::Y => Some(3),
        _ => None, // d-pad drives the sticks
    }
}

const FACE_BUTTONS: [JoypadButton; 4] = [
    JoypadButton::A,
    JoypadButton::B,
    JoypadButton::X,
    JoypadButton::Y,
];

const fn descriptor(
    port: usize,
    button: JoypadButton,
    description: &'static str,
) -> InputDescriptor {
    InputDescriptor {
        port,
        button,
        description,
    }
}

const fn descriptors_for(port: usize) -> [InputDescriptor; 8] {
    [
        descriptor(port, JoypadButton::Left, "Left"),
        descriptor(port, JoypadButton::Up, "Up"),
        descriptor(port, JoypadButton::Down, "Down"),
        descriptor(port, JoypadButton::Right, "Right"),
        descriptor(port, JoypadButton::B, "2"),
        descriptor(port, JoypadButton::A, "1"),
        descriptor(port, JoypadButton::X, "3"),
        descriptor(port, JoypadButton::Y, "4"),
    ]
}

const PORT0_DESCRIPTORS: [InputDescriptor; 8] = descriptors_for(0);
const PORT1_DESCRIPTORS: [InputDescriptor; 8] = descriptors_for(1);

/// Labels for every mapped button, both ports.
pub fn input_descriptors() -> Vec<InputDescriptor> {
    PORT0_DESCRIPTORS
        .iter()
        .chain(PORT1_DESCRIPTORS.iter())
        .copied()
        .collect()
}

/// Host stick reading to a pot value.
#[inline]
pub fn analog_to_pot(value: i16) -> u8 {
    (value as i32 / 256 + 128) as u8
}

/// Pot value for one axis: the stick if it is off center, else the d-pad.
fn axis_value<H: Host + ?Sized>(host: &H, port: usize, axis: AnalogAxis) -> u8 {
    let pot = analog_to_pot(host.analog_axis(port, axis));
    if pot != ControllerState::ANALOG_CENTER {
        return pot;
    }
    let pressed = |button| host.joypad_pressed(port, button);
    match axis {
        // Left wins over Right.
        AnalogAxis::X if pressed(JoypadButton::Left) => 0x00,
        AnalogAxis::X if pressed(JoypadButton::Right) => 0xFF,
        // Up wins over Down.
        AnalogAxis::Y if pressed(JoypadButton::Up) => 0xFF,
        AnalogAxis::Y if pressed(JoypadButton::Down) => 0x00,
        _ => pot,
    }
}

/// Sample both pads from `host` into `state`.
pub fn update_controller<H: Host + ?Sized>(host: &H, state: &mut ControllerState) {
    let mut buttons = 0xFFu8;
    for port in 0..PORTS {
        for button in FACE_BUTTONS {
            if !host.joypad_pressed(port, button) {
                continue;
            }
            if let Some(bit) = button_to_bit(button) {
                buttons &= !(1 << (bit as usize + port * 4));
            }
        }
        state.analog[port] = [
            axis_value(host, port, AnalogAxis::X),
            axis_value(host, port, AnalogAxis::Y),
        ];
    }
    state.buttons = buttons;
}
