//! Scriptable panel shared by driver and controller tests.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    vec::Vec,
};

use super::{encode_reply, Resolution, FRAME_LEN};
use crate::platform::{ChipSelect, IrqOps, SpiOps};

const MODE_BIT: u8 = 1 << 3;

#[derive(Default)]
struct PanelState {
    readings: [u16; 8],
    fail: bool,
    commands: Vec<u8>,
}

#[derive(Clone, Default)]
pub(crate) struct FakePanel {
    state: Rc<RefCell<PanelState>>,
    line: Rc<Cell<bool>>,
}

impl FakePanel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn touch(&self, x: u16, y: u16, z1: u16, z2: u16) {
        let mut state = self.state.borrow_mut();
        state.readings[5] = x;
        state.readings[1] = y;
        state.readings[3] = z1;
        state.readings[4] = z2;
        self.line.set(true);
    }

    pub(crate) fn set_reading(&self, address: u8, value: u16) {
        self.state.borrow_mut().readings[usize::from(address & 0b111)] = value;
    }

    pub(crate) fn lift(&self) {
        self.line.set(false);
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.state.borrow_mut().fail = fail;
    }

    pub(crate) fn commands(&self) -> Vec<u8> {
        self.state.borrow().commands.clone()
    }

    pub(crate) fn exchanges(&self) -> usize {
        self.state.borrow().commands.len()
    }

    pub(crate) fn bus(&self) -> FakeBus {
        FakeBus {
            state: self.state.clone(),
        }
    }

    pub(crate) fn irq(&self) -> FakeIrq {
        FakeIrq {
            line: self.line.clone(),
        }
    }
}

pub(crate) struct FakeBus {
    state: Rc<RefCell<PanelState>>,
}

impl SpiOps for FakeBus {
    type Error = ();

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8], _cs: ChipSelect) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        let command = tx.first().copied().unwrap_or_default();
        state.commands.push(command);
        if state.fail {
            return Err(());
        }

        let resolution = if command & MODE_BIT != 0 {
            Resolution::Bits8
        } else {
            Resolution::Bits12
        };
        let value = state.readings[usize::from((command >> 4) & 0b111)];
        let reply: [u8; FRAME_LEN] = encode_reply(value, resolution);
        for (dst, src) in rx.iter_mut().zip(reply) {
            *dst = src;
        }
        Ok(())
    }
}

pub(crate) struct FakeIrq {
    line: Rc<Cell<bool>>,
}

impl IrqOps for FakeIrq {
    fn touch_asserted(&mut self) -> bool {
        self.line.get()
    }
}
