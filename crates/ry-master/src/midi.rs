//! MIDI input service.
//!
//! Device code holds a [`MidiInput`] and pushes raw MIDI 1.0 messages into
//! it from any thread; the controller drains parsed events on its own
//! thread. The service is created and torn down explicitly by its owner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ControlChange { controller: u8, value: u8 },
}

impl MidiEvent {
    /// Parse one channel voice message. The channel is ignored; messages
    /// other than note on/off and control change yield `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let &[a, b] = data.get(..2)? else { return None };
        if status & 0x80 == 0 || a & 0x80 != 0 || b & 0x80 != 0 {
            return None;
        }
        match status & 0xF0 {
            NOTE_ON if b == 0 => Some(MidiEvent::NoteOff { note: a }),
            NOTE_ON => Some(MidiEvent::NoteOn { note: a, velocity: b }),
            NOTE_OFF => Some(MidiEvent::NoteOff { note: a }),
            CONTROL_CHANGE => Some(MidiEvent::ControlChange { controller: a, value: b }),
            _ => None,
        }
    }
}

/// Sending half handed to device code.
#[derive(Clone, Debug)]
pub struct MidiInput {
    tx: Sender<MidiEvent>,
    active: Arc<AtomicBool>,
}

impl MidiInput {
    /// Parse and forward a raw message. Returns false if the message was
    /// not understood or the service has been torn down.
    pub fn send_raw(&self, bytes: &[u8]) -> bool {
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        match MidiEvent::parse(bytes) {
            Some(event) => self.tx.send(event).is_ok(),
            None => {
                log::trace!(target: "midi", "ignored message {bytes:02x?}");
                false
            }
        }
    }
}

#[derive(Debug)]
pub struct MidiService {
    tx: Sender<MidiEvent>,
    rx: Receiver<MidiEvent>,
    active: Arc<AtomicBool>,
}

impl MidiService {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx, active: Arc::new(AtomicBool::new(false)) }
    }

    /// Start accepting input and return a handle for device code.
    pub fn init(&mut self) -> MidiInput {
        if !self.active.swap(true, Ordering::AcqRel) {
            log::info!(target: "midi", "MIDI input enabled");
        }
        MidiInput { tx: self.tx.clone(), active: self.active.clone() }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop accepting input and discard anything not yet polled.
    pub fn teardown(&mut self) {
        if self.active.swap(false, Ordering::AcqRel) {
            log::info!(target: "midi", "MIDI input disabled");
        }
        self.rx.try_iter().for_each(drop);
    }

    /// Events received since the last poll.
    pub fn poll(&self) -> impl Iterator<Item = MidiEvent> + '_ {
        self.rx.try_iter()
    }
}

impl Default for MidiService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MidiService {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_voice_messages_on_any_channel() {
        assert_eq!(MidiEvent::parse(&[0x93, 60, 100]), Some(MidiEvent::NoteOn { note: 60, velocity: 100 }));
        assert_eq!(MidiEvent::parse(&[0x80, 60, 0]), Some(MidiEvent::NoteOff { note: 60 }));
        assert_eq!(
            MidiEvent::parse(&[0xBF, 74, 127]),
            Some(MidiEvent::ControlChange { controller: 74, value: 127 })
        );
    }

    #[test]
    fn note_on_with_zero_velocity_is_note_off() {
        assert_eq!(MidiEvent::parse(&[0x90, 48, 0]), Some(MidiEvent::NoteOff { note: 48 }));
    }

    #[test]
    fn rejects_truncated_and_unsupported_messages() {
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0xE0, 0, 64]), None);
        assert_eq!(MidiEvent::parse(&[0x40, 60, 100]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 0x80, 100]), None);
    }

    #[test]
    fn input_only_flows_while_initialised() {
        let mut service = MidiService::new();
        let input = service.init();
        assert!(input.send_raw(&[0x90, 60, 90]));
        assert_eq!(service.poll().count(), 1);

        service.teardown();
        assert!(!input.send_raw(&[0x90, 60, 90]));
        assert_eq!(service.poll().count(), 0);
    }
}
