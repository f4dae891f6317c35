//! A single-slot, blocking pipeline register with notifier support
//! (spec §4.4).

use crate::error::CoreError;
use crate::stage::HandlerId;

/// Capacity-1 typed channel between two pipeline stages.
///
/// At any instant it is either empty or holds exactly one element. The
/// reader side exposes a mutable [`peek`](Self::peek) so operand-gather
/// responses can be merged into an in-flight instruction without being
/// popped and re-pushed (spec §9's "mutable peek on the executor buffer"
/// design note).
#[derive(Debug, Default)]
pub struct StageBuffer<T> {
    slot: Option<T>,
    writable_waiters: Vec<HandlerId>,
    readable_waiters: Vec<HandlerId>,
}

impl<T> StageBuffer<T> {
    pub fn new() -> Self {
        Self { slot: None, writable_waiters: Vec::new(), readable_waiters: Vec::new() }
    }

    pub fn write_valid(&self) -> bool {
        self.slot.is_none()
    }

    pub fn read_valid(&self) -> bool {
        self.slot.is_some()
    }

    pub fn write(&mut self, value: T) -> Result<(), CoreError> {
        if !self.write_valid() {
            return Err(CoreError::StageBufferContract("write to a full stage buffer"));
        }
        self.slot = Some(value);
        Ok(())
    }

    pub fn peek(&mut self) -> Result<&mut T, CoreError> {
        self.slot
            .as_mut()
            .ok_or(CoreError::StageBufferContract("peek on an empty stage buffer"))
    }

    pub fn read(&mut self) -> Result<T, CoreError> {
        self.slot
            .take()
            .ok_or(CoreError::StageBufferContract("read from an empty stage buffer"))
    }

    /// Arm `handler` to be scheduled the next time `write_valid()` holds.
    pub fn notify_on_writable(&mut self, handler: HandlerId) {
        self.writable_waiters.push(handler);
    }

    /// Arm `handler` to be scheduled the next time `read_valid()` holds.
    pub fn notify_on_readable(&mut self, handler: HandlerId) {
        self.readable_waiters.push(handler);
    }

    /// Pop every waiter whose predicate currently holds. Each is returned
    /// (and so fires) at most once per arm, per spec §4.4.
    pub fn drain_ready_waiters(&mut self) -> Vec<HandlerId> {
        let mut ready = Vec::new();
        if self.write_valid() && !self.writable_waiters.is_empty() {
            ready.append(&mut self.writable_waiters);
        }
        if self.read_valid() && !self.readable_waiters.is_empty() {
            ready.append(&mut self.readable_waiters);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut buf: StageBuffer<u32> = StageBuffer::new();
        assert!(buf.write_valid());
        buf.write(7).unwrap();
        assert!(!buf.write_valid());
        assert!(buf.read_valid());
        assert_eq!(buf.read().unwrap(), 7);
        assert!(buf.slot.is_none());
    }

    #[test]
    fn write_to_full_buffer_is_a_contract_violation() {
        let mut buf: StageBuffer<u32> = StageBuffer::new();
        buf.write(1).unwrap();
        assert!(matches!(buf.write(2), Err(CoreError::StageBufferContract(_))));
    }

    #[test]
    fn read_from_empty_buffer_is_a_contract_violation() {
        let mut buf: StageBuffer<u32> = StageBuffer::new();
        assert!(matches!(buf.read(), Err(CoreError::StageBufferContract(_))));
    }

    #[test]
    fn peek_allows_in_place_mutation_without_reenqueueing() {
        let mut buf: StageBuffer<Vec<u32>> = StageBuffer::new();
        buf.write(vec![1, 2]).unwrap();
        buf.peek().unwrap().push(3);
        assert_eq!(buf.read().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn writable_waiter_fires_once_when_slot_frees() {
        let mut buf: StageBuffer<u32> = StageBuffer::new();
        buf.write(1).unwrap();
        buf.notify_on_writable(HandlerId::FetchEmit);
        assert!(buf.drain_ready_waiters().is_empty());
        buf.read().unwrap();
        assert_eq!(buf.drain_ready_waiters(), vec![HandlerId::FetchEmit]);
        assert!(buf.drain_ready_waiters().is_empty());
    }
}
