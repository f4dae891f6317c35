//! Memory request/response wire records (spec §6) and a minimal concrete
//! store to run programs against.
//!
//! The memory subsystem proper is an external collaborator per spec §1; the
//! [`LinearMemory`] here is the smallest faithful stand-in needed to
//! actually execute a program end to end — no caching, no alignment
//! faults, no protection (spec's Non-goals exclude caches and privileged
//! modes).

use soc_types::{Address, Word};

/// Read or write, per spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRequestKind {
    Read,
    Write,
}

/// A request has not yet been handed to the memory model (`Pending`), or
/// has (`Sent`) — `fetcher_drain` flips this the moment it forwards a
/// request outward (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRequestStatus {
    Pending,
    Sent,
}

/// A memory request record, carried over a [`crate::port::Port`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRequest {
    pub kind: MemoryRequestKind,
    pub address: Address,
    pub size: u32,
    pub data: Vec<Word>,
    pub status: MemoryRequestStatus,
}

impl MemoryRequest {
    pub fn read(address: Address, size: u32) -> Self {
        Self {
            kind: MemoryRequestKind::Read,
            address,
            size,
            data: Vec::new(),
            status: MemoryRequestStatus::Pending,
        }
    }

    pub fn write(address: Address, data: Vec<Word>) -> Self {
        let size = data.len() as u32;
        Self { kind: MemoryRequestKind::Write, address, size, data, status: MemoryRequestStatus::Pending }
    }
}

/// The reply to a [`MemoryRequest`]: the original request plus, for reads,
/// `size` words of data (one word, for every read this processor issues).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryResponse {
    pub request: MemoryRequest,
    pub data: Vec<Word>,
}

/// The minimal interface a memory model must provide to be driven by a
/// processor's scheduler loop.
pub trait MemoryModel {
    fn service(&mut self, request: MemoryRequest) -> MemoryResponse;
}

/// A flat, word-addressed store. Out-of-range reads return `0`; out-of-range
/// writes grow the store — there is no notion of a fixed address space or
/// access faults here (spec's Non-goals exclude realistic memory
/// protection).
#[derive(Debug, Clone, Default)]
pub struct LinearMemory {
    words: Vec<Word>,
}

impl LinearMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn read_word(&self, address: Address) -> Word {
        self.words.get(address as usize).copied().unwrap_or(0)
    }

    pub fn write_word(&mut self, address: Address, value: Word) {
        let index = address as usize;
        if index >= self.words.len() {
            self.words.resize(index + 1, 0);
        }
        self.words[index] = value;
    }

    pub fn read(&self, address: Address, size: u32) -> Vec<Word> {
        (0..size as u64).map(|offset| self.read_word(address + offset)).collect()
    }

    pub fn write(&mut self, address: Address, data: &[Word]) {
        for (offset, value) in data.iter().enumerate() {
            self.write_word(address + offset as u64, *value);
        }
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }
}

impl MemoryModel for LinearMemory {
    fn service(&mut self, request: MemoryRequest) -> MemoryResponse {
        let data = match request.kind {
            MemoryRequestKind::Read => self.read(request.address, request.size.max(1)),
            MemoryRequestKind::Write => {
                self.write(request.address, &request.data);
                Vec::new()
            }
        };
        MemoryResponse { request, data }
    }
}
