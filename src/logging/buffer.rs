//! Bounded in-memory history of recent log lines.
//!
//! Each named program keeps the last N formatted log lines in a fixed-size
//! ring so status views can show recent history without touching the log
//! file. The ring is volatile and lossy by design; the JSONL file written by
//! [`super::writer::ProgramLogWriter`] is the durable copy.

use parking_lot::RwLock;

use crate::error::{CommonError, CommonResult};

/// A `(write_pos, wrapped)` snapshot of the ring cursor.
///
/// Obtained from [`LogBuffer::position`] and handed back to
/// [`LogBuffer::read_since`] to fetch only the lines appended in between.
/// `write_pos` is the index of the *next* slot to be overwritten; once the
/// cursor has wrapped past the end at least once, `wrapped` stays true for
/// the life of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPosition {
    pub write_pos: usize,
    pub wrapped: bool,
}

impl BufferPosition {
    /// Baseline for "everything from the beginning".
    pub const START: BufferPosition = BufferPosition {
        write_pos: 0,
        wrapped: false,
    };
}

#[derive(Debug)]
struct RingState {
    slots: Vec<Vec<u8>>,
    write_pos: usize,
    wrapped: bool,
}

impl RingState {
    fn position(&self) -> BufferPosition {
        BufferPosition {
            write_pos: self.write_pos,
            wrapped: self.wrapped,
        }
    }

    /// All retained entries, oldest first.
    fn copy_all(&self) -> Vec<Vec<u8>> {
        if !self.wrapped {
            // Slots past the cursor have never been written.
            return self.slots[..self.write_pos].to_vec();
        }
        // The oldest surviving entry sits at the cursor itself.
        self.copy_wrapping(self.write_pos, self.write_pos)
    }

    /// Entries from `from` to the end of the ring, then from the start up to
    /// (excluding) `to`.
    fn copy_wrapping(&self, from: usize, to: usize) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(self.slots.len() - from + to);
        out.extend_from_slice(&self.slots[from..]);
        out.extend_from_slice(&self.slots[..to]);
        out
    }
}

/// Fixed-capacity ring of the most recent log lines for one program.
///
/// Thread-safe: appends take the exclusive side of an internal lock, reads
/// take the shared side, and every operation copies out so nothing borrows
/// the ring after the lock is released. No I/O happens under the lock.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    state: RwLock<RingState>,
}

impl LogBuffer {
    /// Create a buffer retaining at most `capacity` lines.
    ///
    /// A zero capacity is a misconfiguration and is rejected rather than
    /// silently defaulted.
    pub fn new(capacity: usize) -> CommonResult<Self> {
        if capacity == 0 {
            return Err(CommonError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            state: RwLock::new(RingState {
                slots: vec![Vec::new(); capacity],
                write_pos: 0,
                wrapped: false,
            }),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines currently retained.
    pub fn len(&self) -> usize {
        let state = self.state.read();
        if state.wrapped {
            self.capacity
        } else {
            state.write_pos
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one formatted line, evicting the oldest once full.
    ///
    /// The line is copied; callers may reuse their own buffers across calls.
    pub fn append(&self, line: &[u8]) {
        let mut state = self.state.write();
        let pos = state.write_pos;
        state.slots[pos] = line.to_vec();
        state.write_pos = (pos + 1) % self.capacity;
        if state.write_pos == 0 {
            state.wrapped = true;
        }
    }

    /// All retained lines, oldest to newest.
    pub fn read_all(&self) -> Vec<Vec<u8>> {
        self.state.read().copy_all()
    }

    /// The current cursor snapshot, for later use with [`read_since`].
    ///
    /// Taken under the shared lock so the pair can never be torn by a
    /// concurrent append.
    ///
    /// [`read_since`]: LogBuffer::read_since
    pub fn position(&self) -> BufferPosition {
        self.state.read().position()
    }

    /// Lines appended since `last` was observed, oldest to newest.
    ///
    /// Not auto-advancing: repeated calls with the same baseline and no
    /// intervening appends return the same result. If more than a full
    /// capacity of lines landed between observations, the overwritten ones
    /// are gone; the caller gets the surviving window. That loss is inherent
    /// to a bounded history, not an error.
    pub fn read_since(&self, last: BufferPosition) -> Vec<Vec<u8>> {
        let state = self.state.read();
        let current = state.position();

        // Cursor unchanged: nothing new (or an exact multiple of capacity
        // was appended, in which case everything in between is already lost).
        if current == last {
            return Vec::new();
        }

        match (last.wrapped, current.wrapped) {
            // Never wrapped: the cursor only moves forward.
            (false, false) => {
                if current.write_pos > last.write_pos {
                    state.slots[last.write_pos..current.write_pos].to_vec()
                } else {
                    Vec::new()
                }
            }
            // Wrapped between observations.
            (false, true) => state.copy_wrapping(last.write_pos, current.write_pos),
            (true, true) => {
                if current.write_pos > last.write_pos {
                    state.slots[last.write_pos..current.write_pos].to_vec()
                } else {
                    // At least one further wrap happened in between.
                    state.copy_wrapping(last.write_pos, current.write_pos)
                }
            }
            // The wrapped flag never resets while a buffer is alive, so this
            // snapshot cannot have come from this buffer. Degrade to the full
            // history rather than guessing at a delta.
            (true, false) => {
                let all = state.copy_all();
                drop(state);
                eprintln!(
                    "log buffer snapshot claims a wrap that never happened; returning full history"
                );
                all
            }
        }
    }
}
