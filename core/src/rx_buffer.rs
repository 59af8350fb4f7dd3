//! Receive staging buffer for secure sockets
//!
//! The TLS record layer hands back at most one record's worth of plaintext per
//! call, and may hand back nothing at all without the session being closed.
//! [`RxBuffer`] stages those short reads in a fixed-size buffer so callers can
//! ask for any length, the way `BufReader` sits on top of a reader.
//!
//! # Failure model
//!
//! - Storage is allocated on the first fill. If that allocation fails the
//!   buffer is permanently unusable: [`RxBuffer::failed`] turns true and every
//!   later call returns [`RxError::AllocationFailed`].
//! - An empty receive, or an error code from the transport, is never sticky.
//!   It surfaces as a short count, `Ok(0)`, or [`RxError::WouldBlock`], and the
//!   owning connection decides whether to poll again.
//!
//! The TLS library reports "want read" and fatal errors through the same
//! negative return. Neither is escalated here; the last code is kept in
//! [`RxBuffer::last_receive_error`] for callers that want to tell them apart.

use alloc::boxed::Box;
use alloc::vec::Vec;

use rtw_hal::ssl::{SslError, SslRead};

use crate::error::RxError;

/// Staging buffer size used by the secure client
pub const DEFAULT_CAPACITY: usize = 1024;

/// Source of backing storage
pub trait BufferAlloc {
    /// Allocate `len` zeroed bytes, `None` when memory is exhausted
    fn allocate(&mut self, len: usize) -> Option<Box<[u8]>>;
}

/// Global allocator without the abort-on-OOM behaviour of `vec![0; len]`
#[derive(Debug, Clone, Copy, Default)]
pub struct Heap;

impl BufferAlloc for Heap {
    fn allocate(&mut self, len: usize) -> Option<Box<[u8]>> {
        let mut storage = Vec::new();
        storage.try_reserve_exact(len).ok()?;
        storage.resize(len, 0);
        Some(storage.into_boxed_slice())
    }
}

/// Buffered reader over a TLS session
///
/// Holds `pos <= fill <= capacity` at all times; `fill - pos` bytes are
/// buffered. `R` may be `&mut S` when the session is owned elsewhere.
pub struct RxBuffer<R, A = Heap> {
    inner: R,
    alloc: A,
    capacity: usize,
    storage: Option<Box<[u8]>>,
    pos: usize,
    fill: usize,
    failed: bool,
    last_error: Option<SslError>,
}

impl<R: SslRead> RxBuffer<R> {
    /// Buffer of [`DEFAULT_CAPACITY`] bytes over `inner`
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self::with_allocator(inner, capacity, Heap)
    }
}

impl<R: SslRead, A: BufferAlloc> RxBuffer<R, A> {
    /// Buffer whose storage comes from `alloc`
    ///
    /// Nothing is allocated until the first fill.
    pub fn with_allocator(inner: R, capacity: usize, alloc: A) -> Self {
        Self {
            inner,
            alloc,
            capacity,
            storage: None,
            pos: 0,
            fill: 0,
            failed: false,
            last_error: None,
        }
    }

    /// Issue at most one receive into the free tail of the buffer
    ///
    /// Returns the number of bytes added. `Ok(0)` covers a full buffer (the
    /// transport is not touched), an empty receive, and a transport error.
    pub fn fill(&mut self) -> Result<usize, RxError> {
        if self.failed {
            return Err(RxError::AllocationFailed);
        }
        if self.storage.is_none() {
            match self.alloc.allocate(self.capacity) {
                Some(storage) => {
                    self.capacity = storage.len();
                    self.storage = Some(storage);
                }
                None => {
                    error!(
                        "Not enough memory to allocate {} byte receive buffer",
                        self.capacity
                    );
                    self.failed = true;
                    return Err(RxError::AllocationFailed);
                }
            }
        }
        let Some(storage) = self.storage.as_deref_mut() else {
            return Err(RxError::AllocationFailed);
        };

        if self.fill != 0 && self.pos == self.fill {
            self.pos = 0;
            self.fill = 0;
        }
        if self.fill >= storage.len() {
            return Ok(0);
        }

        match self.inner.receive(&mut storage[self.fill..]) {
            Ok(n) => {
                // a transport reporting more than it was given must not move fill past capacity
                let n = n.min(storage.len() - self.fill);
                self.fill += n;
                Ok(n)
            }
            Err(e) => {
                debug!("receive returned {}", e.code());
                self.last_error = Some(e);
                Ok(0)
            }
        }
    }

    /// Read up to `dst.len()` bytes
    ///
    /// Keeps receiving until `dst` is full or a fill yields nothing, so the
    /// count may be short under transport starvation. The returned count is
    /// authoritative; a short count is not an error.
    ///
    /// # Errors
    ///
    /// - [`RxError::ZeroLength`] for an empty `dst`
    /// - [`RxError::WouldBlock`] when nothing is buffered and the transport
    ///   produced nothing
    /// - [`RxError::AllocationFailed`] once the buffer has failed
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, RxError> {
        if dst.is_empty() {
            return Err(RxError::ZeroLength);
        }
        if self.pos == self.fill && self.fill()? == 0 {
            return Err(RxError::WouldBlock);
        }

        let len = dst.len();
        let available = self.fill - self.pos;
        if len > available && len - available <= self.capacity - self.fill {
            // the shortfall fits behind the unread bytes; one receive may cover it
            self.fill()?;
        }

        let mut copied = self.take(dst);
        while copied < len {
            if self.fill()? == 0 {
                break;
            }
            copied += self.take(&mut dst[copied..]);
        }
        Ok(copied)
    }

    /// Next byte without consuming it
    pub fn peek(&mut self) -> Result<u8, RxError> {
        if self.pos == self.fill && self.fill()? == 0 {
            return Err(RxError::WouldBlock);
        }
        self.storage
            .as_deref()
            .and_then(|storage| storage.get(self.pos).copied())
            .ok_or(RxError::WouldBlock)
    }

    /// Buffered byte count, attempting one fill when nothing is buffered
    pub fn available(&mut self) -> Result<usize, RxError> {
        if self.fill > self.pos {
            Ok(self.fill - self.pos)
        } else {
            self.fill()
        }
    }

    /// Storage allocation failed; never cleared
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Buffered byte count without touching the transport
    pub fn buffered(&self) -> usize {
        self.fill - self.pos
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Code of the most recent failed receive
    pub fn last_receive_error(&self) -> Option<SslError> {
        self.last_error
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutable access to the transport
    ///
    /// Reading from it directly bypasses the buffered bytes.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap the transport, discarding buffered bytes
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn take(&mut self, dst: &mut [u8]) -> usize {
        let Some(storage) = self.storage.as_deref() else {
            return 0;
        };
        let n = dst.len().min(self.fill - self.pos);
        dst[..n].copy_from_slice(&storage[self.pos..self.pos + n]);
        self.pos += n;
        n
    }
}
