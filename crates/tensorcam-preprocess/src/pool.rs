//! Fixed‑capacity pool of tensor buffers for per‑frame reuse.

use crate::encode::TensorBuffer;

pub struct TensorPool {
    width: u32,
    height: u32,
    capacity: usize,
    free: Vec<TensorBuffer>,
}

impl TensorPool {
    /// Pool of at most `capacity` idle buffers sized for `width`x`height`.
    pub fn new(width: u32, height: u32, capacity: usize) -> Self {
        Self {
            width,
            height,
            capacity,
            free: Vec::with_capacity(capacity),
        }
    }

    /// Pooled buffer if one is idle, otherwise a fresh one.
    pub fn acquire(&mut self) -> TensorBuffer {
        self.free
            .pop()
            .unwrap_or_else(|| TensorBuffer::with_capacity(self.width, self.height))
    }

    /// Hand a buffer back. Dropped if the pool is already full.
    pub fn release(&mut self, buf: TensorBuffer) {
        if self.free.len() < self.capacity {
            self.free.push(buf);
        }
    }

    pub fn idle(&self) -> usize {
        self.free.len()
    }
}
