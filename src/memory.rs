//! A cache-line-aligned block-list arena. One `MemoryPool` is created per
//! worker thread per tile and used to hold the BSDFs/BxDFs built while
//! shading that tile's pixels; `reset()` is called between samples so the
//! pool's blocks are reused rather than freed and reallocated.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::RefCell;

const CACHE_LINE: usize = 64;
const DEFAULT_BLOCK_SIZE: usize = 256 * 1024;

struct Block {
    ptr: *mut u8,
    size: usize,
}

impl Block {
    fn new(size: usize) -> Self {
        let layout = Layout::from_size_align(size, CACHE_LINE).expect("invalid block layout");
        let ptr = unsafe { alloc(layout) };
        assert!(!ptr.is_null(), "MemoryPool block allocation failed");
        Block { ptr, size }
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        let layout = Layout::from_size_align(self.size, CACHE_LINE).expect("invalid block layout");
        unsafe { dealloc(self.ptr, layout) };
    }
}

struct Inner {
    block_size: usize,
    current: Option<Block>,
    current_offset: usize,
    total_alloc_size: usize,
    free_blocks: Vec<Block>,
    used_blocks: Vec<Block>,
}

impl Inner {
    fn stash_current(&mut self) {
        if let Some(block) = self.current.take() {
            self.used_blocks.push(block);
        }
    }
}

pub struct MemoryPool {
    inner: RefCell<Inner>,
}

impl MemoryPool {
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> Self {
        MemoryPool {
            inner: RefCell::new(Inner {
                block_size,
                current: None,
                current_offset: 0,
                total_alloc_size: 0,
                free_blocks: Vec::new(),
                used_blocks: Vec::new(),
            }),
        }
    }

    /// Total bytes currently held by the pool (across all blocks, used or free).
    pub fn size(&self) -> usize {
        self.inner.borrow().total_alloc_size
    }

    fn alloc_bytes(&self, byte_count: usize) -> *mut u8 {
        let aligned = (byte_count + CACHE_LINE - 1) & !(CACHE_LINE - 1);
        let mut inner = self.inner.borrow_mut();

        let has_room = inner
            .current
            .as_ref()
            .map_or(false, |b| inner.current_offset + aligned <= b.size);

        if !has_room {
            inner.stash_current();

            let reused_idx = inner.free_blocks.iter().position(|b| b.size >= aligned);
            let block = if let Some(idx) = reused_idx {
                inner.free_blocks.remove(idx)
            } else {
                let size = aligned.max(inner.block_size);
                inner.total_alloc_size += size;
                Block::new(size)
            };
            inner.current = Some(block);
            inner.current_offset = 0;
        }

        let offset = inner.current_offset;
        inner.current_offset += aligned;
        unsafe { inner.current.as_ref().unwrap().ptr.add(offset) }
    }

    /// Allocate one `T`, moving `value` into pool-owned storage.
    pub fn alloc_one<'a, T>(&'a self, value: T) -> &'a mut T {
        let ptr = self.alloc_bytes(std::mem::size_of::<T>()) as *mut T;
        unsafe {
            ptr.write(value);
            &mut *ptr
        }
    }

    /// Allocate `n` default-initialized `T`s as one contiguous slice.
    pub fn alloc_slice<'a, T: Default>(&'a self, n: usize) -> &'a mut [T] {
        let ptr = self.alloc_bytes(n * std::mem::size_of::<T>()) as *mut T;
        unsafe {
            for i in 0..n {
                ptr.add(i).write(T::default());
            }
            std::slice::from_raw_parts_mut(ptr, n)
        }
    }

    /// Return all used blocks to the free list without releasing their
    /// memory. Requires `&mut self` so the borrow checker rejects any call
    /// site where an allocation handed out by `alloc_one`/`alloc_slice` is
    /// still reachable.
    pub fn reset(&mut self) {
        let inner = self.inner.get_mut();
        inner.current_offset = 0;
        inner.free_blocks.append(&mut inner.used_blocks);
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_one_roundtrips() {
        let pool = MemoryPool::new();
        let x = pool.alloc_one(42u32);
        assert_eq!(*x, 42);
        *x = 7;
        assert_eq!(*x, 7);
    }

    #[test]
    fn reset_reuses_block_capacity() {
        let mut pool = MemoryPool::with_block_size(4096);
        {
            let _a = pool.alloc_slice::<u8>(1024);
        }
        let size_before = pool.size();
        pool.reset();
        {
            let _b = pool.alloc_slice::<u8>(1024);
        }
        // reusing the freed block shouldn't grow total pool capacity
        assert_eq!(pool.size(), size_before);
    }

    #[test]
    fn many_small_allocs_span_blocks() {
        let mut pool = MemoryPool::with_block_size(64);
        for _ in 0..100 {
            let _ = pool.alloc_one(1u64);
        }
        assert!(pool.size() >= 64);
        pool.reset();
    }
}
