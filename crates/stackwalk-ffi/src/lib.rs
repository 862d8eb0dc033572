//! C ABI for the stackwalk enumerator.
//!
//! A host process hands over its integer-encoded package universe and an
//! open file descriptor, then drives the walker with [`stackwalk_walk`] or
//! [`stackwalk_walk_all`] while reading the stack stream from the other
//! end of the descriptor (typically a pipe). The input layout follows the
//! array-of-rows convention of ctypes-style callers: `edges` is an array
//! of pointers to two-element `(from, to)` rows.
//!
//! ```c
//! void *walker = stackwalk_new(direct, direct_len, edges, edges_len,
//!                              types, size, write_fd);
//! while (stackwalk_walk(walker))
//!     ;
//! stackwalk_free(walker);
//! ```
//!
//! [`stackwalk_item_size`], [`stackwalk_stream_delimiter`] and
//! [`stackwalk_stream_stop`] describe the wire format so the reader on the
//! other side of the descriptor can decode it without sharing headers.

use std::fs::File;
use std::io::{self, Write};
use std::mem::ManuallyDrop;
use std::os::raw::c_int;
use std::os::unix::io::FromRawFd;
use std::slice;

use log::error;

use stackwalk::{
    DependencyGraph, PackageId, StackWalker, TypeId, ITEM_SIZE, STREAM_DELIMITER, STREAM_STOP,
};

/// A writable file descriptor borrowed from the host.
///
/// Dropping the sink leaves the descriptor open; closing it is the host's
/// responsibility.
struct FdSink {
    file: ManuallyDrop<File>,
}

impl FdSink {
    /// # Safety
    /// `fd` must be an open, writable descriptor that outlives the sink.
    unsafe fn new(fd: c_int) -> Self {
        Self {
            file: ManuallyDrop::new(File::from_raw_fd(fd)),
        }
    }
}

impl Write for FdSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.file).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.file).flush()
    }
}

/// Opaque walker handle passed back and forth across the boundary.
pub struct WalkerHandle {
    walker: StackWalker<FdSink>,
}

/// Size in bytes of one stream word.
#[no_mangle]
pub extern "C" fn stackwalk_item_size() -> usize {
    ITEM_SIZE
}

/// The in-band word separating one stack from the next.
#[no_mangle]
pub extern "C" fn stackwalk_stream_delimiter() -> PackageId {
    STREAM_DELIMITER
}

/// The in-band word closing the stream.
#[no_mangle]
pub extern "C" fn stackwalk_stream_stop() -> PackageId {
    STREAM_STOP
}

/// Construct a walker.
///
/// `direct` points at `direct_len` package ids, `edges` at `edges_len`
/// pointers to `(from, to)` rows of two ids each, and `types` at `size`
/// type ids, one per package. Stacks are streamed to `write_fd`.
///
/// Returns null when the inputs violate the construction contract (no
/// direct dependencies, ids out of range, universe too large, null
/// pointers, negative descriptor); the cause is logged.
///
/// # Safety
/// The pointers must be valid for the stated lengths and `write_fd` must
/// be an open, writable descriptor that stays open for the walker's
/// lifetime.
#[no_mangle]
pub unsafe extern "C" fn stackwalk_new(
    direct: *const PackageId,
    direct_len: usize,
    edges: *const *const PackageId,
    edges_len: usize,
    types: *const TypeId,
    size: usize,
    write_fd: c_int,
) -> *mut WalkerHandle {
    if direct.is_null() || types.is_null() || (edges_len > 0 && edges.is_null()) || write_fd < 0 {
        error!("refusing to build a walker from null inputs or an invalid descriptor");
        return std::ptr::null_mut();
    }

    let direct = slice::from_raw_parts(direct, direct_len).to_vec();
    let types = slice::from_raw_parts(types, size).to_vec();

    let mut edge_pairs = Vec::with_capacity(edges_len);
    if edges_len > 0 {
        for &row in slice::from_raw_parts(edges, edges_len) {
            if row.is_null() {
                error!("refusing to build a walker from a null edge row");
                return std::ptr::null_mut();
            }
            let pair = slice::from_raw_parts(row, 2);
            edge_pairs.push((pair[0], pair[1]));
        }
    }

    let graph = match DependencyGraph::new(direct, &edge_pairs, types) {
        Ok(graph) => graph,
        Err(err) => {
            error!("failed to build dependency graph: {err}");
            return std::ptr::null_mut();
        }
    };

    let sink = FdSink::new(write_fd);
    Box::into_raw(Box::new(WalkerHandle {
        walker: StackWalker::new(graph, sink),
    }))
}

/// Produce at most one more stack.
///
/// Returns `false` once the stream has ended. A sink write failure also
/// ends the run: the error is logged, the stream stays truncated without a
/// stop marker, and every later call returns `false`.
///
/// # Safety
/// `handle` must be null or a pointer returned by [`stackwalk_new`] that
/// has not been freed.
#[no_mangle]
pub unsafe extern "C" fn stackwalk_walk(handle: *mut WalkerHandle) -> bool {
    let Some(handle) = handle.as_mut() else {
        return false;
    };
    match handle.walker.step() {
        Ok(more) => more,
        Err(err) => {
            error!("stack stream aborted: {err}");
            false
        }
    }
}

/// Produce every remaining stack.
///
/// # Safety
/// `handle` must be null or a pointer returned by [`stackwalk_new`] that
/// has not been freed.
#[no_mangle]
pub unsafe extern "C" fn stackwalk_walk_all(handle: *mut WalkerHandle) {
    let Some(handle) = handle.as_mut() else {
        return;
    };
    if let Err(err) = handle.walker.drain() {
        error!("stack stream aborted: {err}");
    }
}

/// Destroy a walker and every state still on its frontier. The output
/// descriptor is left open.
///
/// # Safety
/// `handle` must be null or a pointer returned by [`stackwalk_new`] that
/// has not already been freed.
#[no_mangle]
pub unsafe extern "C" fn stackwalk_free(handle: *mut WalkerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}
