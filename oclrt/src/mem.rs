//! 设备内存对象。

use crate::{
    bindings::{
        self, cl_mem, cl_mem_flags, CL_MEM_ALLOC_HOST_PTR, CL_MEM_COPY_HOST_PTR,
        CL_MEM_HOST_NO_ACCESS, CL_MEM_HOST_READ_ONLY, CL_MEM_HOST_WRITE_ONLY, CL_MEM_READ_ONLY,
        CL_MEM_READ_WRITE, CL_MEM_USE_HOST_PTR, CL_MEM_WRITE_ONLY,
    },
    error::check,
    AsRaw,
};
use log::warn;

bitflags::bitflags! {
    /// 内存对象的访问与宿主内存策略。
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct MemFlags: cl_mem_flags {
        const READ_WRITE = CL_MEM_READ_WRITE;
        const WRITE_ONLY = CL_MEM_WRITE_ONLY;
        const READ_ONLY = CL_MEM_READ_ONLY;
        const USE_HOST_PTR = CL_MEM_USE_HOST_PTR;
        const ALLOC_HOST_PTR = CL_MEM_ALLOC_HOST_PTR;
        const COPY_HOST_PTR = CL_MEM_COPY_HOST_PTR;
        const HOST_WRITE_ONLY = CL_MEM_HOST_WRITE_ONLY;
        const HOST_READ_ONLY = CL_MEM_HOST_READ_ONLY;
        const HOST_NO_ACCESS = CL_MEM_HOST_NO_ACCESS;
    }
}

/// 缓冲区句柄,独占所有权,离开作用域即释放。
#[derive(Debug)]
pub struct MemObject {
    raw: cl_mem,
    size: usize,
}

unsafe impl Send for MemObject {}
unsafe impl Sync for MemObject {}

impl AsRaw for MemObject {
    type Raw = cl_mem;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

impl MemObject {
    #[inline]
    pub(crate) fn from_raw(raw: cl_mem, size: usize) -> Self {
        Self { raw, size }
    }

    /// 创建时申请的字节容量。
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// 显式释放,效果等同于析构。
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for MemObject {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { (bindings::api().clReleaseMemObject)(self.raw) }) {
            warn!("failed to release cl_mem {:?}: {e}", self.raw)
        }
    }
}
