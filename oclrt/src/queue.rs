//! 命令队列与入队操作。
//!
//! 每个入队操作都返回标识该命令的 [`Event`]。安全的读写变体一律阻塞,
//! 返回即表示宿主内存的借用已经用完;非阻塞版本是 `unsafe` 的裸指针口。

use crate::{
    bindings::{
        self, cl_bool, cl_command_queue, cl_command_queue_properties,
        CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE, CL_QUEUE_PROFILING_ENABLE, CL_SUCCESS,
    },
    context::Context,
    device::Device,
    error::{check, Error},
    event::{Event, WaitList},
    kernel::Kernel,
    mem::MemObject,
    num::NumTyped,
    AsRaw,
};
use log::warn;
use std::{
    ffi::c_void,
    ptr::{null, null_mut},
};

bitflags::bitflags! {
    /// 命令队列属性。
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct QueueProperties: cl_command_queue_properties {
        const OUT_OF_ORDER_EXEC_MODE_ENABLE = CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE;
        const PROFILING_ENABLE = CL_QUEUE_PROFILING_ENABLE;
    }
}

/// 命令队列句柄,独占所有权,离开作用域即释放。
#[derive(Debug)]
pub struct CommandQueue {
    raw: cl_command_queue,
    device: Device,
}

unsafe impl Send for CommandQueue {}
unsafe impl Sync for CommandQueue {}

impl AsRaw for CommandQueue {
    type Raw = cl_command_queue;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

impl CommandQueue {
    pub(crate) fn new(
        context: &Context,
        device: &Device,
        properties: QueueProperties,
    ) -> Result<Self, Error> {
        let api = bindings::api();
        let mut status = CL_SUCCESS;
        let raw = unsafe {
            (api.clCreateCommandQueue)(
                context.as_raw(),
                device.as_raw(),
                properties.bits(),
                &mut status,
            )
        };
        check(status)?;
        if raw.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Self {
            raw,
            device: *device,
        })
    }

    /// 队列所在设备。
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    /// 入队一次内核执行。
    ///
    /// 工作维度取自 `global_size` 的长度,限 1 到 3;
    /// `global_offset` 与 `local_size` 给出时长度必须和维度一致,
    /// 否则按对应的平台错误返回,不会把长度不符的数组递给平台。
    pub fn enqueue_kernel(
        &self,
        kernel: &Kernel,
        global_offset: Option<&[usize]>,
        global_size: &[usize],
        local_size: Option<&[usize]>,
        wait: &WaitList,
    ) -> Result<Event, Error> {
        let dim = global_size.len();
        if dim == 0 || dim > 3 {
            return Err(Error::InvalidWorkDimension);
        }
        let offset = match global_offset {
            Some(s) if s.len() != dim => return Err(Error::InvalidGlobalOffset),
            Some(s) => s.as_ptr(),
            None => null(),
        };
        let local = match local_size {
            Some(s) if s.len() != dim => return Err(Error::InvalidWorkGroupSize),
            Some(s) => s.as_ptr(),
            None => null(),
        };
        let api = bindings::api();
        let (num_wait, wait_ptr) = wait.as_raw_parts();
        let mut event = null_mut();
        check(unsafe {
            (api.clEnqueueNDRangeKernel)(
                self.raw,
                kernel.as_raw(),
                dim as _,
                offset,
                global_size.as_ptr(),
                local,
                num_wait,
                wait_ptr,
                &mut event,
            )
        })?;
        if event.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Event::from_raw(event))
    }

    /// 阻塞地把 `data` 写入缓冲区 `offset` 字节处。
    pub fn write_buffer(
        &self,
        mem: &MemObject,
        offset: usize,
        data: &[u8],
        wait: &WaitList,
    ) -> Result<Event, Error> {
        unsafe {
            self.enqueue_write_buffer(mem, true, offset, data.len(), data.as_ptr().cast(), wait)
        }
    }

    /// 阻塞地把缓冲区 `offset` 字节处的内容读满 `out`。
    pub fn read_buffer(
        &self,
        mem: &MemObject,
        offset: usize,
        out: &mut [u8],
        wait: &WaitList,
    ) -> Result<Event, Error> {
        unsafe {
            self.enqueue_read_buffer(mem, true, offset, out.len(), out.as_mut_ptr().cast(), wait)
        }
    }

    /// 阻塞写入一段带类型的元素,字节数由登记表宽度换算,`offset` 仍以字节计。
    pub fn write_buffer_from<T: NumTyped>(
        &self,
        mem: &MemObject,
        offset: usize,
        data: &[T],
        wait: &WaitList,
    ) -> Result<Event, Error> {
        unsafe {
            self.enqueue_write_buffer(
                mem,
                true,
                offset,
                data.len() * T::KIND.nbytes(),
                data.as_ptr().cast(),
                wait,
            )
        }
    }

    /// 阻塞读出一段带类型的元素,字节数由登记表宽度换算,`offset` 仍以字节计。
    pub fn read_buffer_into<T: NumTyped>(
        &self,
        mem: &MemObject,
        offset: usize,
        out: &mut [T],
        wait: &WaitList,
    ) -> Result<Event, Error> {
        unsafe {
            self.enqueue_read_buffer(
                mem,
                true,
                offset,
                out.len() * T::KIND.nbytes(),
                out.as_mut_ptr().cast(),
                wait,
            )
        }
    }

    /// 入队缓冲区写入,裸指针口。
    ///
    /// # Safety
    ///
    /// `ptr` 起 `size` 字节必须可读;非阻塞时该区域必须保持有效
    /// 直到返回的事件终结。
    pub unsafe fn enqueue_write_buffer(
        &self,
        mem: &MemObject,
        blocking: bool,
        offset: usize,
        size: usize,
        ptr: *const c_void,
        wait: &WaitList,
    ) -> Result<Event, Error> {
        let api = bindings::api();
        let (num_wait, wait_ptr) = wait.as_raw_parts();
        let mut event = null_mut();
        check(unsafe {
            (api.clEnqueueWriteBuffer)(
                self.raw,
                mem.as_raw(),
                cl_bool(blocking),
                offset,
                size,
                ptr,
                num_wait,
                wait_ptr,
                &mut event,
            )
        })?;
        if event.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Event::from_raw(event))
    }

    /// 入队缓冲区读出,裸指针口。
    ///
    /// # Safety
    ///
    /// `ptr` 起 `size` 字节必须可写;非阻塞时该区域必须保持有效
    /// 且无他者访问,直到返回的事件终结。
    pub unsafe fn enqueue_read_buffer(
        &self,
        mem: &MemObject,
        blocking: bool,
        offset: usize,
        size: usize,
        ptr: *mut c_void,
        wait: &WaitList,
    ) -> Result<Event, Error> {
        let api = bindings::api();
        let (num_wait, wait_ptr) = wait.as_raw_parts();
        let mut event = null_mut();
        check(unsafe {
            (api.clEnqueueReadBuffer)(
                self.raw,
                mem.as_raw(),
                cl_bool(blocking),
                offset,
                size,
                ptr,
                num_wait,
                wait_ptr,
                &mut event,
            )
        })?;
        if event.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Event::from_raw(event))
    }

    /// 把已入队的命令提交给设备,不等待完成。
    pub fn flush(&self) -> Result<(), Error> {
        check(unsafe { (bindings::api().clFlush)(self.raw) })
    }

    /// 阻塞到队列里所有命令完成。
    pub fn finish(&self) -> Result<(), Error> {
        check(unsafe { (bindings::api().clFinish)(self.raw) })
    }

    /// 显式释放,效果等同于析构。
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for CommandQueue {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { (bindings::api().clReleaseCommandQueue)(self.raw) }) {
            warn!("failed to release cl_command_queue {:?}: {e}", self.raw)
        }
    }
}
