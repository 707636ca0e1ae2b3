//! 上下文:其余一切对象的工厂。
//!
//! 工厂同时检查状态码和返回句柄,状态成功而句柄为空按
//! [`Error::Unknown`] 上报,保证拿到的包装值必然有效。

use crate::{
    bindings::{self, cl_context, size_t, CL_SUCCESS},
    device::Device,
    error::{check, Error},
    event::Event,
    mem::{MemFlags, MemObject},
    num::NumTyped,
    program::{BuildError, Program},
    queue::{CommandQueue, QueueProperties},
    AsRaw,
};
use log::warn;
use std::{
    ffi::{c_char, c_void},
    ptr::{null, null_mut},
};

/// 上下文句柄,独占所有权,离开作用域即释放。
#[derive(Debug)]
pub struct Context {
    raw: cl_context,
    devices: Vec<Device>,
}

unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl AsRaw for Context {
    type Raw = cl_context;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

impl Context {
    /// 在一组设备上建上下文。设备集为空时由平台报 `InvalidValue`。
    pub fn new(devices: &[Device]) -> Result<Self, Error> {
        let api = bindings::api();
        // Device 是 cl_device_id 的透明包装,切片可整体传给平台
        let (num, ptr) = match devices.len() {
            0 => (0, null()),
            n => (n as _, devices.as_ptr().cast()),
        };
        let mut status = CL_SUCCESS;
        let raw =
            unsafe { (api.clCreateContext)(null(), num, ptr, None, null_mut(), &mut status) };
        check(status)?;
        if raw.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Self {
            raw,
            devices: devices.to_vec(),
        })
    }

    /// 建上下文时传入的设备集。
    #[inline]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// 在指定设备上建命令队列。
    #[inline]
    pub fn create_queue(
        &self,
        device: &Device,
        properties: QueueProperties,
    ) -> Result<CommandQueue, Error> {
        CommandQueue::new(self, device, properties)
    }

    /// 从若干源码片段建程序,不编译。
    pub fn create_program(&self, sources: &[&str]) -> Result<Program, Error> {
        let api = bindings::api();
        let ptrs: Vec<*const c_char> = sources.iter().map(|s| s.as_ptr().cast()).collect();
        let lens: Vec<size_t> = sources.iter().map(|s| s.len()).collect();
        let mut status = CL_SUCCESS;
        let raw = unsafe {
            (api.clCreateProgramWithSource)(
                self.raw,
                ptrs.len() as _,
                ptrs.as_ptr(),
                lens.as_ptr(),
                &mut status,
            )
        };
        check(status)?;
        if raw.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Program::from_raw(raw, self.devices.clone()))
    }

    /// 建程序并立即对上下文全部设备编译。
    pub fn build_from_source(&self, source: &str, options: &str) -> Result<Program, BuildError> {
        let program = self.create_program(&[source])?;
        program.build(&self.devices, options)?;
        Ok(program)
    }

    fn buffer(&self, flags: MemFlags, size: usize, host_ptr: *mut c_void) -> Result<MemObject, Error> {
        let api = bindings::api();
        let mut status = CL_SUCCESS;
        let raw = unsafe { (api.clCreateBuffer)(self.raw, flags.bits(), size, host_ptr, &mut status) };
        check(status)?;
        if raw.is_null() {
            return Err(Error::Unknown);
        }
        Ok(MemObject::from_raw(raw, size))
    }

    /// 建缓冲区并拷入初始内容。
    ///
    /// 总是按拷贝语义补上 `COPY_HOST_PTR`,平台不会留存 `data` 的指针,
    /// 借用在返回时即可结束。
    pub fn create_buffer(&self, flags: MemFlags, data: &[u8]) -> Result<MemObject, Error> {
        if data.is_empty() {
            return Err(Error::InvalidBufferSize);
        }
        self.buffer(
            flags | MemFlags::COPY_HOST_PTR,
            data.len(),
            data.as_ptr() as *mut c_void,
        )
    }

    /// 按元素类型建缓冲区并拷入初始内容,字节数由登记表宽度换算。
    pub fn create_buffer_from<T: NumTyped>(
        &self,
        flags: MemFlags,
        data: &[T],
    ) -> Result<MemObject, Error> {
        if data.is_empty() {
            return Err(Error::InvalidBufferSize);
        }
        self.buffer(
            flags | MemFlags::COPY_HOST_PTR,
            data.len() * T::KIND.nbytes(),
            data.as_ptr() as *mut c_void,
        )
    }

    /// 建未初始化的缓冲区。
    pub fn create_empty_buffer(&self, flags: MemFlags, size: usize) -> Result<MemObject, Error> {
        self.buffer(flags, size, null_mut())
    }

    /// 原样转发 flags 和宿主指针建缓冲区。
    ///
    /// # Safety
    ///
    /// `USE_HOST_PTR`/`ALLOC_HOST_PTR` 等策略下,`host_ptr` 指向的内存
    /// 必须满足平台对有效性、对齐和存活期的要求,由调用者保证。
    pub unsafe fn create_buffer_raw(
        &self,
        flags: MemFlags,
        size: usize,
        host_ptr: *mut c_void,
    ) -> Result<MemObject, Error> {
        self.buffer(flags, size, host_ptr)
    }

    /// 建用户事件,初始为未终结状态。
    pub fn create_user_event(&self) -> Result<Event, Error> {
        let api = bindings::api();
        let mut status = CL_SUCCESS;
        let raw = unsafe { (api.clCreateUserEvent)(self.raw, &mut status) };
        check(status)?;
        if raw.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Event::from_raw(raw))
    }

    /// 显式释放,效果等同于析构。
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { (bindings::api().clReleaseContext)(self.raw) }) {
            warn!("failed to release cl_context {:?}: {e}", self.raw)
        }
    }
}
