//! 事件、用户事件与等待列表。

use crate::{
    bindings::{
        self, cl_event, cl_int, cl_profiling_info, cl_uint, CL_COMPLETE,
        CL_EVENT_COMMAND_EXECUTION_STATUS, CL_PROFILING_COMMAND_END, CL_PROFILING_COMMAND_QUEUED,
        CL_PROFILING_COMMAND_START, CL_PROFILING_COMMAND_SUBMIT,
    },
    error::{check, Error},
    query, AsRaw,
};
use log::warn;
use std::{marker::PhantomData, ptr::null};

/// 事件句柄,独占所有权,离开作用域即释放。
#[derive(Debug)]
pub struct Event {
    raw: cl_event,
}

unsafe impl Send for Event {}
unsafe impl Sync for Event {}

impl AsRaw for Event {
    type Raw = cl_event;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

/// 事件在性能剖析中的四个时刻。
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProfilingInfo {
    Queued = CL_PROFILING_COMMAND_QUEUED,
    Submit = CL_PROFILING_COMMAND_SUBMIT,
    Start = CL_PROFILING_COMMAND_START,
    End = CL_PROFILING_COMMAND_END,
}

impl Event {
    #[inline]
    pub(crate) fn from_raw(raw: cl_event) -> Self {
        Self { raw }
    }

    /// 命令执行状态:`CL_QUEUED`/`CL_SUBMITTED`/`CL_RUNNING`/`CL_COMPLETE`,
    /// 或表示异常终结的负错误码。
    pub fn status(&self) -> Result<cl_int, Error> {
        let api = bindings::api();
        query::value(|size, ptr, size_ret| unsafe {
            (api.clGetEventInfo)(self.raw, CL_EVENT_COMMAND_EXECUTION_STATUS, size, ptr, size_ret)
        })
    }

    /// 阻塞到本事件终结。
    pub fn wait(&self) -> Result<(), Error> {
        check(unsafe { (bindings::api().clWaitForEvents)(1, &self.raw) })
    }

    /// 把用户事件置为完成,放行所有等待者。
    #[inline]
    pub fn complete(&self) -> Result<(), Error> {
        self.set_status(CL_COMPLETE)
    }

    /// 设置用户事件的终态,`CL_COMPLETE` 或负错误码。
    ///
    /// 终态只能设置一次,重复设置由平台报 `InvalidOperation`。
    pub fn set_status(&self, status: cl_int) -> Result<(), Error> {
        check(unsafe { (bindings::api().clSetUserEventStatus)(self.raw, status) })
    }

    /// 性能剖析时间戳,纳秒。要求队列开启 [`PROFILING_ENABLE`]。
    ///
    /// [`PROFILING_ENABLE`]: crate::QueueProperties::PROFILING_ENABLE
    pub fn profiling_info(&self, info: ProfilingInfo) -> Result<u64, Error> {
        let api = bindings::api();
        query::value(|size, ptr, size_ret| unsafe {
            (api.clGetEventProfilingInfo)(self.raw, info as cl_profiling_info, size, ptr, size_ret)
        })
    }

    /// 显式释放,效果等同于析构。
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for Event {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { (bindings::api().clReleaseEvent)(self.raw) }) {
            warn!("failed to release cl_event {:?}: {e}", self.raw)
        }
    }
}

/// 事件等待列表。
///
/// 列表借用其中的事件,存续期内事件不可能被释放,
/// 递给平台的句柄数组因此必然有效。
#[derive(Default, Debug)]
pub struct WaitList<'a> {
    raw: Vec<cl_event>,
    _events: PhantomData<&'a Event>,
}

impl<'a> WaitList<'a> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: &'a Event) {
        self.raw.push(event.raw)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// 平台调用约定的 `(数量, 指针)` 二元组。
    ///
    /// 空列表退化为 `(0, NULL)`:入队操作把空指针当作"无需等待",
    /// 长度为零而指针非空则是未定义的。
    pub(crate) fn as_raw_parts(&self) -> (cl_uint, *const cl_event) {
        if self.raw.is_empty() {
            (0, null())
        } else {
            (self.raw.len() as _, self.raw.as_ptr())
        }
    }
}

impl<'a> FromIterator<&'a Event> for WaitList<'a> {
    fn from_iter<T: IntoIterator<Item = &'a Event>>(iter: T) -> Self {
        Self {
            raw: iter.into_iter().map(|event| event.raw).collect(),
            _events: PhantomData,
        }
    }
}

impl<'a, const N: usize> From<[&'a Event; N]> for WaitList<'a> {
    #[inline]
    fn from(events: [&'a Event; N]) -> Self {
        events.into_iter().collect()
    }
}

/// 阻塞到列表中全部事件终结,有事件异常终结时报
/// `ExecStatusErrorForEventsInWaitList`。
///
/// 显式等待空列表不同于入队时的"无需等待",平台报 `InvalidValue`。
pub fn wait_for_events(events: &WaitList) -> Result<(), Error> {
    let (num, ptr) = events.as_raw_parts();
    check(unsafe { (bindings::api().clWaitForEvents)(num, ptr) })
}
