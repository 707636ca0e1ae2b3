//! 程序对象与构建诊断。

use crate::{
    bindings::{
        self, cl_program, CL_BUILD_PROGRAM_FAILURE, CL_COMPILE_PROGRAM_FAILURE,
        CL_LINK_PROGRAM_FAILURE, CL_PROGRAM_BUILD_LOG, CL_SUCCESS,
    },
    device::Device,
    error::{check, Error},
    kernel::Kernel,
    query, AsRaw,
};
use log::warn;
use std::{
    ffi::CString,
    fmt,
    ptr::{null, null_mut},
};

/// 程序构建失败。
#[derive(Debug)]
pub enum BuildError {
    /// 前端拒绝了源码,携带各设备的构建日志。
    BuildFailed(String),
    /// 构建之外的环节失败。
    Others(Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BuildFailed(log) => write!(f, "program build failed:\n{log}"),
            Self::Others(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BuildFailed(_) => None,
            Self::Others(e) => Some(e),
        }
    }
}

impl From<Error> for BuildError {
    #[inline]
    fn from(e: Error) -> Self {
        Self::Others(e)
    }
}

/// 程序句柄,独占所有权,离开作用域即释放。
#[derive(Debug)]
pub struct Program {
    raw: cl_program,
    devices: Vec<Device>,
}

unsafe impl Send for Program {}
unsafe impl Sync for Program {}

impl AsRaw for Program {
    type Raw = cl_program;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

impl Program {
    #[inline]
    pub(crate) fn from_raw(raw: cl_program, devices: Vec<Device>) -> Self {
        Self { raw, devices }
    }

    /// 对给定设备编译。设备集为空表示上下文关联的全部设备。
    ///
    /// 构建类失败变体必然携带日志;日志取不到时退化为空文本,
    /// 不会吞掉失败本身。
    pub fn build(&self, devices: &[Device], options: &str) -> Result<(), BuildError> {
        let options = CString::new(options).map_err(|_| Error::InvalidBuildOptions)?;
        let api = bindings::api();
        let (num, ptr) = match devices.len() {
            0 => (0, null()),
            n => (n as _, devices.as_ptr().cast()),
        };
        let status = unsafe {
            (api.clBuildProgram)(self.raw, num, ptr, options.as_ptr(), None, null_mut())
        };
        match status {
            CL_SUCCESS => Ok(()),
            CL_BUILD_PROGRAM_FAILURE | CL_COMPILE_PROGRAM_FAILURE | CL_LINK_PROGRAM_FAILURE => {
                let targets = if devices.is_empty() {
                    &self.devices
                } else {
                    devices
                };
                Err(BuildError::BuildFailed(self.collect_logs(targets)))
            }
            _ => Err(BuildError::Others(Error::from_raw(status))),
        }
    }

    /// 单设备构建日志。尺寸先探后取,长度一步到位。
    pub fn build_log(&self, device: &Device) -> Result<String, Error> {
        let api = bindings::api();
        query::string(|size, ptr, size_ret| unsafe {
            (api.clGetProgramBuildInfo)(
                self.raw,
                device.as_raw(),
                CL_PROGRAM_BUILD_LOG,
                size,
                ptr,
                size_ret,
            )
        })
    }

    fn collect_logs(&self, devices: &[Device]) -> String {
        let mut text = String::new();
        for dev in devices {
            let log = match self.build_log(dev) {
                Ok(log) => log,
                Err(e) => {
                    warn!("failed to fetch build log: {e}");
                    continue;
                }
            };
            let log = log.trim();
            if log.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push('\n')
            }
            if devices.len() > 1 {
                text.push_str("-- ");
                text.push_str(&dev.name());
                text.push('\n');
            }
            text.push_str(log)
        }
        text
    }

    /// 以入口函数名取内核。
    pub fn create_kernel(&self, name: &str) -> Result<Kernel, Error> {
        let c_name = CString::new(name).map_err(|_| Error::InvalidKernelName)?;
        let api = bindings::api();
        let mut status = CL_SUCCESS;
        let raw = unsafe { (api.clCreateKernel)(self.raw, c_name.as_ptr(), &mut status) };
        check(status)?;
        if raw.is_null() {
            return Err(Error::Unknown);
        }
        Ok(Kernel::from_raw(raw))
    }

    /// 显式释放,效果等同于析构。
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { (bindings::api().clReleaseProgram)(self.raw) }) {
            warn!("failed to release cl_program {:?}: {e}", self.raw)
        }
    }
}
