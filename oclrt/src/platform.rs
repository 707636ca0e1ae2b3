//! 平台枚举与元数据。

use crate::{
    bindings::{
        self, cl_platform_id, cl_platform_info, CL_PLATFORM_EXTENSIONS, CL_PLATFORM_NAME,
        CL_PLATFORM_NOT_FOUND_KHR, CL_PLATFORM_PROFILE, CL_PLATFORM_VENDOR, CL_PLATFORM_VERSION,
    },
    device::{Device, DeviceType},
    error::{check, Error},
    query, AsRaw,
};
use log::debug;
use std::ptr::null_mut;

/// 平台句柄。平台归加载器所有,不计引用也无需释放。
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Platform(cl_platform_id);

unsafe impl Send for Platform {}
unsafe impl Sync for Platform {}

impl AsRaw for Platform {
    type Raw = cl_platform_id;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Platform {
    /// 枚举可用平台。
    ///
    /// 找不到平台库,或加载器报告零平台(`CL_PLATFORM_NOT_FOUND_KHR`)时,
    /// 答案都是空集而非错误;宿主没装驱动是正常环境,不该炸掉调用方。
    pub fn all() -> Result<Vec<Self>, Error> {
        let Some(api) = bindings::try_api() else {
            return Ok(Vec::new());
        };
        let mut num = 0;
        match check(unsafe { (api.clGetPlatformIDs)(0, null_mut(), &mut num) }) {
            Ok(()) => {}
            Err(Error::Other(CL_PLATFORM_NOT_FOUND_KHR)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        }
        if num == 0 {
            return Ok(Vec::new());
        }
        let mut ids = vec![null_mut(); num as usize];
        check(unsafe { (api.clGetPlatformIDs)(num, ids.as_mut_ptr(), &mut num) })?;
        ids.truncate(num as usize);
        debug!("{num} OpenCL platform(s) found");
        Ok(ids.into_iter().map(Self).collect())
    }

    /// 枚举平台上给定类型的设备。类型过滤不中时平台报 `DeviceNotFound`。
    pub fn devices(&self, ty: DeviceType) -> Result<Vec<Device>, Error> {
        let api = bindings::api();
        let mut num = 0;
        check(unsafe { (api.clGetDeviceIDs)(self.0, ty.bits(), 0, null_mut(), &mut num) })?;
        if num == 0 {
            return Ok(Vec::new());
        }
        let mut ids = vec![null_mut(); num as usize];
        check(unsafe { (api.clGetDeviceIDs)(self.0, ty.bits(), num, ids.as_mut_ptr(), &mut num) })?;
        ids.truncate(num as usize);
        Ok(ids.into_iter().map(Device::from_raw).collect())
    }

    fn info(&self, param: cl_platform_info) -> Result<String, Error> {
        let api = bindings::api();
        query::string(|size, ptr, size_ret| unsafe {
            (api.clGetPlatformInfo)(self.0, param, size, ptr, size_ret)
        })
    }

    pub fn name(&self) -> String {
        self.info(CL_PLATFORM_NAME)
            .expect("platform name query should never fail")
    }

    pub fn vendor(&self) -> String {
        self.info(CL_PLATFORM_VENDOR)
            .expect("platform vendor query should never fail")
    }

    pub fn profile(&self) -> String {
        self.info(CL_PLATFORM_PROFILE)
            .expect("platform profile query should never fail")
    }

    pub fn version(&self) -> String {
        self.info(CL_PLATFORM_VERSION)
            .expect("platform version query should never fail")
    }

    /// 平台扩展名列表,空白分隔展开。
    pub fn extensions(&self) -> Vec<String> {
        self.info(CL_PLATFORM_EXTENSIONS)
            .expect("platform extensions query should never fail")
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }
}
