//! 设备句柄与元数据。

use crate::{
    bindings::{
        self, cl_device_id, cl_device_info, cl_device_type, cl_uint, CL_DEVICE_EXTENSIONS,
        CL_DEVICE_GLOBAL_MEM_SIZE, CL_DEVICE_LOCAL_MEM_SIZE, CL_DEVICE_MAX_COMPUTE_UNITS,
        CL_DEVICE_MAX_WORK_GROUP_SIZE, CL_DEVICE_NAME, CL_DEVICE_TYPE, CL_DEVICE_TYPE_ACCELERATOR,
        CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_DEFAULT, CL_DEVICE_TYPE_GPU,
        CL_DEVICE_VENDOR,
    },
    context::Context,
    error::Error,
    query, AsRaw,
};
use std::slice;

bitflags::bitflags! {
    /// 设备类型,可按位组合作枚举过滤器。
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct DeviceType: cl_device_type {
        const DEFAULT = CL_DEVICE_TYPE_DEFAULT;
        const CPU = CL_DEVICE_TYPE_CPU;
        const GPU = CL_DEVICE_TYPE_GPU;
        const ACCELERATOR = CL_DEVICE_TYPE_ACCELERATOR;
        const ALL = CL_DEVICE_TYPE_ALL;
    }
}

/// 设备句柄。根设备归平台所有,不计引用也无需释放。
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Device(cl_device_id);

unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl AsRaw for Device {
    type Raw = cl_device_id;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Device {
    #[inline]
    pub(crate) fn from_raw(raw: cl_device_id) -> Self {
        Self(raw)
    }

    /// 以本设备单独建上下文。
    #[inline]
    pub fn context(&self) -> Result<Context, Error> {
        Context::new(slice::from_ref(self))
    }

    fn info<T: Default>(&self, param: cl_device_info) -> Result<T, Error> {
        let api = bindings::api();
        query::value(|size, ptr, size_ret| unsafe {
            (api.clGetDeviceInfo)(self.0, param, size, ptr, size_ret)
        })
    }

    fn info_string(&self, param: cl_device_info) -> Result<String, Error> {
        let api = bindings::api();
        query::string(|size, ptr, size_ret| unsafe {
            (api.clGetDeviceInfo)(self.0, param, size, ptr, size_ret)
        })
    }

    pub fn name(&self) -> String {
        self.info_string(CL_DEVICE_NAME)
            .expect("device name query should never fail")
    }

    pub fn vendor(&self) -> String {
        self.info_string(CL_DEVICE_VENDOR)
            .expect("device vendor query should never fail")
    }

    pub fn device_type(&self) -> DeviceType {
        let bits: cl_device_type = self
            .info(CL_DEVICE_TYPE)
            .expect("device type query should never fail");
        DeviceType::from_bits_retain(bits)
    }

    pub fn max_compute_units(&self) -> usize {
        self.info::<cl_uint>(CL_DEVICE_MAX_COMPUTE_UNITS)
            .expect("device compute units query should never fail") as _
    }

    /// 单个工作组的工作项数上限。
    pub fn max_group_size(&self) -> usize {
        self.info(CL_DEVICE_MAX_WORK_GROUP_SIZE)
            .expect("device group size query should never fail")
    }

    pub fn global_mem_size(&self) -> u64 {
        self.info(CL_DEVICE_GLOBAL_MEM_SIZE)
            .expect("device global memory query should never fail")
    }

    pub fn local_mem_size(&self) -> u64 {
        self.info(CL_DEVICE_LOCAL_MEM_SIZE)
            .expect("device local memory query should never fail")
    }

    /// 设备支持的扩展名列表。
    pub fn extensions(&self) -> Vec<String> {
        self.info_string(CL_DEVICE_EXTENSIONS)
            .expect("device extensions query should never fail")
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }
}
