//! 内核对象与实参封送。
//!
//! 实参封送归结为给平台递 `(size, ptr)` 二元组,三类实参各有口径:
//! 内存对象递句柄本身,本地内存只递尺寸,标量递宿主表示的原始字节、
//! 宽度查登记表。[`Arg`] 把三类封死在一个和类型里,设不进去的实参
//! 在编译期就不存在。

use crate::{
    bindings::{
        self, cl_kernel, cl_mem, cl_uint, CL_KERNEL_ARG_NAME, CL_KERNEL_FUNCTION_NAME,
        CL_KERNEL_NUM_ARGS, CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE,
        CL_KERNEL_WORK_GROUP_SIZE,
    },
    device::Device,
    error::{check, Error},
    mem::MemObject,
    num::NumType,
    query, AsRaw,
};
use log::warn;
use std::{ffi::c_void, ptr::null};

/// 标量实参值,变体集与 [`NumType`] 一一对应。
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Scalar {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    I64(i64),
    U64(u64),
    F64(f64),
    Usize(usize),
}

impl Scalar {
    /// 值所属的数值类别。
    pub const fn num_type(self) -> NumType {
        match self {
            Self::I8(_) => NumType::I8,
            Self::U8(_) => NumType::U8,
            Self::I16(_) => NumType::I16,
            Self::U16(_) => NumType::U16,
            Self::I32(_) => NumType::I32,
            Self::U32(_) => NumType::U32,
            Self::F32(_) => NumType::F32,
            Self::I64(_) => NumType::I64,
            Self::U64(_) => NumType::U64,
            Self::F64(_) => NumType::F64,
            Self::Usize(_) => NumType::Usize,
        }
    }
}

/// 内核实参,三种变体对应三种封送策略。
#[derive(Clone, Copy, Debug)]
pub enum Arg<'a> {
    /// 内存对象:载荷是句柄本身。
    Mem(&'a MemObject),
    /// 设备本地内存占位:只有尺寸,没有载荷。
    Local(usize),
    /// 标量:载荷是宿主表示的原始字节。
    Scalar(Scalar),
}

impl<'a> From<&'a MemObject> for Arg<'a> {
    #[inline]
    fn from(mem: &'a MemObject) -> Self {
        Self::Mem(mem)
    }
}

impl From<Scalar> for Arg<'_> {
    #[inline]
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident)*) => {
        $(
            impl From<$ty> for Scalar {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
            impl From<$ty> for Arg<'_> {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::$variant(value))
                }
            }
        )*
    };
}

scalar_from! {
    i8    => I8
    u8    => U8
    i16   => I16
    u16   => U16
    i32   => I32
    u32   => U32
    f32   => F32
    i64   => I64
    u64   => U64
    f64   => F64
    usize => Usize
}

/// 内核句柄,独占所有权,离开作用域即释放。
#[derive(Debug)]
pub struct Kernel {
    raw: cl_kernel,
}

unsafe impl Send for Kernel {}
// 改动实参要求 `&mut`,共享引用上只剩线程安全的查询与入队
unsafe impl Sync for Kernel {}

impl AsRaw for Kernel {
    type Raw = cl_kernel;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

impl Kernel {
    #[inline]
    pub(crate) fn from_raw(raw: cl_kernel) -> Self {
        Self { raw }
    }

    /// 入口函数名。
    pub fn name(&self) -> String {
        let api = bindings::api();
        query::string(|size, ptr, size_ret| unsafe {
            (api.clGetKernelInfo)(self.raw, CL_KERNEL_FUNCTION_NAME, size, ptr, size_ret)
        })
        .expect("kernel name query should never fail")
    }

    /// 形参个数。
    pub fn num_args(&self) -> Result<usize, Error> {
        let api = bindings::api();
        let num: cl_uint = query::value(|size, ptr, size_ret| unsafe {
            (api.clGetKernelInfo)(self.raw, CL_KERNEL_NUM_ARGS, size, ptr, size_ret)
        })?;
        Ok(num as _)
    }

    /// 形参名。要求程序带着实参信息编译,否则平台报 `KernelArgInfoNotAvailable`。
    pub fn arg_name(&self, index: usize) -> Result<String, Error> {
        let api = bindings::api();
        query::string(|size, ptr, size_ret| unsafe {
            (api.clGetKernelArgInfo)(
                self.raw,
                index as cl_uint,
                CL_KERNEL_ARG_NAME,
                size,
                ptr,
                size_ret,
            )
        })
    }

    /// 本内核在指定设备上的工作组尺寸上限。
    pub fn work_group_size(&self, device: &Device) -> Result<usize, Error> {
        let api = bindings::api();
        query::value(|size, ptr, size_ret| unsafe {
            (api.clGetKernelWorkGroupInfo)(
                self.raw,
                device.as_raw(),
                CL_KERNEL_WORK_GROUP_SIZE,
                size,
                ptr,
                size_ret,
            )
        })
    }

    /// 工作组尺寸取到该倍数上时调度效率最好。
    pub fn preferred_work_group_size_multiple(&self, device: &Device) -> Result<usize, Error> {
        let api = bindings::api();
        query::value(|size, ptr, size_ret| unsafe {
            (api.clGetKernelWorkGroupInfo)(
                self.raw,
                device.as_raw(),
                CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE,
                size,
                ptr,
                size_ret,
            )
        })
    }

    /// 设置一个实参,可链式调用。
    pub fn set_arg<'a>(&mut self, index: usize, arg: impl Into<Arg<'a>>) -> Result<&mut Self, Error> {
        match arg.into() {
            Arg::Mem(mem) => {
                let handle = unsafe { mem.as_raw() };
                self.set_raw(index, size_of::<cl_mem>(), &handle as *const cl_mem as _)
            }
            Arg::Local(size) => self.set_raw(index, size, null()),
            Arg::Scalar(value) => {
                let size = value.num_type().nbytes();
                match value {
                    Scalar::I8(v) => self.set_raw(index, size, &v as *const i8 as _),
                    Scalar::U8(v) => self.set_raw(index, size, &v as *const u8 as _),
                    Scalar::I16(v) => self.set_raw(index, size, &v as *const i16 as _),
                    Scalar::U16(v) => self.set_raw(index, size, &v as *const u16 as _),
                    Scalar::I32(v) => self.set_raw(index, size, &v as *const i32 as _),
                    Scalar::U32(v) => self.set_raw(index, size, &v as *const u32 as _),
                    Scalar::F32(v) => self.set_raw(index, size, &v as *const f32 as _),
                    Scalar::I64(v) => self.set_raw(index, size, &v as *const i64 as _),
                    Scalar::U64(v) => self.set_raw(index, size, &v as *const u64 as _),
                    Scalar::F64(v) => self.set_raw(index, size, &v as *const f64 as _),
                    Scalar::Usize(v) => self.set_raw(index, size, &v as *const usize as _),
                }
            }
        }?;
        Ok(self)
    }

    /// 从 0 号位置起逐个设置全部实参。
    pub fn set_args(&mut self, args: &[Arg]) -> Result<(), Error> {
        for (index, arg) in args.iter().enumerate() {
            self.set_arg(index, *arg)?;
        }
        Ok(())
    }

    /// 直接递交 `(size, ptr)`,绕过类型封送。
    ///
    /// # Safety
    ///
    /// `value` 起 `size` 字节必须可读,且与形参的平台侧类型尺寸一致。
    pub unsafe fn set_arg_raw(
        &mut self,
        index: usize,
        size: usize,
        value: *const c_void,
    ) -> Result<(), Error> {
        self.set_raw(index, size, value)
    }

    fn set_raw(&mut self, index: usize, size: usize, value: *const c_void) -> Result<(), Error> {
        check(unsafe { (bindings::api().clSetKernelArg)(self.raw, index as cl_uint, size, value) })
    }

    /// 显式释放,效果等同于析构。
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { (bindings::api().clReleaseKernel)(self.raw) }) {
            warn!("failed to release cl_kernel {:?}: {e}", self.raw)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(Scalar::from(1i8).num_type(), NumType::I8);
        assert_eq!(Scalar::from(1.5f32).num_type(), NumType::F32);
        assert_eq!(Scalar::from(1usize).num_type(), NumType::Usize);
        for kind in NumType::ALL {
            let scalar = match kind {
                NumType::I8 => Scalar::I8(0),
                NumType::U8 => Scalar::U8(0),
                NumType::I16 => Scalar::I16(0),
                NumType::U16 => Scalar::U16(0),
                NumType::I32 => Scalar::I32(0),
                NumType::U32 => Scalar::U32(0),
                NumType::F32 => Scalar::F32(0.),
                NumType::I64 => Scalar::I64(0),
                NumType::U64 => Scalar::U64(0),
                NumType::F64 => Scalar::F64(0.),
                NumType::Usize => Scalar::Usize(0),
            };
            assert_eq!(scalar.num_type(), kind)
        }
    }

    #[test]
    fn test_arg_from() {
        assert!(matches!(Arg::from(5i32), Arg::Scalar(Scalar::I32(5))));
        assert!(matches!(Arg::from(2.5f64), Arg::Scalar(Scalar::F64(v)) if v == 2.5));
        assert!(matches!(Arg::Local(256), Arg::Local(256)));
        assert!(matches!(
            Arg::from(Scalar::U16(7)),
            Arg::Scalar(Scalar::U16(7))
        ));
    }
}
