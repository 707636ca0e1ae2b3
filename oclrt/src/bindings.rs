//! OpenCL C ABI:标量类型、不透明句柄、常量与入口函数表。
//!
//! 平台库不在链接期绑定,而是在首次使用时通过 [`Api::load`] 解析。
//! 测试可用 [`set_api`] 预先安装一张自制函数表,完全绕开系统库。

#![allow(non_camel_case_types)]

use libloading::Library;
use log::warn;
use std::{
    ffi::{c_char, c_void, CStr},
    fmt,
    mem::transmute,
    sync::OnceLock,
};

pub type cl_int = i32;
pub type cl_uint = u32;
pub type cl_ulong = u64;
pub type cl_bool = cl_uint;
pub type cl_bitfield = cl_ulong;
pub type size_t = usize;

pub type cl_device_type = cl_bitfield;
pub type cl_mem_flags = cl_bitfield;
pub type cl_command_queue_properties = cl_bitfield;
pub type cl_context_properties = isize;
pub type cl_platform_info = cl_uint;
pub type cl_device_info = cl_uint;
pub type cl_program_build_info = cl_uint;
pub type cl_build_status = cl_int;
pub type cl_kernel_info = cl_uint;
pub type cl_kernel_arg_info = cl_uint;
pub type cl_kernel_work_group_info = cl_uint;
pub type cl_event_info = cl_uint;
pub type cl_profiling_info = cl_uint;

macro_rules! opaque {
    ($($handle:ident = $ty:ident;)*) => {
        $(
            #[repr(C)]
            #[doc(hidden)]
            pub struct $ty {
                _unused: [u8; 0],
            }
            pub type $handle = *mut $ty;
        )*
    };
}

opaque! {
    cl_platform_id   = _cl_platform_id;
    cl_device_id     = _cl_device_id;
    cl_context       = _cl_context;
    cl_command_queue = _cl_command_queue;
    cl_mem           = _cl_mem;
    cl_program       = _cl_program;
    cl_kernel        = _cl_kernel;
    cl_event         = _cl_event;
}

pub const CL_SUCCESS: cl_int = 0;
pub const CL_BUILD_PROGRAM_FAILURE: cl_int = -11;
pub const CL_COMPILE_PROGRAM_FAILURE: cl_int = -15;
pub const CL_LINK_PROGRAM_FAILURE: cl_int = -17;
/// cl_khr_icd 扩展:加载器存在但没有任何平台。
pub const CL_PLATFORM_NOT_FOUND_KHR: cl_int = -1001;

pub const CL_FALSE: cl_bool = 0;
pub const CL_TRUE: cl_bool = 1;

pub const CL_PLATFORM_PROFILE: cl_platform_info = 0x0900;
pub const CL_PLATFORM_VERSION: cl_platform_info = 0x0901;
pub const CL_PLATFORM_NAME: cl_platform_info = 0x0902;
pub const CL_PLATFORM_VENDOR: cl_platform_info = 0x0903;
pub const CL_PLATFORM_EXTENSIONS: cl_platform_info = 0x0904;

pub const CL_DEVICE_TYPE_DEFAULT: cl_device_type = 1 << 0;
pub const CL_DEVICE_TYPE_CPU: cl_device_type = 1 << 1;
pub const CL_DEVICE_TYPE_GPU: cl_device_type = 1 << 2;
pub const CL_DEVICE_TYPE_ACCELERATOR: cl_device_type = 1 << 3;
pub const CL_DEVICE_TYPE_ALL: cl_device_type = 0xFFFFFFFF;

pub const CL_DEVICE_TYPE: cl_device_info = 0x1000;
pub const CL_DEVICE_MAX_COMPUTE_UNITS: cl_device_info = 0x1002;
pub const CL_DEVICE_MAX_WORK_GROUP_SIZE: cl_device_info = 0x1004;
pub const CL_DEVICE_GLOBAL_MEM_SIZE: cl_device_info = 0x101F;
pub const CL_DEVICE_LOCAL_MEM_SIZE: cl_device_info = 0x1023;
pub const CL_DEVICE_NAME: cl_device_info = 0x102B;
pub const CL_DEVICE_VENDOR: cl_device_info = 0x102C;
pub const CL_DEVICE_EXTENSIONS: cl_device_info = 0x1030;

pub const CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE: cl_command_queue_properties = 1 << 0;
pub const CL_QUEUE_PROFILING_ENABLE: cl_command_queue_properties = 1 << 1;

pub const CL_MEM_READ_WRITE: cl_mem_flags = 1 << 0;
pub const CL_MEM_WRITE_ONLY: cl_mem_flags = 1 << 1;
pub const CL_MEM_READ_ONLY: cl_mem_flags = 1 << 2;
pub const CL_MEM_USE_HOST_PTR: cl_mem_flags = 1 << 3;
pub const CL_MEM_ALLOC_HOST_PTR: cl_mem_flags = 1 << 4;
pub const CL_MEM_COPY_HOST_PTR: cl_mem_flags = 1 << 5;
pub const CL_MEM_HOST_WRITE_ONLY: cl_mem_flags = 1 << 7;
pub const CL_MEM_HOST_READ_ONLY: cl_mem_flags = 1 << 8;
pub const CL_MEM_HOST_NO_ACCESS: cl_mem_flags = 1 << 9;

pub const CL_PROGRAM_BUILD_STATUS: cl_program_build_info = 0x1181;
pub const CL_PROGRAM_BUILD_LOG: cl_program_build_info = 0x1183;

pub const CL_KERNEL_FUNCTION_NAME: cl_kernel_info = 0x1190;
pub const CL_KERNEL_NUM_ARGS: cl_kernel_info = 0x1191;
pub const CL_KERNEL_ARG_NAME: cl_kernel_arg_info = 0x119A;
pub const CL_KERNEL_WORK_GROUP_SIZE: cl_kernel_work_group_info = 0x11B0;
pub const CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE: cl_kernel_work_group_info = 0x11B3;

pub const CL_EVENT_COMMAND_EXECUTION_STATUS: cl_event_info = 0x11D3;

pub const CL_COMPLETE: cl_int = 0;
pub const CL_RUNNING: cl_int = 1;
pub const CL_SUBMITTED: cl_int = 2;
pub const CL_QUEUED: cl_int = 3;

pub const CL_PROFILING_COMMAND_QUEUED: cl_profiling_info = 0x1280;
pub const CL_PROFILING_COMMAND_SUBMIT: cl_profiling_info = 0x1281;
pub const CL_PROFILING_COMMAND_START: cl_profiling_info = 0x1282;
pub const CL_PROFILING_COMMAND_END: cl_profiling_info = 0x1283;

pub type ContextNotify =
    unsafe extern "C" fn(*const c_char, *const c_void, size_t, *mut c_void);
pub type ProgramNotify = unsafe extern "C" fn(cl_program, *mut c_void);

macro_rules! api {
    ($($name:ident: fn($($arg:ty),*) -> $ret:ty;)*) => {
        /// 运行时解析的平台入口函数表。
        ///
        /// 字段与 C 入口同名同型,可以直接按结构体字面量构造(测试桩即如此)。
        #[allow(non_snake_case)]
        #[derive(Clone, Copy)]
        pub struct Api {
            $(pub $name: unsafe extern "C" fn($($arg),*) -> $ret,)*
        }

        impl Api {
            /// 用调用者提供的符号查找逐项解析函数表。
            ///
            /// # Safety
            ///
            /// 查找返回的每个非空指针必须是对应入口的地址。
            pub unsafe fn from_lookup(
                mut lookup: impl FnMut(&CStr) -> *const c_void,
            ) -> Result<Self, LoadError> {
                Ok(Self {
                    $($name: {
                        let name = unsafe {
                            CStr::from_bytes_with_nul_unchecked(
                                concat!(stringify!($name), "\0").as_bytes(),
                            )
                        };
                        let ptr = lookup(name);
                        if ptr.is_null() {
                            return Err(LoadError::Symbol(stringify!($name)));
                        }
                        unsafe { transmute(ptr) }
                    },)*
                })
            }
        }
    };
}

api! {
    clGetPlatformIDs: fn(cl_uint, *mut cl_platform_id, *mut cl_uint) -> cl_int;
    clGetPlatformInfo: fn(cl_platform_id, cl_platform_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clGetDeviceIDs: fn(cl_platform_id, cl_device_type, cl_uint, *mut cl_device_id, *mut cl_uint) -> cl_int;
    clGetDeviceInfo: fn(cl_device_id, cl_device_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clCreateContext: fn(*const cl_context_properties, cl_uint, *const cl_device_id, Option<ContextNotify>, *mut c_void, *mut cl_int) -> cl_context;
    clReleaseContext: fn(cl_context) -> cl_int;
    clCreateCommandQueue: fn(cl_context, cl_device_id, cl_command_queue_properties, *mut cl_int) -> cl_command_queue;
    clReleaseCommandQueue: fn(cl_command_queue) -> cl_int;
    clCreateBuffer: fn(cl_context, cl_mem_flags, size_t, *mut c_void, *mut cl_int) -> cl_mem;
    clReleaseMemObject: fn(cl_mem) -> cl_int;
    clCreateProgramWithSource: fn(cl_context, cl_uint, *const *const c_char, *const size_t, *mut cl_int) -> cl_program;
    clBuildProgram: fn(cl_program, cl_uint, *const cl_device_id, *const c_char, Option<ProgramNotify>, *mut c_void) -> cl_int;
    clGetProgramBuildInfo: fn(cl_program, cl_device_id, cl_program_build_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clReleaseProgram: fn(cl_program) -> cl_int;
    clCreateKernel: fn(cl_program, *const c_char, *mut cl_int) -> cl_kernel;
    clSetKernelArg: fn(cl_kernel, cl_uint, size_t, *const c_void) -> cl_int;
    clGetKernelInfo: fn(cl_kernel, cl_kernel_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clGetKernelArgInfo: fn(cl_kernel, cl_uint, cl_kernel_arg_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clGetKernelWorkGroupInfo: fn(cl_kernel, cl_device_id, cl_kernel_work_group_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clReleaseKernel: fn(cl_kernel) -> cl_int;
    clCreateUserEvent: fn(cl_context, *mut cl_int) -> cl_event;
    clSetUserEventStatus: fn(cl_event, cl_int) -> cl_int;
    clGetEventInfo: fn(cl_event, cl_event_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clGetEventProfilingInfo: fn(cl_event, cl_profiling_info, size_t, *mut c_void, *mut size_t) -> cl_int;
    clWaitForEvents: fn(cl_uint, *const cl_event) -> cl_int;
    clReleaseEvent: fn(cl_event) -> cl_int;
    clEnqueueNDRangeKernel: fn(cl_command_queue, cl_kernel, cl_uint, *const size_t, *const size_t, *const size_t, cl_uint, *const cl_event, *mut cl_event) -> cl_int;
    clEnqueueReadBuffer: fn(cl_command_queue, cl_mem, cl_bool, size_t, size_t, *mut c_void, cl_uint, *const cl_event, *mut cl_event) -> cl_int;
    clEnqueueWriteBuffer: fn(cl_command_queue, cl_mem, cl_bool, size_t, size_t, *const c_void, cl_uint, *const cl_event, *mut cl_event) -> cl_int;
    clFlush: fn(cl_command_queue) -> cl_int;
    clFinish: fn(cl_command_queue) -> cl_int;
}

impl Api {
    /// 打开系统 OpenCL 库并解析全部入口。
    ///
    /// 环境变量 `OCL_LIBRARY` 可指定库路径,否则依平台惯例搜索。
    /// 库句柄存入进程级静态,解析出的入口在整个进程生命周期内有效。
    ///
    /// # Safety
    ///
    /// 打开的库必须是一个规范的 OpenCL 实现。
    pub unsafe fn load() -> Result<Self, LoadError> {
        static LIBRARY: OnceLock<Library> = OnceLock::new();
        let lib = match LIBRARY.get() {
            Some(lib) => lib,
            None => {
                let lib = unsafe { open_library() }?;
                LIBRARY.get_or_init(|| lib)
            }
        };
        unsafe {
            Self::from_lookup(
                |name| match lib.get::<*const c_void>(name.to_bytes_with_nul()) {
                    Ok(sym) => *sym,
                    Err(_) => std::ptr::null(),
                },
            )
        }
    }
}

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &["OpenCL.dll"];
#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &["/System/Library/Frameworks/OpenCL.framework/OpenCL"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATES: &[&str] = &["libOpenCL.so.1", "libOpenCL.so"];

unsafe fn open_library() -> Result<Library, LoadError> {
    if let Ok(path) = std::env::var("OCL_LIBRARY") {
        return unsafe { Library::new(path) }.map_err(LoadError::Library);
    }
    let mut last = None;
    for name in CANDIDATES {
        match unsafe { Library::new(name) } {
            Ok(lib) => return Ok(lib),
            Err(e) => last = Some(e),
        }
    }
    // CANDIDATES 非空,至少记录了一个错误
    Err(LoadError::Library(last.unwrap()))
}

/// 库打开或符号解析失败。
#[derive(Debug)]
pub enum LoadError {
    Library(libloading::Error),
    Symbol(&'static str),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Library(e) => write!(f, "failed to open OpenCL library: {e}"),
            Self::Symbol(name) => write!(f, "symbol not found in OpenCL library: {name}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Library(e) => Some(e),
            Self::Symbol(_) => None,
        }
    }
}

static API: OnceLock<Option<Api>> = OnceLock::new();

/// 安装一张现成的函数表,此后所有调用经由它分发。
///
/// 必须先于任何平台操作调用;函数表已初始化时不生效,返回 `false`。
pub fn set_api(api: Api) -> bool {
    API.set(Some(api)).is_ok()
}

/// 首次调用时尝试加载系统库,失败则告警并永久返回 `None`。
pub(crate) fn try_api() -> Option<&'static Api> {
    API.get_or_init(|| match unsafe { Api::load() } {
        Ok(api) => Some(api),
        Err(e) => {
            warn!("OpenCL is not available: {e}");
            None
        }
    })
    .as_ref()
}

/// 句柄存在即蕴含函数表已就绪。
pub(crate) fn api() -> &'static Api {
    try_api().expect("OpenCL library is not loaded")
}

#[inline]
pub(crate) const fn cl_bool(b: bool) -> cl_bool {
    if b {
        CL_TRUE
    } else {
        CL_FALSE
    }
}
