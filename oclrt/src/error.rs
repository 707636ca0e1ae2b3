//! 平台状态码的封闭翻译。
//!
//! 任何有符号状态码都有确定的翻译结果:识别的码映射到具名变体,
//! 未识别的码保留原值落入 [`Error::Other`],翻译永不失败。

use crate::bindings::{cl_int, CL_SUCCESS};
use std::fmt;

macro_rules! errors {
    ($($variant:ident = $code:literal, $msg:literal;)*) => {
        /// 平台状态码对应的错误。
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum Error {
            $($variant,)*
            /// 平台报告成功,却交回空句柄。
            Unknown,
            /// 识别集之外的状态码,原值保留。
            Other(cl_int),
        }

        impl Error {
            /// 翻译一个非成功状态码。
            #[inline]
            pub const fn from_raw(code: cl_int) -> Self {
                match code {
                    $($code => Self::$variant,)*
                    _ => Self::Other(code),
                }
            }

            /// 对应的平台状态码。[`Unknown`](Self::Unknown) 不源自状态码,没有对应值。
            #[inline]
            pub const fn raw(self) -> Option<cl_int> {
                match self {
                    $(Self::$variant => Some($code),)*
                    Self::Unknown => None,
                    Self::Other(code) => Some(code),
                }
            }
        }

        impl fmt::Display for Error {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self {
                    $(Self::$variant => f.write_str(concat!("cl: ", $msg)),)*
                    Self::Unknown => f.write_str("cl: unknown error"),
                    Self::Other(code) => write!(f, "cl: error {code}"),
                }
            }
        }
    };
}

errors! {
    DeviceNotFound = -1, "Device Not Found";
    DeviceNotAvailable = -2, "Device Not Available";
    CompilerNotAvailable = -3, "Compiler Not Available";
    MemObjectAllocationFailure = -4, "Mem Object Allocation Failure";
    OutOfResources = -5, "Out Of Resources";
    OutOfHostMemory = -6, "Out Of Host Memory";
    ProfilingInfoNotAvailable = -7, "Profiling Info Not Available";
    MemCopyOverlap = -8, "Mem Copy Overlap";
    ImageFormatMismatch = -9, "Image Format Mismatch";
    ImageFormatNotSupported = -10, "Image Format Not Supported";
    BuildProgramFailure = -11, "Build Program Failure";
    MapFailure = -12, "Map Failure";
    MisalignedSubBufferOffset = -13, "Misaligned Sub Buffer Offset";
    ExecStatusErrorForEventsInWaitList = -14, "Exec Status Error For Events In Wait List";
    CompileProgramFailure = -15, "Compile Program Failure";
    LinkerNotAvailable = -16, "Linker Not Available";
    LinkProgramFailure = -17, "Link Program Failure";
    DevicePartitionFailed = -18, "Device Partition Failed";
    KernelArgInfoNotAvailable = -19, "Kernel Arg Info Not Available";
    InvalidValue = -30, "Invalid Value";
    InvalidDeviceType = -31, "Invalid Device Type";
    InvalidPlatform = -32, "Invalid Platform";
    InvalidDevice = -33, "Invalid Device";
    InvalidContext = -34, "Invalid Context";
    InvalidQueueProperties = -35, "Invalid Queue Properties";
    InvalidCommandQueue = -36, "Invalid Command Queue";
    InvalidHostPtr = -37, "Invalid Host Ptr";
    InvalidMemObject = -38, "Invalid Mem Object";
    InvalidImageFormatDescriptor = -39, "Invalid Image Format Descriptor";
    InvalidImageSize = -40, "Invalid Image Size";
    InvalidSampler = -41, "Invalid Sampler";
    InvalidBinary = -42, "Invalid Binary";
    InvalidBuildOptions = -43, "Invalid Build Options";
    InvalidProgram = -44, "Invalid Program";
    InvalidProgramExecutable = -45, "Invalid Program Executable";
    InvalidKernelName = -46, "Invalid Kernel Name";
    InvalidKernelDefinition = -47, "Invalid Kernel Definition";
    InvalidKernel = -48, "Invalid Kernel";
    InvalidArgIndex = -49, "Invalid Arg Index";
    InvalidArgValue = -50, "Invalid Arg Value";
    InvalidArgSize = -51, "Invalid Arg Size";
    InvalidKernelArgs = -52, "Invalid Kernel Args";
    InvalidWorkDimension = -53, "Invalid Work Dimension";
    InvalidWorkGroupSize = -54, "Invalid Work Group Size";
    InvalidWorkItemSize = -55, "Invalid Work Item Size";
    InvalidGlobalOffset = -56, "Invalid Global Offset";
    InvalidEventWaitList = -57, "Invalid Event Wait List";
    InvalidEvent = -58, "Invalid Event";
    InvalidOperation = -59, "Invalid Operation";
    InvalidGlObject = -60, "Invalid GL Object";
    InvalidBufferSize = -61, "Invalid Buffer Size";
    InvalidMipLevel = -62, "Invalid Mip Level";
    InvalidGlobalWorkSize = -63, "Invalid Global Work Size";
    InvalidProperty = -64, "Invalid Property";
    InvalidImageDescriptor = -65, "Invalid Image Descriptor";
    InvalidCompilerOptions = -66, "Invalid Compiler Options";
    InvalidLinkerOptions = -67, "Invalid Linker Options";
    InvalidDevicePartitionCount = -68, "Invalid Device Partition Count";
}

impl std::error::Error for Error {}

/// 成功状态化为 `Ok`,其余一律翻译。
#[inline]
pub fn check(code: cl_int) -> Result<(), Error> {
    if code == CL_SUCCESS {
        Ok(())
    } else {
        Err(Error::from_raw(code))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_success() {
        assert!(check(CL_SUCCESS).is_ok());
        assert_eq!(check(-1), Err(Error::DeviceNotFound));
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(Error::from_raw(-1), Error::DeviceNotFound);
        assert_eq!(Error::from_raw(-11), Error::BuildProgramFailure);
        assert_eq!(Error::from_raw(-54), Error::InvalidWorkGroupSize);
        assert_eq!(Error::from_raw(-68), Error::InvalidDevicePartitionCount);
        assert_eq!(Error::DeviceNotFound.raw(), Some(-1));
        assert_eq!(Error::InvalidKernelName.raw(), Some(-46));
    }

    #[test]
    fn test_unrecognized_codes() {
        // -20..=-29 是编号空洞,正数不是合法状态
        assert_eq!(Error::from_raw(-20), Error::Other(-20));
        assert_eq!(Error::from_raw(-29), Error::Other(-29));
        assert_eq!(Error::from_raw(-9999), Error::Other(-9999));
        assert_eq!(Error::from_raw(1), Error::Other(1));
        assert_eq!(Error::Other(-1001).raw(), Some(-1001));
        assert_eq!(Error::Unknown.raw(), None);
    }

    #[test]
    fn test_total() {
        for code in -2000..=100 {
            match Error::from_raw(code) {
                Error::Other(c) => assert_eq!(c, code),
                e => assert_eq!(e.raw(), Some(code)),
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::DeviceNotFound.to_string(), "cl: Device Not Found");
        assert_eq!(Error::Unknown.to_string(), "cl: unknown error");
        assert_eq!(Error::Other(-100).to_string(), "cl: error -100");
    }
}
