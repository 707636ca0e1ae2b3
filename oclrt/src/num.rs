//! 数值类别登记表。
//!
//! 封送标量实参、为缓冲区定尺寸、在内核源码里拼类型名,
//! 都从这张表取宽度和名字,三处使用同一事实。

/// 受支持的标量数值类别。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NumType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    I64,
    U64,
    F64,
    Usize,
}

impl NumType {
    pub const ALL: [Self; 11] = [
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::F32,
        Self::I64,
        Self::U64,
        Self::F64,
        Self::Usize,
    ];

    /// 宿主内存中的字节宽度,逐字节封送时载荷长度必须等于它。
    #[inline]
    pub const fn nbytes(self) -> usize {
        match self {
            Self::I8 | Self::U8 => size_of::<u8>(),
            Self::I16 | Self::U16 => size_of::<u16>(),
            Self::I32 | Self::U32 | Self::F32 => size_of::<u32>(),
            Self::I64 | Self::U64 | Self::F64 => size_of::<u64>(),
            Self::Usize => size_of::<usize>(),
        }
    }

    /// 内核源码中的类型名。
    #[inline]
    pub const fn cl_name(self) -> &'static str {
        match self {
            Self::I8 => "char",
            Self::U8 => "uchar",
            Self::I16 => "short",
            Self::U16 => "ushort",
            Self::I32 => "int",
            Self::U32 => "uint",
            Self::F32 => "float",
            Self::I64 => "long",
            Self::U64 => "ulong",
            Self::F64 => "double",
            Self::Usize => "size_t",
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// 可充当缓冲区元素和标量实参的宿主类型。
///
/// 实现集与 [`NumType`] 一一对应,且 `size_of::<T>() == T::KIND.nbytes()`,
/// 这是按元素数换算字节数的前提,因此本特质不对外开放实现。
pub trait NumTyped: Copy + sealed::Sealed {
    const KIND: NumType;
}

macro_rules! num_typed {
    ($($ty:ty => $kind:ident)*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl NumTyped for $ty {
                const KIND: NumType = NumType::$kind;
            }
        )*
    };
}

num_typed! {
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

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn width_matches<T: NumTyped>() {
        assert_eq!(size_of::<T>(), T::KIND.nbytes())
    }

    #[test]
    fn test_nbytes() {
        width_matches::<i8>();
        width_matches::<u8>();
        width_matches::<i16>();
        width_matches::<u16>();
        width_matches::<i32>();
        width_matches::<u32>();
        width_matches::<f32>();
        width_matches::<i64>();
        width_matches::<u64>();
        width_matches::<f64>();
        width_matches::<usize>();
    }

    #[test]
    fn test_cl_names() {
        let names = NumType::ALL.map(NumType::cl_name);
        assert!(names.iter().all(|name| !name.is_empty()));
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), names.len());
        assert_eq!(NumType::F32.cl_name(), "float");
        assert_eq!(NumType::Usize.cl_name(), "size_t");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(<f32 as NumTyped>::KIND, NumType::F32);
        assert_eq!(<usize as NumTyped>::KIND, NumType::Usize);
        assert_eq!(NumType::ALL.len(), 11);
    }
}
