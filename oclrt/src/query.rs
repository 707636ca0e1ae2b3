//! 信息查询的两步协议:先探尺寸,再按探得的精确尺寸取值。

use crate::{
    bindings::{cl_int, size_t},
    error::{check, Error},
};
use std::{ffi::c_void, ptr::null_mut};

/// 变长字符串查询。首步得到的尺寸含结尾 NUL,第二步原样传回。
pub(crate) fn string(
    mut get: impl FnMut(size_t, *mut c_void, *mut size_t) -> cl_int,
) -> Result<String, Error> {
    let mut size = 0;
    check(get(0, null_mut(), &mut size))?;
    if size == 0 {
        return Ok(String::new());
    }
    let mut bytes = vec![0u8; size];
    check(get(size, bytes.as_mut_ptr().cast(), null_mut()))?;
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 定长标量查询。
pub(crate) fn value<T: Default>(
    mut get: impl FnMut(size_t, *mut c_void, *mut size_t) -> cl_int,
) -> Result<T, Error> {
    let mut value = T::default();
    check(get(
        size_of::<T>(),
        (&mut value as *mut T).cast(),
        null_mut(),
    ))?;
    Ok(value)
}
