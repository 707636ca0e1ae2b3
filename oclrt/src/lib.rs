//! OpenCL 主机侧运行时的安全包装。
//!
//! 原生接口以裸句柄、状态码和手工释放工作,本层把三者各自换成
//! Rust 的表达:
//!
//! - 句柄所有权交给 RAII 包装,释放点唯一,重复释放无从表达;
//! - 状态码进封闭的 [`Error`] 集,任何码都有确定的翻译;
//! - 内核实参收进和类型 [`Arg`],封送宽度查数值登记表 [`NumType`]。
//!
//! 平台库在运行时加载,没装驱动的宿主上 [`Platform::all`] 给出空集,
//! 依赖方可以把"无设备"当作正常环境处理。

mod context;
mod device;
mod error;
mod event;
mod kernel;
mod mem;
mod num;
mod platform;
mod program;
mod query;
mod queue;

pub mod bindings;

pub use context::Context;
pub use device::{Device, DeviceType};
pub use error::{check, Error};
pub use event::{wait_for_events, Event, ProfilingInfo, WaitList};
pub use kernel::{Arg, Kernel, Scalar};
pub use mem::{MemFlags, MemObject};
pub use num::{NumType, NumTyped};
pub use platform::Platform;
pub use program::{BuildError, Program};
pub use queue::{CommandQueue, QueueProperties};

/// 暴露原生句柄。
pub trait AsRaw {
    /// 原生句柄类型。
    type Raw;
    /// # Safety
    ///
    /// 句柄的所有权仍归包装值,调用者不得释放它,
    /// 也不得在包装值失效后继续使用。
    unsafe fn as_raw(&self) -> Self::Raw;
}
