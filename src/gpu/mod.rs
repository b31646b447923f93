pub mod context;
pub mod device;
pub mod page;

pub use context::GpuContext;
pub use device::{WgpuDevice, WgpuFactory};
pub use page::{PageHost, StageImage};
