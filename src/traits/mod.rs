pub mod device;
pub mod preference;

pub use device::*;
pub use preference::*;
