/// Graphics device module - backend-agnostic buffers, draws and compute

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod command_list;
pub mod compute;

// Software device (no GPU required)
pub mod mock_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use command_list::*;
pub use compute::*;


#[cfg(test)]
#[path = "command_list_tests.rs"]
mod command_list_tests;
