#![no_std]
#![no_main]

use bootloader_api::{BootInfo, entry_point};

entry_point!(kernel);

/// This is the entry point for the x86-64 kernel.
fn kernel(_boot_info: &'static mut BootInfo) -> ! {
    vesper_kernel::boot::kernel_main()
}
