use core::panic::PanicInfo;

use log::error;

pub mod qemu;
pub mod serial;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("kernel panic: {}", info);
    qemu::exit_qemu(qemu::QemuExitCode::Failed);
    super::halt()
}
