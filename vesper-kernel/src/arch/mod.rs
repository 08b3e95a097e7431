use core::fmt;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86;

/// Write formatted text to the kernel console.
///
/// Hosted builds have no console and drop the output.
pub fn console_print(args: fmt::Arguments) {
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    x86::serial::_print(args);

    #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
    let _ = args;
}

/// Stop the machine for good.
pub fn shutdown() -> ! {
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    x86::qemu::exit_qemu(x86::qemu::QemuExitCode::Success);

    halt()
}

pub fn halt() -> ! {
    loop {
        #[cfg(all(target_arch = "x86_64", target_os = "none"))]
        x86_64::instructions::hlt();

        #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
        core::hint::spin_loop();
    }
}
