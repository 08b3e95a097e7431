//! Kernel startup: bring up logging and the scheduler, start the built-in
//! programs, then keep yielding from the root task until they are all gone.

use log::{info, warn};

use crate::{arch, loader, logging};

/// Programs started at boot, in order.
pub const BOOT_PROGRAMS: &[&[u8]] = &[b"hello", b"ticker"];

pub fn kernel_main() -> ! {
    logging::init();
    info!("vesper booting");

    vesper_sched::init();

    for name in BOOT_PROGRAMS {
        if let Err(err) = loader::run_program(name) {
            warn!("boot program skipped: {}", err);
        }
    }

    // root task idles here
    while vesper_sched::runnable_count() > 0 {
        vesper_sched::schedule();
    }

    info!("all tasks finished, shutting down");
    arch::shutdown()
}
