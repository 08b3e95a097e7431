//! Vesper kernel: startup sequence, serial logging and the program loader on
//! top of the cooperative scheduler in `vesper-sched`.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod boot;
pub mod loader;
pub mod logging;
pub mod programs;
