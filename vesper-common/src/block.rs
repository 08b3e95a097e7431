//! Sector-level storage interface.
//!
//! The disk driver implements this and the file-system layer consumes it.
//! The scheduler never touches storage; the trait lives here so both sides
//! of that boundary agree on it without depending on each other.

use core::fmt;

/// Bytes per sector.
pub const SECTOR_SIZE: usize = 512;

/// A single sector buffer.
pub type Sector = [u8; SECTOR_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// The device reported an error or returned a bad status.
    Io,
    /// The LBA is past the end of the device.
    OutOfRange,
    /// No device is attached.
    NotFound,
    /// The device did not become ready in time.
    TimeOut,
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::Io => write!(f, "device I/O error"),
            BlockError::OutOfRange => write!(f, "sector out of range"),
            BlockError::NotFound => write!(f, "no such device"),
            BlockError::TimeOut => write!(f, "device timed out"),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = ::core::result::Result<T, BlockError>;

/// Synchronous whole-sector access addressed by LBA.
///
/// A transfer either moves the full sector or fails; there are no partial
/// reads or writes.
pub trait BlockDevice {
    /// Read sector `lba` into `buf`.
    fn read_sector(&mut self, lba: u32, buf: &mut Sector) -> Result<()>;

    /// Write `buf` to sector `lba`.
    fn write_sector(&mut self, lba: u32, buf: &Sector) -> Result<()>;

    /// Number of addressable sectors.
    fn sector_count(&self) -> u32;
}

impl<T: BlockDevice + ?Sized> BlockDevice for &mut T {
    fn read_sector(&mut self, lba: u32, buf: &mut Sector) -> Result<()> {
        (**self).read_sector(lba, buf)
    }

    fn write_sector(&mut self, lba: u32, buf: &Sector) -> Result<()> {
        (**self).write_sector(lba, buf)
    }

    fn sector_count(&self) -> u32 {
        (**self).sector_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MemoryDisk {
        sectors: Vec<Sector>,
    }

    impl BlockDevice for MemoryDisk {
        fn read_sector(&mut self, lba: u32, buf: &mut Sector) -> Result<()> {
            let sector = self
                .sectors
                .get(lba as usize)
                .ok_or(BlockError::OutOfRange)?;
            buf.copy_from_slice(sector);
            Ok(())
        }

        fn write_sector(&mut self, lba: u32, buf: &Sector) -> Result<()> {
            let sector = self
                .sectors
                .get_mut(lba as usize)
                .ok_or(BlockError::OutOfRange)?;
            sector.copy_from_slice(buf);
            Ok(())
        }

        fn sector_count(&self) -> u32 {
            self.sectors.len() as u32
        }
    }

    fn copy_sector<D: BlockDevice>(mut dev: D, from: u32, to: u32) -> Result<()> {
        let mut buf = [0u8; SECTOR_SIZE];
        dev.read_sector(from, &mut buf)?;
        dev.write_sector(to, &buf)
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        let mut disk = MemoryDisk {
            sectors: vec![[0u8; SECTOR_SIZE]; 4],
        };
        disk.sectors[1][0] = 0x55;
        disk.sectors[1][511] = 0xaa;

        copy_sector(&mut disk, 1, 3).unwrap();

        assert_eq!(disk.sectors[3][0], 0x55);
        assert_eq!(disk.sectors[3][511], 0xaa);
        assert_eq!((&mut disk).sector_count(), 4);
    }

    #[test]
    fn test_out_of_range_leaves_buffer_untouched() {
        let mut disk = MemoryDisk {
            sectors: vec![[7u8; SECTOR_SIZE]; 1],
        };
        let mut buf = [1u8; SECTOR_SIZE];

        assert_eq!(disk.read_sector(1, &mut buf), Err(BlockError::OutOfRange));
        assert!(buf.iter().all(|&b| b == 1));
        assert_eq!(copy_sector(&mut disk, 0, 9), Err(BlockError::OutOfRange));
    }
}
