use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::common::PAGE_SIZE;
use crate::error::DbResult;

/// Page-granular access to one table's backing file. Page k lives at byte
/// offset k * PAGE_SIZE; there is no file header.
pub struct DiskManager {
    file: Mutex<File>,
}

impl DiskManager {
    pub fn open(path: &Path) -> DbResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Reads page `page_no` into `data`. An offset at or past end-of-file
    /// yields a zero-filled page and extends the file up to it, which is
    /// how the insert path grows the file without a separate append step.
    /// A zero page deserializes as an empty page (all occupancy bits
    /// clear), so extension never exposes uncommitted tuple data.
    pub fn read_page(&self, page_no: u32, data: &mut [u8]) -> DbResult<()> {
        assert_eq!(data.len(), PAGE_SIZE);
        let mut file = self.file.lock().unwrap();
        let mut num_pages = file.metadata()?.len().div_ceil(PAGE_SIZE as u64);
        while num_pages <= page_no as u64 {
            file.seek(SeekFrom::Start(num_pages * PAGE_SIZE as u64))?;
            file.write_all(&[0u8; PAGE_SIZE])?;
            num_pages += 1;
        }
        file.seek(SeekFrom::Start(page_no as u64 * PAGE_SIZE as u64))?;
        file.read_exact(data)?;
        Ok(())
    }

    pub fn write_page(&self, page_no: u32, data: &[u8]) -> DbResult<()> {
        assert_eq!(data.len(), PAGE_SIZE);
        let mut file = self.file.lock().unwrap();
        let offset = page_no as u64 * PAGE_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    }

    pub fn num_pages(&self) -> DbResult<u32> {
        let file = self.file.lock().unwrap();
        let len = file.metadata()?.len();
        Ok(len.div_ceil(PAGE_SIZE as u64) as u32)
    }
}
