//! Forward-only record cursor over an in-memory track file.

use std::io::Cursor;

use binrw::{BinRead, Endian};

use crate::error::{Error, Result};

/// A fixed-size on-disk record.
pub trait Record: for<'a> BinRead<Args<'a> = ()> {
    /// Name used in error messages.
    const NAME: &'static str;
    /// Exact number of bytes one record occupies.
    const SIZE: usize;
}

/// Little-endian cursor that only ever moves forward.
pub struct RecordReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> u64 {
        (self.cursor.get_ref().len() as u64).saturating_sub(self.cursor.position())
    }

    fn ensure(&self, record: &'static str, needed: u64) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(Error::TruncatedInput {
                record,
                position: self.position(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    /// Read one fixed-size record.
    pub fn record<T: Record>(&mut self) -> Result<T> {
        self.ensure(T::NAME, T::SIZE as u64)?;
        let start = self.position();
        T::read_options(&mut self.cursor, Endian::Little, ()).map_err(|err| {
            if err.is_eof() {
                Error::TruncatedInput {
                    record: T::NAME,
                    position: start,
                    needed: T::SIZE as u64,
                    remaining: self.remaining(),
                }
            } else {
                Error::Binary(err)
            }
        })
    }

    /// Read `count` consecutive records. The whole run is bounds-checked
    /// before anything is allocated.
    pub fn records<T: Record>(&mut self, count: usize) -> Result<Vec<T>> {
        let needed = (count as u64).saturating_mul(T::SIZE as u64);
        self.ensure(T::NAME, needed)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.record::<T>()?);
        }
        Ok(out)
    }

    /// Read an i32 count prefix, rejecting negative values.
    pub fn count(&mut self, field: &'static str) -> Result<usize> {
        let position = self.position();
        let count = self.i32(field)?;
        usize::try_from(count).map_err(|_| Error::InvalidCount {
            field,
            count: count as i64,
            position,
        })
    }

    pub fn i32(&mut self, field: &'static str) -> Result<i32> {
        Ok(i32::from_le_bytes(self.bytes::<4>(field)?))
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.bytes::<4>(field)?))
    }

    pub fn i16(&mut self, field: &'static str) -> Result<i16> {
        Ok(i16::from_le_bytes(self.bytes::<2>(field)?))
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.bytes::<1>(field)?[0])
    }

    pub fn bytes<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        self.ensure(field, N as u64)?;
        let start = self.cursor.position() as usize;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.cursor.get_ref()[start..start + N]);
        self.cursor.set_position((start + N) as u64);
        Ok(buf)
    }

    /// Skip forward to an absolute offset. Offsets behind the cursor are an
    /// error: the format is never re-read.
    pub fn skip_to(&mut self, field: &'static str, offset: u64) -> Result<()> {
        let position = self.position();
        if offset < position {
            return Err(Error::CountMismatch {
                field,
                first: offset as i64,
                second: position as i64,
                position,
            });
        }
        self.ensure(field, offset - position)?;
        self.cursor.set_position(offset);
        Ok(())
    }

    pub fn skip(&mut self, field: &'static str, len: u64) -> Result<()> {
        let target = self.position() + len;
        self.skip_to(field, target)
    }
}
