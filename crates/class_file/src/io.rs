use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Big-endian `u1`/`u2`/`u4` reads as named by the class file format.
pub trait ReadClassExt: Read {
    fn read_u1(&mut self) -> Result<u8> {
        Ok(ReadBytesExt::read_u8(self)?)
    }

    fn read_u2(&mut self) -> Result<u16> {
        Ok(ReadBytesExt::read_u16::<Endian>(self)?)
    }

    fn read_u4(&mut self) -> Result<u32> {
        Ok(ReadBytesExt::read_u32::<Endian>(self)?)
    }

    /// Reads exactly `len` bytes. The buffer only grows as far as the stream
    /// actually yields, so a bogus length cannot trigger a huge allocation.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        Read::take(&mut *self, len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(ClassFileError::UnexpectedEndOfStream);
        }

        Ok(buf)
    }
}
impl<R: Read + ?Sized> ReadClassExt for R {}

pub trait WriteClassExt: Write {
    fn write_u1(&mut self, n: u8) -> Result<()> {
        Ok(WriteBytesExt::write_u8(self, n)?)
    }

    fn write_u2(&mut self, n: u16) -> Result<()> {
        Ok(WriteBytesExt::write_u16::<Endian>(self, n)?)
    }

    fn write_u4(&mut self, n: u32) -> Result<()> {
        Ok(WriteBytesExt::write_u32::<Endian>(self, n)?)
    }

    /// Writes a `u2` count prefix for a collection of `len` items.
    fn write_count(&mut self, len: usize, what: &'static str) -> Result<()> {
        let count = u16::try_from(len).map_err(|_| ClassFileError::CollectionTooLarge { what, len })?;
        self.write_u2(count)
    }

    /// Writes a `u4` length prefix for a blob of `len` bytes.
    fn write_length(&mut self, len: usize, what: &'static str) -> Result<()> {
        let length = u32::try_from(len).map_err(|_| ClassFileError::CollectionTooLarge { what, len })?;
        self.write_u4(length)
    }
}
impl<W: Write + ?Sized> WriteClassExt for W {}
