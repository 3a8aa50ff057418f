//! TIFF tag value reading.
//!
//! Values are stored either inline in the IFD entry (for small values) or at
//! an offset in the file. The whole file is in memory, so out-of-line values
//! are slices of the same buffer.

use crate::error::TiffError;

use super::parser::{ByteOrder, IfdEntry, TiffHeader};
use super::tags::FieldType;

/// Reads tag values from an in-memory TIFF file.
pub struct ValueReader<'a> {
    data: &'a [u8],
    header: &'a TiffHeader,
}

impl<'a> ValueReader<'a> {
    pub fn new(data: &'a [u8], header: &'a TiffHeader) -> Self {
        Self { data, header }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// Raw bytes of an entry's value, inline or out-of-line.
    pub fn read_bytes<'e>(&self, entry: &'e IfdEntry) -> Result<&'e [u8], TiffError>
    where
        'a: 'e,
    {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if entry.is_inline {
            return Ok(&entry.value_offset_bytes[..size as usize]);
        }

        let data: &'a [u8] = self.data;
        let offset = entry.value_offset(self.header.byte_order);
        let end = offset.checked_add(size).filter(|&end| end <= data.len() as u64);
        match end {
            Some(end) => Ok(&data[offset as usize..end as usize]),
            None => Err(TiffError::InvalidTagValue {
                tag: "value",
                message: format!(
                    "{} bytes at offset {} exceed file size {}",
                    size,
                    offset,
                    data.len()
                ),
            }),
        }
    }

    /// Read an array of unsigned integers (Byte, Short, Long or Long8).
    pub fn read_u64_array(&self, entry: &IfdEntry) -> Result<Vec<u64>, TiffError> {
        let field_type = entry
            .field_type
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        let bytes = self.read_bytes(entry)?;
        let byte_order = self.byte_order();
        let step = field_type.size_in_bytes();

        if !matches!(
            field_type,
            FieldType::Byte | FieldType::Short | FieldType::Long | FieldType::Long8
        ) {
            return Err(TiffError::InvalidTagValue {
                tag: "integer array",
                message: format!("expected an integer type, got {:?}", field_type),
            });
        }

        let values = bytes
            .chunks_exact(step)
            .map(|chunk| match field_type {
                FieldType::Byte => chunk[0] as u64,
                FieldType::Short => byte_order.read_u16(chunk) as u64,
                FieldType::Long => byte_order.read_u32(chunk) as u64,
                _ => byte_order.read_u64(chunk),
            })
            .collect();

        Ok(values)
    }

    /// Read the first value of a Rational entry as `(numerator, denominator)`.
    pub fn read_rational(&self, entry: &IfdEntry) -> Result<(u32, u32), TiffError> {
        if entry.field_type != Some(FieldType::Rational) || entry.count == 0 {
            return Err(TiffError::InvalidTagValue {
                tag: "rational",
                message: format!("expected Rational, got {:?}", entry.field_type),
            });
        }

        let bytes = self.read_bytes(entry)?;
        let byte_order = self.byte_order();
        Ok((byte_order.read_u32(&bytes[0..4]), byte_order.read_u32(&bytes[4..8])))
    }

    /// Read an ASCII string, stripping the NUL terminator and trailing whitespace.
    pub fn read_string(&self, entry: &IfdEntry) -> Result<String, TiffError> {
        if entry.field_type != Some(FieldType::Ascii) {
            return Err(TiffError::InvalidTagValue {
                tag: "string",
                message: format!("expected Ascii, got {:?}", entry.field_type),
            });
        }

        let bytes = self.read_bytes(entry)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).trim_end().to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
