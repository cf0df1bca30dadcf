//! Fixed-slot heap page format.
//!
//! A page holds as many fixed-size record slots as fit next to a one-bit-per-slot
//! occupancy header:
//!
//! ```text
//! +----------------------+--------+--------+-----+------------+
//! | header (bitmap)      | slot 0 | slot 1 | ... | zero pad   |
//! +----------------------+--------+--------+-----+------------+
//! ```
//!
//! Bit `i` of the header lives in byte `i / 8` at bit position `i % 8` (least
//! significant bit first) and is set when slot `i` holds a record. Slots are laid
//! out back to back, each `schema.size()` bytes wide.

use crate::access::schema::Schema;
use crate::access::tuple::{RecordId, Tuple};
use crate::access::value::Value;
use crate::error::{DbError, DbResult};
use crate::storage::page::PageId;
use crate::storage::PAGE_SIZE;
use std::io::Cursor;
use std::sync::Arc;

/// A page decoded into the records of its occupied slots.
#[derive(Debug, Clone)]
pub struct HeapPage {
    page_id: PageId,
    num_slots: usize,
    tuples: Vec<Tuple>,
}

impl HeapPage {
    /// Number of record slots a page offers for records laid out by `schema`.
    pub fn slots_per_page(schema: &Schema) -> usize {
        (PAGE_SIZE * 8) / (schema.size() * 8 + 1)
    }

    /// Bytes used by the occupancy bitmap for `num_slots` slots.
    pub fn header_len(num_slots: usize) -> usize {
        num_slots.div_ceil(8)
    }

    pub fn decode(page_id: PageId, data: &[u8], schema: Arc<Schema>) -> DbResult<Self> {
        if data.len() != PAGE_SIZE {
            return Err(DbError::CorruptPage {
                page_id,
                reason: format!("expected {} bytes, got {}", PAGE_SIZE, data.len()),
            });
        }

        let num_slots = Self::slots_per_page(&schema);
        let header_len = Self::header_len(num_slots);
        let record_size = schema.size();

        let mut tuples = Vec::new();
        for slot in 0..num_slots {
            if data[slot / 8] & (1 << (slot % 8)) == 0 {
                continue;
            }

            let offset = header_len + slot * record_size;
            let mut reader = Cursor::new(&data[offset..offset + record_size]);
            let mut tuple = Tuple::new(schema.clone());
            for (i, field) in schema.iter().enumerate() {
                let value = field
                    .field_type
                    .read_value(&mut reader)
                    .map_err(|e| DbError::CorruptPage {
                        page_id,
                        reason: format!("slot {} field {}: {}", slot, i, e),
                    })?;
                tuple.set_field(i, value)?;
            }
            tuple.set_record_id(Some(RecordId::new(page_id, slot as u16)));
            tuples.push(tuple);
        }

        Ok(Self {
            page_id,
            num_slots,
            tuples,
        })
    }

    /// Lay `records` out in slots `0..records.len()` of a fresh page image.
    pub fn encode(schema: &Schema, records: &[Vec<Value>]) -> DbResult<Vec<u8>> {
        let num_slots = Self::slots_per_page(schema);
        if records.len() > num_slots {
            return Err(DbError::InvalidArgument(format!(
                "{} records do not fit in a page of {} slots",
                records.len(),
                num_slots
            )));
        }

        let header_len = Self::header_len(num_slots);
        let record_size = schema.size();
        let mut data = Self::empty_page_data();

        for (slot, record) in records.iter().enumerate() {
            if record.len() != schema.num_fields() {
                return Err(DbError::InvalidArgument(format!(
                    "record has {} values, schema has {} fields",
                    record.len(),
                    schema.num_fields()
                )));
            }

            let mut buf = Vec::with_capacity(record_size);
            for (value, field) in record.iter().zip(schema.iter()) {
                if value.field_type() != field.field_type {
                    return Err(DbError::TypeMismatch {
                        expected: field.field_type.to_string(),
                        actual: value.field_type().to_string(),
                    });
                }
                value.write_to(&mut buf)?;
            }

            let offset = header_len + slot * record_size;
            data[offset..offset + record_size].copy_from_slice(&buf);
            data[slot / 8] |= 1 << (slot % 8);
        }

        Ok(data)
    }

    /// A page image with no occupied slots.
    pub fn empty_page_data() -> Vec<u8> {
        vec![0u8; PAGE_SIZE]
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn num_empty_slots(&self) -> usize {
        self.num_slots - self.tuples.len()
    }

    /// Records of the occupied slots, in slot order.
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::value::FieldType;
    use anyhow::Result;

    fn int_pair() -> Arc<Schema> {
        Arc::new(Schema::from_types(&[FieldType::Int, FieldType::Int]).unwrap())
    }

    #[test]
    fn test_slot_arithmetic() {
        // 8-byte records: floor(32768 / 65) = 504 slots, 63 header bytes
        let schema = int_pair();
        assert_eq!(HeapPage::slots_per_page(&schema), 504);
        assert_eq!(HeapPage::header_len(504), 63);
        assert_eq!(HeapPage::header_len(505), 64);
    }

    #[test]
    fn test_empty_page() -> Result<()> {
        let page = HeapPage::decode(PageId::new(1, 0), &HeapPage::empty_page_data(), int_pair())?;
        assert!(page.is_empty());
        assert_eq!(page.num_empty_slots(), page.num_slots());
        Ok(())
    }

    #[test]
    fn test_encode_decode_records() -> Result<()> {
        let schema = int_pair();
        let records = vec![
            vec![Value::Int(1), Value::Int(10)],
            vec![Value::Int(2), Value::Int(20)],
            vec![Value::Int(3), Value::Int(30)],
        ];
        let data = HeapPage::encode(&schema, &records)?;
        let page = HeapPage::decode(PageId::new(4, 2), &data, schema)?;

        assert_eq!(page.len(), 3);
        assert_eq!(page.page_id(), PageId::new(4, 2));
        for (slot, tuple) in page.tuples().iter().enumerate() {
            assert_eq!(
                tuple.record_id(),
                Some(RecordId::new(PageId::new(4, 2), slot as u16))
            );
            assert_eq!(tuple.get_field(0)?, Some(&records[slot][0]));
            assert_eq!(tuple.get_field(1)?, Some(&records[slot][1]));
        }
        Ok(())
    }

    #[test]
    fn test_header_bits_select_slots() -> Result<()> {
        let schema = int_pair();
        let records: Vec<Vec<Value>> =
            (0..10).map(|i| vec![Value::Int(i), Value::Int(-i)]).collect();
        let mut data = HeapPage::encode(&schema, &records)?;

        // Clear slots 0 and 9 in the bitmap
        data[0] &= !1;
        data[1] &= !(1 << 1);

        let page = HeapPage::decode(PageId::new(1, 0), &data, schema)?;
        assert_eq!(page.len(), 8);
        assert_eq!(page.tuples()[0].get_field(0)?, Some(&Value::Int(1)));
        assert_eq!(page.tuples()[7].get_field(0)?, Some(&Value::Int(8)));
        Ok(())
    }

    #[test]
    fn test_full_page() -> Result<()> {
        let schema = int_pair();
        let slots = HeapPage::slots_per_page(&schema);
        let records: Vec<Vec<Value>> = (0..slots as i32)
            .map(|i| vec![Value::Int(i), Value::Int(i)])
            .collect();

        let data = HeapPage::encode(&schema, &records)?;
        let page = HeapPage::decode(PageId::new(1, 0), &data, schema.clone())?;
        assert_eq!(page.len(), slots);
        assert_eq!(page.num_empty_slots(), 0);

        let mut too_many = records.clone();
        too_many.push(vec![Value::Int(0), Value::Int(0)]);
        assert!(HeapPage::encode(&schema, &too_many).is_err());
        Ok(())
    }

    #[test]
    fn test_encode_rejects_mismatched_records() {
        let schema = int_pair();
        assert!(HeapPage::encode(&schema, &[vec![Value::Int(1)]]).is_err());
        assert!(matches!(
            HeapPage::encode(&schema, &[vec![Value::Int(1), Value::String("x".into())]]),
            Err(DbError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_wrong_size() {
        let result = HeapPage::decode(PageId::new(1, 0), &[0u8; 100], int_pair());
        assert!(matches!(result, Err(DbError::CorruptPage { .. })));
    }

    #[test]
    fn test_decode_corrupt_string() -> Result<()> {
        let schema = Arc::new(Schema::from_types(&[FieldType::String])?);
        let mut data = HeapPage::encode(&schema, &[vec![Value::String("ok".into())]])?;
        let header_len = HeapPage::header_len(HeapPage::slots_per_page(&schema));
        // Length prefix larger than the payload area
        data[header_len..header_len + 4].copy_from_slice(&500u32.to_be_bytes());

        let result = HeapPage::decode(PageId::new(1, 0), &data, schema);
        assert!(matches!(result, Err(DbError::CorruptPage { .. })));
        Ok(())
    }
}
