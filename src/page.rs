use crate::catalog::Schema;
use crate::common::{PageID, TransactionID, PAGE_SIZE, RID};
use crate::error::{DbError, DbResult};
use crate::tuple::Tuple;

/// Slotted page of fixed-width tuples. Layout: an occupancy bitmap of
/// `ceil(slot_count / 8)` bytes (bit k, LSB-first within each byte, is set
/// iff slot k holds a tuple), then `slot_count` tuple slots of
/// `schema.tuple_size()` bytes each, then zero padding up to PAGE_SIZE.
pub struct HeapPage {
    page_id: PageID,
    schema: Schema,
    header: Vec<u8>,
    slots: Vec<Option<Tuple>>,
    dirtied_by: Option<TransactionID>,
}

impl HeapPage {
    /// Tuples per page: one bit of header per slot, so
    /// `slot_count * (width * 8 + 1) <= PAGE_SIZE * 8`.
    pub fn slot_count(schema: &Schema) -> usize {
        (PAGE_SIZE * 8) / (schema.tuple_size() * 8 + 1)
    }

    fn header_size(slot_count: usize) -> usize {
        (slot_count + 7) / 8
    }

    pub fn new(page_id: PageID, schema: Schema) -> Self {
        let slot_count = Self::slot_count(&schema);
        Self {
            page_id,
            schema,
            header: vec![0u8; Self::header_size(slot_count)],
            slots: (0..slot_count).map(|_| None).collect(),
            dirtied_by: None,
        }
    }

    pub fn from_data(page_id: PageID, schema: Schema, data: &[u8]) -> Self {
        assert_eq!(data.len(), PAGE_SIZE);
        let slot_count = Self::slot_count(&schema);
        let header_size = Self::header_size(slot_count);
        let header = data[..header_size].to_vec();
        let tuple_size = schema.tuple_size();
        let slots = (0..slot_count)
            .map(|i| {
                if !Self::slot_bit(&header, i) {
                    return None;
                }
                let offset = header_size + i * tuple_size;
                let mut tuple = Tuple::deserialize(&schema, &data[offset..offset + tuple_size]);
                tuple.rid = Some(RID(page_id, i as u32));
                Some(tuple)
            })
            .collect();
        Self {
            page_id,
            schema,
            header,
            slots,
            dirtied_by: None,
        }
    }

    /// Exact PAGE_SIZE serialization; `from_data(data()).data()` is
    /// byte-identical.
    pub fn data(&self) -> Box<[u8]> {
        let tuple_size = self.schema.tuple_size();
        let mut data = Vec::with_capacity(PAGE_SIZE);
        data.extend_from_slice(&self.header);
        for slot in &self.slots {
            match slot {
                Some(tuple) => data.extend_from_slice(&tuple.serialize(&self.schema)),
                None => data.resize(data.len() + tuple_size, 0),
            }
        }
        data.resize(PAGE_SIZE, 0);
        data.into()
    }

    pub fn page_id(&self) -> PageID {
        self.page_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn slot_bit(header: &[u8], index: usize) -> bool {
        header[index / 8] & (1 << (index % 8)) != 0
    }

    fn set_slot_bit(header: &mut [u8], index: usize, occupied: bool) {
        let mask = 1 << (index % 8);
        if occupied {
            header[index / 8] |= mask;
        } else {
            header[index / 8] &= !mask;
        }
    }

    pub fn empty_slot_count(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| !Self::slot_bit(&self.header, *i))
            .count()
    }

    /// Places the tuple in the lowest-indexed empty slot, stamps its RID and
    /// marks the page dirty with `txn_id`.
    pub fn insert_tuple(&mut self, txn_id: TransactionID, mut tuple: Tuple) -> DbResult<RID> {
        if !tuple.fits(&self.schema) {
            return Err(DbError::Db(
                "tuple does not match the page schema".to_string(),
            ));
        }
        for index in 0..self.slots.len() {
            if Self::slot_bit(&self.header, index) {
                continue;
            }
            let rid = RID(self.page_id, index as u32);
            tuple.rid = Some(rid);
            self.slots[index] = Some(tuple);
            Self::set_slot_bit(&mut self.header, index, true);
            self.mark_dirty(txn_id);
            return Ok(rid);
        }
        Err(DbError::Db(format!(
            "no empty slot on page {:?}",
            self.page_id
        )))
    }

    pub fn delete_tuple(&mut self, txn_id: TransactionID, rid: RID) -> DbResult<()> {
        if rid.0 != self.page_id {
            return Err(DbError::Db(format!(
                "tuple {:?} does not live on page {:?}",
                rid, self.page_id
            )));
        }
        let index = rid.1 as usize;
        if index >= self.slots.len() || !Self::slot_bit(&self.header, index) {
            return Err(DbError::Db(format!("slot {} is already empty", rid.1)));
        }
        self.slots[index] = None;
        Self::set_slot_bit(&mut self.header, index, false);
        self.mark_dirty(txn_id);
        Ok(())
    }

    /// Occupied slots in ascending slot order.
    pub fn tuples(&self) -> impl Iterator<Item = &Tuple> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn mark_dirty(&mut self, txn_id: TransactionID) {
        self.dirtied_by = Some(txn_id);
    }

    pub fn mark_clean(&mut self) {
        self.dirtied_by = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirtied_by.is_some()
    }

    pub fn dirtied_by(&self) -> Option<TransactionID> {
        self.dirtied_by
    }
}
