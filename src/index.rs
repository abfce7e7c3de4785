//! Open-addressing minimizer hash table, per §4.E.
//!
//! Layout and serialization style are grounded on the corpus's own
//! on-disk hash table (`eric9n-Kun-peng/src/compact_hash.rs`): power-of-two
//! capacity, linear probing, and a little-endian `byteorder` wire format.
//! Unlike that table, cell values here can be multi-valued, so each cell
//! carries a shape bit distinguishing an inline singleton position from an
//! index into an out-of-line value-list arena (indices, not pointers, so
//! rehash and serialize are a plain copy — see the Design Notes).

use std::collections::HashMap;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::canonical::hash64;
use crate::error::{GraphIndexError, Result};
use crate::kmer::{K_MAX, NO_KEY};
use crate::minimizer::Minimizer;
use crate::position::NO_VALUE;

const INITIAL_CAPACITY: usize = 1024;
const MAX_LOAD_FACTOR: f64 = 0.77;
const MAGIC: &[u8; 4] = b"MIDX";
const FORMAT_VERSION: u32 = 1;

/// Validated `(k, w)` parameters for a [`MinimizerIndex`].
///
/// Defaults (`k=29, w=11`) match the historical defaults of the indexing
/// scheme this crate's minimizer machinery descends from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimizerIndexParams {
    pub k: usize,
    pub w: usize,
}

impl Default for MinimizerIndexParams {
    fn default() -> Self {
        Self { k: 29, w: 11 }
    }
}

impl MinimizerIndexParams {
    /// Validates `k` against [`K_MAX`] and rejects `w == 0`.
    pub fn new(k: usize, w: usize) -> Result<Self> {
        if k == 0 || k > K_MAX {
            log::error!("invalid minimizer index parameter: k={k} (must be 1..={K_MAX})");
            return Err(GraphIndexError::InvalidParameter(format!(
                "k must be in 1..={K_MAX}, got {k}"
            )));
        }
        if w == 0 {
            log::error!("invalid minimizer index parameter: w=0");
            return Err(GraphIndexError::InvalidParameter(
                "w must be >= 1".to_string(),
            ));
        }
        Ok(Self { k, w })
    }
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    key: u64,
    payload: u64,
    is_multi: bool,
}

impl Cell {
    const EMPTY: Cell = Cell {
        key: NO_KEY,
        payload: 0,
        is_multi: false,
    };

    fn is_empty(&self) -> bool {
        self.key == NO_KEY
    }
}

/// The minimizer `-> {graph position}` hash table.
#[derive(Clone, Debug)]
pub struct MinimizerIndex {
    k: usize,
    w: usize,
    capacity: usize,
    cells: Vec<Cell>,
    arena: Vec<Vec<u64>>,
    size: usize,
    values: usize,
    unique_keys: usize,
    max_keys: usize,
}

impl Default for MinimizerIndex {
    fn default() -> Self {
        Self::new(MinimizerIndexParams::default())
    }
}

impl MinimizerIndex {
    /// Builds an empty index. `params` is assumed validated (see
    /// [`MinimizerIndexParams::new`]); this constructor never fails.
    pub fn new(params: MinimizerIndexParams) -> Self {
        let capacity = INITIAL_CAPACITY;
        Self {
            k: params.k,
            w: params.w,
            capacity,
            cells: vec![Cell::EMPTY; capacity],
            arena: Vec::new(),
            size: 0,
            values: 0,
            unique_keys: 0,
            max_keys: Self::max_keys_for(capacity),
        }
    }

    fn max_keys_for(capacity: usize) -> usize {
        (capacity as f64 * MAX_LOAD_FACTOR) as usize
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn w(&self) -> usize {
        self.w
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn values(&self) -> usize {
        self.values
    }

    pub fn unique_keys(&self) -> usize {
        self.unique_keys
    }

    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    fn slot_for(&self, hash: u64) -> usize {
        (hash as usize) & (self.capacity - 1)
    }

    /// Inserts `pos` under the canonical form of `minimizer`. A no-op if
    /// `minimizer.key == NO_KEY` or `pos == NO_VALUE`, per §4.E invariant 4.
    pub fn insert(&mut self, minimizer: &Minimizer, pos: u64) {
        if minimizer.key == NO_KEY || pos == NO_VALUE {
            return;
        }

        let mut idx = self.slot_for(minimizer.hash);
        loop {
            if self.cells[idx].is_empty() {
                self.cells[idx] = Cell {
                    key: minimizer.key,
                    payload: pos,
                    is_multi: false,
                };
                self.size += 1;
                self.values += 1;
                self.unique_keys += 1;
                if self.size > self.max_keys {
                    self.rehash();
                }
                return;
            }
            if self.cells[idx].key == minimizer.key {
                if self.cells[idx].is_multi {
                    let list = &mut self.arena[self.cells[idx].payload as usize];
                    if let Err(at) = list.binary_search(&pos) {
                        list.insert(at, pos);
                        self.values += 1;
                    }
                } else {
                    let existing = self.cells[idx].payload;
                    if existing == pos {
                        return;
                    }
                    let mut list = vec![existing, pos];
                    list.sort_unstable();
                    let arena_idx = self.arena.len();
                    self.arena.push(list);
                    self.cells[idx].payload = arena_idx as u64;
                    self.cells[idx].is_multi = true;
                    self.values += 1;
                    self.unique_keys -= 1;
                }
                return;
            }
            idx = (idx + 1) & (self.capacity - 1);
        }
    }

    /// Returns the ascending list of positions stored under `minimizer`'s
    /// canonical key, or an empty vector if absent.
    pub fn find(&self, minimizer: &Minimizer) -> Vec<u64> {
        if minimizer.key == NO_KEY {
            return Vec::new();
        }
        let mut idx = self.slot_for(minimizer.hash);
        loop {
            if self.cells[idx].is_empty() {
                return Vec::new();
            }
            if self.cells[idx].key == minimizer.key {
                return if self.cells[idx].is_multi {
                    self.arena[self.cells[idx].payload as usize].clone()
                } else {
                    vec![self.cells[idx].payload]
                };
            }
            idx = (idx + 1) & (self.capacity - 1);
        }
    }

    fn rehash(&mut self) {
        let new_capacity = self.capacity * 2;
        log::debug!(
            "rehashing minimizer index: {} -> {} slots ({} keys)",
            self.capacity,
            new_capacity,
            self.size
        );
        let mut new_cells = vec![Cell::EMPTY; new_capacity];
        for cell in &self.cells {
            if cell.is_empty() {
                continue;
            }
            let hash = hash64(cell.key);
            let mut idx = (hash as usize) & (new_capacity - 1);
            while !new_cells[idx].is_empty() {
                idx = (idx + 1) & (new_capacity - 1);
            }
            new_cells[idx] = *cell;
        }
        self.cells = new_cells;
        self.capacity = new_capacity;
        self.max_keys = Self::max_keys_for(new_capacity);
    }

    /// Swaps the contents of two indexes in place (the teacher's
    /// `std::mem::swap`-backed idiom for a cheap O(1) exchange).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    fn key_to_positions(&self) -> HashMap<u64, Vec<u64>> {
        let mut map = HashMap::with_capacity(self.size);
        for cell in &self.cells {
            if cell.is_empty() {
                continue;
            }
            let positions = if cell.is_multi {
                self.arena[cell.payload as usize].clone()
            } else {
                vec![cell.payload]
            };
            map.insert(cell.key, positions);
        }
        map
    }

    /// Writes the index to `sink` in the little-endian layout described in
    /// §4.E / §6: magic, version, header fields, cells in slot order, then
    /// the value-list arena.
    pub fn serialize<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(MAGIC)?;
        sink.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        sink.write_u64::<LittleEndian>(self.k as u64)?;
        sink.write_u64::<LittleEndian>(self.w as u64)?;
        sink.write_u64::<LittleEndian>(self.capacity as u64)?;
        sink.write_u64::<LittleEndian>(self.size as u64)?;
        sink.write_u64::<LittleEndian>(self.values as u64)?;
        sink.write_u64::<LittleEndian>(self.unique_keys as u64)?;
        sink.write_u32::<LittleEndian>(crate::position::OFF_BITS)?;

        for cell in &self.cells {
            sink.write_u64::<LittleEndian>(cell.key)?;
            sink.write_u64::<LittleEndian>(cell.payload)?;
            sink.write_u8(cell.is_multi as u8)?;
        }

        sink.write_u64::<LittleEndian>(self.arena.len() as u64)?;
        for list in &self.arena {
            sink.write_u64::<LittleEndian>(list.len() as u64)?;
            for &pos in list {
                sink.write_u64::<LittleEndian>(pos)?;
            }
        }
        Ok(())
    }

    /// Reads an index back from `source`, validating the magic/version
    /// header. Any mismatch or truncation is a clean
    /// [`GraphIndexError::FormatError`], never a panic.
    pub fn deserialize<R: Read>(source: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        source.read_exact(&mut magic).map_err(|e| {
            log::warn!("minimizer index deserialize failed reading magic: {e}");
            GraphIndexError::FormatError("truncated header".to_string())
        })?;
        if &magic != MAGIC {
            log::warn!("minimizer index deserialize: bad magic {magic:?}");
            return Err(GraphIndexError::FormatError(
                "bad magic number".to_string(),
            ));
        }
        let version = source
            .read_u32::<LittleEndian>()
            .map_err(|_| GraphIndexError::FormatError("truncated version".to_string()))?;
        if version != FORMAT_VERSION {
            return Err(GraphIndexError::FormatError(format!(
                "unsupported format version {version}"
            )));
        }

        let read_u64 = |source: &mut R| -> Result<u64> {
            source
                .read_u64::<LittleEndian>()
                .map_err(|_| GraphIndexError::FormatError("truncated header field".to_string()))
        };

        let k = read_u64(source)? as usize;
        let w = read_u64(source)? as usize;
        let capacity = read_u64(source)? as usize;
        let size = read_u64(source)? as usize;
        let values = read_u64(source)? as usize;
        let unique_keys = read_u64(source)? as usize;
        let _off_bits = source
            .read_u32::<LittleEndian>()
            .map_err(|_| GraphIndexError::FormatError("truncated header field".to_string()))?;

        let mut cells = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let key = read_u64(source)?;
            let payload = read_u64(source)?;
            let is_multi = source
                .read_u8()
                .map_err(|_| GraphIndexError::FormatError("truncated cell".to_string()))?
                != 0;
            cells.push(Cell {
                key,
                payload,
                is_multi,
            });
        }

        let arena_len = read_u64(source)? as usize;
        let mut arena = Vec::with_capacity(arena_len);
        for _ in 0..arena_len {
            let list_len = read_u64(source)? as usize;
            let mut list = Vec::with_capacity(list_len);
            for _ in 0..list_len {
                list.push(read_u64(source)?);
            }
            arena.push(list);
        }

        Ok(Self {
            k,
            w,
            capacity,
            cells,
            arena,
            size,
            values,
            unique_keys,
            max_keys: Self::max_keys_for(capacity),
        })
    }
}

impl PartialEq for MinimizerIndex {
    fn eq(&self, other: &Self) -> bool {
        self.k == other.k && self.w == other.w && self.key_to_positions() == other.key_to_positions()
    }
}

impl Eq for MinimizerIndex {}
