//! Variable memory ("RAM"): a flat, name-indexed table of typed cells.
//!
//! The store is append-only: the slot index a name receives on its first
//! write is its address for the lifetime of the store, even as capacity
//! grows. Reads hand back deep copies, so callers never alias stored
//! buffers.

use std::io::{self, Write};

use thiserror::Error;

use crate::value::Value;

const INITIAL_CAPACITY: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum RamError {
    #[error("invalid memory address {0}")]
    InvalidAddress(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    name: String,
    value: Value,
}

#[derive(Debug)]
pub struct Ram {
    cells: Vec<Cell>,
    capacity: usize,
}

impl Ram {
    pub fn new() -> Self {
        Ram {
            cells: Vec::with_capacity(INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
        }
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current capacity: starts at 4 and exactly doubles whenever a new
    /// name would overflow it.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Address of `name`, if it has ever been written. Addresses are stable:
    /// once assigned, they never change.
    pub fn get_addr(&self, name: &str) -> Option<usize> {
        self.cells.iter().position(|cell| cell.name == name)
    }

    /// Writes `value` under `name`, appending a new permanently-addressed
    /// cell on first write. Always succeeds; returns the address.
    pub fn write_by_name(&mut self, value: Value, name: &str) -> usize {
        match self.get_addr(name) {
            Some(addr) => {
                self.cells[addr].value = value;
                addr
            }
            None => {
                if self.cells.len() == self.capacity {
                    self.capacity *= 2;
                    self.cells.reserve_exact(self.capacity - self.cells.len());
                }
                self.cells.push(Cell {
                    name: name.to_string(),
                    value,
                });
                self.cells.len() - 1
            }
        }
    }

    /// Writes `value` to an existing address. Fails if `addr` has never
    /// been assigned to a name.
    pub fn write_by_addr(&mut self, value: Value, addr: usize) -> Result<(), RamError> {
        let cell = self
            .cells
            .get_mut(addr)
            .ok_or(RamError::InvalidAddress(addr))?;
        cell.value = value;
        Ok(())
    }

    /// Deep copy of the value bound to `name`, or `None` if unbound.
    pub fn read_by_name(&self, name: &str) -> Option<Value> {
        let addr = self.get_addr(name)?;
        self.read_by_addr(addr)
    }

    /// Deep copy of the value at `addr`, or `None` if the address is
    /// invalid.
    pub fn read_by_addr(&self, addr: usize) -> Option<Value> {
        self.cells.get(addr).map(|cell| cell.value.clone())
    }

    /// Post-run diagnostic dump: capacity, entry count, then one line per
    /// occupied slot as `index: name, type, value`.
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "**MEMORY PRINT**")?;
        writeln!(out, "Capacity: {}", self.capacity)?;
        writeln!(out, "Num values: {}", self.cells.len())?;
        writeln!(out, "Contents:")?;
        for (addr, cell) in self.cells.iter().enumerate() {
            let rendered = match &cell.value {
                Value::Str(s) => format!("'{}'", s),
                other => other.to_string(),
            };
            let type_name = match &cell.value {
                Value::Bool(_) => "boolean",
                other => other.type_name(),
            };
            writeln!(out, " {}: {}, {}, {}", addr, cell.name, type_name, rendered)?;
        }
        writeln!(out, "**END PRINT**")
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}
