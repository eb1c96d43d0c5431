//! Thread-safe spreadsheet handle
//!
//! Every operation takes the lock for its whole duration, so an edit and
//! its recalculation are never observed half-done.

use crate::calculation::{RecalcStats, Spreadsheet};
use crate::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable handle to a spreadsheet shared between threads
#[derive(Debug, Clone, Default)]
pub struct SharedSpreadsheet {
    inner: Arc<Mutex<Spreadsheet>>,
}

impl SharedSpreadsheet {
    /// Wrap a spreadsheet
    pub fn new(sheet: Spreadsheet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sheet)),
        }
    }

    // A panic mid-edit leaves the grid as it was at the panic; keep serving it.
    fn lock(&self) -> MutexGuard<'_, Spreadsheet> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`Spreadsheet::edit_cell`]
    pub fn edit_cell(&self, address: &str, text: &str) -> Result<RecalcStats> {
        self.lock().edit_cell(address, text)
    }

    /// See [`Spreadsheet::get_display_value`]
    pub fn get_display_value(&self, address: &str) -> Result<String> {
        self.lock().get_display_value(address)
    }

    /// See [`Spreadsheet::get_raw_input`]
    pub fn get_raw_input(&self, address: &str) -> Result<String> {
        self.lock().get_raw_input(address)
    }

    /// See [`Spreadsheet::batch_find_replace`]
    pub fn batch_find_replace<P, T>(&self, predicate: P, transform: T) -> Result<usize>
    where
        P: Fn(&str) -> bool,
        T: Fn(&str) -> String,
    {
        self.lock().batch_find_replace(predicate, transform)
    }

    /// Run a closure with exclusive access to the spreadsheet
    pub fn with<R>(&self, f: impl FnOnce(&mut Spreadsheet) -> R) -> R {
        f(&mut self.lock())
    }
}

impl From<Spreadsheet> for SharedSpreadsheet {
    fn from(sheet: Spreadsheet) -> Self {
        Self::new(sheet)
    }
}
