//! The block of argument rows handed to a function instance.

use common::protocol::ColumnSpec;

use super::error::FunctionError;

/// One value per argument column; `None` is SQL NULL.
pub type RowValues = Vec<Option<Vec<u8>>>;

/// A batch of rows sharing one set of argument columns.
#[derive(Debug, Clone)]
pub struct ArgumentBlock {
    columns: Vec<ColumnSpec>,
    rows: Vec<RowValues>,
}

/// A borrowed row of an [`ArgumentBlock`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    values: &'a [Option<Vec<u8>>],
}

impl ArgumentBlock {
    /// Build a block, checking every row has one value per column.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::RowShape`] for the first row of the wrong width.
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<RowValues>) -> Result<Self, FunctionError> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(FunctionError::RowShape {
                row,
                found: values.len(),
                expected: columns.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row { values })
    }
}

impl<'a> Row<'a> {
    /// The value being encrypted or decrypted.
    pub fn primary(&self) -> Option<&'a [u8]> {
        self.values.first().and_then(|v| v.as_deref())
    }

    /// The raw associated-data value, if the block has a second column and
    /// this row's value is not null.
    pub fn associated_data(&self) -> Option<&'a [u8]> {
        self.values.get(1).and_then(|v| v.as_deref())
    }
}
