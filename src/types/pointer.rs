//! Offsets to dynamic members of tuples and arrays.

use super::DataType;
use crate::{
    calldata::RawCalldata,
    error::{Error, Result},
    primitive::{Primitive as _, WORD_SIZE},
    rules::DecodingRules,
    value::Value,
};
use ethnum::U256;

/// A dynamic type embedded in a tuple or array.
///
/// Its head holds an offset, relative to the start of the enclosing head,
/// to its contents in the enclosing tail.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pointer {
    target: Box<DataType>,
}

impl Pointer {
    pub fn new(target: DataType) -> Self {
        Self {
            target: Box::new(target),
        }
    }

    /// Returns the type the pointer refers to.
    pub fn target(&self) -> &DataType {
        &self.target
    }

    /// Follows the offset at the cursor and decodes the target, leaving the
    /// cursor after the offset word.
    pub fn decode(&self, calldata: &mut RawCalldata, rules: &DecodingRules) -> Result<Value> {
        let word = calldata.pop_word()?;
        let relative = U256::from_word(word);
        if rules.strict && word[WORD_SIZE - 1] % WORD_SIZE as u8 != 0 {
            return Err(Error::strict(format!("unaligned offset {relative}")));
        }

        let absolute = calldata.to_absolute_offset(relative)?;
        let resume = calldata.offset();
        calldata.set_offset(absolute)?;
        let value = self.target.decode_from(calldata, rules)?;
        calldata.set_offset(resume)?;
        Ok(value)
    }
}
