//! Breakpoints
//!
//! A breakpoint is anchored either to a machine address or to a source location, and once the
//! assembler has seen it may carry both.
//!
//! On the wire to and from the assembler worker a breakpoint looks like
//! `{"addr":8192,"fileId":"main.asm","lineNum":10,"col":0}` with `-1` (or `null` for the file)
//! standing in for anything that's unset.

/// A breakpoint as held in the registry and exchanged with the assembler worker
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    #[serde(rename = "addr", default, with = "unset")]
    address: Option<u16>,
    #[serde(rename = "fileId", default)]
    file_id: Option<String>,
    #[serde(rename = "lineNum", default, with = "unset")]
    line_num: Option<u32>,
    #[serde(rename = "col", default, with = "unset")]
    column: Option<u32>,
}

impl Breakpoint {
    pub fn new(
        address: Option<u16>,
        file_id: Option<String>,
        line_num: Option<u32>,
        column: Option<u32>,
    ) -> Self {
        Breakpoint {
            address,
            file_id,
            line_num,
            column,
        }
    }

    /// A breakpoint set on a line of source, its address is unknown until the assembler
    /// resolves it.
    pub fn at_source(file_id: String, line_num: u32, column: Option<u32>) -> Self {
        Breakpoint::new(None, Some(file_id), Some(line_num), column)
    }

    /// A breakpoint set on a machine address with no known source location.
    pub fn at_address(address: u16) -> Self {
        Breakpoint::new(Some(address), None, None, None)
    }

    pub fn address(&self) -> Option<u16> {
        self.address
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn line_num(&self) -> Option<u32> {
        self.line_num
    }

    pub fn column(&self) -> Option<u32> {
        self.column
    }

    /// Whether this breakpoint is anchored to a real (1-based) source line.
    pub fn has_source_line(&self) -> bool {
        matches!(self.line_num, Some(n) if n > 0)
    }

    /// Identity of the breakpoint on the source axis, if it has one.
    pub fn source_key(&self) -> Option<(&str, u32, Option<u32>)> {
        match (self.file_id.as_deref(), self.line_num) {
            (Some(file_id), Some(line_num)) => Some((file_id, line_num, self.column)),
            _ => None,
        }
    }

    pub(crate) fn matches_source(
        &self,
        file_id: &str,
        line_num: u32,
        column: Option<u32>,
    ) -> bool {
        self.file_id.as_deref() == Some(file_id)
            && self.line_num == Some(line_num)
            && self.column == column
    }

    pub(crate) fn set_address(&mut self, address: Option<u16>) {
        self.address = address;
    }

    pub(crate) fn set_source(
        &mut self,
        file_id: Option<String>,
        line_num: Option<u32>,
        column: Option<u32>,
    ) {
        self.file_id = file_id;
        self.line_num = line_num;
        self.column = column;
    }
}

/// (De)serialize an optional integer using `-1` for "unset".
///
/// Any negative number, `null` or a missing field reads back as unset.
mod unset {
    use std::convert::TryFrom;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: TryFrom<i64>,
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(n) if n < 0 => Ok(None),
            Some(n) => T::try_from(n)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("value {} out of range", n))),
        }
    }
}
