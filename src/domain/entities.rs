//! Domain entities: core data structures

use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

/// Employee record as read from the input, before it is placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    /// Unique employee id
    pub id: String,
    /// Id of the manager, empty for the root
    pub manager_id: String,
}

impl RawRecord {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        manager_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            manager_id: manager_id.into(),
        }
    }

    /// A record with an empty manager id claims to be the root.
    pub fn is_root(&self) -> bool {
        self.manager_id.is_empty()
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Options controlling how a record file is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFormat {
    pub delimiter: char,
    /// Skip the first non-blank line
    pub has_header: bool,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: false,
        }
    }
}

/// Parsed content of a record file: `name,id,manager_id` per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFile {
    pub records: Vec<RawRecord>,
}

/// Number of fields every row must carry.
pub const FIELD_COUNT: usize = 3;

impl RecordFile {
    /// Parse record file content.
    ///
    /// - Blank lines are skipped
    /// - Fields are trimmed; double quotes protect the delimiter, `""` is a literal quote
    /// - A quoted field must be the whole field: text after the closing quote is rejected
    /// - Records are single lines; a line break inside quotes is not supported
    /// - Any row without exactly three fields is rejected with its 1-based line number
    pub fn parse(content: &str, format: RecordFormat) -> DomainResult<Self> {
        let mut records = Vec::new();
        let mut header_pending = format.has_header;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            if header_pending {
                header_pending = false;
                continue;
            }

            let fields = split_fields(line, format.delimiter).map_err(|message| {
                DomainError::InvalidRecord {
                    line: line_no,
                    message,
                }
            })?;

            let [name, id, manager_id]: [String; FIELD_COUNT] =
                fields.try_into().map_err(|fields: Vec<String>| DomainError::InvalidRecord {
                    line: line_no,
                    message: format!(
                        "expected {} fields (name, id, manager id), found {}",
                        FIELD_COUNT,
                        fields.len()
                    ),
                })?;

            if id.is_empty() {
                return Err(DomainError::InvalidRecord {
                    line: line_no,
                    message: "employee id is empty".to_string(),
                });
            }

            records.push(RawRecord {
                name,
                id,
                manager_id,
            });
        }

        Ok(Self { records })
    }
}

/// Split a single line on `delimiter`, honouring double-quoted fields.
fn split_fields(line: &str, delimiter: char) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // quoted field closed, only whitespace may follow before the delimiter
    let mut closed = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                    closed = true;
                }
            }
            c if closed && c != delimiter && !c.is_whitespace() => {
                return Err(format!("unexpected {c:?} after closing quote"));
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
                closed = false;
            }
            c => current.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(current.trim().to_string());
    Ok(fields)
}
