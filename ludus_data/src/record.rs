use serde::{Deserialize, Serialize};

/// One key of a record with every value it was given, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Upper-cased key.
    pub key: String,
    pub values: Vec<String>,
}

/// A delimited chunk of a data file, tokenized into fields.
///
/// Keys keep the order of their first appearance. A key that appears on several lines keeps all of
/// its values, so a single-occurrence key is simply a one-element sequence.
///
/// ```
/// use ludus_data::Record;
///
/// let mut record = Record::new(1);
/// record.push("skillattribute", "weapon");
/// record.push("SKILLATTRIBUTE", "melee");
/// assert_eq!(record.values("SkillAttribute"), ["weapon", "melee"]);
/// assert!(record.values("SKILLUSECLASS").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based line number of the first line of the chunk in its source file.
    pub line: usize,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: Vec::new(),
        }
    }

    /// Append `value` to `key`, creating the field on first use.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let key = key.trim().to_uppercase();
        let value = value.into();
        match self.fields.iter_mut().find(|field| field.key == key) {
            Some(field) => field.values.push(value),
            None => self.fields.push(Field {
                key,
                values: vec![value],
            }),
        }
    }

    /// All values for `key` (case-insensitive), or an empty slice.
    pub fn values(&self, key: &str) -> &[String] {
        self.field(key).map_or(&[], |field| field.values.as_slice())
    }

    /// First value for `key`, if the key is present.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key.eq_ignore_ascii_case(key.trim()))
    }
}
