//! The table/column/key model: plaintext schema declarations, validated once at build start so
//! that every downstream component can assume a table has exactly one primary key and every
//! foreign key resolves.

use std::collections::HashMap;

// -------------------------------------------------------------------------------------------------
//
/// A single plaintext cell value.
///
/// The row encryptor AEAD-encrypts the serialized form of this value; the identifier model casts
/// [`Value::Int`] columns to `i64` for Cantor pairing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
    Null,
}

impl Value {
    /// The canonical lexeme used inside a filter predicate string.
    ///
    /// Two values that are `==` under [`PartialEq`] always produce the same lexeme; this is the
    /// only property the filter EMM's partitioning step depends on.
    #[must_use]
    pub fn lexeme(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bytes(b) => hex_lexeme(b),
            Self::Null => "\u{0}null".to_string(),
        }
    }

    /// Casts the value to `i64`, as required for Cantor pairing of a compound key component.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TypeCast`] if the value is not an integer.
    pub fn as_i64(&self, table: &str, column: &str) -> Result<i64, crate::Error> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(crate::Error::TypeCast { table: table.to_string(), column: column.to_string() }),
        }
    }

    /// Serializes the value to bytes for AEAD cell encryption.
    #[must_use]
    pub fn to_plaintext_bytes(&self) -> Vec<u8> {
        match self {
            Self::Int(n) => n.to_be_bytes().to_vec(),
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Bytes(b) => b.clone(),
            Self::Null => Vec::new(),
        }
    }
}

fn hex_lexeme(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// -------------------------------------------------------------------------------------------------
//
/// A plaintext row: an ordered list of `(column name, value)` pairs, in schema column order.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row(pub Vec<(String, Value)>);

impl Row {
    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] if `column` is not present on this row.
    pub fn get<'r>(&'r self, table: &str, column: &str) -> Result<&'r Value, crate::Error> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| crate::Error::MissingColumn { table: table.to_string(), column: column.to_string() })
    }
}

// -------------------------------------------------------------------------------------------------
//
/// A table's declared primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimaryKey {
    /// `(table, attr)`.
    Atomic(String),
    /// `(table, [attr_1, attr_2])`, reduced to an atomic long via Cantor pairing.
    Compound([String; 2]),
}

impl PrimaryKey {
    /// Validates a table's raw declared PK column list and builds a [`PrimaryKey`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingPrimaryKey`] if zero columns were declared, or
    /// [`crate::Error::UnsupportedKeyArity`] if more than two were declared.
    pub fn from_declared(table: &str, declared: Vec<String>) -> Result<Self, crate::Error> {
        match declared.len() {
            0 => Err(crate::Error::MissingPrimaryKey { table: table.to_string(), declared: 0 }),
            1 => Ok(Self::Atomic(declared.into_iter().next().expect("len == 1"))),
            2 => {
                let mut it = declared.into_iter();
                let a = it.next().expect("len == 2");
                let b = it.next().expect("len == 2");
                Ok(Self::Compound([a, b]))
            },
            n => Err(crate::Error::UnsupportedKeyArity { table: table.to_string(), arity: n }),
        }
    }

    /// The column names making up this key, in declaration order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Atomic(a) => vec![a.as_str()],
            Self::Compound([a, b]) => vec![a.as_str(), b.as_str()],
        }
    }
}

// -------------------------------------------------------------------------------------------------
//
/// A declared foreign key: `this.column` references `references_table.references_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

// -------------------------------------------------------------------------------------------------
//
/// A plaintext table's schema: its columns, primary key, and foreign keys.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
    pub primary_key: PrimaryKey,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// The non-key columns subject to filter-EMM indexing: every declared column that is not part
    /// of the primary key.
    #[must_use]
    pub fn non_key_columns(&self) -> Vec<&str> {
        let pk_columns = self.primary_key.columns();
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !pk_columns.contains(c))
            .collect()
    }
}

// -------------------------------------------------------------------------------------------------
//
/// The full set of plaintext table schemas for one build, validated as a unit so that every
/// foreign key is known to resolve before any row is processed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, TableSchema>,
}

impl Catalog {
    /// Builds a catalog from a set of table schemas, validating every name and foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ReservedSeparatorInName`] if any table or column name contains `~`,
    /// or [`crate::Error::DanglingForeignKey`] if a foreign key references a table with no
    /// declared primary key in this catalog.
    pub fn new(tables: Vec<TableSchema>) -> Result<Self, crate::Error> {
        let mut by_name = HashMap::with_capacity(tables.len());

        for table in &tables {
            crate::predicates::validate_name(&table.name)?;
            for column in &table.columns {
                crate::predicates::validate_name(column)?;
            }
        }

        for table in tables {
            by_name.insert(table.name.clone(), table);
        }

        for table in by_name.values() {
            for fk in &table.foreign_keys {
                if !by_name.contains_key(&fk.references_table) {
                    return Err(crate::Error::DanglingForeignKey {
                        foreign_table: table.name.clone(),
                        foreign_attr: fk.column.clone(),
                        primary_table: fk.references_table.clone(),
                    });
                }
            }
        }

        Ok(Self { tables: by_name })
    }

    /// Looks up a table schema by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Iterates over every table schema in the catalog.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}
