//! Error returned from the `cryptdex` crate. This includes configuration errors, cryptographic
//! primitive failures, source-data errors, and backing-store errors.

// -------------------------------------------------------------------------------------------------
//
/// Error returned from the `cryptdex` crate.
///
/// Variants are grouped along the four kinds named by the builder's error-handling design:
/// configuration, cryptography, source data, and the backing store. Configuration and data errors
/// are only ever raised during validation, before any store write has been issued; crypto and store
/// errors can surface mid-build and leave the encrypted store in a partially-built state that the
/// caller is expected to overwrite on re-run.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // ---------------------------------------------------------------------------------------
    // Config errors — raised at validation time, before any side effect.
    // ---------------------------------------------------------------------------------------

    #[error("table `{table}` must declare exactly one primary key, found {declared}")]
    MissingPrimaryKey {
        table: String,
        declared: usize,
    },

    #[error("compound primary key on `{table}` has arity {arity}; only arity 2 is supported")]
    UnsupportedKeyArity {
        table: String,
        arity: usize,
    },

    #[error("foreign key `{foreign_table}.{foreign_attr}` references `{primary_table}`, which has no declared primary key")]
    DanglingForeignKey {
        foreign_table: String,
        foreign_attr: String,
        primary_table: String,
    },

    #[error("name `{name}` contains the reserved predicate separator `~`")]
    ReservedSeparatorInName {
        name: String,
    },

    #[error("missing required configuration variable `{variable}`")]
    MissingConfig {
        variable: &'static str,
    },

    // ---------------------------------------------------------------------------------------
    // Crypto errors — fatal, abort the whole run.
    // ---------------------------------------------------------------------------------------

    #[error("invalid key length: expected {expected} bytes, found {found}")]
    InvalidKeyLength {
        expected: usize,
        found: usize,
    },

    #[error("cell encryption failed")]
    Encrypt,

    #[error("cell decryption failed (wrong key, or ciphertext corrupted/truncated)")]
    Decrypt,

    #[error("ciphertext too short to contain a nonce and authentication tag")]
    CiphertextTooShort,

    // ---------------------------------------------------------------------------------------
    // Data errors — raised at validation/projection time.
    // ---------------------------------------------------------------------------------------

    #[error("column `{column}` not found on table `{table}`")]
    MissingColumn {
        table: String,
        column: String,
    },

    #[error("column `{column}` on table `{table}` could not be cast to the expected type")]
    TypeCast {
        table: String,
        column: String,
    },

    #[error("table `{table}` has two rows sharing primary key value `{value}`; PKFK stores rows keyed by primary key and requires it unique")]
    DuplicatePrimaryKeyValue {
        table: String,
        value: u64,
    },

    // ---------------------------------------------------------------------------------------
    // Store errors — abort the current table; partial state is left in place.
    // ---------------------------------------------------------------------------------------

    /// [redb](https://www.redb.org/)
    /// [transaction commit error](https://docs.rs/redb/latest/redb/enum.CommitError.html).
    #[error(transparent)]
    RedbCommit(#[from] redb::CommitError),

    /// [redb](https://www.redb.org/)
    /// [database error](https://docs.rs/redb/latest/redb/enum.DatabaseError.html).
    #[error(transparent)]
    RedbDatabase(#[from] redb::DatabaseError),

    /// [redb](https://www.redb.org/)
    /// [storage error](https://docs.rs/redb/latest/redb/enum.StorageError.html).
    #[error(transparent)]
    RedbStorage(#[from] redb::StorageError),

    /// [redb](https://www.redb.org/)
    /// [table error](https://docs.rs/redb/latest/redb/enum.TableError.html).
    #[error(transparent)]
    RedbTable(#[from] redb::TableError),

    /// [redb](https://www.redb.org/)
    /// [transaction error](https://docs.rs/redb/latest/redb/enum.TransactionError.html).
    #[error(transparent)]
    RedbTransaction(#[from] Box<redb::TransactionError>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An external error supplied by the caller.
    #[error("external error: {0}")]
    External(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

// -------------------------------------------------------------------------------------------------
//
// Method Implementations

impl Error {
    /// Wraps a user-defined error in a boxed container for use with [`Error::External`].
    ///
    /// This provides an escape hatch for callers who wish to integrate their own custom error types
    /// into the unified [`crate::Error`] type, without requiring generic trait bounds.
    pub fn wrap_external<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        Self::External(Box::new(e))
    }

    #[cfg(feature = "anyhow")]
    /// Wraps an [`anyhow::Error`] into an [`Error::External`] variant.
    #[must_use]
    pub fn wrap_anyhow(err: anyhow::Error) -> Self {
        Self::External(err.into_boxed_dyn_error())
    }

    /// Attaches additional context to any existing error variant.
    ///
    /// This attaches context to all error variants by wrapping them in [`Error::External`], even if
    /// they were originally internal.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let context = context.into();
        let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = match self {
            Self::External(inner) => {
                let message = format!("{context}: {inner}");
                Box::new(std::io::Error::other(message))
            },
            error => {
                let message = format!("{context}: {error}");
                Box::new(std::io::Error::other(message))
            },
        };

        Self::External(boxed)
    }
}

#[cfg(feature = "anyhow")]
impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        Self::External(error.into_boxed_dyn_error())
    }
}
