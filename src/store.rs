//! The embedded backing store: a thin, typed wrapper over [redb](https://www.redb.org/) for the
//! encrypted tables and EMM tables this crate writes.
//!
//! Every table this crate ever writes is a flat mapping from a fixed-width key (an EMM label, a
//! dependent-filter token, or an `enc_rid`) to an opaque byte payload. There is no generic,
//! pluggable serialization layer here — the scheme never stores anything but byte blobs it
//! constructed itself, so a single `&[u8] -> &[u8]` table shape covers every schema in §6.
//!
//! redb's tables are themselves ordered B-trees keyed by the raw bytes we hand them, so choosing
//! the EMM label (or token, or `enc_rid`) as the redb key is already the "hash/tree index on the
//! label column" that §6 asks the builder to request from a relational backing store. Against an
//! embedded store the builder owns the lifecycle of, that request has no separate DDL step to
//! issue — [`request_index`] exists purely to preserve the state-machine's logging shape and to
//! give a single place future backends could hang a real index-creation call off of.

use redb::{ReadableTable, TableDefinition};

type Definition<'n> = TableDefinition<'n, &'static [u8], &'static [u8]>;

/// The entry point for working with the encrypted backing store.
///
/// Wraps a `redb::Database`; one `Database` is opened per build and holds every encrypted table
/// and EMM table the variant in use writes.
pub struct Database(redb::Database);

impl Database {
    /// Creates the encrypted store at `path`, or opens it if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbDatabase`] if the file cannot be created or opened.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self, crate::Error> {
        Ok(Self(redb::Database::create(path)?))
    }

    /// Begins a write transaction. The caller is expected to open one [`BytesTable`] per target
    /// table, write every entry, then [`WriteTxn::commit`] — matching the "one blocking write per
    /// EMM table" rule of §5.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbTransaction`] if a transaction cannot be started.
    pub fn write(&self) -> Result<WriteTxn<'_>, crate::Error> {
        Ok(WriteTxn(self.0.begin_write().map_err(Box::new)?))
    }

    /// Begins a read-only transaction, used by tests that verify the testable properties of §8.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbTransaction`] if a transaction cannot be started.
    pub fn read(&self) -> Result<ReadTxn<'_>, crate::Error> {
        Ok(ReadTxn(self.0.begin_read().map_err(Box::new)?))
    }
}

/// A single write transaction against the encrypted store.
pub struct WriteTxn<'db>(redb::WriteTransaction);

impl WriteTxn<'_> {
    /// Opens (creating if necessary) the named table for writing, as `&[u8] -> &[u8]`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbTable`] if the table cannot be opened.
    pub fn table<'t>(&'t self, name: &'t str) -> Result<BytesTable<'t>, crate::Error> {
        let definition: Definition<'t> = TableDefinition::new(name);
        Ok(BytesTable(self.0.open_table(definition)?))
    }

    /// Commits every table write issued against this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbCommit`] if the commit fails.
    pub fn commit(self) -> Result<(), crate::Error> {
        Ok(self.0.commit()?)
    }
}

/// A single read-only transaction against the encrypted store.
pub struct ReadTxn<'db>(redb::ReadTransaction);

impl ReadTxn<'_> {
    /// Opens the named table for reading. Returns `Ok(None)` semantics via an empty table if the
    /// name was never written (redb creates tables lazily on first write).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbTable`] if the table exists but cannot be opened for reading.
    pub fn table<'t>(&'t self, name: &'t str) -> Result<ReadBytesTable<'t>, crate::Error> {
        let definition: Definition<'t> = TableDefinition::new(name);
        Ok(ReadBytesTable(self.0.open_table(definition)?))
    }
}

/// A writable handle to one named table, storing raw byte keys and values.
pub struct BytesTable<'txn>(redb::Table<'txn, &'static [u8], &'static [u8]>);

impl BytesTable<'_> {
    /// Inserts (or overwrites) `key -> value`, matching the "overwrite-on-conflict" failure
    /// semantics of §4.7/§7: re-running a build with the same inputs and keys reproduces the same
    /// keys and simply replaces their values.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbStorage`] if the write fails.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), crate::Error> {
        self.0.insert(key, value)?;
        Ok(())
    }
}

/// A read-only handle to one named table.
pub struct ReadBytesTable<'txn>(redb::ReadOnlyTable<&'static [u8], &'static [u8]>);

impl ReadBytesTable<'_> {
    /// Looks up `key`, returning its stored value if present.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbStorage`] if the read fails.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, crate::Error> {
        Ok(self.0.get(key)?.map(|guard| guard.value().to_vec()))
    }

    /// Iterates every `(key, value)` pair in the table, used by tests that check row-count
    /// conservation and dense-counter properties across a whole bucket.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RedbStorage`] if the scan fails.
    pub fn iter(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, crate::Error> {
        let mut out = Vec::new();
        for entry in self.0.iter()? {
            let (k, v) = entry?;
            out.push((k.value().to_vec(), v.value().to_vec()));
        }
        Ok(out)
    }
}

/// The kind of secondary index §6 asks the builder to request for a given column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// EMM label columns: exact-match lookups only.
    Hash,
    /// PKFK index columns: range-free equality, but declared as a tree index per §4.7 step 5.
    Tree,
}

/// Requests a secondary index on `column` of `table`.
///
/// Against the embedded store this crate owns the lifecycle of, every table is already keyed by
/// the column being indexed (see the module docs), so this is a logging no-op rather than a DDL
/// statement — it exists so the build's `indices_requested` state transition (§4.7) has something
/// concrete to log, matching the teacher's state-machine tracing discipline (§10.2).
pub fn request_index(table: &str, column: &str, kind: IndexKind) {
    tracing::info!(table, column, ?kind, "secondary index requested");
}
