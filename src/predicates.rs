//! Canonical predicate strings: pure functions that turn a `(table, attr, value)` or
//! `(table, attr)` pair tuple into the exact byte string fed to [`crate::crypto::Prf`].
//!
//! These strings are never sent to the backing store — they exist only in memory, long enough to
//! derive a trapdoor from them.

/// The separator reserved for predicate encoding. Table, column, and value lexemes must not
/// contain it.
pub const SEPARATOR: char = '~';

/// Validates that a name destined for predicate encoding does not contain the reserved separator.
///
/// # Errors
///
/// Returns [`crate::Error::ReservedSeparatorInName`] if `name` contains `~`.
pub fn validate_name(name: &str) -> Result<(), crate::Error> {
    if name.contains(SEPARATOR) {
        return Err(crate::Error::ReservedSeparatorInName { name: name.to_string() });
    }
    Ok(())
}

/// `filter~<table>~<attr>~<value-lexeme>`
#[must_use]
pub fn filter_predicate(table: &str, attr: &str, value_lexeme: &str) -> String {
    format!("filter{SEPARATOR}{table}{SEPARATOR}{attr}{SEPARATOR}{value_lexeme}")
}

/// `corrjoin~<left_table>.<left_attr>~<right_table>.<right_attr>`
///
/// The caller is responsible for choosing the orientation (`left`, `right`) — CORR emits this
/// predicate for both orientations of a declared FK.
#[must_use]
pub fn corr_join_predicate(left_table: &str, left_attr: &str, right_table: &str, right_attr: &str) -> String {
    format!("corrjoin{SEPARATOR}{left_table}.{left_attr}{SEPARATOR}{right_table}.{right_attr}")
}

/// Lexicographically ordered pair of the same qualified names, used for the uncorrelated-join
/// predicate so that both declaration orders of an FK resolve to one predicate.
#[must_use]
pub fn uncorr_join_predicate(a_table: &str, a_attr: &str, b_table: &str, b_attr: &str) -> String {
    let a = format!("{a_table}.{a_attr}");
    let b = format!("{b_table}.{b_attr}");
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    format!("uncorrjoin{SEPARATOR}{left}{SEPARATOR}{right}")
}

/// `pkfk~<primary_table>~<foreign_table>`
#[must_use]
pub fn pkfk_join_predicate(primary_table: &str, foreign_table: &str) -> String {
    format!("pkfk{SEPARATOR}{primary_table}{SEPARATOR}{foreign_table}")
}
