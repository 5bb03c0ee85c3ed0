//! The Cantor pairing function, used to reduce a 2-column compound primary key to a single atomic
//! long RID.

/// Computes `π(a, b) = (a + b)(a + b + 1) / 2 + b`, the standard Cantor pairing of two
/// non-negative integers into a unique ordered-pair identifier.
///
/// Compound primary keys are restricted to arity 2 (see [`crate::Error::UnsupportedKeyArity`]);
/// callers past that check always have exactly two components to pair.
///
/// # Errors
///
/// Returns [`crate::Error::TypeCast`] if either component is negative, or if the pairing would
/// overflow `u64`.
pub fn cantor_pair(table: &str, column: &str, a: i64, b: i64) -> Result<u64, crate::Error> {
    if a < 0 || b < 0 {
        return Err(crate::Error::TypeCast {
            table: table.to_string(),
            column: column.to_string(),
        });
    }

    let (a, b) = (a as u128, b as u128);
    let sum = a + b;
    let paired = (sum * (sum + 1)) / 2 + b;

    u64::try_from(paired).map_err(|_| crate::Error::TypeCast {
        table: table.to_string(),
        column: column.to_string(),
    })
}
