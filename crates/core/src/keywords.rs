//! The built-in reserved-word list.
//!
//! This is not a strict ANSI reserved-words table: like `ALL_KEYWORDS` in
//! most hand-written SQL tokenizers, it is deliberately generous so that a
//! word used as a clause or operator keyword in *any* supported dialect
//! gets tagged `Keyword` rather than `Identifier`. The parser, not the
//! tokenizer, decides whether a keyword is legal in a given position.
//!
//! Kept as a flat sorted array plus binary search rather than a `match` on
//! a generated enum: the tokenizer only ever needs a yes/no
//! classification (`keyword` vs `identifier`), never to distinguish which
//! keyword it saw, so a giant enum would be ceremony with no payoff here.
macro_rules! keyword_list {
    ($($kw:literal),+ $(,)?) => {
        &[$($kw),+]
    };
}

/// Sorted (ASCII, case-sensitive-on-the-uppercase-form) so `classify` can
/// binary search it. Keep entries upper-case and keep the list sorted —
/// `debug_assert!` in `classify` will catch an out-of-order insertion.
pub const RESERVED_KEYWORDS: &[&str] = keyword_list![
    "ADD", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "ANY", "APPLY", "ARRAY", "AS", "ASC",
    "ASYMMETRIC", "AT", "AUTHORIZATION", "BEGIN", "BETWEEN", "BOTH", "BY", "CACHE", "CASCADE",
    "CASE", "CAST", "CHECK", "COLLATE", "COLUMN", "COMMENT", "COMMIT", "CONCURRENTLY",
    "CONFLICT", "CONSTRAINT", "CREATE", "CROSS", "CUBE", "CURRENT_CATALOG", "CURRENT_DATE",
    "CURRENT_ROLE", "CURRENT_SCHEMA", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "CURSOR", "DATE", "DEFAULT", "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DISTINCT",
    "DISTRIBUTE", "DO", "DROP", "ELSE", "END", "EXCEPT", "EXEC", "EXECUTE", "EXISTS",
    "EXPLAIN", "EXTRACT", "FALSE", "FETCH", "FILTER", "FIRST", "FOLLOWING", "FOR",
    "FORALL", "FOREIGN", "FROM", "FULL", "FUNCTION", "GENERATED", "GLOBAL", "GRANT", "GROUP",
    "GROUPING", "GROUPS", "HAVING", "IDENTITY", "IF", "IGNORE", "ILIKE", "IMMEDIATE", "IN",
    "INDEX", "INHERITS", "INITIALLY", "INNER", "INSERT", "INTERSECT", "INTERVAL", "INTO",
    "IS", "ISNULL", "JOIN", "KEY", "LAST", "LATERAL", "LEADING", "LEFT", "LIKE", "LIMIT",
    "LOCAL", "LOCALTIME", "LOCALTIMESTAMP", "LOCK", "MATCH", "MATCHED", "MATERIALIZED",
    "MERGE", "NATURAL", "NO", "NOT", "NOTHING", "NOTNULL", "NULL", "NULLS", "OFFSET", "ON",
    "ONLY", "OPTION", "OR", "ORDER", "OUTER", "OUTPUT", "OVER", "OVERLAPS", "OVERLAY",
    "OVERRIDING", "OWNED", "PARTITION", "PIVOT", "PLACING", "POLICY", "POSITION",
    "PRECEDING", "PRIMARY", "QUALIFY", "RANGE", "RECURSIVE", "REFERENCES", "REGEXP",
    "REPLACE", "RESTRICT", "RETURNING", "REVOKE", "RIGHT", "RLIKE", "ROLLBACK", "ROLLUP",
    "ROW", "ROWS", "SAVEPOINT", "SELECT", "SEQUENCE", "SESSION", "SET", "SHARE", "SIMILAR",
    "SOME", "STORED", "SUBSTRING", "SYMMETRIC", "TABLE", "TABLESAMPLE", "TEMP", "TEMPORARY",
    "THEN", "TIES", "TIME", "TIMESTAMP", "TO", "TOP", "TRAILING", "TRANSACTION", "TRIGGER",
    "TRIM", "TRUE", "TRUNCATE", "UNBOUNDED", "UNION", "UNIQUE", "UNLOGGED", "UNNEST",
    "UNPIVOT", "UPDATE", "USING", "VACUUM", "VALUES", "VARIADIC", "VIEW", "WHEN", "WHERE",
    "WINDOW", "WITH", "WITHIN", "WITHOUT", "ZONE",
];

/// Extra clause-boundary keywords that mark where a statement starts or a
/// clause begins, kept separate from `RESERVED_KEYWORDS` because the
/// recovery-mode statement scanner treats them as candidate
/// resynchronization points even though a handful double as identifiers
/// in some dialects (`GO`, `USE`).
pub const CLAUSE_KEYWORDS: &[&str] = keyword_list![
    "ALTER", "BEGIN", "COMMENT", "COMMIT", "CREATE", "DELETE", "DROP", "EXPLAIN", "GO",
    "GRANT", "INSERT", "MERGE", "REPLACE", "REVOKE", "ROLLBACK", "SELECT", "SET",
    "TRUNCATE", "UPDATE", "USE", "WITH",
];

fn binary_search_upper(list: &[&str], upper: &str) -> bool {
    list.binary_search(&upper).is_ok()
}

/// True if `upper` (an already-uppercased identifier candidate) names a
/// built-in reserved word.
pub fn is_reserved(upper: &str) -> bool {
    binary_search_upper(RESERVED_KEYWORDS, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keywords_stay_sorted() {
        let mut sorted = RESERVED_KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(RESERVED_KEYWORDS, sorted.as_slice());
    }

    #[test]
    fn classifies_core_keywords() {
        assert!(is_reserved("SELECT"));
        assert!(is_reserved("FROM"));
        assert!(!is_reserved("CUSTOMER_ID"));
    }
}
