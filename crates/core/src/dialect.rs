use crate::keywords::{self, CLAUSE_KEYWORDS};

/// A small keyword-extension pack. A dialect never changes the
/// grammar's shape, only which extra words the
/// tokenizer tags as `Keyword` and which extra words the recovery-mode
/// statement scanner treats as resynchronization points.
#[derive(Debug, Clone, Default)]
pub struct Dialect {
    /// Extra reserved words this dialect recognizes, e.g. MySQL's
    /// `REPLACE` as a statement starter or T-SQL's `GO`.
    pub additional_keywords: Vec<String>,
    /// Extra clause/statement-boundary words, used by the recovery-mode
    /// scanner when looking for the next place to resynchronize.
    pub clause_keywords: Vec<String>,
}

impl Dialect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_additional_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.additional_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_clause_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.clause_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Is `upper` (an already-uppercased word) a keyword under this
    /// dialect? Checks the built-in reserved set first, then the
    /// dialect's own additions.
    pub fn is_keyword(&self, upper: &str) -> bool {
        keywords::is_reserved(upper)
            || self
                .additional_keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case(upper))
    }

    /// Is `upper` a clause-boundary keyword, used by recovery mode to find
    /// the next statement start inside an unparsable region?
    pub fn is_clause_keyword(&self, upper: &str) -> bool {
        CLAUSE_KEYWORDS.contains(&upper)
            || self
                .clause_keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case(upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dialect_only_sees_builtins() {
        let dialect = Dialect::new();
        assert!(dialect.is_keyword("SELECT"));
        assert!(!dialect.is_keyword("REGPROC"));
    }

    #[test]
    fn extra_keywords_are_recognized() {
        let dialect = Dialect::new().with_additional_keywords(["REGPROC"]);
        assert!(dialect.is_keyword("REGPROC"));
        assert!(dialect.is_keyword("regproc".to_uppercase().as_str()));
    }
}
