/// Ordered list of search terms that must all appear, left to right
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryChain {
    terms: Vec<String>,
}

impl QueryChain {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a chain from a comma-delimited list; empty terms are dropped
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').filter(|term| !term.is_empty()))
    }

    /// Check whether every term occurs in `text`, in order
    ///
    /// Each term is searched for in what remains after the first match of the
    /// previous term, so matches may be separated by other text but never
    /// overlap or go backwards.
    pub fn matches(&self, text: &str) -> bool {
        let mut rest = text;
        for term in &self.terms {
            match rest.find(term.as_str()) {
                Some(pos) => rest = &rest[pos + term.len()..],
                None => return false,
            }
        }
        true
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Check if the chain is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
