use std::fmt;

/// Indexed field holding the blob path of each document.
pub const PATH_FIELD: &str = "metadata_storage_path";

/// Sorts after every character used in blob paths, closing the prefix range.
const RANGE_SENTINEL: char = '~';

/// The folder of documents one employee is allowed to see.
///
/// Built from configuration rather than request credentials; every request
/// served by one process is attributed to the same folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeScope {
    prefix: String,
}

impl EmployeeScope {
    pub fn new(storage_account_url: &str, container: &str, folder: &str) -> Self {
        Self {
            prefix: format!(
                "{}/{}/{}/",
                storage_account_url.trim_end_matches('/'),
                container.trim_matches('/'),
                folder.trim_matches('/')
            ),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lexicographic range `prefix <= path < prefix~` as an OData filter.
    pub fn filter(&self) -> String {
        let lower = escape_literal(&self.prefix);
        let upper = escape_literal(&format!("{}{}", self.prefix, RANGE_SENTINEL));
        format!("{PATH_FIELD} ge '{lower}' and {PATH_FIELD} lt '{upper}'")
    }
}

impl fmt::Display for EmployeeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
