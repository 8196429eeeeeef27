//! Environment/database parameter names.
//!
//! `env_get_parameters`/`db_get_parameters` are sparse: the reply only
//! populates the parameters the caller asked for by name (spec §4.6,
//! supplemented from `db_remote.cc`'s parameter switch). Two parameters
//! (`filename`, `dbname`) are string-valued; every other recognized
//! parameter is an integer.

/// A recognized environment or database parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ParamName {
    /// Environment: configured page cache size, in bytes.
    CacheSize = 1,
    /// Environment or database: page size, in bytes.
    PageSize = 2,
    /// Environment: maximum number of databases the environment can host.
    MaxEnvDatabases = 3,
    /// Environment or database: the flags the resource was opened with.
    Flags = 4,
    /// Environment: the host filesystem permission bits used at creation.
    Filemode = 5,
    /// Environment: the path `connect` was called with.
    Filename = 6,
    /// Database: fixed key size, or 0 if variable-length.
    KeySize = 7,
    /// Database: fixed record size, or 0 if variable-length.
    RecordSize = 8,
    /// Database: the key comparison/type tag.
    KeyType = 9,
    /// Database: its 16-bit name within the environment.
    DbName = 10,
    /// Database: maximum keys a leaf page can hold.
    KeysPerPage = 11,
}

impl ParamName {
    /// The numeric id as carried in [`hamlink_proto::Param::name`].
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Whether this parameter's value is carried as a string rather than an
    /// integer.
    #[must_use]
    pub const fn is_string_valued(self) -> bool {
        matches!(self, Self::Filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_filename_is_string_valued() {
        assert!(ParamName::Filename.is_string_valued());
        assert!(!ParamName::CacheSize.is_string_valued());
        assert!(!ParamName::DbName.is_string_valued());
    }
}
