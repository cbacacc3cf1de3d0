//! Builtin static table and the [`static_table!`](crate::static_table) macro.
//!
//! The macro turns a sorted list of `NAME => b"text"` pairs into three
//! things: a `#[repr(u32)]` index enum whose variant 0 is the null entry, a
//! [`Handle`](crate::Handle) constant per entry, and a
//! [`StaticTable`](crate::StaticTable) whose hashes are computed at compile
//! time. Entries must be listed in ascending byte order; the interner checks
//! this when it is built.

/// Declare a static root table with an index enum and handle constants
///
/// # Examples
///
/// ```
/// use istr::{static_table, Interner, InternerConfig};
///
/// static_table! {
///     /// Positions in `KEYWORDS`
///     pub enum Keyword;
///     pub static KEYWORDS;
///
///     ELSE => b"else",
///     FN => b"fn",
///     IF => b"if",
/// }
///
/// let interner = Interner::with_config(KEYWORDS, InternerConfig::default()).unwrap();
/// assert_eq!(interner.find(b"fn"), Some(FN));
/// assert_eq!(Keyword::IF.handle(), IF);
/// assert_eq!(interner.content(ELSE), b"else");
/// ```
#[macro_export]
macro_rules! static_table {
    (
        $(#[$enum_meta:meta])*
        $enum_vis:vis enum $index:ident;
        $(#[$table_meta:meta])*
        $table_vis:vis static $table:ident;

        $($name:ident => $text:literal),* $(,)?
    ) => {
        $(#[$enum_meta])*
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u32)]
        $enum_vis enum $index {
            /// The reserved empty entry
            Null = 0,
            $($name,)*
        }

        impl $index {
            /// Handle of this entry; `None` for the null entry
            #[inline]
            pub const fn try_handle(self) -> ::core::option::Option<$crate::Handle> {
                $crate::Handle::from_raw(self as u32)
            }

            /// Handle of this entry
            ///
            /// # Panics
            ///
            /// Panics for the null entry.
            #[inline]
            pub const fn handle(self) -> $crate::Handle {
                $crate::Handle::from_static_index(self as u32)
            }
        }

        $(
            #[allow(dead_code)]
            $enum_vis const $name: $crate::Handle =
                $crate::Handle::from_static_index($index::$name as u32);
        )*

        $(#[$table_meta])*
        $table_vis static $table: $crate::StaticTable = {
            const ENTRIES: &[$crate::StaticEntry] = &[
                $crate::StaticEntry::NULL,
                $($crate::StaticEntry::new($text),)*
            ];
            $crate::StaticTable::new(ENTRIES)
        };
    };
}

static_table! {
    /// Positions of the builtin names in [`TABLE`]
    pub enum BuiltinIndex;
    /// Common identifiers known to every [`Interner::new`](crate::Interner::new)
    pub static TABLE;

    FALSE => b"False",
    NONE => b"None",
    TRUE => b"True",
    DUNDER_CLASS => b"__class__",
    DUNDER_INIT => b"__init__",
    DUNDER_MAIN => b"__main__",
    DUNDER_NAME => b"__name__",
    APPEND => b"append",
    ARGS => b"args",
    BOOL => b"bool",
    BYTES => b"bytes",
    CLOSE => b"close",
    DICT => b"dict",
    END => b"end",
    FLOAT => b"float",
    GET => b"get",
    INT => b"int",
    ITEMS => b"items",
    JOIN => b"join",
    KEY => b"key",
    KEYS => b"keys",
    LEN => b"len",
    LIST => b"list",
    OBJECT => b"object",
    OPEN => b"open",
    POP => b"pop",
    PRINT => b"print",
    RANGE => b"range",
    READ => b"read",
    SELF => b"self",
    SEND => b"send",
    SEP => b"sep",
    SPLIT => b"split",
    STR => b"str",
    TUPLE => b"tuple",
    TYPE => b"type",
    VALUE => b"value",
    VALUES => b"values",
    WRITE => b"write",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Handle, Interner};

    #[test]
    fn test_builtin_table_verifies() {
        assert!(TABLE.verify(crate::HashWidth::Two).is_ok());
        assert!(TABLE.verify(crate::HashWidth::One).is_ok());
        assert_eq!(TABLE.len(), BuiltinIndex::WRITE as usize + 1);
    }

    #[test]
    fn test_constants_resolve() {
        let interner = Interner::new();
        assert_eq!(interner.content(FALSE), b"False");
        assert_eq!(interner.content(DUNDER_INIT), b"__init__");
        assert_eq!(interner.content(WRITE), b"write");
        assert_eq!(interner.find(b"keys"), Some(KEYS));
        assert_eq!(interner.find(b"key"), Some(KEY));
    }

    #[test]
    fn test_every_entry_found_at_its_index() {
        let interner = Interner::new();
        for (index, entry) in TABLE.entries().iter().enumerate().skip(1) {
            assert_eq!(interner.find(entry.bytes()), Handle::from_raw(index as u32));
        }
    }

    #[test]
    fn test_null_has_no_handle() {
        assert_eq!(BuiltinIndex::Null.try_handle(), None);
        assert_eq!(BuiltinIndex::APPEND.try_handle(), Some(APPEND));
        assert_eq!(BuiltinIndex::APPEND.handle().as_u32(), 8);
    }
}
