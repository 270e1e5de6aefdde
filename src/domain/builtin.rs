//! The fixed list of well-known categories shipped with the tracker. They are
//! plain names, never records: they cannot be created, renamed or deleted,
//! only hidden from selection menus.

use super::common::names_match;

pub const BUILTIN_CATEGORIES: [&str; 17] = [
    "INTERNET",
    "CEMIG",
    "CODAU",
    "Mercado",
    "GÁS",
    "VAREJÃO",
    "AÇOUGUE",
    "FARMÁCIA",
    "ACADEMIA",
    "VIAGEM",
    "TELEFONE",
    "BANCO",
    "NUBANK",
    "Unimed",
    "CONSTRUÇÃO",
    "IPTU",
    "Outros",
];

/// Exact membership, as bill labels and hidden entries are compared verbatim.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_CATEGORIES.contains(&name)
}

/// Case-insensitive lookup returning the canonical built-in spelling.
pub fn builtin_name(name: &str) -> Option<&'static str> {
    BUILTIN_CATEGORIES
        .iter()
        .copied()
        .find(|builtin| names_match(builtin, name))
}
