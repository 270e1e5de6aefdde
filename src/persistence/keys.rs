//! Storage keys. The values are the on-device names, kept stable so existing
//! data stays readable.

pub const PRIMARY_KEY: &str = "controle_financeiro_dados";
pub const BACKUP_KEY: &str = "_financeiro_backup";
pub const LITE_KEY: &str = "controle_financeiro_dados_lite";
pub const LAST_UPDATE_KEY: &str = "ultima_atualizacao";
pub const BILL_COUNT_KEY: &str = "total_contas";
pub const THEME_KEY: &str = "temaEscuro";
pub const FIRST_RUN_KEY: &str = "primeiro_acesso";
pub const HIDDEN_KEY: &str = "categoriasOcultas";

pub const FORMAT_VERSION: &str = "2.0";

/// Keys that survive pruning after a quota failure, besides anything under
/// the primary key's prefix.
pub const ESSENTIAL_KEYS: [&str; 5] = [
    PRIMARY_KEY,
    BACKUP_KEY,
    LAST_UPDATE_KEY,
    THEME_KEY,
    FIRST_RUN_KEY,
];

pub fn is_essential(key: &str) -> bool {
    ESSENTIAL_KEYS.contains(&key) || key.starts_with(PRIMARY_KEY)
}
