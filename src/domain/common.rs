/// Anything referenced by a label: bills by their category, records by name.
pub trait NamedEntity {
    fn name(&self) -> &str;

    /// Case-insensitive comparison, ignoring surrounding whitespace.
    fn name_matches(&self, candidate: &str) -> bool {
        names_match(self.name(), candidate)
    }
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Case-insensitive name comparison used for every category uniqueness rule.
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
