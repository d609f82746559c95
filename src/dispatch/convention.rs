/// Naming conventions that turn a mutation field name into a storage operation

use std::fmt;

/// What a mutation field does, inferred from its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Unsupported,
}

impl MutationKind {
    /// Classify a mutation field name.
    ///
    /// The lower-cased name is checked against `add`, `update` and `delete`
    /// in that order. Anything else is unsupported.
    pub fn classify(field_name: &str) -> Self {
        let lowered = field_name.to_lowercase();
        [MutationKind::Create, MutationKind::Update, MutationKind::Delete]
            .into_iter()
            .find(|kind| kind.prefix().is_some_and(|p| lowered.starts_with(p)))
            .unwrap_or(MutationKind::Unsupported)
    }

    pub fn prefix(self) -> Option<&'static str> {
        match self {
            MutationKind::Create => Some("add"),
            MutationKind::Update => Some("update"),
            MutationKind::Delete => Some("delete"),
            MutationKind::Unsupported => None,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
            MutationKind::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// Table targeted by a mutation field.
///
/// The matched prefix is stripped from the lower-cased field name; when
/// nothing remains the return type's base name is used instead. The first
/// character is then upper-cased, so `addBike` targets `Bike` and
/// `addOrderItem` targets `Orderitem`.
pub fn mutation_target_table(field_name: &str, kind: MutationKind, return_base: &str) -> Option<String> {
    let prefix = kind.prefix()?;
    let lowered = field_name.to_lowercase();
    let remainder = lowered.strip_prefix(prefix)?;
    let candidate = if remainder.is_empty() {
        return_base
    } else {
        remainder
    };
    Some(capitalize(candidate))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A mutation call after convention inference, bound to one set of arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOperation {
    pub kind: MutationKind,
    pub target_table: String,
    /// Column used to address the row (update/delete only)
    pub key_argument: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(MutationKind::classify("addBike"), MutationKind::Create);
        assert_eq!(MutationKind::classify("updateBike"), MutationKind::Update);
        assert_eq!(MutationKind::classify("deleteBike"), MutationKind::Delete);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(MutationKind::classify("AddCat"), MutationKind::Create);
        assert_eq!(MutationKind::classify("DELETECAT"), MutationKind::Delete);
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(MutationKind::classify("archiveCat"), MutationKind::Unsupported);
        assert_eq!(MutationKind::classify("removeCat"), MutationKind::Unsupported);
    }

    #[test]
    fn test_target_table_from_name() {
        assert_eq!(
            mutation_target_table("addBike", MutationKind::Create, "Bike"),
            Some("Bike".to_string())
        );
        assert_eq!(
            mutation_target_table("updateCat", MutationKind::Update, "Result"),
            Some("Cat".to_string())
        );
    }

    #[test]
    fn test_target_table_loses_inner_capitals() {
        assert_eq!(
            mutation_target_table("addOrderItem", MutationKind::Create, "OrderItem"),
            Some("Orderitem".to_string())
        );
    }

    #[test]
    fn test_target_table_falls_back_to_return_type() {
        assert_eq!(
            mutation_target_table("delete", MutationKind::Delete, "Cat"),
            Some("Cat".to_string())
        );
        assert_eq!(
            mutation_target_table("add", MutationKind::Create, "bike"),
            Some("Bike".to_string())
        );
    }

    #[test]
    fn test_target_table_unsupported() {
        assert_eq!(mutation_target_table("archiveCat", MutationKind::Unsupported, "Cat"), None);
    }
}
