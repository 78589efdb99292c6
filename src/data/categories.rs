//! Static per-category reference table.
//!
//! These figures are fixed sample values for the IPCA groups. They are not
//! sourced from the API and are never merged with the live series.

use crate::domain::CategoryVariation;

const fn row(name: &'static str, monthly_pct: f64, cumulative_pct: f64) -> CategoryVariation {
    CategoryVariation {
        name,
        monthly_pct,
        cumulative_pct,
    }
}

pub const CATEGORY_TABLE: [CategoryVariation; 10] = [
    row("Índice Geral", 0.5, 2.1),
    row("Alimentação e Bebidas", 0.6, 3.5),
    row("Habitação", 4.2, 2.8),
    row("Artigos de Residência", 0.3, 2.3),
    row("Vestuário", 0.1, 3.9),
    row("Transportes", 0.8, 4.1),
    row("Saúde e Cuidados Pessoais", 0.5, 3.0),
    row("Despesas Pessoais", 0.2, 2.9),
    row("Educação", 4.5, 4.9),
    row("Comunicação", 0.3, 4.7),
];

/// All category names, in table order.
pub fn category_names() -> Vec<String> {
    CATEGORY_TABLE.iter().map(|c| c.name.to_string()).collect()
}

/// Resolve a user-supplied name to its canonical table entry.
///
/// Matching ignores case and surrounding whitespace.
pub fn find_category(name: &str) -> Option<&'static CategoryVariation> {
    let needle = name.trim().to_lowercase();
    CATEGORY_TABLE.iter().find(|c| c.name.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        let mut names = category_names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CATEGORY_TABLE.len());
    }

    #[test]
    fn find_category_ignores_case() {
        assert_eq!(find_category("habitação").map(|c| c.name), Some("Habitação"));
        assert_eq!(find_category(" EDUCAÇÃO ").map(|c| c.name), Some("Educação"));
        assert!(find_category("Energia").is_none());
    }
}
