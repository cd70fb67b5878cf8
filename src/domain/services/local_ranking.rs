/// Elemento filtrable en local por nombre y descripción
pub trait Searchable {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
}

/// Tipo de coincidencia de un elemento con la consulta normalizada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Prefix,
    Substring,
}

fn match_kind<T: Searchable>(item: &T, needle: &str) -> Option<MatchKind> {
    let name = item.name().to_lowercase();
    let description = item.description().map(str::to_lowercase);

    if name.starts_with(needle) || description.as_deref().is_some_and(|d| d.starts_with(needle)) {
        return Some(MatchKind::Prefix);
    }
    if name.contains(needle) || description.as_deref().is_some_and(|d| d.contains(needle)) {
        return Some(MatchKind::Substring);
    }
    None
}

/**
 * Filtra y reordena una página ya cargada sin esperar al backend.
 *
 * Los elementos cuyo nombre o descripción empiezan por la consulta van
 * primero, seguidos de los que sólo la contienen; el resto se descarta.
 * Dentro de cada grupo se conserva el orden de entrada. Una consulta vacía
 * (tras `trim`) devuelve la entrada intacta.
 *
 * El resultado es orientativo: siempre lo sustituye la respuesta remota.
 */
pub fn rank_locally<T: Searchable + Clone>(query: &str, items: &[T]) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }

    let mut prefix = Vec::new();
    let mut substring = Vec::new();

    for item in items {
        match match_kind(item, &needle) {
            Some(MatchKind::Prefix) => prefix.push(item.clone()),
            Some(MatchKind::Substring) => substring.push(item.clone()),
            None => {}
        }
    }

    prefix.extend(substring);
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        description: Option<&'static str>,
    }

    impl Searchable for Item {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> Option<&str> {
            self.description
        }
    }

    fn named(names: &[&'static str]) -> Vec<Item> {
        names.iter().map(|name| Item { name, description: None }).collect()
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|item| item.name).collect()
    }

    #[test]
    fn test_prefix_matches_come_first() {
        let items = named(&["Annual Budget", "Budget Report", "Banana"]);
        let ranked = rank_locally("an", &items);

        assert_eq!(names(&ranked), vec!["Annual Budget", "Banana"]);
    }

    #[test]
    fn test_groups_keep_input_order() {
        let items = named(&["Old Budget Notes", "Budget Report", "Annual Budget", "Budget 2024"]);
        let ranked = rank_locally("budget", &items);

        assert_eq!(
            names(&ranked),
            vec!["Budget Report", "Budget 2024", "Old Budget Notes", "Annual Budget"]
        );
    }

    #[test]
    fn test_empty_query_returns_input_unchanged() {
        let items = named(&["b", "a", "c"]);
        assert_eq!(rank_locally("   ", &items), items);
        assert_eq!(rank_locally("", &items), items);
    }

    #[test]
    fn test_query_is_trimmed_and_case_insensitive() {
        let items = named(&["REPORT final", "Draft"]);
        assert_eq!(names(&rank_locally("  Report ", &items)), vec!["REPORT final"]);
    }

    #[test]
    fn test_description_counts_for_both_groups() {
        let items = vec![
            Item { name: "Scan 001", description: Some("tax return 2023") },
            Item { name: "Receipts", description: Some("misc tax papers") },
            Item { name: "Photos", description: None },
        ];
        let ranked = rank_locally("tax", &items);

        assert_eq!(names(&ranked), vec!["Scan 001", "Receipts"]);
    }

    #[test]
    fn test_prefix_in_description_beats_substring_in_name() {
        let items = vec![
            Item { name: "My invoices", description: None },
            Item { name: "Folder", description: Some("Invoices from vendors") },
        ];
        let ranked = rank_locally("invoice", &items);

        assert_eq!(names(&ranked), vec!["Folder", "My invoices"]);
    }
}
