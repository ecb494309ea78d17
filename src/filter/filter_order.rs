use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    pub fn desc(column: &'static str) -> FilterOrderInfo {
        FilterOrderInfo { column }
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} DESC", i.column))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_order_with_tie_break() {
        let sql = FilterOrder::generate(&[FilterOrder::desc("data_criacao"), FilterOrder::desc("id_publicacao")]);
        assert_eq!(sql, "ORDER BY data_criacao DESC, id_publicacao DESC");
    }

    #[test]
    fn empty_order_renders_nothing() {
        assert_eq!(FilterOrder::generate(&[]), "");
    }
}
