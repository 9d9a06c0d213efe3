//! Upsell hints shown after a product is added. Cosmetic only.

/// Hint for the operator after adding `product_name`, keyed on simple keywords.
#[must_use]
pub fn upsell_for(product_name: &str) -> String {
    let name = product_name.trim();
    if name.is_empty() {
        return "Product added to the cart.".to_string();
    }

    let lower = name.to_lowercase();
    if lower.contains("coca") {
        format!("Customer added {name}. Suggest chips (high margin)!")
    } else if lower.contains("snack") || lower.contains("papas") {
        format!("Customer added {name}. A drink to go with it?")
    } else {
        "Great! Anything else the customer needs?".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_pick_pairing() {
        assert!(upsell_for("Coca Cola 600ml").contains("chips"));
        assert!(upsell_for("Papas Fritas").contains("drink"));
        assert!(upsell_for("Snack Mix").contains("drink"));
        assert_eq!(upsell_for("Chicle"), "Great! Anything else the customer needs?");
        assert_eq!(upsell_for(""), "Product added to the cart.");
    }
}
