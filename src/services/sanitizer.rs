use crate::models::{CleanProduct, Product, NOT_AVAILABLE};

/// Absent, blank and textual-NaN values all count as missing.
fn field(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() && !v.trim().eq_ignore_ascii_case("nan") => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Project a catalog product onto the public field set.
pub fn clean(product: &Product) -> CleanProduct {
    CleanProduct {
        title: field(&product.title),
        brand: field(&product.brand),
        description: field(&product.description),
        image_link: field(&product.image_link),
        site_link: field(&product.site_link),
    }
}
