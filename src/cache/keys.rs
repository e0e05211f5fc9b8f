//! Fixed cache keys, one per persisted collection.

/// Ordered list of brand names.
pub const BRANDS: &str = "brands";
/// Map of brand name to its workspace state.
pub const WORKSPACES: &str = "brand_workspaces";
pub const DARK_MODE: &str = "dark_mode";
pub const LAST_VIEW: &str = "last_view";
pub const LAST_BRAND: &str = "last_brand";
pub const ONBOARDING_STEPS: &str = "onboarding_completed_steps";

const DOCUMENTS_PREFIX: &str = "documents:";

/// Key holding the document list of one brand.
pub fn documents(brand: &str) -> String {
    format!("{DOCUMENTS_PREFIX}{brand}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_key_is_per_brand() {
        assert_eq!(documents("Acme"), "documents:Acme");
        assert_ne!(documents("Acme"), documents("acme"));
    }
}
