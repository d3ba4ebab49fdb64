//! Clean-up of generated recommendation text before rendering

const BOLD_MARKER: &str = "**";

/// Removes every `**` bold marker.
///
/// A run of `n` asterisks becomes `n % 2`, so a second pass is a no-op.
pub fn clean(text: &str) -> String {
    text.replace(BOLD_MARKER, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_bold_markers() {
        let cleaned = clean("**Recommendation 1:** Offer a **market-aligned** raise.");
        assert_eq!(cleaned, "Recommendation 1: Offer a market-aligned raise.");
        assert!(!cleaned.contains("**"));
    }

    #[test]
    fn test_idempotent_on_odd_runs() {
        for input in ["***", "*****x**", "a * b", "****", "no markup", ""] {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input {:?}", input);
            assert!(!once.contains("**"));
        }
    }
}
