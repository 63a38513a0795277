//! Generative-over-heuristic merge

use super::record::{ExtractionRecord, TextField};

/// Merge the two strategies into the final record
///
/// Each field takes the generative value when it is non-empty and the
/// heuristic value otherwise. `URL` is always the caller's normalized site
/// URL, and a generative `raw_ai_output` is carried through.
#[must_use]
pub fn merge(
    heuristic: ExtractionRecord,
    generative: Option<ExtractionRecord>,
    site_url: &str,
) -> ExtractionRecord {
    let mut merged = heuristic;

    if let Some(generative) = generative {
        for field in TextField::ALL {
            let value = generative.text(field).trim();
            if !value.is_empty() {
                *merged.text_mut(field) = value.to_string();
            }
        }
        if !generative.main_services.is_empty() {
            merged.main_services = generative.main_services;
        }
        merged.raw_ai_output = generative.raw_ai_output;
    }

    merged.url = site_url.to_string();
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic() -> ExtractionRecord {
        ExtractionRecord {
            email: "a@x.com".into(),
            business_name: "Acme".into(),
            url: "https://acme.io".into(),
            ..ExtractionRecord::default()
        }
    }

    #[test]
    fn empty_generative_value_keeps_heuristic() {
        let generative = ExtractionRecord {
            email: String::new(),
            ..ExtractionRecord::default()
        };
        let merged = merge(heuristic(), Some(generative), "https://acme.io");
        assert_eq!(merged.email, "a@x.com");
    }

    #[test]
    fn generative_value_wins() {
        let generative = ExtractionRecord {
            email: "b@y.com".into(),
            main_services: vec!["Launch".into()],
            ..ExtractionRecord::default()
        };
        let merged = merge(heuristic(), Some(generative), "https://acme.io");
        assert_eq!(merged.email, "b@y.com");
        assert_eq!(merged.business_name, "Acme");
        assert_eq!(merged.main_services, vec!["Launch"]);
    }

    #[test]
    fn url_is_always_the_callers() {
        let generative = ExtractionRecord {
            url: "https://hallucinated.example".into(),
            ..ExtractionRecord::default()
        };
        let merged = merge(heuristic(), Some(generative), "https://acme.io");
        assert_eq!(merged.url, "https://acme.io");
    }

    #[test]
    fn no_generative_is_heuristic_verbatim() {
        let merged = merge(heuristic(), None, "https://acme.io");
        assert_eq!(merged, heuristic());
    }

    #[test]
    fn diagnostic_is_carried_through() {
        let merged = merge(
            heuristic(),
            Some(ExtractionRecord::diagnostic("prose")),
            "https://acme.io",
        );
        assert_eq!(merged.raw_ai_output.as_deref(), Some("prose"));
        assert_eq!(merged.email, "a@x.com");
    }
}
