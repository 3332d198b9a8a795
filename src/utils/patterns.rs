//! Generates candidate email addresses from normalized name tokens.

use crate::core::models::{Candidate, NameTokens, SkipReason, Template};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shape of every address the generator may produce.
pub(crate) static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(\.[a-z0-9]+)*@[a-z0-9-]+(\.[a-z0-9-]+)+$")
        .expect("candidate email regex is valid")
});

fn initial(token: &str) -> String {
    token.chars().next().map(String::from).unwrap_or_default()
}

fn local_part(template: Template, given: &str, rest: &[String]) -> String {
    let joined_rest = rest.concat();
    match template {
        Template::GivenDotRest => format!("{}.{}", given, joined_rest),
        Template::RestDotGiven => format!("{}.{}", joined_rest, given),
        Template::InitialDotRest => format!("{}.{}", initial(given), joined_rest),
        Template::RestInitialsDotGiven => {
            let initials: String = rest.iter().map(|t| initial(t)).collect();
            format!("{}.{}", initials, given)
        }
    }
}

/// Produces the four candidates for a 2 to 4 token name, in template order.
///
/// Duplicates are kept (e.g. `jean.jean` twice for "Jean Jean") so that each
/// template always maps to exactly one position. A single token yields
/// `SkipReason::SingleToken`; other arities yield `SkipReason::UnsupportedArity`.
pub fn generate_candidates(
    tokens: &NameTokens,
    domain: &str,
) -> std::result::Result<Vec<Candidate>, SkipReason> {
    let parts = tokens.as_slice();
    match parts.len() {
        1 => return Err(SkipReason::SingleToken),
        2..=4 => {}
        n => return Err(SkipReason::UnsupportedArity(n)),
    }

    let (given, rest) = (&parts[0], &parts[1..]);
    let candidates: Vec<Candidate> = Template::ORDERED
        .iter()
        .map(|&template| {
            let address = format!("{}@{}", local_part(template, given, rest), domain);
            Candidate::new(address, template, tokens.clone())
        })
        .collect();

    tracing::debug!(
        "Generated {} candidates for '{}' @ '{}'",
        candidates.len(),
        tokens,
        domain
    );
    Ok(candidates)
}
