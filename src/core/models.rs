//! Data model: name tokens, candidates, account records and enriched reports.

use crate::core::error::ServiceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered, normalized parts of a display name.
///
/// Every token is lowercase ASCII alphanumeric and non-empty. Only
/// `utils::names::normalize_name` constructs values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameTokens(Vec<String>);

impl NameTokens {
    pub(crate) fn from_normalized(tokens: Vec<String>) -> Self {
        debug_assert!(tokens.iter().all(|t| {
            !t.is_empty() && t.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        }));
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Tokens joined by single spaces, used to name per-name artifacts.
    pub fn full_name(&self) -> String {
        self.0.join(" ")
    }
}

impl fmt::Display for NameTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// The four fixed local-part layouts. `given` is the first token and `rest`
/// the concatenation of the remaining ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// `given.rest`
    GivenDotRest,
    /// `rest.given`
    RestDotGiven,
    /// `initial(given).rest`
    InitialDotRest,
    /// `initials(rest).given`
    RestInitialsDotGiven,
}

impl Template {
    /// Templates in generation order.
    pub const ORDERED: [Template; 4] = [
        Template::GivenDotRest,
        Template::RestDotGiven,
        Template::InitialDotRest,
        Template::RestInitialsDotGiven,
    ];

    pub fn id(self) -> u8 {
        match self {
            Template::GivenDotRest => 0,
            Template::RestDotGiven => 1,
            Template::InitialDotRest => 2,
            Template::RestInitialsDotGiven => 3,
        }
    }
}

/// A generated guess at an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    address: String,
    template: Template,
    tokens: NameTokens,
}

impl Candidate {
    pub(crate) fn new(address: String, template: Template, tokens: NameTokens) -> Self {
        Self {
            address,
            template,
            tokens,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn tokens(&self) -> &NameTokens {
        &self.tokens
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Why a name produced no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SingleToken,
    UnsupportedArity(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SingleToken => write!(f, "single name entry"),
            SkipReason::UnsupportedArity(n) => write!(f, "name has {} parts", n),
        }
    }
}

/// Visibility context an account attribute belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Container {
    Profile,
    Contact,
    DomainProfile,
    DomainContact,
    Other(String),
}

impl Container {
    pub fn as_str(&self) -> &str {
        match self {
            Container::Profile => "PROFILE",
            Container::Contact => "CONTACT",
            Container::DomainProfile => "DOMAIN_PROFILE",
            Container::DomainContact => "DOMAIN_CONTACT",
            Container::Other(name) => name,
        }
    }

    /// Key under which a report for this container is serialized.
    pub fn report_key(&self) -> String {
        format!("{}_CONTAINER", self.as_str())
    }
}

impl From<String> for Container {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PROFILE" => Container::Profile,
            "CONTACT" => Container::Contact,
            "DOMAIN_PROFILE" => Container::DomainProfile,
            "DOMAIN_CONTACT" => Container::DomainContact,
            _ => Container::Other(value),
        }
    }
}

impl From<Container> for String {
    fn from(value: Container) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable numeric account identifier. Kept as text because it does not fit in 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Attributes of an account as seen from one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<Photo>,
    #[serde(default)]
    pub cover_photo: Option<Photo>,
    #[serde(default)]
    pub user_types: Vec<String>,
    #[serde(default)]
    pub reachable_apps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlusData {
    #[serde(default)]
    pub is_enterprise_user: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedData {
    #[serde(default)]
    pub chat: ChatData,
    #[serde(default)]
    pub plus: PlusData,
}

/// Account returned by a successful lookup. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: AccountId,
    pub containers: BTreeMap<Container, ContainerRecord>,
    #[serde(default)]
    pub extended: ExtendedData,
}

impl AccountRecord {
    pub fn has_container(&self, container: &Container) -> bool {
        self.containers.contains_key(container)
    }

    /// The public-profile view, if the account has one.
    pub fn profile(&self) -> Option<&ContainerRecord> {
        self.containers.get(&Container::Profile)
    }

    pub fn container_names(&self) -> Vec<&Container> {
        self.containers.keys().collect()
    }
}

/// Raw answer of the account-lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupResponse {
    pub found: bool,
    #[serde(default)]
    pub person: Option<AccountRecord>,
}

/// Classification of one probe. Exactly one variant per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Resolved(AccountRecord),
    NoPublicProfile,
    NotFound,
    TransientError(ServiceError),
}

impl ProbeOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Resolved(_) => "resolved",
            ProbeOutcome::NoPublicProfile => "no_public_profile",
            ProbeOutcome::NotFound => "not_found",
            ProbeOutcome::TransientError(_) => "transient_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedGame {
    pub name: String,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub experience_points: Option<u64>,
    #[serde(default)]
    pub played_games: Vec<PlayedGame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub place: Option<Place>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPhoto {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub place: Option<Place>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// Raw answer of the map-review service. `error` set means "no data", not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MapsResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub stats: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub reviews: Option<Vec<Review>>,
    #[serde(default)]
    pub photos: Option<Vec<MapPhoto>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapsSection {
    pub photos: Option<Vec<MapPhoto>>,
    pub reviews: Option<Vec<Review>>,
    pub stats: Option<BTreeMap<String, u64>>,
}

impl MapsSection {
    pub fn is_empty(&self) -> bool {
        self.photos.is_none() && self.reviews.is_none() && self.stats.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDetails {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvents {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}

/// Raw answer of the calendar service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CalendarResponse {
    pub found: bool,
    #[serde(default)]
    pub calendar: Option<CalendarDetails>,
    #[serde(default)]
    pub events: Option<CalendarEvents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSection {
    pub details: Option<CalendarDetails>,
    pub events: Option<CalendarEvents>,
}

/// Merged result for one resolved account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedReport {
    pub address: String,
    pub container: Container,
    pub account: AccountRecord,
    pub play_games: Option<PlayerProfile>,
    pub maps: MapsSection,
    pub calendar: Option<CalendarSection>,
}

/// Serialized shape of one container entry.
#[derive(Debug, Serialize)]
pub struct ContainerReport<'a> {
    pub profile: &'a AccountRecord,
    pub play_games: Option<&'a PlayerProfile>,
    pub maps: &'a MapsSection,
    pub calendar: Option<&'a CalendarSection>,
}

impl EnrichedReport {
    /// Tree-shaped document keyed by `<CONTAINER>_CONTAINER`.
    pub fn to_document(&self) -> BTreeMap<String, ContainerReport<'_>> {
        let mut document = BTreeMap::new();
        document.insert(
            self.container.report_key(),
            ContainerReport {
                profile: &self.account,
                play_games: self.play_games.as_ref(),
                maps: &self.maps,
                calendar: self.calendar.as_ref(),
            },
        );
        document
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_document())
    }
}

/// Addresses that resolved for one input name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub name: String,
    pub found: Vec<String>,
}

impl BatchResult {
    pub fn has_matches(&self) -> bool {
        !self.found.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_from_wire_names() {
        assert_eq!(Container::from("PROFILE".to_string()), Container::Profile);
        assert_eq!(Container::from("profile".to_string()), Container::Profile);
        assert_eq!(
            Container::from("DOMAIN_PROFILE".to_string()),
            Container::DomainProfile
        );
        assert_eq!(
            Container::from("AFFINITY".to_string()),
            Container::Other("AFFINITY".to_string())
        );
        assert_eq!(Container::Profile.report_key(), "PROFILE_CONTAINER");
    }

    #[test]
    fn test_account_record_deserializes_with_defaults() {
        let json = r#"{
            "account_id": "112233445566778899001",
            "containers": {
                "PROFILE": { "display_name": "Jean Dupont", "user_types": ["GOOGLE_USER"] },
                "CONTACT": {}
            }
        }"#;
        let record: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.account_id.0, "112233445566778899001");
        assert!(record.has_container(&Container::Profile));
        assert!(record.has_container(&Container::Contact));
        assert_eq!(
            record.profile().and_then(|p| p.display_name.as_deref()),
            Some("Jean Dupont")
        );
        assert!(!record.extended.plus.is_enterprise_user);
        assert!(record.extended.chat.customer_id.is_none());
    }

    #[test]
    fn test_report_document_keeps_absent_sections_null() {
        let record = AccountRecord {
            account_id: AccountId("1".into()),
            containers: BTreeMap::from([(Container::Profile, ContainerRecord::default())]),
            extended: ExtendedData::default(),
        };
        let report = EnrichedReport {
            address: "jean.dupont@gmail.com".into(),
            container: Container::Profile,
            account: record,
            play_games: None,
            maps: MapsSection::default(),
            calendar: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        let entry = &value["PROFILE_CONTAINER"];
        assert!(entry["play_games"].is_null());
        assert!(entry["calendar"].is_null());
        assert!(entry["maps"]["reviews"].is_null());
        assert_eq!(entry["profile"]["account_id"], "1");
        assert!(entry["profile"]["containers"]["PROFILE"].is_object());
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(SkipReason::SingleToken.to_string(), "single name entry");
        assert_eq!(SkipReason::UnsupportedArity(5).to_string(), "name has 5 parts");
    }

    #[test]
    fn test_probe_outcome_labels_are_distinct() {
        let labels = [
            ProbeOutcome::Resolved(crate::services::mock::account("1", &[Container::Profile])),
            ProbeOutcome::NoPublicProfile,
            ProbeOutcome::NotFound,
            ProbeOutcome::TransientError(ServiceError::Timeout),
        ]
        .iter()
        .map(|o| o.label())
        .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(labels.len(), 4);
        assert!(labels.contains("not_found"));
    }
}
