//! Human-readable meanings of account user-type tags.

/// Describes a user-type tag, or returns a generic text for unknown tags.
pub fn user_type_definition(user_type: &str) -> &'static str {
    match user_type {
        "USER_TYPE_UNKNOWN" => "The user type is not known.",
        "GOOGLE_USER" => "The user is a regular consumer account.",
        "GPLUS_USER" => "The user had a social profile on the account.",
        "GOOGLE_APPS_USER" => "The user belongs to a managed (workspace) organization.",
        "OWNER_USER_TYPE_UNKNOWN" => "The owner user type is not known.",
        "GPLUS_DISABLED_BY_ADMIN" => "The social profile was disabled by an administrator.",
        "GOOGLE_APPS_ADMIN_DISABLED" => "The account was disabled by a workspace administrator.",
        "GOOGLE_FAMILY_USER" => "The user is part of a family group.",
        "GOOGLE_FAMILY_CHILD_USER" => "The user is a supervised child account in a family group.",
        "GOOGLE_FAMILY_CONVERTED_CHILD_USER" => {
            "The user was a supervised child account that graduated to a regular account."
        }
        "GOOGLE_ONE_USER" => "The user has a paid storage subscription.",
        _ => "Unknown user type.",
    }
}
