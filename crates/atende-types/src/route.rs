use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::ids::ThreadId;

/// Dashboard screens, addressed by hash routes (`#/contacts/12`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Chat,
    Contacts,
    Contact(ThreadId),
    Profile,
    Dashboard,
    Integrations,
    Products,
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, SchemaError> {
        let trimmed = path.trim().trim_start_matches('#');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["chat"] => Ok(Route::Chat),
            ["contacts"] => Ok(Route::Contacts),
            ["contacts", id] => Ok(Route::Contact(ThreadId::from(*id))),
            ["profile"] => Ok(Route::Profile),
            ["dashboard"] => Ok(Route::Dashboard),
            ["integrations"] => Ok(Route::Integrations),
            ["products"] => Ok(Route::Products),
            _ => Err(SchemaError::UnknownRoute(path.to_string())),
        }
    }
}

impl FromStr for Route {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Chat => f.write_str("#/chat"),
            Route::Contacts => f.write_str("#/contacts"),
            Route::Contact(id) => write!(f, "#/contacts/{}", id),
            Route::Profile => f.write_str("#/profile"),
            Route::Dashboard => f.write_str("#/dashboard"),
            Route::Integrations => f.write_str("#/integrations"),
            Route::Products => f.write_str("#/products"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("#/chat").unwrap(), Route::Chat);
        assert_eq!(Route::parse("/contacts").unwrap(), Route::Contacts);
        assert_eq!(
            Route::parse("#/contacts/12").unwrap(),
            Route::Contact(ThreadId::from(12))
        );
        assert_eq!(Route::parse("").unwrap(), Route::Chat);
        assert!(Route::parse("#/billing").is_err());
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(Route::Contact(ThreadId::from(3)).to_string(), "#/contacts/3");
        assert_eq!(Route::parse(&Route::Integrations.to_string()).unwrap(), Route::Integrations);
    }
}
